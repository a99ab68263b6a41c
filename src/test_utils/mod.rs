#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value, must_get_form,
};
pub(crate) use html::{assert_valid_html, element_text, must_select, parse_html_document};
pub(crate) use http::{
    TEST_EMAIL, TEST_FULL_NAME, TEST_PASSWORD, TEST_USERNAME, get_test_app_state,
    get_test_server, log_in_test_user,
};
