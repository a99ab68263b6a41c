//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        cookie::{get_token_from_cookies, set_auth_cookie},
        token::Session,
        user::get_user_by_username,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_SUCCESS_STYLE, LINK_STYLE, base, form_error, log_in_register,
        password_input, text_input,
    },
    internal_server_error::InternalServerError,
};

const EMPTY_FIELDS_ERROR_MSG: &str = "Please fill in all fields";
const REGISTERED_MSG: &str = "Registration successful! Please log in.";

fn log_in_form(username: &str, error_message: Option<&str>, success_message: Option<&str>) -> Markup {
    html! {
        @if let Some(success_message) = success_message
        {
            div class=(FORM_SUCCESS_STYLE) role="status" { (success_message) }
        }

        (form_error(error_message))

        form method="post" action=(endpoints::LOG_IN_VIEW)
        {
            (text_input("Username", "username", "text", username, true))
            (password_input("Password", "password"))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }
        }

        p class="auth-footer"
        {
            "Don't have an account? "
            a href=(endpoints::REGISTER_VIEW) class=(LINK_STYLE) { "Sign up" }
        }
    }
}

fn log_in_page(username: &str, error_message: Option<&str>, success_message: Option<&str>) -> Markup {
    let form = log_in_form(username, error_message, success_message);
    let content = log_in_register("Welcome back", &form);

    base("Log In", &[], &content)
}

/// The query parameters accepted by the log-in page.
#[derive(Debug, Default, Deserialize)]
pub struct LogInQuery {
    /// Set after a successful registration so that the page can confirm it.
    pub registered: Option<String>,
}

/// Display the log-in page, or redirect to the dashboard if the user is already logged in.
pub async fn get_log_in_page(jar: PrivateCookieJar, Query(query): Query<LogInQuery>) -> Response {
    if get_token_from_cookies(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    let success_message = query.registered.is_some().then_some(REGISTERED_MSG);

    log_in_page("", None, success_message).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is redirected to the dashboard page.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let username = user_data.username.trim();

    if username.is_empty() || user_data.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            log_in_page(username, Some(EMPTY_FIELDS_ERROR_MSG), None),
        )
            .into_response();
    }

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return InternalServerError::default().into_response();
            }
        };

        get_user_by_username(username, &connection)
    };

    let invalid_credentials = || {
        (
            StatusCode::UNAUTHORIZED,
            log_in_page(username, Some(&Error::InvalidCredentials.to_string()), None),
        )
            .into_response()
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound) => return invalid_credentials(),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return InternalServerError::default().into_response();
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return InternalServerError::default().into_response();
        }
    }

    match set_auth_cookie(jar, Session::from(&user), state.cookie_duration) {
        Ok(jar) => (jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            InternalServerError::default().into_response()
        }
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password hash in the database.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    #[serde(default)]
    pub username: String,

    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,
}
