//! The registration page for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{
        PasswordHash, ValidatedPassword, cookie::get_token_from_cookies, user::create_user,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, form_error, log_in_register, password_input,
        text_input,
    },
};

const EMPTY_FIELDS_ERROR_MSG: &str = "All fields are required";
const INVALID_EMAIL_ERROR_MSG: &str = "Invalid email address";
const PASSWORD_MISMATCH_ERROR_MSG: &str = "Passwords do not match";
const REGISTRATION_FAILED_ERROR_MSG: &str = "Registration failed. Please try again.";

fn registration_form(user_data: &RegisterForm, error_message: Option<&str>) -> Markup {
    html! {
        (form_error(error_message))

        form method="post" action=(endpoints::REGISTER_VIEW)
        {
            (text_input("Full Name", "full_name", "text", &user_data.full_name, true))
            (text_input("Username", "username", "text", &user_data.username, false))
            (text_input("Email", "email", "email", &user_data.email, false))
            (password_input("Password", "password"))
            (password_input("Confirm Password", "confirm_password"))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Account" }
        }

        p class="auth-footer"
        {
            "Already have an account? "
            a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in" }
        }
    }
}

fn registration_page(user_data: &RegisterForm, error_message: Option<&str>) -> Markup {
    let form = registration_form(user_data, error_message);
    let content = log_in_register("Create your account", &form);

    base("Register", &[], &content)
}

/// Display the registration page, or redirect to the dashboard if the user is already logged in.
pub async fn get_register_page(jar: PrivateCookieJar) -> Response {
    if get_token_from_cookies(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    registration_page(&RegisterForm::default(), None).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The bcrypt cost used when hashing the new user's password.
    pub password_hash_cost: u32,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Check the registration form, returning the password to hash if it is valid.
///
/// The checks run in a fixed order and only the first failure is reported.
/// Leading and trailing whitespace is trimmed from every field except the passwords.
fn validate(user_data: &RegisterForm) -> Result<ValidatedPassword, String> {
    if user_data.full_name.is_empty()
        || user_data.username.is_empty()
        || user_data.email.is_empty()
        || user_data.password.is_empty()
    {
        return Err(EMPTY_FIELDS_ERROR_MSG.to_owned());
    }

    if !EmailAddress::is_valid(&user_data.email) {
        return Err(INVALID_EMAIL_ERROR_MSG.to_owned());
    }

    if user_data.password != user_data.confirm_password {
        return Err(PASSWORD_MISMATCH_ERROR_MSG.to_owned());
    }

    ValidatedPassword::new(&user_data.password).map_err(|error| error.to_string())
}

/// Handler for registration requests via the POST method.
///
/// On success the user is redirected to the log-in page, which confirms the registration.
/// Otherwise, the form is returned with the first problem found and the
/// values the user entered, except for the passwords.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(mut user_data): Form<RegisterForm>,
) -> Response {
    user_data.full_name = user_data.full_name.trim().to_owned();
    user_data.username = user_data.username.trim().to_owned();
    user_data.email = user_data.email.trim().to_owned();

    let validated_password = match validate(&user_data) {
        Ok(password) => password,
        Err(error_message) => {
            return (
                StatusCode::BAD_REQUEST,
                registration_page(&user_data, Some(&error_message)),
            )
                .into_response();
        }
    };

    let password_hash = match PasswordHash::new(validated_password, state.password_hash_cost) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                registration_page(&user_data, Some(REGISTRATION_FAILED_ERROR_MSG)),
            )
                .into_response();
        }
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => create_user(
            &user_data.username,
            &user_data.email,
            &user_data.full_name,
            password_hash,
            &connection,
        ),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    match result {
        Ok(user) => {
            tracing::info!("Registered new user {} with ID {}", user.username, user.id);
            Redirect::to(&format!("{}?registered=1", endpoints::LOG_IN_VIEW)).into_response()
        }
        Err(Error::DuplicateUser) => (
            StatusCode::BAD_REQUEST,
            registration_page(&user_data, Some(&Error::DuplicateUser.to_string())),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                registration_page(&user_data, Some(REGISTRATION_FAILED_ERROR_MSG)),
            )
                .into_response()
        }
    }
}
