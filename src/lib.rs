//! BudgetFlow is a web app for tracking personal income, expenses and monthly budgets.
//!
//! This library serves the log-in, registration and dashboard pages as HTML and
//! exposes a small JSON API that the dashboard script uses to manage
//! transactions and budgets.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod amount;
mod api;
mod app_state;
mod auth;
mod budget;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod month;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use amount::Amount;
pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, create_user};
pub use budget::{Budget, create_or_update_budget};
pub use category::CategoryName;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::YearMonth;
pub use routing::build_router;
pub use transaction::{Transaction, TransactionType, create_transaction};

use crate::api::ErrorResponse;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// The display string of client errors is sent back to the client as-is, so
/// it should read as a complete sentence.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a valid session cookie.
    #[error("Unauthorized")]
    Unauthorized,

    /// The username and password did not match a registered user.
    ///
    /// The same error is used for unknown usernames and wrong passwords so
    /// that clients cannot probe for registered usernames.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The password given at registration is too short.
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    /// The username or email given at registration is already taken.
    #[error("Username or email already exists")]
    DuplicateUser,

    /// The `action` query parameter was missing or did not name a supported operation.
    #[error("Invalid action")]
    InvalidAction,

    /// The request body was not valid JSON or did not match the expected schema.
    #[error("Invalid JSON input: {0}")]
    InvalidJson(String),

    /// The query string could not be parsed.
    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),

    /// A month was not in the `YYYY-MM` format.
    #[error("Invalid month \"{0}\", expected the format YYYY-MM")]
    InvalidMonth(String),

    /// A transaction ID was missing or not a positive integer.
    #[error("Invalid transaction ID")]
    InvalidTransactionId,

    /// A budget ID was missing or not a positive integer.
    #[error("Invalid budget ID")]
    InvalidBudgetId,

    /// An empty string was used as a category.
    #[error("Category is required")]
    EmptyCategory,

    /// A category name was longer than 50 characters.
    #[error("Category must be at most 50 characters")]
    CategoryTooLong,

    /// An amount of zero or less was given for a transaction or budget.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// Tried to update a transaction that does not exist or belongs to another user.
    #[error("Transaction not found")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist or belongs to another user.
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// Tried to update a budget that does not exist or belongs to another user.
    #[error("Budget not found")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist or belongs to another user.
    #[error("Budget not found")]
    DeleteMissingBudget,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.") =>
            {
                Error::DuplicateUser
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::PasswordTooShort
            | Error::DuplicateUser
            | Error::InvalidAction
            | Error::InvalidJson(_)
            | Error::InvalidQuery(_)
            | Error::InvalidMonth(_)
            | Error::InvalidTransactionId
            | Error::InvalidBudgetId
            | Error::EmptyCategory
            | Error::CategoryTooLong
            | Error::NonPositiveAmount => StatusCode::BAD_REQUEST,
            Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingBudget
            | Error::DeleteMissingBudget
            | Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::JSONSerializationError(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code.is_server_error() {
            // Internal details stay in the server logs.
            tracing::error!("An unexpected error occurred: {}", self);
            "An internal error occurred. Please try again later.".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(ErrorResponse::new(message))).into_response()
    }
}
