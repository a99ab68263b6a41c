//! The building blocks shared by the JSON API endpoints.
//!
//! Each API endpoint is a single route that selects the operation with the
//! `action` query parameter. Successful responses carry `"success": true`, and
//! errors are sent as [ErrorResponse] by [Error]'s `IntoResponse` impl.

use std::str::FromStr;

use axum::{
    body::Bytes,
    extract::{Query, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Error, database_id::DatabaseId, month::YearMonth, timezone::current_month};

/// The JSON body sent when a request fails.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    success: bool,
    error: String,
}

impl ErrorResponse {
    /// Wrap an error message in the error envelope.
    pub fn new(error: String) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// The JSON body sent when a request for data succeeds.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    success: bool,
    data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// The JSON body sent when a change succeeds.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    success: bool,
    message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// The operations the API endpoints can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetAll,
    Create,
    Update,
    Delete,
    GetSummary,
    GetSpending,
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get_all" => Ok(Self::GetAll),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "get_summary" => Ok(Self::GetSummary),
            "get_spending" => Ok(Self::GetSpending),
            _ => Err(Error::InvalidAction),
        }
    }
}

/// The query string accepted by the API endpoints.
///
/// `id` and `month` are kept as strings so that a malformed value gets a
/// specific error message instead of a generic query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
    #[serde(default)]
    pub action: String,
    pub id: Option<String>,
    pub month: Option<String>,
}

impl ActionQuery {
    /// Unpack the query string, turning a rejection into an [Error::InvalidQuery].
    pub fn from_extractor(query: Result<Query<ActionQuery>, QueryRejection>) -> Result<Self, Error> {
        query
            .map(|Query(query)| query)
            .map_err(|rejection| Error::InvalidQuery(rejection.body_text()))
    }

    pub fn action(&self) -> Result<Action, Error> {
        self.action.parse()
    }

    /// The `id` parameter if it is a positive integer.
    pub fn id(&self) -> Option<DatabaseId> {
        self.id.as_deref().and_then(parse_id)
    }

    /// The `month` parameter, or the current month in `local_timezone` if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidMonth] if the month is not in the format
    /// `YYYY-MM`, or an [Error::InvalidTimezoneError] if the current month is
    /// needed and `local_timezone` is not a valid timezone.
    pub fn month_or_current(&self, local_timezone: &str) -> Result<YearMonth, Error> {
        match self.month.as_deref().map(str::trim) {
            Some(month) if !month.is_empty() => month.parse(),
            _ => current_month(local_timezone),
        }
    }
}

/// Parse a database ID, accepting only positive integers.
pub fn parse_id(raw: &str) -> Option<DatabaseId> {
    raw.trim().parse().ok().filter(|id: &DatabaseId| *id > 0)
}

/// Deserialize a JSON request body.
///
/// # Errors
///
/// Returns an [Error::InvalidJson] if the body is not valid JSON or does not
/// match the schema of `T`.
pub fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|error| Error::InvalidJson(error.to_string()))
}
