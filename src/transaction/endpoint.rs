//! The JSON endpoint used by the dashboard to manage transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    amount::Amount,
    api::{Action, ActionQuery, DataResponse, MessageResponse, parse_json_body},
    auth::Session,
    category::CategoryName,
    database_id::TransactionId,
    db::lock_connection,
    timezone::local_today,
    transaction::{
        TransactionBuilder, TransactionType, create_transaction, delete_transaction,
        get_monthly_summary, get_transactions, update_transaction,
    },
};

const CREATED_MSG: &str = "Transaction added successfully";
const UPDATED_MSG: &str = "Transaction updated successfully";
const DELETED_MSG: &str = "Transaction deleted successfully";

/// The state needed by the transactions endpoint.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Manila".
    pub local_timezone: String,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a transaction.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateTransactionBody {
    #[serde(rename = "type")]
    type_: TransactionType,
    category: String,
    amount: Amount,
    note: Option<String>,
    date: Option<Date>,
}

/// The JSON body for updating a transaction.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateTransactionBody {
    transaction_id: TransactionId,
    #[serde(rename = "type")]
    type_: TransactionType,
    category: String,
    amount: Amount,
    note: Option<String>,
    date: Option<Date>,
}

#[derive(Debug, Serialize)]
struct TransactionCreated {
    success: bool,
    transaction_id: TransactionId,
    message: &'static str,
}

/// Check the fields shared by the create and update bodies.
///
/// The date defaults to today in `local_timezone`.
fn validate_fields(
    type_: TransactionType,
    category: &str,
    amount: Amount,
    note: Option<String>,
    date: Option<Date>,
    local_timezone: &str,
) -> Result<TransactionBuilder, Error> {
    let category = CategoryName::new(category)?;
    let amount = amount.require_positive()?;
    let date = match date {
        Some(date) => date,
        None => local_today(local_timezone)?,
    };

    Ok(TransactionBuilder {
        type_,
        category,
        amount,
        date,
        note: note.unwrap_or_default().trim().to_owned(),
    })
}

/// A route handler for listing, creating, updating and deleting the logged-in
/// user's transactions, and for their monthly totals.
///
/// The operation is chosen with the `action` query parameter.
pub async fn transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    query: Result<Query<ActionQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Response, Error> {
    let query = ActionQuery::from_extractor(query)?;

    match query.action()? {
        Action::GetAll => get_all(&state, &session),
        Action::Create => create(&state, &session, &body),
        Action::Update => update(&state, &session, &body),
        Action::Delete => delete(&state, &session, &query),
        Action::GetSummary => get_summary(&state, &session, &query),
        Action::GetSpending => Err(Error::InvalidAction),
    }
}

fn get_all(state: &TransactionState, session: &Session) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let transactions = get_transactions(session.user_id, &connection)?;

    Ok(Json(DataResponse::new(transactions)).into_response())
}

fn create(state: &TransactionState, session: &Session, body: &Bytes) -> Result<Response, Error> {
    let body: CreateTransactionBody = parse_json_body(body)?;
    let builder = validate_fields(
        body.type_,
        &body.category,
        body.amount,
        body.note,
        body.date,
        &state.local_timezone,
    )?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(session.user_id, builder, &connection)?;

    tracing::debug!(
        "User {} created transaction {}",
        session.user_id,
        transaction.id
    );

    Ok(Json(TransactionCreated {
        success: true,
        transaction_id: transaction.id,
        message: CREATED_MSG,
    })
    .into_response())
}

fn update(state: &TransactionState, session: &Session, body: &Bytes) -> Result<Response, Error> {
    let body: UpdateTransactionBody = parse_json_body(body)?;

    if body.transaction_id <= 0 {
        return Err(Error::InvalidTransactionId);
    }

    let builder = validate_fields(
        body.type_,
        &body.category,
        body.amount,
        body.note,
        body.date,
        &state.local_timezone,
    )?;

    let connection = lock_connection(&state.db_connection)?;
    update_transaction(body.transaction_id, session.user_id, builder, &connection)?;

    Ok(Json(MessageResponse::new(UPDATED_MSG)).into_response())
}

fn delete(
    state: &TransactionState,
    session: &Session,
    query: &ActionQuery,
) -> Result<Response, Error> {
    let id = query.id().ok_or(Error::InvalidTransactionId)?;

    let connection = lock_connection(&state.db_connection)?;
    delete_transaction(id, session.user_id, &connection)?;

    Ok(Json(MessageResponse::new(DELETED_MSG)).into_response())
}

fn get_summary(
    state: &TransactionState,
    session: &Session,
    query: &ActionQuery,
) -> Result<Response, Error> {
    let month = query.month_or_current(&state.local_timezone)?;

    let connection = lock_connection(&state.db_connection)?;
    let summary = get_monthly_summary(session.user_id, month, &connection)?;

    Ok(Json(DataResponse::new(summary)).into_response())
}
