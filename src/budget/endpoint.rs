//! The JSON endpoint used by the dashboard to manage budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    amount::Amount,
    api::{Action, ActionQuery, DataResponse, MessageResponse, parse_json_body},
    auth::Session,
    budget::{
        BudgetChange, create_or_update_budget, delete_budget, get_budgets,
        get_spending_by_category, update_budget_amount,
    },
    category::CategoryName,
    database_id::BudgetId,
    db::lock_connection,
    month::YearMonth,
    timezone::current_month,
};

const CREATED_MSG: &str = "Budget created successfully";
const UPDATED_MSG: &str = "Budget updated successfully";
const DELETED_MSG: &str = "Budget deleted successfully";

/// The state needed by the budgets endpoint.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Manila".
    pub local_timezone: String,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for setting the budget of a category.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateBudgetBody {
    category: String,
    amount: Amount,
    /// Defaults to the current month.
    month: Option<String>,
}

/// The JSON body for changing the amount of a budget.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateBudgetBody {
    budget_id: BudgetId,
    amount: Amount,
}

#[derive(Debug, Serialize)]
struct BudgetSaved {
    success: bool,
    budget_id: BudgetId,
    message: &'static str,
}

/// A route handler for listing, setting, updating and deleting the logged-in
/// user's budgets, and for their spending per category.
///
/// The operation is chosen with the `action` query parameter.
pub async fn budgets_endpoint(
    State(state): State<BudgetState>,
    Extension(session): Extension<Session>,
    query: Result<Query<ActionQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Response, Error> {
    let query = ActionQuery::from_extractor(query)?;

    match query.action()? {
        Action::GetAll => get_all(&state, &session, &query),
        Action::Create => create(&state, &session, &body),
        Action::Update => update(&state, &session, &body),
        Action::Delete => delete(&state, &session, &query),
        Action::GetSpending => get_spending(&state, &session, &query),
        Action::GetSummary => Err(Error::InvalidAction),
    }
}

fn get_all(state: &BudgetState, session: &Session, query: &ActionQuery) -> Result<Response, Error> {
    let month = query.month_or_current(&state.local_timezone)?;

    let connection = lock_connection(&state.db_connection)?;
    let budgets = get_budgets(session.user_id, month, &connection)?;

    Ok(Json(DataResponse::new(budgets)).into_response())
}

fn create(state: &BudgetState, session: &Session, body: &Bytes) -> Result<Response, Error> {
    let body: CreateBudgetBody = parse_json_body(body)?;
    let category = CategoryName::new(&body.category)?;
    let amount = body.amount.require_positive()?;
    let month: YearMonth = match body.month.as_deref().map(str::trim) {
        Some(month) if !month.is_empty() => month.parse()?,
        _ => current_month(&state.local_timezone)?,
    };

    let connection = lock_connection(&state.db_connection)?;
    let (budget, change) =
        create_or_update_budget(session.user_id, category, amount, month, &connection)?;

    let message = match change {
        BudgetChange::Created => CREATED_MSG,
        BudgetChange::Updated => UPDATED_MSG,
    };

    Ok(Json(BudgetSaved {
        success: true,
        budget_id: budget.id,
        message,
    })
    .into_response())
}

fn update(state: &BudgetState, session: &Session, body: &Bytes) -> Result<Response, Error> {
    let body: UpdateBudgetBody = parse_json_body(body)?;

    if body.budget_id <= 0 {
        return Err(Error::InvalidBudgetId);
    }

    let amount = body.amount.require_positive()?;

    let connection = lock_connection(&state.db_connection)?;
    update_budget_amount(body.budget_id, session.user_id, amount, &connection)?;

    Ok(Json(MessageResponse::new(UPDATED_MSG)).into_response())
}

fn delete(state: &BudgetState, session: &Session, query: &ActionQuery) -> Result<Response, Error> {
    let id = query.id().ok_or(Error::InvalidBudgetId)?;

    let connection = lock_connection(&state.db_connection)?;
    delete_budget(id, session.user_id, &connection)?;

    Ok(Json(MessageResponse::new(DELETED_MSG)).into_response())
}

fn get_spending(
    state: &BudgetState,
    session: &Session,
    query: &ActionQuery,
) -> Result<Response, Error> {
    let month = query.month_or_current(&state.local_timezone)?;

    let connection = lock_connection(&state.db_connection)?;
    let spending = get_spending_by_category(session.user_id, month, &connection)?;

    Ok(Json(DataResponse::new(spending)).into_response())
}
