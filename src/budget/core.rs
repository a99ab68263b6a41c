//! Defines the budget model and its database queries.

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior, named_params};
use serde::Serialize;

use crate::{
    Error,
    amount::Amount,
    auth::UserID,
    category::CategoryName,
    database_id::BudgetId,
    month::YearMonth,
};

/// A spending limit for one category in one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The ID of the budget.
    #[serde(rename = "budget_id")]
    pub id: BudgetId,
    /// The ID of the user that owns the budget.
    pub user_id: UserID,
    /// The category of expenses the budget applies to.
    pub category: CategoryName,
    /// How much the user plans to spend. Always positive.
    pub amount: Amount,
    /// The month the budget applies to.
    pub month: YearMonth,
}

/// Whether [create_or_update_budget] added a new budget or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetChange {
    /// There was no budget for the category and month, so one was created.
    Created,
    /// The amount of the existing budget was replaced.
    Updated,
}

/// Set the budget of `user_id` for `category` in `month` to `amount`.
///
/// A user has at most one budget per category and month, so if one already
/// exists its amount is replaced rather than a second budget being added.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or less,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_or_update_budget(
    user_id: UserID,
    category: CategoryName,
    amount: Amount,
    month: YearMonth,
    connection: &Connection,
) -> Result<(Budget, BudgetChange), Error> {
    let amount = amount.require_positive()?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let exists: bool = transaction.query_row(
        "SELECT EXISTS (
             SELECT 1 FROM budget
             WHERE user_id = :user_id AND category = :category AND month = :month
         )",
        named_params! {":user_id": user_id, ":category": category, ":month": month},
        |row| row.get(0),
    )?;

    let budget = transaction
        .prepare(
            "INSERT INTO budget (user_id, category, amount, month)
             VALUES (:user_id, :category, :amount, :month)
             ON CONFLICT(user_id, category, month) DO UPDATE SET amount = excluded.amount
             RETURNING id, user_id, category, amount, month",
        )?
        .query_row(
            named_params! {
                ":user_id": user_id,
                ":category": category,
                ":amount": amount,
                ":month": month,
            },
            map_budget_row,
        )?;

    transaction.commit()?;

    let change = if exists {
        BudgetChange::Updated
    } else {
        BudgetChange::Created
    };

    Ok((budget, change))
}

/// Get the budgets of `user_id` for `month`, ordered by category.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_budgets(
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, amount, month FROM budget
             WHERE user_id = :user_id AND month = :month
             ORDER BY category, id",
        )?
        .query_map(
            named_params! {":user_id": user_id, ":month": month},
            map_budget_row,
        )?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Replace the amount of the budget `id` if it is owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or less,
/// - [Error::UpdateMissingBudget] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget_amount(
    id: BudgetId,
    user_id: UserID,
    amount: Amount,
    connection: &Connection,
) -> Result<(), Error> {
    let amount = amount.require_positive()?;

    let rows_affected = connection.execute(
        "UPDATE budget SET amount = :amount WHERE id = :id AND user_id = :user_id",
        named_params! {":amount": amount, ":id": id, ":user_id": user_id},
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete the budget `id` if it is owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = :id AND user_id = :user_id",
        named_params! {":id": id, ":user_id": user_id},
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL CHECK (category <> ''),
                amount INTEGER NOT NULL CHECK (amount > 0),
                month TEXT NOT NULL,
                UNIQUE(user_id, category, month),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        month: row.get(4)?,
    })
}
