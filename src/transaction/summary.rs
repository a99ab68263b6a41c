//! Monthly income and expense totals.

use rusqlite::{Connection, named_params};
use serde::Serialize;

use crate::{
    Error,
    amount::Amount,
    auth::UserID,
    month::YearMonth,
    transaction::TransactionType,
};

/// The totals for one month of a user's transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    /// The sum of the income transactions.
    pub income: Amount,
    /// The sum of the expense transactions.
    pub expense: Amount,
    /// Income minus expenses. Negative if the user spent more than they earned.
    pub balance: Amount,
}

/// Sum the transactions of `user_id` dated in `month`, grouped by type.
///
/// Types without any transactions in the month count as zero.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_monthly_summary(
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<MonthlySummary, Error> {
    let mut statement = connection.prepare(
        "SELECT type, SUM(amount) FROM \"transaction\"
         WHERE user_id = :user_id AND strftime('%Y-%m', date) = :month
         GROUP BY type",
    )?;
    let totals = statement.query_map(
        named_params! {":user_id": user_id, ":month": month},
        |row| Ok((row.get::<_, TransactionType>(0)?, row.get::<_, Amount>(1)?)),
    )?;

    let mut summary = MonthlySummary::default();

    for total in totals {
        match total? {
            (TransactionType::Income, amount) => summary.income = amount,
            (TransactionType::Expense, amount) => summary.expense = amount,
        }
    }

    summary.balance = summary.income - summary.expense;

    Ok(summary)
}
