//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, named_params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    amount::Amount,
    auth::UserID,
    category::CategoryName,
    database_id::TransactionId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. a salary.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The name used in the database and the JSON API.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type {other:?}").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    #[serde(rename = "transaction_id")]
    pub id: TransactionId,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub type_: TransactionType,
    /// What the money was earned or spent on, e.g. "Food".
    pub category: CategoryName,
    /// The amount of money spent or earned. Always positive.
    pub amount: Amount,
    /// A free text note, empty if the user did not write one.
    pub note: String,
    /// When the transaction happened.
    #[serde(rename = "transaction_date")]
    pub date: Date,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        type_: TransactionType,
        category: CategoryName,
        amount: Amount,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            type_,
            category,
            amount,
            date,
            note: String::new(),
        }
    }
}

/// A builder for creating and updating [Transaction] rows.
///
/// The owner, ID and creation time are filled in by the database functions.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let builder = Transaction::build(
///         TransactionType::Expense,
///         CategoryName::new("Food")?,
///         Amount::from_cents(45_99),
///         date!(2025 - 01 - 15),
///     )
///     .note("Lunch with the team");
/// let transaction = create_transaction(user_id, builder, &connection)?;
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the money was earned or spent.
    pub type_: TransactionType,
    /// What the money was earned or spent on.
    pub category: CategoryName,
    /// The amount of money, must be greater than zero.
    pub amount: Amount,
    /// When the transaction happened.
    pub date: Date,
    /// A free text note. Defaults to an empty string.
    pub note: String,
}

impl TransactionBuilder {
    /// Set the note for the transaction.
    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or less,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = builder.amount.require_positive()?;

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, type, category, amount, note, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, type, category, amount, note, date, created_at",
        )?
        .query_row(
            (
                user_id,
                builder.type_,
                builder.category,
                amount,
                builder.note,
                builder.date,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get all of the transactions owned by `user_id`, newest first.
///
/// Transactions on the same date are ordered by when they were recorded, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, category, amount, note, date, created_at
             FROM \"transaction\"
             WHERE user_id = :user_id
             ORDER BY date DESC, created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Replace the details of the transaction `id` if it is owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or less,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let amount = builder.amount.require_positive()?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET type = ?1, category = ?2, amount = ?3, note = ?4, date = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            builder.type_,
            builder.category,
            amount,
            builder.note,
            builder.date,
            id,
            user_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction `id` if it is owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        named_params! {":id": id, ":user_id": user_id},
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL CHECK (category <> ''),
                amount INTEGER NOT NULL CHECK (amount > 0),
                note TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the monthly summary and spending queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        type_: row.get(2)?,
        category: row.get(3)?,
        amount: row.get(4)?,
        note: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod test_helpers {
    use rusqlite::Connection;
    use time::Date;

    use crate::{
        amount::Amount,
        auth::{PasswordHash, UserID, create_user},
        category::CategoryName,
        db::initialize,
        transaction::{Transaction, TransactionType, create_transaction},
    };

    pub(crate) fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    /// Insert a user with the given username and return its ID.
    pub(crate) fn create_test_user(username: &str, conn: &Connection) -> UserID {
        create_user(
            username,
            &format!("{username}@example.com"),
            "Test User",
            PasswordHash::new_unchecked("hunter2"),
            conn,
        )
        .unwrap()
        .id
    }

    pub(crate) fn insert_transaction(
        user_id: UserID,
        type_: TransactionType,
        category: &str,
        cents: i64,
        date: Date,
        conn: &Connection,
    ) -> Transaction {
        create_transaction(
            user_id,
            Transaction::build(
                type_,
                CategoryName::new_unchecked(category),
                Amount::from_cents(cents),
                date,
            ),
            conn,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        amount::Amount,
        category::CategoryName,
        transaction::{
            Transaction, TransactionType, create_transaction, delete_transaction,
            get_transactions,
            test_helpers::{create_test_user, get_test_connection, insert_transaction},
            update_transaction,
        },
    };

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice", &conn);
        let amount = Amount::from_cents(12_30);

        let result = create_transaction(
            user_id,
            Transaction::build(
                TransactionType::Expense,
                CategoryName::new_unchecked("Food"),
                amount,
                date!(2025 - 10 - 05),
            )
            .note("Lunch"),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.user_id, user_id);
                assert_eq!(transaction.type_, TransactionType::Expense);
                assert_eq!(transaction.note, "Lunch");
                assert_eq!(transaction.date, date!(2025 - 10 - 05));
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice", &conn);

        for cents in [0, -100] {
            let result = create_transaction(
                user_id,
                Transaction::build(
                    TransactionType::Income,
                    CategoryName::new_unchecked("Salary"),
                    Amount::from_cents(cents),
                    date!(2025 - 10 - 05),
                ),
                &conn,
            );

            assert_eq!(result, Err(Error::NonPositiveAmount));
        }

        assert_eq!(get_transactions(user_id, &conn), Ok(vec![]));
    }

    #[test]
    fn get_transactions_orders_newest_first() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice", &conn);
        let older = insert_transaction(
            user_id,
            TransactionType::Expense,
            "Food",
            100,
            date!(2025 - 01 - 01),
            &conn,
        );
        let newer = insert_transaction(
            user_id,
            TransactionType::Expense,
            "Food",
            200,
            date!(2025 - 02 - 01),
            &conn,
        );
        let same_day_later = insert_transaction(
            user_id,
            TransactionType::Income,
            "Salary",
            300,
            date!(2025 - 02 - 01),
            &conn,
        );

        let got = get_transactions(user_id, &conn).unwrap();

        assert_eq!(got, vec![same_day_later, newer, older]);
    }

    #[test]
    fn get_transactions_only_returns_own_transactions() {
        let conn = get_test_connection();
        let alice = create_test_user("alice", &conn);
        let bob = create_test_user("bob", &conn);
        let want = insert_transaction(
            alice,
            TransactionType::Expense,
            "Food",
            100,
            date!(2025 - 01 - 01),
            &conn,
        );
        insert_transaction(
            bob,
            TransactionType::Expense,
            "Food",
            200,
            date!(2025 - 01 - 01),
            &conn,
        );

        assert_eq!(get_transactions(alice, &conn), Ok(vec![want]));
    }

    #[test]
    fn update_replaces_fields() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice", &conn);
        let transaction = insert_transaction(
            user_id,
            TransactionType::Expense,
            "Food",
            100,
            date!(2025 - 01 - 01),
            &conn,
        );

        update_transaction(
            transaction.id,
            user_id,
            Transaction::build(
                TransactionType::Income,
                CategoryName::new_unchecked("Salary"),
                Amount::from_cents(5000),
                date!(2025 - 01 - 31),
            )
            .note("January"),
            &conn,
        )
        .unwrap();

        let got = get_transactions(user_id, &conn).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, transaction.id);
        assert_eq!(got[0].type_, TransactionType::Income);
        assert_eq!(got[0].category.as_ref(), "Salary");
        assert_eq!(got[0].amount, Amount::from_cents(5000));
        assert_eq!(got[0].note, "January");
        assert_eq!(got[0].date, date!(2025 - 01 - 31));
        assert_eq!(got[0].created_at, transaction.created_at);
    }

    #[test]
    fn update_fails_for_other_users_transaction() {
        let conn = get_test_connection();
        let alice = create_test_user("alice", &conn);
        let bob = create_test_user("bob", &conn);
        let transaction = insert_transaction(
            alice,
            TransactionType::Expense,
            "Food",
            100,
            date!(2025 - 01 - 01),
            &conn,
        );

        let result = update_transaction(
            transaction.id,
            bob,
            Transaction::build(
                TransactionType::Expense,
                CategoryName::new_unchecked("Food"),
                Amount::from_cents(1),
                date!(2025 - 01 - 01),
            ),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
        assert_eq!(get_transactions(alice, &conn), Ok(vec![transaction]));
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice", &conn);
        let transaction = insert_transaction(
            user_id,
            TransactionType::Expense,
            "Food",
            100,
            date!(2025 - 01 - 01),
            &conn,
        );

        assert_eq!(delete_transaction(transaction.id, user_id, &conn), Ok(()));
        assert_eq!(get_transactions(user_id, &conn), Ok(vec![]));
        assert_eq!(
            delete_transaction(transaction.id, user_id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn delete_fails_for_other_users_transaction() {
        let conn = get_test_connection();
        let alice = create_test_user("alice", &conn);
        let bob = create_test_user("bob", &conn);
        let transaction = insert_transaction(
            alice,
            TransactionType::Expense,
            "Food",
            100,
            date!(2025 - 01 - 01),
            &conn,
        );

        assert_eq!(
            delete_transaction(transaction.id, bob, &conn),
            Err(Error::DeleteMissingTransaction)
        );
        assert_eq!(get_transactions(alice, &conn), Ok(vec![transaction]));
    }

    #[test]
    fn transaction_serializes_with_api_field_names() {
        let conn = get_test_connection();
        let user_id = create_test_user("alice", &conn);
        let transaction = insert_transaction(
            user_id,
            TransactionType::Expense,
            "Food",
            500_00,
            date!(2024 - 05 - 10),
            &conn,
        );

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["transaction_id"], transaction.id);
        assert_eq!(json["user_id"], user_id.as_i64());
        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"], "Food");
        assert_eq!(json["amount"], 500.0);
        assert_eq!(json["note"], "");
        assert_eq!(json["transaction_date"], "2024-05-10");
        assert!(json["created_at"].is_string());
    }
}
