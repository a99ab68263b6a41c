//! Sets up the application's database.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, budget::create_budget_table,
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not already exist and
/// turn on foreign key enforcement for `connection`.
///
/// # Errors
/// Returns an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Lock the shared database connection.
///
/// # Errors
/// Returns an [Error::DatabaseLockError] if another thread panicked while holding the lock.
pub fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();
        initialize(&conn).unwrap();
    }

    #[test]
    fn initialize_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let mut tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();
        tables.retain(|name| !name.starts_with("sqlite_"));

        assert_eq!(tables, ["budget", "transaction", "user"]);
    }

    #[test]
    fn initialize_enables_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let enabled: bool = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();

        assert!(enabled);
    }
}
