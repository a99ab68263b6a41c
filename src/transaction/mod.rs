//! Income and expense transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - The monthly income and expense totals
//! - The JSON endpoint used by the dashboard

mod core;
mod endpoint;
mod summary;

pub use core::{
    Transaction, TransactionBuilder, TransactionType, create_transaction,
    create_transaction_table, delete_transaction, get_transactions, map_transaction_row,
    update_transaction,
};
pub use endpoint::transactions_endpoint;
pub use summary::{MonthlySummary, get_monthly_summary};

#[cfg(test)]
pub(crate) use core::test_helpers;
