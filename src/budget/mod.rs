//! Monthly spending limits per category.
//!
//! This module contains:
//! - The `Budget` model and the database functions for managing budgets
//! - The spending per category that budgets are compared against
//! - The JSON endpoint used by the dashboard

mod core;
mod endpoint;
mod spending;

pub use core::{
    Budget, BudgetChange, create_budget_table, create_or_update_budget, delete_budget,
    get_budgets, update_budget_amount,
};
pub use endpoint::budgets_endpoint;
pub use spending::{Spending, get_spending_by_category};
