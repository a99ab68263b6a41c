//! The endpoint URIs for pages and the JSON API.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The route for getting the registration page and submitting the registration form.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page and submitting the log in form.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for logging out the current user.
pub const LOG_OUT: &str = "/log_out";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The JSON API for the user's transactions. The operation is selected with the `action` query parameter.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The JSON API for the user's budgets. The operation is selected with the `action` query parameter.
pub const BUDGETS_API: &str = "/api/budgets";
