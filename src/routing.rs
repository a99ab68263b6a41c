//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        api_auth_guard, auth_guard, get_log_in_page, get_register_page, post_log_in,
        post_log_out, register_user,
    },
    budget::budgets_endpoint,
    dashboard::get_dashboard_page,
    endpoints,
    not_found::get_404_not_found,
    transaction::transactions_endpoint,
};

/// Return a router with all the app's routes.
///
/// Static files are served from `static_dir` under [endpoints::STATIC].
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    let unprotected_routes = Router::new()
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(
            endpoints::REGISTER_VIEW,
            get(get_register_page).post(register_user),
        )
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // The dashboard script expects JSON errors, so the API does not redirect to the log-in page.
    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(transactions_endpoint).post(transactions_endpoint),
        )
        .route(
            endpoints::BUDGETS_API,
            get(budgets_endpoint).post(budgets_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api_auth_guard,
        ));

    protected_pages
        .merge(api_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new(static_dir))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
