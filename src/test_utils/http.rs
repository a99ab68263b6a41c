use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState,
    auth::{COOKIE_TOKEN, LogInData, PasswordHash, create_user},
    endpoints,
    routing::build_router,
};

pub(crate) const TEST_USERNAME: &str = "demo";
pub(crate) const TEST_PASSWORD: &str = "demo123";
pub(crate) const TEST_EMAIL: &str = "demo@example.com";
pub(crate) const TEST_FULL_NAME: &str = "Demo User";

/// The lowest cost bcrypt accepts, so that tests that hash passwords stay fast.
const TEST_HASH_COST: u32 = 4;

/// An in-memory app state with a single user that can log in with
/// [TEST_USERNAME] and [TEST_PASSWORD].
pub(crate) fn get_test_app_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let mut state = AppState::new(connection, "42", "Asia/Manila")
        .expect("Could not create app state.");
    state.password_hash_cost = TEST_HASH_COST;

    let password_hash = PasswordHash::from_raw_password(TEST_PASSWORD, TEST_HASH_COST)
        .expect("Could not hash test password.");
    create_user(
        TEST_USERNAME,
        TEST_EMAIL,
        TEST_FULL_NAME,
        password_hash,
        &state.db_connection.lock().unwrap(),
    )
    .expect("Could not create test user.");

    state
}

pub(crate) fn get_test_server(state: AppState) -> TestServer {
    let app = build_router(state, "static/");

    TestServer::try_new(app).expect("Could not create test server.")
}

/// Log in as the test user and return the auth cookie.
pub(crate) async fn log_in_test_user(server: &TestServer) -> Cookie<'static> {
    let response = server
        .post(endpoints::LOG_IN_VIEW)
        .form(&LogInData {
            username: TEST_USERNAME.to_owned(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await;

    response.assert_status_see_other();

    response.cookie(COOKIE_TOKEN)
}
