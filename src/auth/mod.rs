//! User accounts, sessions and the pages for logging in and out.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::post_log_out;
pub use middleware::{api_auth_guard, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{get_register_page, register_user};
pub use token::Session;
pub use user::{User, UserID, create_user, create_user_table};

#[cfg(test)]
pub(crate) use cookie::{COOKIE_TOKEN, set_auth_cookie};
#[cfg(test)]
pub(crate) use log_in::LogInData;
#[cfg(test)]
pub(crate) use middleware::AuthState;
