//! Defines the token stored in the auth cookie and how to serialize/deserialize it.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::{User, UserID};

/// The logged-in user, as seen by request handlers.
///
/// Route handlers behind the auth middleware can receive this with
/// `Extension(session): Extension<Session>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the logged-in user.
    pub user_id: UserID,
    /// The name the user logged in with.
    pub username: String,
    /// The user's display name.
    pub full_name: String,
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

/// A token for authorization and authentication.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    #[serde(flatten)]
    pub session: Session,

    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}
