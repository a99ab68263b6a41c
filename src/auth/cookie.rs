//! Defines functions for handling user authentication with cookies.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::token::{Session, Token},
};

pub(crate) const COOKIE_TOKEN: &str = "token";
/// The default duration for which auth cookies are valid.
///
/// Each authenticated request pushes the expiry out again, so this is how long
/// an idle session lasts.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

fn build_token_cookie(value: String, expiry: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((COOKIE_TOKEN, value))
        .path("/")
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add an auth cookie to the cookie jar, indicating that `session`'s user is logged in and authenticated.
///
/// Sets the initial expiry of the cookie to `duration` from the current time.
/// You can use [DEFAULT_COOKIE_DURATION] for the default duration.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the token could not be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    session: Session,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;

    set_token_cookie(
        jar,
        Token {
            session,
            expires_at,
        },
    )
}

fn set_token_cookie(jar: PrivateCookieJar, token: Token) -> Result<PrivateCookieJar, Error> {
    let token_string = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(build_token_cookie(token_string, token.expires_at)))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = build_token_cookie("deleted".to_owned(), OffsetDateTime::UNIX_EPOCH);
    cookie.set_max_age(Duration::ZERO);

    jar.add(cookie)
}

/// Get the token from the auth cookie in `jar`.
///
/// # Errors
///
/// Returns an [Error::Unauthorized] if the cookie is missing, cannot be
/// decoded, or the token has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::Unauthorized)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::Unauthorized)?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::Unauthorized);
    }

    Ok(token)
}

/// Set the expiry of the auth cookie in `jar` to the latest of UTC now
/// plus `duration` and the cookie's expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns an [Error::Unauthorized] if the auth cookie is missing or invalid,
/// or an [Error::JSONSerializationError] if the new token cannot be serialized.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .unwrap_or(token.expires_at);

    set_token_cookie(
        jar,
        Token {
            expires_at: max(token.expires_at, new_expiry),
            session: token.session,
        },
    )
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            UserID,
            cookie::{
                COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, extend_auth_cookie_duration_if_needed,
                get_token_from_cookies, invalidate_auth_cookie, set_auth_cookie, set_token_cookie,
            },
            token::{Session, Token},
        },
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    fn test_session() -> Session {
        Session {
            user_id: UserID::new(1),
            username: "demo".to_owned(),
            full_name: "Demo User".to_owned(),
        }
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_cookie() {
        let jar = set_auth_cookie(get_jar(), test_session(), DEFAULT_COOKIE_DURATION).unwrap();

        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        let token = get_token_from_cookies(&jar).unwrap();

        assert_eq!(token.session, test_session());
        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
        assert_eq!(cookie.expires_datetime(), Some(token.expires_at));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn get_token_fails_without_cookie() {
        assert_eq!(
            get_token_from_cookies(&get_jar()).unwrap_err(),
            Error::Unauthorized
        );
    }

    #[test]
    fn get_token_fails_with_garbage_cookie() {
        let jar = get_jar().add(Cookie::new(COOKIE_TOKEN, "FOOBAR"));

        assert_eq!(get_token_from_cookies(&jar).unwrap_err(), Error::Unauthorized);
    }

    #[test]
    fn get_token_fails_when_token_expired() {
        let jar = set_token_cookie(
            get_jar(),
            Token {
                session: test_session(),
                expires_at: OffsetDateTime::now_utc() - Duration::seconds(1),
            },
        )
        .unwrap();

        assert_eq!(get_token_from_cookies(&jar).unwrap_err(), Error::Unauthorized);
    }

    #[test]
    fn can_extend_cookie_duration() {
        let jar = set_auth_cookie(get_jar(), test_session(), Duration::seconds(5)).unwrap();

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(10)).unwrap();
        let token = get_token_from_cookies(&jar).unwrap();
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        let want = OffsetDateTime::now_utc() + Duration::minutes(10);
        assert_date_time_close!(token.expires_at, want);
        assert_date_time_close!(cookie.expires_datetime().unwrap(), want);
        assert_eq!(token.session, test_session());
    }

    #[test]
    fn cookie_duration_does_not_shrink() {
        let jar = set_auth_cookie(get_jar(), test_session(), Duration::minutes(30)).unwrap();
        let want = get_token_from_cookies(&jar).unwrap().expires_at;

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::seconds(5)).unwrap();

        assert_eq!(get_token_from_cookies(&jar).unwrap().expires_at, want);
    }

    #[test]
    fn invalidate_auth_cookie_succeeds() {
        let jar = set_auth_cookie(get_jar(), test_session(), DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_auth_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(get_token_from_cookies(&jar).unwrap_err(), Error::Unauthorized);
    }
}
