//! Cookie service: set/get/clear the httpOnly `token` cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use feedfin_core::session::CredentialUpdate;
use time::Duration;

/// Cookie name for the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Build a httpOnly session cookie carrying `token`.
///
/// `secure` is off only in development mode.
pub fn token_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .build()
}

/// Build an empty, already-expired cookie to blank the stored token.
pub fn clear_token_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// The token the client currently holds, if any.
pub fn current_token(jar: &CookieJar) -> Option<&str> {
    jar.get(TOKEN_COOKIE).map(Cookie::value)
}

/// Apply a session directive's credential update to the outgoing jar.
pub fn apply(jar: CookieJar, update: &CredentialUpdate, secure: bool) -> CookieJar {
    match update {
        CredentialUpdate::Unchanged => jar,
        CredentialUpdate::Replace(token) => jar.add(token_cookie(token, secure)),
        CredentialUpdate::Clear => jar.add(clear_token_cookie(secure)),
    }
}
