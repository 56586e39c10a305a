//! Route handlers and the session-cookie helpers they share.

pub mod check_email_token;
pub mod health;
pub mod index;
pub mod resend;
pub mod sign_up;

#[cfg(test)]
mod tests;

use axum::{
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue, LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::accounts::AccountError;
use crate::api::AppState;
use crate::session::{Principal, Session, SessionStore};

pub(crate) const SESSION_COOKIE_NAME: &str = "admin_session";

/// Build an `HttpOnly` cookie carrying the raw session token.
pub(crate) fn session_cookie(
    token: &str,
    ttl_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    // Only mark cookies secure when served over HTTPS.
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(COOKIE)?.to_str().ok()?;
    value.split(';').find_map(|pair| {
        let (key, val) = pair.trim().split_once('=')?;
        (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
    })
}

/// Resolve the session cookie into a principal. Missing or unknown cookies are anonymous.
pub(crate) async fn current_principal(
    headers: &HeaderMap,
    sessions: &SessionStore,
) -> Option<Principal> {
    let token = extract_session_token(headers)?;
    sessions.lookup(&token).await
}

/// `Set-Cookie` headers for a freshly opened session.
pub(crate) fn session_headers(session: &Session, state: &AppState) -> Result<HeaderMap, Response> {
    let ttl_seconds = state.sessions.ttl().num_seconds();
    let cookie = session_cookie(&session.token, ttl_seconds, state.session_cookie_secure)
        .map_err(|err| {
            error!("Failed to build session cookie: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok(headers)
}

/// 303 to `location`, keeping any headers already collected.
pub(crate) fn see_other(location: &'static str, mut headers: HeaderMap) -> Response {
    headers.insert(LOCATION, HeaderValue::from_static(location));
    (StatusCode::SEE_OTHER, headers).into_response()
}

pub(crate) fn internal_error(err: &AccountError) -> Response {
    error!("Request failed: {err}");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
