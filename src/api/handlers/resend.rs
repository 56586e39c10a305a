use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{current_principal, internal_error, see_other};
use crate::accounts::AccountError;
use crate::api::{
    AppState,
    view::{CheckEmailModel, VIEW_CHECK_EMAIL, View},
};

#[utoipa::path(
    get,
    path = "/resend-confirm-email",
    responses(
        (status = 303, description = "New confirmation email sent"),
        (status = 200, description = "Previous email is too recent", body = View<CheckEmailModel>),
        (status = 401, description = "No active session"),
        (status = 500, description = "Storage or mail failure")
    ),
    tag = "account"
)]
#[instrument(skip(state, headers))]
pub async fn resend_confirm_email(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let Some(principal) = current_principal(&headers, &state.sessions).await else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match state.service.resend_confirm_email(&principal).await {
        Ok(()) => see_other("/", HeaderMap::new()),
        Err(err @ AccountError::ResendTooSoon) => View::new(
            VIEW_CHECK_EMAIL,
            CheckEmailModel {
                error: err.to_string(),
                nickname: principal.nickname,
            },
        )
        .into_response(),
        Err(AccountError::NotFound) => {
            debug!("session refers to a missing account");
            StatusCode::UNAUTHORIZED.into_response()
        }
        Err(err) => internal_error(&err),
    }
}
