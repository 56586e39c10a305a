use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::IntoParams;

use super::{internal_error, session_headers};
use crate::accounts::{AccountError, normalize_email};
use crate::api::{
    AppState,
    view::{CheckedEmailModel, VIEW_CHECKED_EMAIL, View},
};

/// Model `error` value for a failed check.
pub const WRONG_EMAIL: &str = "wrong.email";

#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct CheckEmailTokenParams {
    token: Option<String>,
    email: Option<String>,
}

#[utoipa::path(
    get,
    path = "/check-email-token",
    params(CheckEmailTokenParams),
    responses(
        (status = 200, description = "Verification result; sets the session cookie on success", body = View<CheckedEmailModel>),
        (status = 500, description = "Storage failure")
    ),
    tag = "account"
)]
#[instrument(skip(state, params))]
pub async fn check_email_token(
    state: Extension<Arc<AppState>>,
    params: Query<CheckEmailTokenParams>,
) -> Response {
    let CheckEmailTokenParams { token, email } = params.0;
    let (Some(token), Some(email)) = (token, email) else {
        return wrong_email();
    };

    let verified = match state
        .service
        .check_email_token(&normalize_email(&email), &token)
        .await
    {
        Ok(verified) => verified,
        Err(AccountError::InvalidToken) => return wrong_email(),
        Err(err) => return internal_error(&err),
    };

    let headers = match session_headers(&verified.session, &state) {
        Ok(headers) => headers,
        Err(response) => return response,
    };
    let view = View::new(
        VIEW_CHECKED_EMAIL,
        CheckedEmailModel {
            nickname: Some(verified.nickname),
            number_of_user: Some(verified.number_of_user),
            ..CheckedEmailModel::default()
        },
    );
    (headers, view).into_response()
}

fn wrong_email() -> Response {
    View::new(
        VIEW_CHECKED_EMAIL,
        CheckedEmailModel {
            error: Some(WRONG_EMAIL.to_string()),
            ..CheckedEmailModel::default()
        },
    )
    .into_response()
}
