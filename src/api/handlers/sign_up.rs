use axum::{
    Form,
    extract::Extension,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{internal_error, see_other, session_headers};
use crate::accounts::{AccountError, FieldErrors, SignUpForm, SignUpFormView, reject_duplicate};
use crate::api::{
    AppState,
    view::{SignUpModel, VIEW_SIGN_UP, View},
};

#[utoipa::path(
    get,
    path = "/sign-up",
    responses(
        (status = 200, description = "Empty sign-up form", body = View<SignUpModel>)
    ),
    tag = "account"
)]
pub async fn sign_up_form() -> View<SignUpModel> {
    View::new(VIEW_SIGN_UP, SignUpModel::default())
}

#[utoipa::path(
    post,
    path = "/sign-up",
    request_body(content = SignUpForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, confirmation email sent, session cookie set"),
        (status = 200, description = "Form redisplayed with field errors", body = View<SignUpModel>),
        (status = 500, description = "Storage or mail failure")
    ),
    tag = "account"
)]
#[instrument(skip(state, form))]
pub async fn sign_up_submit(
    state: Extension<Arc<AppState>>,
    form: Form<SignUpForm>,
) -> Response {
    let form = form.0.normalized();

    // Format errors short-circuit; no lookups for a malformed form.
    let mut errors = form.check_format();
    if errors.is_empty() {
        errors = match state.validator.validate(&form).await {
            Ok(errors) => errors,
            Err(err) => return internal_error(&err),
        };
    }
    if !errors.is_empty() {
        debug!(errors = errors.len(), "sign-up form rejected");
        return redisplay(&form, errors);
    }

    let account = match state.service.process_new_account(&form).await {
        Ok(account) => account,
        Err(AccountError::Duplicate(field)) => {
            // Lost a race with a concurrent sign-up after validation passed.
            let mut errors = FieldErrors::new();
            reject_duplicate(&mut errors, field);
            return redisplay(&form, errors);
        }
        Err(err) => return internal_error(&err),
    };

    let session = match state.service.login(&account).await {
        Ok(session) => session,
        Err(err) => return internal_error(&err),
    };
    match session_headers(&session, &state) {
        Ok(headers) => see_other("/", headers),
        Err(response) => response,
    }
}

fn redisplay(form: &SignUpForm, errors: FieldErrors) -> Response {
    View::new(
        VIEW_SIGN_UP,
        SignUpModel {
            sign_up_form: SignUpFormView::from(form),
            errors,
        },
    )
    .into_response()
}
