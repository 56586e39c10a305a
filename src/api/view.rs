//! Named views rendered as JSON.
//!
//! Handlers return the view name plus its model attributes; turning that into
//! HTML is left to whatever sits in front of the service.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::accounts::{FieldErrors, SignUpFormView};
use crate::session::Principal;

pub const VIEW_SIGN_UP: &str = "account/sign-up";
pub const VIEW_CHECKED_EMAIL: &str = "account/checked-email";
pub const VIEW_CHECK_EMAIL: &str = "account/check-email";
pub const VIEW_INDEX: &str = "index";

#[derive(ToSchema, Serialize, Debug)]
pub struct View<M> {
    #[schema(value_type = String)]
    pub view: &'static str,
    pub model: M,
}

impl<M> View<M> {
    pub const fn new(view: &'static str, model: M) -> Self {
        Self { view, model }
    }
}

impl<M: Serialize> IntoResponse for View<M> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(ToSchema, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignUpModel {
    pub sign_up_form: SignUpFormView,
    pub errors: FieldErrors,
}

#[derive(ToSchema, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckedEmailModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_user: Option<u64>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct CheckEmailModel {
    pub error: String,
    pub nickname: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct IndexModel {
    pub principal: Option<Principal>,
}
