use axum::{extract::Extension, http::HeaderMap};
use std::sync::Arc;

use super::current_principal;
use crate::api::{
    AppState,
    view::{IndexModel, VIEW_INDEX, View},
};

// axum handler for the landing page
pub async fn index(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> View<IndexModel> {
    let principal = current_principal(&headers, &state.sessions).await;
    View::new(VIEW_INDEX, IndexModel { principal })
}
