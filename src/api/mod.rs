use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;
use utoipa_axum::router::OpenApiRouter;

use crate::accounts::{AccountConfig, AccountRepository, AccountService, SignUpFormValidator};
use crate::mail::MailSender;
use crate::session::SessionStore;

pub(crate) mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;
pub mod view;

pub use openapi::openapi;

/// Everything the handlers need, shared behind one `Extension`.
pub struct AppState {
    pub service: AccountService,
    pub validator: SignUpFormValidator,
    pub sessions: Arc<SessionStore>,
    pub repository: Arc<dyn AccountRepository>,
    pub session_cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(
        repository: Arc<dyn AccountRepository>,
        mail_sender: Arc<dyn MailSender>,
        config: AccountConfig,
        session_cookie_secure: bool,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session_ttl()));
        Self {
            service: AccountService::new(
                repository.clone(),
                mail_sender,
                sessions.clone(),
                config,
            ),
            validator: SignUpFormValidator::new(repository.clone()),
            sessions,
            repository,
            session_cookie_secure,
        }
    }
}

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// The full application: documented routes, `/`, and the request-id/trace layers.
pub fn app(state: Arc<AppState>) -> Router {
    let (router, _openapi) = router().split_for_parts();
    router.route("/", get(handlers::index::index)).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(Extension(state)),
    )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: AppState) -> Result<()> {
    let app = app(Arc::new(state));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Gracefully shutdown"),
                Err(err) => {
                    error!("Failed to listen for shutdown signal: {err}");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
