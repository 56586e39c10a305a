//! Router-level tests for the handlers that need no mail or token fixtures.

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{HeaderMap, HeaderValue, Request, StatusCode, header::COOKIE},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use super::{SESSION_COOKIE_NAME, extract_session_token, session_cookie};
use crate::accounts::{
    Account, AccountConfig, AccountError, AccountId, AccountRepository, InMemoryAccountRepository,
};
use crate::api::{AppState, app};
use crate::mail::LogMailSender;
use crate::session::Principal;

/// Repository whose storage is always down.
struct DownRepository;

#[async_trait]
impl AccountRepository for DownRepository {
    async fn save(&self, _account: Account) -> Result<Account, AccountError> {
        Err(down())
    }

    async fn exists_by_email(&self, _email: &str) -> Result<bool, AccountError> {
        Err(down())
    }

    async fn exists_by_nickname(&self, _nickname: &str) -> Result<bool, AccountError> {
        Err(down())
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, AccountError> {
        Err(down())
    }

    async fn find_by_id(&self, _id: AccountId) -> Result<Option<Account>, AccountError> {
        Err(down())
    }

    async fn count(&self) -> Result<u64, AccountError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), AccountError> {
        Err(down())
    }
}

fn down() -> AccountError {
    AccountError::Storage(anyhow::anyhow!("connection refused"))
}

fn state(repository: Arc<dyn AccountRepository>) -> Arc<AppState> {
    Arc::new(AppState::new(
        repository,
        Arc::new(LogMailSender),
        AccountConfig::new(),
        false,
    ))
}

async fn json_body(response: axum::response::Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[test]
fn session_cookie_is_http_only() -> Result<()> {
    let cookie = session_cookie("abc", 3600, false)?;
    let cookie = cookie.to_str()?;
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=abc;")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=3600"));
    assert!(!cookie.contains("Secure"));

    let secure = session_cookie("abc", 3600, true)?;
    assert!(secure.to_str()?.ends_with("; Secure"));
    Ok(())
}

#[test]
fn extract_session_token_among_other_cookies() {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_static("theme=dark; admin_session=token-value; lang=ko"),
    );
    assert_eq!(
        extract_session_token(&headers).as_deref(),
        Some("token-value")
    );

    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
    assert_eq!(extract_session_token(&headers), None);
    assert_eq!(extract_session_token(&HeaderMap::new()), None);
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let app = app(state(Arc::new(InMemoryAccountRepository::new())));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("X-App").is_some());
    assert!(response.headers().get("x-request-id").is_some());
    let body = json_body(response).await?;
    assert_eq!(body["database"], "ok");
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    Ok(())
}

#[tokio::test]
async fn health_unavailable_when_storage_is_down() -> Result<()> {
    let app = app(state(Arc::new(DownRepository)));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await?;
    assert_eq!(body["database"], "error");
    Ok(())
}

#[tokio::test]
async fn sign_up_storage_failure_is_500() -> Result<()> {
    let app = app(state(Arc::new(DownRepository)));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sign-up")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(
                    "email=correct%40email.com&nickname=nickname&password=correct-password",
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn index_is_anonymous_without_cookie() -> Result<()> {
    let app = app(state(Arc::new(InMemoryAccountRepository::new())));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["view"], "index");
    assert!(body["model"]["principal"].is_null());
    Ok(())
}

#[tokio::test]
async fn index_shows_principal_for_session() -> Result<()> {
    let state = state(Arc::new(InMemoryAccountRepository::new()));
    let session = state
        .sessions
        .open(Principal::user(AccountId::new(), "nickname".to_string()))
        .await?;

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/")
                .header(COOKIE, format!("{SESSION_COOKIE_NAME}={}", session.token))
                .body(Body::empty())?,
        )
        .await?;

    let body = json_body(response).await?;
    assert_eq!(body["model"]["principal"]["nickname"], "nickname");
    assert_eq!(body["model"]["principal"]["roles"][0], "ROLE_USER");
    Ok(())
}

#[tokio::test]
async fn check_email_token_without_params_is_wrong_email() -> Result<()> {
    let app = app(state(Arc::new(InMemoryAccountRepository::new())));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/check-email-token")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("set-cookie").is_none());
    let body = json_body(response).await?;
    assert_eq!(body["view"], "account/checked-email");
    assert_eq!(body["model"]["error"], "wrong.email");
    Ok(())
}
