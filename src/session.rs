//! Authenticated principals and the in-process session store.
//!
//! Logging in hands back an explicit [`Session`]; the web layer puts the raw
//! token in a cookie and resolves it through [`SessionStore::lookup`] on later
//! requests. Only token digests are kept in memory, and each session expires
//! after the store's TTL.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::accounts::{AccountError, AccountId, digest_token, generate_session_token};

pub const ROLE_USER: &str = "ROLE_USER";

/// Who the current request acts as.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    #[schema(value_type = String, format = Uuid)]
    pub account_id: AccountId,
    pub nickname: String,
    pub roles: Vec<String>,
}

impl Principal {
    #[must_use]
    pub fn user(account_id: AccountId, nickname: String) -> Self {
        Self {
            account_id,
            nickname,
            roles: vec![ROLE_USER.to_string()],
        }
    }
}

/// A freshly opened session. `token` is the raw value and is only available here.
#[derive(Clone)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"***")
            .field("principal", &self.principal)
            .finish()
    }
}

pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Debug)]
struct Entry {
    principal: Principal,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Session token digests mapped to principals, each valid for `ttl`.
#[derive(Debug)]
pub struct SessionStore {
    ttl: TimeDelta,
    entries: RwLock<HashMap<Vec<u8>, Entry>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Register `principal` under a new random token.
    ///
    /// Expired sessions are pruned on the way.
    ///
    /// # Errors
    /// Returns [`AccountError::Token`] if no token could be generated.
    pub async fn open(&self, principal: Principal) -> Result<Session, AccountError> {
        self.open_at(principal, Utc::now()).await
    }

    pub async fn lookup(&self, token: &str) -> Option<Principal> {
        self.lookup_at(token, Utc::now()).await
    }

    /// Number of sessions currently held, expired ones included until pruned.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn open_at(
        &self,
        principal: Principal,
        now: DateTime<Utc>,
    ) -> Result<Session, AccountError> {
        let token = generate_session_token()?;
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            digest_token(&token),
            Entry {
                principal: principal.clone(),
                expires_at,
            },
        );
        Ok(Session { token, principal })
    }

    async fn lookup_at(&self, token: &str, now: DateTime<Utc>) -> Option<Principal> {
        let digest = digest_token(token);
        {
            let entries = self.entries.read().await;
            match entries.get(&digest) {
                Some(entry) if entry.is_live(now) => return Some(entry.principal.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: drop it so it cannot be resolved again.
        self.entries.write().await.remove(&digest);
        None
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(DEFAULT_SESSION_TTL_SECONDS))
    }
}
