//! Account persistence contract and the in-process store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::form::{FIELD_EMAIL, FIELD_NICKNAME};
use super::{Account, AccountError, AccountId};

/// Persistence seam for accounts.
///
/// `save` inserts or replaces by id. Implementations must reject a second
/// account with the same email or nickname with [`AccountError::Duplicate`];
/// the form validator only narrows that window, it cannot close it.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn save(&self, account: Account) -> Result<Account, AccountError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, AccountError>;

    async fn exists_by_nickname(&self, nickname: &str) -> Result<bool, AccountError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountError>;

    async fn count(&self) -> Result<u64, AccountError>;

    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> Result<(), AccountError>;
}

/// Accounts held in process memory. Used when no DSN is configured.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn save(&self, account: Account) -> Result<Account, AccountError> {
        // Check and insert under one write lock so concurrent sign-ups serialize.
        let mut accounts = self.accounts.write().await;
        for existing in accounts.values().filter(|existing| existing.id != account.id) {
            if existing.email == account.email {
                return Err(AccountError::Duplicate(FIELD_EMAIL));
            }
            if existing.nickname == account.nickname {
                return Err(AccountError::Duplicate(FIELD_NICKNAME));
            }
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|account| account.email == email))
    }

    async fn exists_by_nickname(&self, nickname: &str) -> Result<bool, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|account| account.nickname == nickname))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn count(&self) -> Result<u64, AccountError> {
        let len = self.accounts.read().await.len();
        Ok(u64::try_from(len).unwrap_or(u64::MAX))
    }

    async fn ping(&self) -> Result<(), AccountError> {
        Ok(())
    }
}
