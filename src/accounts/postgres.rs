//! PostgreSQL-backed [`AccountRepository`]. Schema lives in `sql/schema.sql`.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    Connection, PgPool, Postgres, Row,
    postgres::{PgArguments, PgRow},
    query::Query,
};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use super::form::{FIELD_EMAIL, FIELD_NICKNAME};
use super::{Account, AccountError, AccountId, AccountRepository};

const ACCOUNT_COLUMNS: &str = "id, email, nickname, password, email_verified, \
     email_check_token, email_check_token_generated_at, joined_at";

#[derive(Clone, Debug)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists_where(&self, query: &'static str, value: &str) -> Result<bool, AccountError> {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(value)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to check account existence")
            .map_err(AccountError::Storage)?;
        Ok(row.get("exists"))
    }

    async fn fetch_account(
        &self,
        statement: &str,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<Option<Account>, AccountError> {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = statement
        );
        let row = query
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to load account")
            .map_err(AccountError::Storage)?;
        Ok(row.as_ref().map(account_from_row))
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn save(&self, account: Account) -> Result<Account, AccountError> {
        let query = format!(
            r"
            INSERT INTO accounts
                ({ACCOUNT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                nickname = EXCLUDED.nickname,
                password = EXCLUDED.password,
                email_verified = EXCLUDED.email_verified,
                email_check_token = EXCLUDED.email_check_token,
                email_check_token_generated_at = EXCLUDED.email_check_token_generated_at,
                joined_at = EXCLUDED.joined_at
            RETURNING {ACCOUNT_COLUMNS}
        "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );
        let result = sqlx::query(&query)
            .bind(account.id.as_uuid())
            .bind(&account.email)
            .bind(&account.nickname)
            .bind(&account.password)
            .bind(account.email_verified)
            .bind(account.email_check_token.as_deref())
            .bind(account.email_check_token_generated_at)
            .bind(account.joined_at)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(row) => Ok(account_from_row(&row)),
            Err(err) => match duplicate_field(&err) {
                Some(field) => Err(AccountError::Duplicate(field)),
                None => Err(AccountError::Storage(
                    anyhow::Error::new(err).context("failed to save account"),
                )),
            },
        }
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AccountError> {
        self.exists_where(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1) AS exists",
            email,
        )
        .await
    }

    async fn exists_by_nickname(&self, nickname: &str) -> Result<bool, AccountError> {
        self.exists_where(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE nickname = $1) AS exists",
            nickname,
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let statement = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        self.fetch_account(&statement, sqlx::query(&statement).bind(email))
            .await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountError> {
        let statement = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        self.fetch_account(&statement, sqlx::query(&statement).bind(id.as_uuid()))
            .await
    }

    async fn count(&self) -> Result<u64, AccountError> {
        let query = "SELECT COUNT(*) AS count FROM accounts";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to count accounts")
            .map_err(AccountError::Storage)?;
        let count: i64 = row.get("count");
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), AccountError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")
            .map_err(AccountError::Storage)?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
            .map_err(AccountError::Storage)
    }
}

fn account_from_row(row: &PgRow) -> Account {
    let id: Uuid = row.get("id");
    Account {
        id: AccountId::from_uuid(id),
        email: row.get("email"),
        nickname: row.get("nickname"),
        password: row.get("password"),
        email_verified: row.get("email_verified"),
        email_check_token: row.get("email_check_token"),
        email_check_token_generated_at: row.get("email_check_token_generated_at"),
        joined_at: row.get("joined_at"),
    }
}

/// Map a unique-constraint violation (SQLSTATE 23505) to the field it guards.
fn duplicate_field(err: &sqlx::Error) -> Option<&'static str> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if !db_err.code().is_some_and(|code| code == "23505") {
        return None;
    }
    match db_err.constraint() {
        Some(constraint) if constraint.contains("nickname") => Some(FIELD_NICKNAME),
        _ => Some(FIELD_EMAIL),
    }
}
