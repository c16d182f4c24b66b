//! Postgres storage for one-time verification/reset tokens.

use async_trait::async_trait;
use sqlx::{FromRow, Postgres, Transaction};
use tg_core::domain::entities::one_time::OneTimeToken;
use tg_core::errors::{CoreError, CoreResult};
use tg_core::repositories::OneTimeTokenRepository;
use uuid::Uuid;

use super::db_error;

#[derive(FromRow)]
struct OneTimeRow {
    id: Uuid,
    user_id: String,
    token_hash: String,
    created_at: i64,
    expires_at: i64,
}

impl From<OneTimeRow> for OneTimeToken {
    fn from(row: OneTimeRow) -> Self {
        OneTimeToken {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Postgres one-time token repository, bound to one table. The same
/// implementation backs both token kinds; construct it twice.
#[derive(Debug, Clone)]
pub struct PgOneTimeTokenRepository {
    table: &'static str,
}

impl PgOneTimeTokenRepository {
    /// Repository over the email verification token table.
    pub fn verification() -> Self {
        Self {
            table: "verification_tokens",
        }
    }

    /// Repository over the password reset token table.
    pub fn reset() -> Self {
        Self {
            table: "reset_tokens",
        }
    }
}

#[async_trait]
impl OneTimeTokenRepository for PgOneTimeTokenRepository {
    type Tx = Transaction<'static, Postgres>;

    async fn create(&self, tx: &mut Self::Tx, token: OneTimeToken) -> CoreResult<OneTimeToken> {
        let sql = format!(
            "INSERT INTO {} (id, user_id, token_hash, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5)",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(token.id)
            .bind(&token.user_id)
            .bind(&token.token_hash)
            .bind(token.created_at)
            .bind(token.expires_at)
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;

        if result.rows_affected() != 1 {
            return Err(CoreError::system("one-time token insert affected no rows"));
        }
        Ok(token)
    }

    async fn get_by_id(&self, tx: &mut Self::Tx, id: Uuid) -> CoreResult<Option<OneTimeToken>> {
        let sql = format!(
            "SELECT id, user_id, token_hash, created_at, expires_at FROM {} WHERE id = $1",
            self.table
        );
        let row: Option<OneTimeRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error)?;
        Ok(row.map(OneTimeToken::from))
    }

    async fn delete_by_id(&self, tx: &mut Self::Tx, id: Uuid) -> CoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        sqlx::query(&sql)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
