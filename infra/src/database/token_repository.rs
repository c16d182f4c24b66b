//! Postgres token repository with per-role table partitioning.

use async_trait::async_trait;
use sqlx::{FromRow, Postgres, Transaction};
use tg_core::domain::entities::role::{Role, TokenPurpose};
use tg_core::domain::entities::token::TokenRecord;
use tg_core::errors::{CoreError, CoreResult};
use tg_core::repositories::token::alloc::next_generation_number;
use tg_core::repositories::TokenRepository;

use super::db_error;

/// Table holding the token records of one role partition. The mapped
/// name is the only value ever interpolated into SQL; everything else is
/// bound.
fn table_for(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin_tokens",
        Role::StandardUser => "user_tokens",
    }
}

#[derive(FromRow)]
struct TokenRow {
    user_id: String,
    number: i64,
    purpose: i64,
    secret: String,
    expires_at: i64,
}

impl TokenRow {
    fn into_record(self, role: Role) -> CoreResult<TokenRecord> {
        let purpose = TokenPurpose::from_tag(self.purpose)
            .ok_or_else(|| CoreError::system(format!("unknown purpose tag {}", self.purpose)))?;
        Ok(TokenRecord {
            user_id: self.user_id,
            role,
            number: self.number,
            purpose,
            secret: self.secret,
            expires_at: self.expires_at,
        })
    }
}

/// Postgres implementation of [`TokenRepository`].
#[derive(Debug, Default, Clone)]
pub struct PgTokenRepository;

impl PgTokenRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    type Tx = Transaction<'static, Postgres>;

    async fn next_number(
        &self,
        tx: &mut Self::Tx,
        role: Role,
        user_id: &str,
    ) -> CoreResult<i64> {
        let sql = format!(
            "SELECT number FROM {} WHERE user_id = $1 AND purpose = $2 ORDER BY number",
            table_for(role)
        );
        let numbers: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(TokenPurpose::Access.tag())
            .fetch_all(&mut **tx)
            .await
            .map_err(db_error)?;

        next_generation_number(&numbers)
    }

    async fn insert(&self, tx: &mut Self::Tx, record: TokenRecord) -> CoreResult<TokenRecord> {
        let sql = format!(
            "INSERT INTO {} (user_id, number, purpose, secret, expires_at) \
             VALUES ($1, $2, $3, $4, $5)",
            table_for(record.role)
        );
        let result = sqlx::query(&sql)
            .bind(&record.user_id)
            .bind(record.number)
            .bind(record.purpose.tag())
            .bind(&record.secret)
            .bind(record.expires_at)
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;

        if result.rows_affected() != 1 {
            return Err(CoreError::system("token insert affected no rows"));
        }
        Ok(record)
    }

    async fn find_matching(
        &self,
        tx: &mut Self::Tx,
        role: Role,
        user_id: &str,
        number: i64,
        purpose: TokenPurpose,
        secret: &str,
    ) -> CoreResult<Option<TokenRecord>> {
        let sql = format!(
            "SELECT user_id, number, purpose, secret, expires_at FROM {} \
             WHERE user_id = $1 AND number = $2 AND purpose = $3 AND secret = $4",
            table_for(role)
        );
        let row: Option<TokenRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(number)
            .bind(purpose.tag())
            .bind(secret)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error)?;

        row.map(|r| r.into_record(role)).transpose()
    }

    async fn delete_generation(
        &self,
        tx: &mut Self::Tx,
        role: Role,
        user_id: &str,
        number: i64,
    ) -> CoreResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND number = $2",
            table_for(role)
        );
        sqlx::query(&sql)
            .bind(user_id)
            .bind(number)
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn delete_all_for_user(
        &self,
        tx: &mut Self::Tx,
        role: Role,
        user_id: &str,
    ) -> CoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE user_id = $1", table_for(role));
        sqlx::query(&sql)
            .bind(user_id)
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn sweep_expired(&self, tx: &mut Self::Tx, cutoff: i64) -> CoreResult<u64> {
        let mut deleted = 0;
        for role in Role::ALL {
            let table = table_for(role);
            // correlated on (user_id, number) so one user's expired
            // generation never drags another user's rows along
            let sql = format!(
                "DELETE FROM {table} WHERE (user_id, number) IN \
                 (SELECT user_id, number FROM {table} WHERE purpose = $1 AND expires_at <= $2)"
            );
            let result = sqlx::query(&sql)
                .bind(TokenPurpose::Refresh.tag())
                .bind(cutoff)
                .execute(&mut **tx)
                .await
                .map_err(db_error)?;
            deleted += result.rows_affected();
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_maps_to_its_own_table() {
        assert_eq!(table_for(Role::Admin), "admin_tokens");
        assert_eq!(table_for(Role::StandardUser), "user_tokens");
    }
}
