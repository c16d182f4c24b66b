//! Token lifecycle engine implementation.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

use crate::domain::entities::role::{Role, TokenPurpose};
use crate::domain::entities::token::{Claims, TokenRecord};
use crate::domain::value_objects::{IssuedToken, TokenIdentity, TokenPair};
use crate::errors::{CoreError, CoreResult, TokenError};
use crate::repositories::{TokenRepository, TransactionManager};

use super::config::TokenServiceConfig;
use super::locks::UserLockTable;

/// Engine for issuing, validating, rotating and revoking bearer token
/// generations.
///
/// Tokens are "verifiable but revocable": the HS256 signature proves
/// authenticity without a lookup, but every validation still performs an
/// exact-match lookup of the embedded secret against the live record, so
/// deleting the record revokes the token in real time.
///
/// Mutating operations for the same (role, user) are serialized through a
/// per-user lock table; operations for different users run concurrently.
/// Every public operation runs under the configured deadline, and an
/// in-flight transaction is dropped (rolled back) when it elapses.
pub struct TokenService<T, R>
where
    T: TransactionManager,
    R: TokenRepository<Tx = T::Tx>,
{
    tx_manager: Arc<T>,
    repository: Arc<R>,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    locks: UserLockTable,
}

impl<T, R> TokenService<T, R>
where
    T: TransactionManager,
    R: TokenRepository<Tx = T::Tx>,
{
    /// Creates a new engine over the given transaction manager and
    /// repository. The signing key is derived once from the configured
    /// secret and is read-only afterwards.
    pub fn new(tx_manager: Arc<T>, repository: Arc<R>, config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            tx_manager,
            repository,
            config,
            encoding_key,
            decoding_key,
            validation,
            locks: UserLockTable::new(),
        }
    }

    /// Issues a fresh access/refresh generation for a login.
    ///
    /// Allocates the smallest free generation number, inserts one record
    /// per purpose and mints the signed wire tokens, all inside one
    /// transaction: any repository failure aborts the whole issuance.
    pub async fn issue_for_login(&self, role: Role, user_id: &str) -> CoreResult<TokenPair> {
        self.with_deadline(async {
            let _guard = self.locks.acquire(role, user_id).await;

            let mut tx = self.tx_manager.begin().await?;
            let pair = self.mint_pair(&mut tx, role, user_id).await?;
            self.tx_manager.commit(tx).await?;

            debug!(role = role.tag(), user_id, "issued token generation");
            Ok(pair)
        })
        .await
    }

    /// Issues a generation inside a transaction owned by the caller.
    ///
    /// Used by flows that bundle issuance with other writes (login). The
    /// per-user lock is returned alongside the pair and MUST be held
    /// until the caller has committed: under transaction isolation the
    /// new rows are invisible to other connections until commit, so
    /// releasing the lock earlier would let a concurrent issuance for
    /// the same user allocate the same generation number.
    pub async fn issue_in_tx(
        &self,
        tx: &mut T::Tx,
        role: Role,
        user_id: &str,
    ) -> CoreResult<(TokenPair, OwnedMutexGuard<()>)> {
        let guard = self.locks.acquire(role, user_id).await;
        let pair = self.mint_pair(tx, role, user_id).await?;
        Ok((pair, guard))
    }

    /// Validates a bearer token for the expected purpose.
    ///
    /// Verifies the signature and expiry, checks the purpose tag, resolves
    /// the role partition, and requires an exact-match live record for the
    /// embedded secret. A missing record yields [`TokenError::Invalid`]
    /// whether the token was revoked, rotated or forged; callers cannot
    /// tell the difference.
    ///
    /// Returns the proven identity and the generation number, which
    /// callers use to correlate a refresh back to the same family.
    pub async fn authenticate(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> CoreResult<(TokenIdentity, i64)> {
        self.with_deadline(async {
            let claims = self.decode_claims(token)?;

            if claims.purpose != purpose.tag() {
                return Err(TokenError::WrongPurpose.into());
            }
            let role = Role::from_tag(claims.role).ok_or(TokenError::Invalid)?;

            let mut tx = self.tx_manager.begin().await?;
            let record = self
                .repository
                .find_matching(&mut tx, role, &claims.sub, claims.number, purpose, &claims.secret)
                .await?
                .ok_or(TokenError::Invalid)?;
            self.tx_manager.commit(tx).await?;

            Ok((
                TokenIdentity {
                    user_id: record.user_id,
                    role,
                },
                claims.number,
            ))
        })
        .await
    }

    /// Rotates a generation: deletes the named one and issues a fresh
    /// pair in the same transaction.
    ///
    /// The freed number may legitimately be reassigned to the new
    /// generation; the secrets still differ, so the old bearer tokens
    /// stay unusable.
    pub async fn refresh(&self, role: Role, user_id: &str, number: i64) -> CoreResult<TokenPair> {
        self.with_deadline(async {
            let _guard = self.locks.acquire(role, user_id).await;

            let mut tx = self.tx_manager.begin().await?;
            self.repository
                .delete_generation(&mut tx, role, user_id, number)
                .await?;
            let pair = self.mint_pair(&mut tx, role, user_id).await?;
            self.tx_manager.commit(tx).await?;

            debug!(role = role.tag(), user_id, number, "rotated token generation");
            Ok(pair)
        })
        .await
    }

    /// Revokes one generation (single-session logout).
    pub async fn revoke(&self, role: Role, user_id: &str, number: i64) -> CoreResult<()> {
        self.with_deadline(async {
            let _guard = self.locks.acquire(role, user_id).await;

            let mut tx = self.tx_manager.begin().await?;
            self.repository
                .delete_generation(&mut tx, role, user_id, number)
                .await?;
            self.tx_manager.commit(tx).await?;

            debug!(role = role.tag(), user_id, number, "revoked token generation");
            Ok(())
        })
        .await
    }

    /// Revokes every generation for a user within one role partition
    /// ("log out everywhere").
    pub async fn revoke_all(&self, role: Role, user_id: &str) -> CoreResult<()> {
        self.with_deadline(async {
            let _guard = self.locks.acquire(role, user_id).await;

            let mut tx = self.tx_manager.begin().await?;
            self.repository
                .delete_all_for_user(&mut tx, role, user_id)
                .await?;
            self.tx_manager.commit(tx).await?;

            debug!(role = role.tag(), user_id, "revoked all token generations");
            Ok(())
        })
        .await
    }

    /// Deletes every generation whose refresh record expired at or before
    /// `cutoff` (unix milliseconds). Returns the number of rows deleted.
    ///
    /// Scheduling is the caller's concern; see [`super::TokenSweeper`].
    pub async fn sweep_expired(&self, cutoff: i64) -> CoreResult<u64> {
        self.with_deadline(async {
            let mut tx = self.tx_manager.begin().await?;
            let deleted = self.repository.sweep_expired(&mut tx, cutoff).await?;
            self.tx_manager.commit(tx).await?;

            if deleted > 0 {
                info!(deleted, cutoff, "swept expired token generations");
            }
            Ok(deleted)
        })
        .await
    }

    /// Mints both purpose records of one generation inside `tx`.
    async fn mint_pair(&self, tx: &mut T::Tx, role: Role, user_id: &str) -> CoreResult<TokenPair> {
        let now = Utc::now();
        let number = self.repository.next_number(tx, role, user_id).await?;

        let access_expires_at = now + Duration::seconds(self.config.access_token_expiry);
        let refresh_expires_at = now + Duration::seconds(self.config.refresh_token_expiry);

        let access = self
            .mint_token(tx, role, user_id, number, TokenPurpose::Access, access_expires_at)
            .await?;
        let refresh = self
            .mint_token(tx, role, user_id, number, TokenPurpose::Refresh, refresh_expires_at)
            .await?;

        Ok(TokenPair { access, refresh })
    }

    /// Inserts one record and mints its signed wire form.
    async fn mint_token(
        &self,
        tx: &mut T::Tx,
        role: Role,
        user_id: &str,
        number: i64,
        purpose: TokenPurpose,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<IssuedToken> {
        let secret = self.generate_secret(role, user_id, number, purpose);

        let record = TokenRecord {
            user_id: user_id.to_string(),
            role,
            number,
            purpose,
            secret: secret.clone(),
            expires_at: expires_at.timestamp_millis(),
        };
        self.repository.insert(tx, record).await?;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.tag(),
            purpose: purpose.tag(),
            secret,
            number,
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::GenerationFailed)?;

        Ok(IssuedToken {
            token,
            expires_at: expires_at.timestamp_millis(),
        })
    }

    /// Decodes and verifies a bearer token's signature and expiry.
    fn decode_claims(&self, token: &str) -> CoreResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature {
                    TokenError::Expired.into()
                } else {
                    TokenError::Invalid.into()
                }
            })
    }

    /// Derives a per-record secret from the record coordinates, the
    /// current instant and fresh randomness.
    fn generate_secret(
        &self,
        role: Role,
        user_id: &str,
        number: i64,
        purpose: TokenPurpose,
    ) -> String {
        let jitter: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(20)
            .map(char::from)
            .collect();
        let material = format!(
            "{}_{}_{}_{}_{}_{}",
            role.tag(),
            user_id,
            number,
            purpose.tag(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            jitter,
        );

        let mut hasher = Sha256::new();
        hasher.update(material.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Runs `fut` under the configured operation deadline. On expiry the
    /// future is dropped, taking any open transaction with it.
    async fn with_deadline<F, O>(&self, fut: F) -> CoreResult<O>
    where
        F: Future<Output = CoreResult<O>>,
    {
        match tokio::time::timeout(self.config.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout),
        }
    }
}
