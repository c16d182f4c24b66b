//! Account flow orchestration.

use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::adapters::{IdentityAdapter, MessagePublisher};
use crate::domain::entities::account::{Account, NewAccount};
use crate::domain::entities::message::{MailMessage, SagaCompensation};
use crate::domain::entities::one_time::OneTimeToken;
use crate::domain::entities::role::Role;
use crate::errors::{CoreError, CoreResult, TokenError};
use crate::repositories::{OneTimeTokenRepository, TokenRepository, TransactionManager};
use crate::services::token::TokenService;

use super::config::AccountServiceConfig;
use super::types::{LoginResponse, RegisterRequest};

/// Verification tokens are short because the user types them by hand.
const VERIFICATION_TOKEN_LEN: usize = 6;
/// Reset tokens travel inside a link and can afford more entropy.
const RESET_TOKEN_LEN: usize = 16;

const PASSWORD_MIN_LEN: usize = 8;
/// bcrypt truncates input at 72 bytes; longer passwords would silently
/// lose entropy.
const PASSWORD_MAX_LEN: usize = 72;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Orchestrates account flows over the identity collaborator, the token
/// engine, two one-time token tables and the outbound mail queue.
pub struct AccountService<T, R, O, I, Q>
where
    T: TransactionManager,
    R: TokenRepository<Tx = T::Tx>,
    O: OneTimeTokenRepository<Tx = T::Tx>,
    I: IdentityAdapter,
    Q: MessagePublisher,
{
    tx_manager: Arc<T>,
    tokens: Arc<TokenService<T, R>>,
    verification_tokens: Arc<O>,
    reset_tokens: Arc<O>,
    identity: Arc<I>,
    queue: Arc<Q>,
    config: AccountServiceConfig,
}

impl<T, R, O, I, Q> AccountService<T, R, O, I, Q>
where
    T: TransactionManager,
    R: TokenRepository<Tx = T::Tx>,
    O: OneTimeTokenRepository<Tx = T::Tx>,
    I: IdentityAdapter,
    Q: MessagePublisher,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tx_manager: Arc<T>,
        tokens: Arc<TokenService<T, R>>,
        verification_tokens: Arc<O>,
        reset_tokens: Arc<O>,
        identity: Arc<I>,
        queue: Arc<Q>,
        config: AccountServiceConfig,
    ) -> Self {
        Self {
            tx_manager,
            tokens,
            verification_tokens,
            reset_tokens,
            identity,
            queue,
            config,
        }
    }

    /// Logs a user in by login name.
    ///
    /// Unverified accounts are rejected before any token is minted. The
    /// token pair is issued inside one transaction so a failed insert
    /// leaves nothing behind.
    pub async fn login(&self, login: &str) -> CoreResult<LoginResponse> {
        let account = self.identity.get_by_login(login).await?;

        if !account.verified {
            return Err(CoreError::NotVerified);
        }

        let mut tx = self.tx_manager.begin().await?;
        let (tokens, lock) = self
            .tokens
            .issue_in_tx(&mut tx, account.role, &account.id)
            .await?;
        self.tx_manager.commit(tx).await?;
        // the new rows only became visible at commit; a concurrent login
        // must not allocate until then
        drop(lock);

        info!(user_id = %account.id, "login succeeded");
        Ok(LoginResponse { account, tokens })
    }

    /// Registers a new account and mails a verification token.
    ///
    /// The upstream create is the first irreversible step: every failure
    /// after it publishes a compensation message so the account is rolled
    /// back asynchronously instead of being stranded unverifiable.
    ///
    /// Returns the new account id.
    pub async fn register(&self, request: RegisterRequest) -> CoreResult<String> {
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = self.hash(&request.password)?;
        let account = self
            .identity
            .create_account(NewAccount {
                firstname: request.firstname,
                lastname: request.lastname,
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await?;

        if let Err(e) = self.send_verification(&account).await {
            warn!(user_id = %account.id, error = %e, "registration failed after account creation, compensating");
            self.compensate(&account.id).await;
            return Err(e);
        }

        info!(user_id = %account.id, "registration succeeded");
        Ok(account.id)
    }

    /// Confirms an emailed verification token and flips the upstream
    /// verification flag. Returns the account in its verified state.
    pub async fn confirm_verification(
        &self,
        raw_token: &str,
        account_id: &str,
        token_id: Uuid,
    ) -> CoreResult<Account> {
        let mut account = self.identity.get_by_id(account_id).await?;

        let mut tx = self.tx_manager.begin().await?;
        let row = self
            .consume_one_time(&mut tx, &self.verification_tokens, token_id, account_id, raw_token)
            .await?;

        let accepted = self
            .identity
            .update_verification_status(account_id, &account.email)
            .await?;
        if !accepted {
            return Err(CoreError::VerificationFailed);
        }

        self.verification_tokens.delete_by_id(&mut tx, row.id).await?;
        self.tx_manager.commit(tx).await?;

        account.verified = true;
        info!(user_id = %account_id, "email verified");
        Ok(account)
    }

    /// Creates a reset token for the account behind `email` and mails it.
    pub async fn request_password_reset(&self, email: &str) -> CoreResult<()> {
        let account = self.identity.get_by_email(email).await?;

        let mut tx = self.tx_manager.begin().await?;
        let (raw, row) = self
            .create_one_time(
                &mut tx,
                &self.reset_tokens,
                &account.id,
                RESET_TOKEN_LEN,
                self.config.reset_token_ttl,
            )
            .await?;

        self.queue
            .publish_mail(&MailMessage {
                to: account.email.clone(),
                subject: "Reset your password".to_string(),
                body: format!(
                    "Hi {}, use token {} (id {}) to reset the password for account {}.",
                    account.firstname, raw, row.id, account.id
                ),
            })
            .await?;
        self.tx_manager.commit(tx).await?;

        info!(user_id = %account.id, "password reset requested");
        Ok(())
    }

    /// Confirms a reset token and pushes the new password hash upstream.
    pub async fn confirm_password_reset(
        &self,
        raw_token: &str,
        token_id: Uuid,
        account_id: &str,
        new_password: &str,
    ) -> CoreResult<()> {
        validate_password(new_password)?;
        self.identity.get_by_id(account_id).await?;

        let mut tx = self.tx_manager.begin().await?;
        let row = self
            .consume_one_time(&mut tx, &self.reset_tokens, token_id, account_id, raw_token)
            .await?;
        self.reset_tokens.delete_by_id(&mut tx, row.id).await?;

        let password_hash = self.hash(new_password)?;
        self.identity.reset_password(account_id, &password_hash).await?;
        self.tx_manager.commit(tx).await?;

        info!(user_id = %account_id, "password reset confirmed");
        Ok(())
    }

    /// Ends one session.
    pub async fn logout(&self, role: Role, user_id: &str, number: i64) -> CoreResult<()> {
        self.tokens.revoke(role, user_id, number).await
    }

    /// Ends every session of the user within one role partition.
    pub async fn logout_everywhere(&self, role: Role, user_id: &str) -> CoreResult<()> {
        self.tokens.revoke_all(role, user_id).await
    }

    /// Stores a verification token and mails it to the new account.
    async fn send_verification(&self, account: &Account) -> CoreResult<()> {
        let mut tx = self.tx_manager.begin().await?;
        let (raw, row) = self
            .create_one_time(
                &mut tx,
                &self.verification_tokens,
                &account.id,
                VERIFICATION_TOKEN_LEN,
                self.config.verification_token_ttl,
            )
            .await?;

        self.queue
            .publish_mail(&MailMessage {
                to: account.email.clone(),
                subject: "Verify your email".to_string(),
                body: format!(
                    "Hi {}, your verification token is {} (id {}).",
                    account.firstname, raw, row.id
                ),
            })
            .await?;
        self.tx_manager.commit(tx).await
    }

    /// Generates, hashes and stores a one-time token. Returns the raw
    /// value (for the email) together with the stored row.
    async fn create_one_time(
        &self,
        tx: &mut T::Tx,
        repository: &Arc<O>,
        user_id: &str,
        len: usize,
        ttl: std::time::Duration,
    ) -> CoreResult<(String, OneTimeToken)> {
        let raw: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        let now = Utc::now().timestamp();

        let row = repository
            .create(
                tx,
                OneTimeToken {
                    id: Uuid::new_v4(),
                    user_id: user_id.to_string(),
                    token_hash: self.hash(&raw)?,
                    created_at: now,
                    expires_at: now + ttl.as_secs() as i64,
                },
            )
            .await?;
        Ok((raw, row))
    }

    /// Loads a one-time token row and checks ownership, expiry and the
    /// bcrypt match. Deletion is the caller's job so the row stays usable
    /// while later steps of the flow can still fail.
    async fn consume_one_time(
        &self,
        tx: &mut T::Tx,
        repository: &Arc<O>,
        token_id: Uuid,
        account_id: &str,
        raw_token: &str,
    ) -> CoreResult<OneTimeToken> {
        let row = repository
            .get_by_id(tx, token_id)
            .await?
            .ok_or(CoreError::NotFound {
                resource: "one-time token".to_string(),
            })?;

        if row.user_id != account_id {
            return Err(TokenError::Invalid.into());
        }
        if row.is_expired_at(Utc::now().timestamp()) {
            return Err(TokenError::Expired.into());
        }
        let matches = bcrypt::verify(raw_token, &row.token_hash)
            .map_err(|e| CoreError::system(format!("bcrypt verify failed: {e}")))?;
        if !matches {
            return Err(TokenError::Invalid.into());
        }
        Ok(row)
    }

    fn hash(&self, value: &str) -> CoreResult<String> {
        bcrypt::hash(value, self.config.bcrypt_cost)
            .map_err(|e| CoreError::system(format!("bcrypt hash failed: {e}")))
    }

    /// Publishes the rollback message for an already-created upstream
    /// account. A failed publish is logged but not surfaced; the original
    /// flow error is what the caller reports.
    async fn compensate(&self, user_id: &str) {
        let message = SagaCompensation {
            user_id: user_id.to_string(),
        };
        if let Err(e) = self.queue.publish_compensation(&message).await {
            error!(user_id, error = %e, "failed to publish saga compensation");
        }
    }
}

fn validate_email(email: &str) -> CoreResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(CoreError::validation("malformed email address"))
    }
}

fn validate_password(password: &str) -> CoreResult<()> {
    if password.len() < PASSWORD_MIN_LEN {
        return Err(CoreError::validation("password is too short"));
    }
    if password.len() > PASSWORD_MAX_LEN {
        return Err(CoreError::validation("password is too long"));
    }
    Ok(())
}

#[cfg(test)]
mod validation_tests {
    use super::{validate_email, validate_password};

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plain", "a@b", "a b@example.com", "a@@example.com"] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn enforces_password_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(73)).is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password(&"x".repeat(72)).is_ok());
    }
}
