//! Unit tests for the token lifecycle engine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::role::{Role, TokenPurpose};
use crate::domain::entities::token::TokenRecord;
use crate::errors::{CoreError, CoreResult, TokenError};
use crate::repositories::{
    FailingTransactionManager, MockTokenRepository, MockTransactionManager, TokenRepository,
    TransactionManager,
};
use crate::services::token::{TokenService, TokenServiceConfig};

fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        secret: "unit-test-signing-secret".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604_800,
        operation_timeout: Duration::from_secs(5),
    }
}

fn create_test_service() -> (
    Arc<TokenService<MockTransactionManager, MockTokenRepository>>,
    Arc<MockTokenRepository>,
) {
    let repository = Arc::new(MockTokenRepository::new());
    let service = Arc::new(TokenService::new(
        Arc::new(MockTransactionManager::new()),
        Arc::clone(&repository),
        test_config(),
    ));
    (service, repository)
}

#[tokio::test]
async fn test_issue_creates_access_and_refresh_records() {
    let (service, repository) = create_test_service();

    let pair = service
        .issue_for_login(Role::StandardUser, "user-1")
        .await
        .expect("issuance should succeed");

    assert!(!pair.access.token.is_empty());
    assert!(!pair.refresh.token.is_empty());
    assert_ne!(pair.access.token, pair.refresh.token);
    assert!(pair.refresh.expires_at > pair.access.expires_at);
    // one access row + one refresh row
    assert_eq!(repository.len(), 2);
}

#[tokio::test]
async fn test_authenticate_round_trip() {
    let (service, _) = create_test_service();

    let pair = service
        .issue_for_login(Role::Admin, "admin-7")
        .await
        .unwrap();

    let (identity, number) = service
        .authenticate(&pair.access.token, TokenPurpose::Access)
        .await
        .expect("freshly issued access token should validate");
    assert_eq!(identity.user_id, "admin-7");
    assert_eq!(identity.role, Role::Admin);
    assert_eq!(number, 0);

    let (identity, number) = service
        .authenticate(&pair.refresh.token, TokenPurpose::Refresh)
        .await
        .expect("freshly issued refresh token should validate");
    assert_eq!(identity.user_id, "admin-7");
    assert_eq!(number, 0);
}

#[tokio::test]
async fn test_generation_numbers_fill_smallest_gap() {
    let (service, _) = create_test_service();

    service.issue_for_login(Role::StandardUser, "u").await.unwrap();
    service.issue_for_login(Role::StandardUser, "u").await.unwrap();
    let third = service.issue_for_login(Role::StandardUser, "u").await.unwrap();

    // generations 0, 1, 2 are live; revoke the middle one
    let (_, number) = service
        .authenticate(&third.access.token, TokenPurpose::Access)
        .await
        .unwrap();
    assert_eq!(number, 2);
    service.revoke(Role::StandardUser, "u", 1).await.unwrap();

    let fourth = service.issue_for_login(Role::StandardUser, "u").await.unwrap();
    let (_, number) = service
        .authenticate(&fourth.access.token, TokenPurpose::Access)
        .await
        .unwrap();
    assert_eq!(number, 1);
}

#[tokio::test]
async fn test_wrong_purpose_is_rejected() {
    let (service, _) = create_test_service();

    let pair = service
        .issue_for_login(Role::StandardUser, "user-1")
        .await
        .unwrap();

    let err = service
        .authenticate(&pair.access.token, TokenPurpose::Refresh)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Token(TokenError::WrongPurpose)));

    let err = service
        .authenticate(&pair.refresh.token, TokenPurpose::Access)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Token(TokenError::WrongPurpose)));
}

#[tokio::test]
async fn test_garbage_token_is_invalid() {
    let (service, _) = create_test_service();

    let err = service
        .authenticate("not.a.token", TokenPurpose::Access)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Token(TokenError::Invalid)));
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_invalid() {
    let (service, _) = create_test_service();

    let other_repository = Arc::new(MockTokenRepository::new());
    let mut other_config = test_config();
    other_config.secret = "a-different-signing-secret".to_string();
    let other_service = TokenService::new(
        Arc::new(MockTransactionManager::new()),
        other_repository,
        other_config,
    );

    let pair = other_service
        .issue_for_login(Role::StandardUser, "user-1")
        .await
        .unwrap();

    let err = service
        .authenticate(&pair.access.token, TokenPurpose::Access)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Token(TokenError::Invalid)));
}

#[tokio::test]
async fn test_expired_token_is_reported_as_expired() {
    let repository = Arc::new(MockTokenRepository::new());
    let mut config = test_config();
    config.access_token_expiry = -60;
    let service = TokenService::new(
        Arc::new(MockTransactionManager::new()),
        repository,
        config,
    );

    let pair = service
        .issue_for_login(Role::StandardUser, "user-1")
        .await
        .unwrap();

    let err = service
        .authenticate(&pair.access.token, TokenPurpose::Access)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Token(TokenError::Expired)));
}

#[tokio::test]
async fn test_revoke_invalidates_both_purposes() {
    let (service, repository) = create_test_service();

    let pair = service
        .issue_for_login(Role::StandardUser, "user-1")
        .await
        .unwrap();

    service.revoke(Role::StandardUser, "user-1", 0).await.unwrap();
    assert!(repository.is_empty());

    // signature and expiry still pass; the missing record is what kills it
    let err = service
        .authenticate(&pair.access.token, TokenPurpose::Access)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Token(TokenError::Invalid)));

    let err = service
        .authenticate(&pair.refresh.token, TokenPurpose::Refresh)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Token(TokenError::Invalid)));
}

#[tokio::test]
async fn test_refresh_rotates_and_reuses_freed_number() {
    let (service, repository) = create_test_service();

    let old = service
        .issue_for_login(Role::StandardUser, "user-1")
        .await
        .unwrap();
    let (_, number) = service
        .authenticate(&old.refresh.token, TokenPurpose::Refresh)
        .await
        .unwrap();

    let new = service
        .refresh(Role::StandardUser, "user-1", number)
        .await
        .unwrap();

    // the freed number is the smallest gap again
    let (identity, new_number) = service
        .authenticate(&new.access.token, TokenPurpose::Access)
        .await
        .unwrap();
    assert_eq!(identity.user_id, "user-1");
    assert_eq!(new_number, number);
    assert_eq!(repository.len(), 2);

    // same coordinates, fresh secret: the old tokens are dead
    let err = service
        .authenticate(&old.refresh.token, TokenPurpose::Refresh)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Token(TokenError::Invalid)));
    let err = service
        .authenticate(&old.access.token, TokenPurpose::Access)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Token(TokenError::Invalid)));
}

#[tokio::test]
async fn test_revoke_all_is_scoped_to_one_user_and_role() {
    let (service, _) = create_test_service();

    let victim_a = service.issue_for_login(Role::StandardUser, "alice").await.unwrap();
    let victim_b = service.issue_for_login(Role::StandardUser, "alice").await.unwrap();
    let bystander = service.issue_for_login(Role::StandardUser, "bob").await.unwrap();
    let admin = service.issue_for_login(Role::Admin, "alice").await.unwrap();

    service.revoke_all(Role::StandardUser, "alice").await.unwrap();

    for token in [&victim_a.access.token, &victim_b.access.token] {
        let err = service
            .authenticate(token, TokenPurpose::Access)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Token(TokenError::Invalid)));
    }

    // other users and other role partitions are untouched
    assert!(service
        .authenticate(&bystander.access.token, TokenPurpose::Access)
        .await
        .is_ok());
    assert!(service
        .authenticate(&admin.access.token, TokenPurpose::Access)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_sweep_removes_whole_generation_on_refresh_expiry() {
    let repository = Arc::new(MockTokenRepository::new());
    let mut config = test_config();
    config.refresh_token_expiry = -60;
    let service = TokenService::new(
        Arc::new(MockTransactionManager::new()),
        Arc::clone(&repository),
        config,
    );

    // dead generation for alice, live access row included
    service.issue_for_login(Role::StandardUser, "alice").await.unwrap();

    let live_service = TokenService::new(
        Arc::new(MockTransactionManager::new()),
        Arc::clone(&repository),
        test_config(),
    );
    let live = live_service
        .issue_for_login(Role::StandardUser, "bob")
        .await
        .unwrap();

    let deleted = live_service
        .sweep_expired(chrono::Utc::now().timestamp_millis())
        .await
        .unwrap();

    // alice's access + refresh rows go together; bob keeps both
    assert_eq!(deleted, 2);
    assert_eq!(repository.len(), 2);
    assert!(live_service
        .authenticate(&live.refresh.token, TokenPurpose::Refresh)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_concurrent_issuance_allocates_distinct_numbers() {
    let (service, repository) = create_test_service();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.issue_for_login(Role::StandardUser, "user-1").await
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        let pair = handle.await.unwrap().expect("concurrent issuance should succeed");
        let (_, number) = service
            .authenticate(&pair.refresh.token, TokenPurpose::Refresh)
            .await
            .unwrap();
        numbers.push(number);
    }

    numbers.sort_unstable();
    assert_eq!(numbers, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(repository.len(), 16);
}

#[tokio::test]
async fn test_failed_transaction_start_surfaces() {
    let service = TokenService::new(
        Arc::new(FailingTransactionManager::default()),
        Arc::new(MockTokenRepository::new()),
        test_config(),
    );

    let err = service
        .issue_for_login(Role::StandardUser, "user-1")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::System { .. }));
}

/// Repository wrapper whose allocation stalls past any reasonable
/// deadline.
struct StalledRepository {
    inner: MockTokenRepository,
}

#[async_trait]
impl TokenRepository for StalledRepository {
    type Tx = ();

    async fn next_number(&self, tx: &mut (), role: Role, user_id: &str) -> CoreResult<i64> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        self.inner.next_number(tx, role, user_id).await
    }

    async fn insert(&self, tx: &mut (), record: TokenRecord) -> CoreResult<TokenRecord> {
        self.inner.insert(tx, record).await
    }

    async fn find_matching(
        &self,
        tx: &mut (),
        role: Role,
        user_id: &str,
        number: i64,
        purpose: TokenPurpose,
        secret: &str,
    ) -> CoreResult<Option<TokenRecord>> {
        self.inner
            .find_matching(tx, role, user_id, number, purpose, secret)
            .await
    }

    async fn delete_generation(
        &self,
        tx: &mut (),
        role: Role,
        user_id: &str,
        number: i64,
    ) -> CoreResult<()> {
        self.inner.delete_generation(tx, role, user_id, number).await
    }

    async fn delete_all_for_user(&self, tx: &mut (), role: Role, user_id: &str) -> CoreResult<()> {
        self.inner.delete_all_for_user(tx, role, user_id).await
    }

    async fn sweep_expired(&self, tx: &mut (), cutoff: i64) -> CoreResult<u64> {
        self.inner.sweep_expired(tx, cutoff).await
    }
}

/// Transaction double with real isolation: writes buffer in the handle
/// and only reach the shared store on commit, like a Postgres
/// transaction seen from another connection.
struct IsolatedTx {
    writes: Vec<TokenRecord>,
}

struct IsolatedStore {
    committed: Arc<std::sync::Mutex<Vec<TokenRecord>>>,
}

#[async_trait]
impl TransactionManager for IsolatedStore {
    type Tx = IsolatedTx;

    async fn begin(&self) -> CoreResult<IsolatedTx> {
        Ok(IsolatedTx { writes: Vec::new() })
    }

    async fn commit(&self, tx: IsolatedTx) -> CoreResult<()> {
        self.committed.lock().unwrap().extend(tx.writes);
        Ok(())
    }

    async fn rollback(&self, _tx: IsolatedTx) -> CoreResult<()> {
        Ok(())
    }
}

struct IsolatedRepository {
    committed: Arc<std::sync::Mutex<Vec<TokenRecord>>>,
}

impl IsolatedRepository {
    /// Committed rows plus the transaction's own uncommitted writes.
    fn visible(&self, tx: &IsolatedTx) -> Vec<TokenRecord> {
        let mut rows = self.committed.lock().unwrap().clone();
        rows.extend(tx.writes.iter().cloned());
        rows
    }
}

#[async_trait]
impl TokenRepository for IsolatedRepository {
    type Tx = IsolatedTx;

    async fn next_number(&self, tx: &mut IsolatedTx, role: Role, user_id: &str) -> CoreResult<i64> {
        let mut numbers: Vec<i64> = self
            .visible(tx)
            .iter()
            .filter(|r| {
                r.role == role && r.user_id == user_id && r.purpose == TokenPurpose::Access
            })
            .map(|r| r.number)
            .collect();
        numbers.sort_unstable();
        crate::repositories::token::alloc::next_generation_number(&numbers)
    }

    async fn insert(&self, tx: &mut IsolatedTx, record: TokenRecord) -> CoreResult<TokenRecord> {
        tx.writes.push(record.clone());
        Ok(record)
    }

    async fn find_matching(
        &self,
        tx: &mut IsolatedTx,
        role: Role,
        user_id: &str,
        number: i64,
        purpose: TokenPurpose,
        secret: &str,
    ) -> CoreResult<Option<TokenRecord>> {
        Ok(self.visible(tx).into_iter().find(|r| {
            r.role == role
                && r.user_id == user_id
                && r.number == number
                && r.purpose == purpose
                && r.secret == secret
        }))
    }

    async fn delete_generation(
        &self,
        tx: &mut IsolatedTx,
        role: Role,
        user_id: &str,
        number: i64,
    ) -> CoreResult<()> {
        tx.writes
            .retain(|r| !(r.role == role && r.user_id == user_id && r.number == number));
        self.committed
            .lock()
            .unwrap()
            .retain(|r| !(r.role == role && r.user_id == user_id && r.number == number));
        Ok(())
    }

    async fn delete_all_for_user(
        &self,
        tx: &mut IsolatedTx,
        role: Role,
        user_id: &str,
    ) -> CoreResult<()> {
        tx.writes.retain(|r| !(r.role == role && r.user_id == user_id));
        self.committed
            .lock()
            .unwrap()
            .retain(|r| !(r.role == role && r.user_id == user_id));
        Ok(())
    }

    async fn sweep_expired(&self, _tx: &mut IsolatedTx, cutoff: i64) -> CoreResult<u64> {
        let mut committed = self.committed.lock().unwrap();
        let doomed: Vec<(Role, String, i64)> = committed
            .iter()
            .filter(|r| r.purpose == TokenPurpose::Refresh && r.expires_at <= cutoff)
            .map(|r| (r.role, r.user_id.clone(), r.number))
            .collect();
        let before = committed.len();
        committed.retain(|r| {
            !doomed
                .iter()
                .any(|(role, user, number)| r.role == *role && r.user_id == *user && r.number == *number)
        });
        Ok((before - committed.len()) as u64)
    }
}

#[tokio::test]
async fn test_caller_owned_tx_issuance_holds_lock_across_commit() {
    let committed = Arc::new(std::sync::Mutex::new(Vec::new()));
    let tx_manager = Arc::new(IsolatedStore {
        committed: Arc::clone(&committed),
    });
    let service = Arc::new(TokenService::new(
        Arc::clone(&tx_manager),
        Arc::new(IsolatedRepository {
            committed: Arc::clone(&committed),
        }),
        test_config(),
    ));

    // two login-shaped sequences (begin, issue, commit) for one user,
    // with a window between issuance and commit where the shared store
    // still lacks the new rows
    let mut handles = Vec::new();
    for _ in 0..2 {
        let service = Arc::clone(&service);
        let tx_manager = Arc::clone(&tx_manager);
        handles.push(tokio::spawn(async move {
            let mut tx = tx_manager.begin().await.unwrap();
            let (pair, lock) = service
                .issue_in_tx(&mut tx, Role::StandardUser, "user-1")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx_manager.commit(tx).await.unwrap();
            drop(lock);
            pair
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        let pair = handle.await.unwrap();
        let (_, number) = service
            .authenticate(&pair.refresh.token, TokenPurpose::Refresh)
            .await
            .expect("both committed generations should validate");
        numbers.push(number);
    }

    numbers.sort_unstable();
    assert_eq!(numbers, vec![0, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_operation_deadline_yields_timeout() {
    let mut config = test_config();
    config.operation_timeout = Duration::from_millis(50);
    let service = TokenService::new(
        Arc::new(MockTransactionManager::new()),
        Arc::new(StalledRepository {
            inner: MockTokenRepository::new(),
        }),
        config,
    );

    let err = service
        .issue_for_login(Role::StandardUser, "user-1")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Timeout));
}
