//! In-memory implementation of [`TokenRepository`] for testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::entities::role::{Role, TokenPurpose};
use crate::domain::entities::token::TokenRecord;
use crate::errors::{CoreError, CoreResult};

use super::alloc::next_generation_number;
use super::r#trait::TokenRepository;

/// In-memory token repository. Writes apply immediately; the transaction
/// handle carries no state (pair with
/// [`crate::repositories::transaction::MockTransactionManager`]).
#[derive(Default)]
pub struct MockTokenRepository {
    records: Arc<Mutex<Vec<TokenRecord>>>,
}

impl MockTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, across all partitions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TokenRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    type Tx = ();

    async fn next_number(&self, _tx: &mut (), role: Role, user_id: &str) -> CoreResult<i64> {
        let records = self.lock();
        let mut numbers: Vec<i64> = records
            .iter()
            .filter(|r| {
                r.role == role && r.user_id == user_id && r.purpose == TokenPurpose::Access
            })
            .map(|r| r.number)
            .collect();
        numbers.sort_unstable();
        next_generation_number(&numbers)
    }

    async fn insert(&self, _tx: &mut (), record: TokenRecord) -> CoreResult<TokenRecord> {
        let mut records = self.lock();
        let duplicate = records.iter().any(|r| {
            r.role == record.role
                && r.user_id == record.user_id
                && r.number == record.number
                && r.purpose == record.purpose
        });
        if duplicate {
            return Err(CoreError::system("duplicate (user, number, purpose) row"));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn find_matching(
        &self,
        _tx: &mut (),
        role: Role,
        user_id: &str,
        number: i64,
        purpose: TokenPurpose,
        secret: &str,
    ) -> CoreResult<Option<TokenRecord>> {
        let records = self.lock();
        Ok(records
            .iter()
            .find(|r| {
                r.role == role
                    && r.user_id == user_id
                    && r.number == number
                    && r.purpose == purpose
                    && r.secret == secret
            })
            .cloned())
    }

    async fn delete_generation(
        &self,
        _tx: &mut (),
        role: Role,
        user_id: &str,
        number: i64,
    ) -> CoreResult<()> {
        let mut records = self.lock();
        records.retain(|r| !(r.role == role && r.user_id == user_id && r.number == number));
        Ok(())
    }

    async fn delete_all_for_user(&self, _tx: &mut (), role: Role, user_id: &str) -> CoreResult<()> {
        let mut records = self.lock();
        records.retain(|r| !(r.role == role && r.user_id == user_id));
        Ok(())
    }

    async fn sweep_expired(&self, _tx: &mut (), cutoff: i64) -> CoreResult<u64> {
        let mut records = self.lock();
        let doomed: Vec<(Role, String, i64)> = records
            .iter()
            .filter(|r| r.purpose == TokenPurpose::Refresh && r.expires_at <= cutoff)
            .map(|r| (r.role, r.user_id.clone(), r.number))
            .collect();

        let before = records.len();
        records.retain(|r| {
            !doomed
                .iter()
                .any(|(role, user, number)| r.role == *role && r.user_id == *user && r.number == *number)
        });
        Ok((before - records.len()) as u64)
    }
}
