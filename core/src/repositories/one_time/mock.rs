//! In-memory implementation of [`OneTimeTokenRepository`] for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::one_time::OneTimeToken;
use crate::errors::{CoreError, CoreResult};

use super::r#trait::OneTimeTokenRepository;

/// In-memory one-time token store.
#[derive(Default)]
pub struct MockOneTimeTokenRepository {
    tokens: Arc<Mutex<HashMap<Uuid, OneTimeToken>>>,
}

impl MockOneTimeTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, OneTimeToken>> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl OneTimeTokenRepository for MockOneTimeTokenRepository {
    type Tx = ();

    async fn create(&self, _tx: &mut (), token: OneTimeToken) -> CoreResult<OneTimeToken> {
        let mut tokens = self.lock();
        if tokens.contains_key(&token.id) {
            return Err(CoreError::AlreadyExists {
                resource: format!("one-time token {}", token.id),
            });
        }
        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn get_by_id(&self, _tx: &mut (), id: Uuid) -> CoreResult<Option<OneTimeToken>> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn delete_by_id(&self, _tx: &mut (), id: Uuid) -> CoreResult<()> {
        self.lock().remove(&id);
        Ok(())
    }
}
