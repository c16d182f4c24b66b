//! Per-(role, user) serialization of token mutations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::entities::role::Role;

/// Sharded lock table handing out one async mutex per (role, user).
///
/// The allocation algorithm reads then writes generation numbers
/// non-atomically relative to the store, so two concurrent issuances for
/// the same user could otherwise observe the same "unused" number.
/// Operations for different users never contend. Idle cells are swept on
/// the next acquire, so the table only holds entries for users with an
/// operation in flight.
#[derive(Default)]
pub(crate) struct UserLockTable {
    cells: Mutex<HashMap<(Role, String), Arc<AsyncMutex<()>>>>,
}

impl UserLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `(role, user_id)`, waiting if another
    /// operation for the same pair is in flight.
    pub async fn acquire(&self, role: Role, user_id: &str) -> OwnedMutexGuard<()> {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
            // a strong count of 1 means no holder and no waiter: only the
            // map still references the cell
            cells.retain(|_, cell| Arc::strong_count(cell) > 1);
            Arc::clone(
                cells
                    .entry((role, user_id.to_string()))
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        cell.lock_owned().await
    }

    #[cfg(test)]
    fn cell_count(&self) -> usize {
        self.cells.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
