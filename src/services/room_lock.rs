//! Advisory per-room lock held in the shared store.
//!
//! Every mutation of a room document runs under this lock so concurrent
//! requests against the same room serialize instead of clobbering each
//! other's writes. The lock is TTL-bound: a holder that crashes mid-cycle is
//! recovered when the store expires the key.

use std::{sync::Arc, time::Duration};

use rand::Rng;
use tokio::time::sleep;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::room_store::{RoomStore, lock_key},
    error::ServiceError,
};

/// How long an acquired lock survives if its holder never releases it.
pub const LOCK_TTL_MS: u64 = 5_000;

const MAX_ATTEMPTS: u32 = 20;
const RETRY_BASE_MS: u64 = 100;
const RETRY_JITTER_MS: u64 = 100;

/// A held room lock. Must be released via [`RoomLock::release`] on every
/// code path; there is no drop guard because release is asynchronous.
pub struct RoomLock {
    store: Arc<dyn RoomStore>,
    key: String,
    token: String,
}

impl RoomLock {
    /// Try to take the lock for `room_code`, retrying with jittered backoff.
    ///
    /// Fails with [`ServiceError::Busy`] once the retry budget is exhausted,
    /// which surfaces to clients as a retriable conflict.
    pub async fn acquire(
        store: Arc<dyn RoomStore>,
        room_code: &str,
    ) -> Result<Self, ServiceError> {
        let key = lock_key(room_code);
        let token = Uuid::new_v4().simple().to_string();

        for attempt in 1..=MAX_ATTEMPTS {
            let acquired = store
                .acquire_lock(key.clone(), token.clone(), LOCK_TTL_MS)
                .await?;
            if acquired {
                return Ok(Self { store, key, token });
            }

            if attempt < MAX_ATTEMPTS {
                let backoff = RETRY_BASE_MS + rand::rng().random_range(0..RETRY_JITTER_MS);
                sleep(Duration::from_millis(backoff)).await;
            }
        }

        Err(ServiceError::Busy(format!(
            "room `{room_code}` is processing another request"
        )))
    }

    /// Release the lock, but only if this holder's token is still in place.
    ///
    /// If the TTL already expired the key may be gone or owned by a newer
    /// holder; deleting it then would break that holder's critical section.
    pub async fn release(self) {
        match self.store.read_lock(self.key.clone()).await {
            Ok(Some(holder)) if holder == self.token => {
                if let Err(err) = self.store.release_lock(self.key.clone()).await {
                    warn!(key = %self.key, error = %err, "failed to release room lock");
                }
            }
            Ok(_) => {
                warn!(key = %self.key, "room lock no longer held at release time");
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read room lock before release");
            }
        }
    }
}
