//! In-memory [`RoomStore`] backend with per-entry expiry.
//!
//! Mirrors the external store's semantics closely enough for tests and
//! single-node deployments: TTL-bound entries and an atomic
//! set-if-absent-with-expiry used by the advisory lock.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;

use crate::{
    dao::{
        room_store::{RoomStore, image_key, room_key},
        storage::{StorageError, StorageResult},
    },
    state::room::Room,
};

#[derive(Debug)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn live(&self) -> bool {
        self.expires_at.is_none_or(|deadline| Instant::now() < deadline)
    }
}

/// Process-local key-value store backing rooms, locks, and image blobs.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    entries: Arc<DashMap<String, StoredValue>>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: &str) -> Option<String> {
        let found = self
            .entries
            .get(key)
            .map(|entry| (entry.live(), entry.value.clone()));
        match found {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                // Lazy purge of an expired entry.
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: String, value: String, ttl: Option<Duration>) {
        self.entries.insert(
            key,
            StoredValue {
                value,
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
    }

    fn set_if_absent(&self, key: String, value: String, ttl: Duration) -> bool {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(StoredValue {
                    value,
                    expires_at: Some(Instant::now() + ttl),
                });
                true
            }
            Entry::Occupied(mut slot) => {
                if slot.get().live() {
                    false
                } else {
                    slot.insert(StoredValue {
                        value,
                        expires_at: Some(Instant::now() + ttl),
                    });
                    true
                }
            }
        }
    }
}

impl RoomStore for MemoryRoomStore {
    fn load_room(&self, room_code: String) -> BoxFuture<'static, StorageResult<Option<Room>>> {
        let store = self.clone();
        Box::pin(async move {
            let key = room_key(&room_code);
            match store.get(&key) {
                Some(raw) => serde_json::from_str(&raw)
                    .map(Some)
                    .map_err(|source| StorageError::corrupt(key, source)),
                None => Ok(None),
            }
        })
    }

    fn save_room(&self, room: Room, ttl: Duration) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let key = room_key(&room.room_code);
            let raw = serde_json::to_string(&room)
                .map_err(|source| StorageError::corrupt(key.clone(), source))?;
            store.set(key, raw, Some(ttl));
            Ok(())
        })
    }

    fn acquire_lock(
        &self,
        lock_key: String,
        token: String,
        ttl_ms: u64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store.set_if_absent(lock_key, token, Duration::from_millis(ttl_ms)))
        })
    }

    fn read_lock(&self, lock_key: String) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.get(&lock_key)) })
    }

    fn release_lock(&self, lock_key: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.entries.remove(&lock_key);
            Ok(())
        })
    }

    fn put_image(
        &self,
        image_id: String,
        data_uri: String,
        ttl: Duration,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.set(image_key(&image_id), data_uri, Some(ttl));
            Ok(())
        })
    }

    fn fetch_image(&self, image_id: String) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.get(&image_key(&image_id))) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
