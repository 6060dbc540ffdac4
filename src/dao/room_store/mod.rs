/// Always-available in-memory backend, used for tests and single-node runs.
pub mod memory;
/// Redis REST backend, enabled by the `redis-store` feature.
#[cfg(feature = "redis-store")]
pub mod redis;

use std::time::Duration;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;
use crate::state::room::Room;

/// Abstraction over the shared key-value store holding room documents, image
/// blobs, and the advisory per-room locks.
///
/// Everything is TTL-bound: a room that stops receiving actions disappears on
/// its own, and a crashed lock holder is recovered by lock expiry.
pub trait RoomStore: Send + Sync {
    /// Fetch the room stored under `room_code`, if it has not expired.
    fn load_room(&self, room_code: String) -> BoxFuture<'static, StorageResult<Option<Room>>>;
    /// Persist a room document, refreshing its inactivity expiry.
    fn save_room(&self, room: Room, ttl: Duration) -> BoxFuture<'static, StorageResult<()>>;
    /// Set `lock_key` to `token` only if absent, with a millisecond expiry.
    /// Returns whether the lock was acquired.
    fn acquire_lock(
        &self,
        lock_key: String,
        token: String,
        ttl_ms: u64,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Read the token currently holding `lock_key`, if any.
    fn read_lock(&self, lock_key: String) -> BoxFuture<'static, StorageResult<Option<String>>>;
    /// Delete `lock_key` unconditionally.
    fn release_lock(&self, lock_key: String) -> BoxFuture<'static, StorageResult<()>>;
    /// Store an image blob (a data URI) under `image_id`.
    fn put_image(
        &self,
        image_id: String,
        data_uri: String,
        ttl: Duration,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a stored image blob, if it has not expired.
    fn fetch_image(&self, image_id: String) -> BoxFuture<'static, StorageResult<Option<String>>>;
    /// Probe the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish connectivity after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Store key for a room document.
pub fn room_key(room_code: &str) -> String {
    format!("room:{room_code}")
}

/// Store key for a room's advisory lock.
pub fn lock_key(room_code: &str) -> String {
    format!("lock:room:{room_code}")
}

/// Store key for an image blob.
pub fn image_key(image_id: &str) -> String {
    format!("image:{image_id}")
}
