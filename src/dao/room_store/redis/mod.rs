//! Redis-backed [`super::RoomStore`] speaking the REST command protocol.

/// Connection settings for the Redis REST endpoint.
pub mod config;
/// Errors raised by the Redis REST client.
pub mod error;
mod store;

pub use config::RedisConfig;
pub use store::RedisRoomStore;
