use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    dao::{
        room_store::{RoomStore, image_key, room_key},
        storage::{StorageError, StorageResult},
    },
    state::room::Room,
};

use super::{
    config::RedisConfig,
    error::{RedisDaoError, RedisResult},
};

/// Reply envelope of the REST command endpoint.
#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Room store speaking the Redis REST protocol: each command is posted as a
/// JSON array of strings and answered with a `{"result": ...}` envelope.
#[derive(Clone)]
pub struct RedisRoomStore {
    client: Client,
    base_url: Arc<str>,
    token: Arc<str>,
}

impl RedisRoomStore {
    /// Build a client for the configured endpoint and verify it answers PING.
    pub async fn connect(config: RedisConfig) -> RedisResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RedisDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            token: Arc::<str>::from(config.token),
        };

        store.ping().await?;
        Ok(store)
    }

    async fn command(&self, name: &'static str, parts: Vec<String>) -> RedisResult<Value> {
        let response = self
            .client
            .post(self.base_url.as_ref())
            .bearer_auth(self.token.as_ref())
            .json(&parts)
            .send()
            .await
            .map_err(|source| RedisDaoError::RequestSend {
                command: name,
                source,
            })?;

        match response.status() {
            status if status.is_success() => {
                let envelope = response.json::<CommandResponse>().await.map_err(|source| {
                    RedisDaoError::DecodeResponse {
                        command: name,
                        source,
                    }
                })?;
                if let Some(message) = envelope.error {
                    return Err(RedisDaoError::CommandFailed {
                        command: name,
                        message,
                    });
                }
                Ok(envelope.result.unwrap_or(Value::Null))
            }
            other => Err(RedisDaoError::RequestStatus {
                command: name,
                status: other,
            }),
        }
    }

    async fn get(&self, key: String) -> RedisResult<Option<String>> {
        let reply = self.command("GET", vec!["GET".into(), key]).await?;
        match reply {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value)),
            _ => Err(RedisDaoError::UnexpectedReply { command: "GET" }),
        }
    }

    async fn set_ex(&self, key: String, value: String, ttl: Duration) -> RedisResult<()> {
        self.command(
            "SET",
            vec![
                "SET".into(),
                key,
                value,
                "EX".into(),
                ttl.as_secs().max(1).to_string(),
            ],
        )
        .await?;
        Ok(())
    }

    /// `SET key value PX ttl NX`; a null reply means the key was already held.
    async fn set_px_nx(&self, key: String, value: String, ttl_ms: u64) -> RedisResult<bool> {
        let reply = self
            .command(
                "SET",
                vec![
                    "SET".into(),
                    key,
                    value,
                    "PX".into(),
                    ttl_ms.to_string(),
                    "NX".into(),
                ],
            )
            .await?;
        Ok(!reply.is_null())
    }

    async fn del(&self, key: String) -> RedisResult<()> {
        self.command("DEL", vec!["DEL".into(), key]).await?;
        Ok(())
    }

    async fn ping(&self) -> RedisResult<()> {
        self.command("PING", vec!["PING".into()]).await?;
        Ok(())
    }
}

impl RoomStore for RedisRoomStore {
    fn load_room(&self, room_code: String) -> BoxFuture<'static, StorageResult<Option<Room>>> {
        let store = self.clone();
        Box::pin(async move {
            let key = room_key(&room_code);
            match store.get(key.clone()).await? {
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
            store.set_ex(key, raw, ttl).await.map_err(Into::into)
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
            store
                .set_px_nx(lock_key, token, ttl_ms)
                .await
                .map_err(Into::into)
        })
    }

    fn read_lock(&self, lock_key: String) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let store = self.clone();
        Box::pin(async move { store.get(lock_key).await.map_err(Into::into) })
    }

    fn release_lock(&self, lock_key: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.del(lock_key).await.map_err(Into::into) })
    }

    fn put_image(
        &self,
        image_id: String,
        data_uri: String,
        ttl: Duration,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .set_ex(image_key(&image_id), data_uri, ttl)
                .await
                .map_err(Into::into)
        })
    }

    fn fetch_image(&self, image_id: String) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let store = self.clone();
        Box::pin(async move { store.get(image_key(&image_id)).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
