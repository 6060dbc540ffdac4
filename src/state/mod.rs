//! Shared application state and the room domain model.

/// Per-room broadcast hubs feeding SSE streams.
pub mod hub;
/// Room document and its embedded records.
pub mod room;
/// Pure phase transition logic.
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::room_store::RoomStore,
    error::ServiceError,
    services::generation_service::{ImageGenerator, PlaceholderGenerator},
};

pub use self::hub::{RoomHubs, SseHub};

/// Cheaply cloneable handle on the application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the storage handle, the per-room broadcast
/// hubs, and the immutable runtime configuration.
///
/// All room data lives in the external store; nothing here caches it, which
/// is what keeps concurrent request handlers coordinated solely through the
/// per-room lock.
pub struct AppState {
    room_store: RwLock<Option<Arc<dyn RoomStore>>>,
    hubs: RoomHubs,
    degraded: watch::Sender<bool>,
    image_generator: Arc<dyn ImageGenerator>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is
    /// installed, and with the placeholder image generator until a real one
    /// is attached.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_image_generator(config, Arc::new(PlaceholderGenerator))
    }

    /// Same as [`AppState::new`] but with an explicit image generator.
    pub fn with_image_generator(
        config: AppConfig,
        image_generator: Arc<dyn ImageGenerator>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            room_store: RwLock::new(None),
            hubs: RoomHubs::new(),
            degraded: degraded_tx,
            image_generator,
            config,
        })
    }

    /// Obtain a handle to the current room store, if one is installed.
    pub async fn room_store(&self) -> Option<Arc<dyn RoomStore>> {
        let guard = self.room_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the room store or fail with a degraded-mode error.
    pub async fn require_room_store(&self) -> Result<Arc<dyn RoomStore>, ServiceError> {
        self.room_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn install_room_store(&self, store: Arc<dyn RoomStore>) {
        {
            let mut guard = self.room_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_room_store(&self) {
        {
            let mut guard = self.room_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Registry of per-room SSE hubs.
    pub fn hubs(&self) -> &RoomHubs {
        &self.hubs
    }

    /// The collaborator that produces images for player prompts.
    pub fn image_generator(&self) -> &Arc<dyn ImageGenerator> {
        &self.image_generator
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
