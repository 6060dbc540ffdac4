//! Image generation collaborator and blob storage.
//!
//! The generator is a pluggable trait so deployments can wire a real
//! diffusion backend while tests and degraded setups run on a deterministic
//! placeholder. Generated data URIs are parked in the store under short ids
//! and served back through `/images/{id}`, keeping the room document small.

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::generate::{GenerateImageRequest, GenerateImageResponse},
    error::ServiceError,
    services::sse_events,
    state::{SharedState, room::FALLBACK_IMAGE_URL},
};

/// Failure of the image generation collaborator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend rejected the prompt.
    #[error("prompt rejected: {0}")]
    Rejected(String),
    /// The backend could not be reached or answered with a failure.
    #[error("image backend unavailable: {0}")]
    Unavailable(String),
}

/// Produces candidate images for a player prompt.
///
/// Implementations return either ready-to-serve URLs or `data:` URIs; the
/// latter are re-homed into blob storage before being handed to clients.
pub trait ImageGenerator: Send + Sync {
    /// Generate candidate images for `prompt`.
    fn generate(&self, prompt: &str) -> BoxFuture<'static, Result<Vec<String>, GenerationError>>;
}

/// Generator that always answers with the built-in fallback illustration.
///
/// Used until a real backend is attached, and as the degraded answer when
/// one fails mid-game: a battle must never stall on a missing image.
pub struct PlaceholderGenerator;

impl ImageGenerator for PlaceholderGenerator {
    fn generate(&self, _prompt: &str) -> BoxFuture<'static, Result<Vec<String>, GenerationError>> {
        Box::pin(async { Ok(vec![FALLBACK_IMAGE_URL.to_string()]) })
    }
}

/// Run the generator for a player and publish the resulting references.
///
/// The room is read outside any lock: generation does not touch the room
/// document, it only parks blobs and notifies the player so they can pick a
/// candidate and submit it as a regular action.
pub async fn generate_for_player(
    state: &SharedState,
    room_code: &str,
    request: GenerateImageRequest,
) -> Result<GenerateImageResponse, ServiceError> {
    let store = state.require_room_store().await?;

    let room = store
        .load_room(room_code.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_code}` not found")))?;
    if room.find_player(&request.player_id).is_none() {
        return Err(ServiceError::InvalidInput(format!(
            "player `{}` is not in room `{room_code}`",
            request.player_id
        )));
    }

    let candidates = match state.image_generator().generate(&request.prompt).await {
        Ok(candidates) if !candidates.is_empty() => candidates,
        Ok(_) => {
            warn!(room_code, player_id = %request.player_id, "generator returned no candidates");
            vec![FALLBACK_IMAGE_URL.to_string()]
        }
        Err(err) => {
            warn!(room_code, player_id = %request.player_id, error = %err, "image generation failed; falling back to placeholder");
            vec![FALLBACK_IMAGE_URL.to_string()]
        }
    };

    let mut image_urls = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.starts_with("data:") {
            let image_id = Uuid::new_v4().to_string();
            store
                .put_image(image_id.clone(), candidate, state.config().room_ttl())
                .await?;
            image_urls.push(format!("/images/{image_id}"));
        } else {
            image_urls.push(candidate);
        }
    }

    info!(room_code, player_id = %request.player_id, count = image_urls.len(), "image candidates ready");
    sse_events::broadcast_image_ready(state, room_code, &request.player_id, &image_urls);

    Ok(GenerateImageResponse { image_urls })
}

/// Fetch a stored image blob for serving.
pub async fn fetch_image(state: &SharedState, image_id: &str) -> Result<String, ServiceError> {
    let store = state.require_room_store().await?;
    store
        .fetch_image(image_id.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("image `{image_id}` not found")))
}
