use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_player_id;

/// Payload of `POST /rooms/{code}/generate`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    /// Free-form text sent to the image generator.
    #[validate(length(min = 1, max = 600))]
    pub prompt: String,
    /// Player the generated images belong to.
    #[validate(custom(function = validate_player_id))]
    pub player_id: String,
}

/// Candidate images produced for one generation request.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    /// Servable references, one per candidate.
    pub image_urls: Vec<String>,
}
