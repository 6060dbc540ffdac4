use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use validator::Validate;

use crate::{
    dto::{
        generate::{GenerateImageRequest, GenerateImageResponse},
        validation::validate_image_id,
    },
    error::AppError,
    routes::checked_room_code,
    services::generation_service,
    state::SharedState,
};

/// Routes for image generation and blob serving.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms/{code}/generate", post(generate))
        .route("/images/{id}", get(serve_image))
}

/// Generate image candidates for a player's prompt.
#[utoipa::path(
    post,
    path = "/rooms/{code}/generate",
    tag = "images",
    params(("code" = String, Path, description = "4-letter room code")),
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "Candidate images ready", body = GenerateImageResponse),
        (status = 404, description = "Room not found or expired")
    )
)]
pub async fn generate(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, AppError> {
    checked_room_code(&code)?;
    payload.validate()?;
    let response = generation_service::generate_for_player(&state, &code, payload).await?;
    Ok(Json(response))
}

/// Serve a stored image blob.
///
/// Blob ids are random UUIDs and their content never changes, so the
/// response is marked immutable and cacheable for a year.
#[utoipa::path(
    get,
    path = "/images/{id}",
    tag = "images",
    params(("id" = String, Path, description = "Image blob identifier")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "Image not found or expired")
    )
)]
pub async fn serve_image(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_image_id(&id).map_err(|_| AppError::BadRequest("invalid image id".into()))?;

    let data_uri = generation_service::fetch_image(&state, &id).await?;
    let (content_type, bytes) = decode_data_uri(&data_uri)
        .ok_or_else(|| AppError::Internal(format!("stored image `{id}` is not a data URI")))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        bytes,
    ))
}

/// Split a `data:<mime>;base64,<payload>` URI into its decoded parts.
fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let content_type = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((content_type.to_string(), bytes))
}
