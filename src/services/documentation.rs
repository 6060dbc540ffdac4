use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Prompt Clash Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::get_room,
        crate::routes::rooms::join_room,
        crate::routes::rooms::dispatch_action,
        crate::routes::images::generate,
        crate::routes::images::serve_image,
        crate::routes::sse::room_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::CreateRoomResponse,
            crate::dto::room::JoinRoomRequest,
            crate::dto::room::PlayerInput,
            crate::dto::room::RoomSnapshot,
            crate::dto::action::ActionRequest,
            crate::dto::generate::GenerateImageRequest,
            crate::dto::generate::GenerateImageResponse,
            crate::dto::sse::Handshake,
            crate::state::room::Room,
            crate::state::room::Player,
            crate::state::room::Battle,
            crate::state::room::Generation,
            crate::state::room::Prompt,
            crate::state::state_machine::GamePhase,
            crate::state::state_machine::VoteChoice,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Room lifecycle and game actions"),
        (name = "images", description = "Image generation and blob serving"),
        (name = "sse", description = "Server-sent event streams"),
    )
)]
pub struct ApiDoc;
