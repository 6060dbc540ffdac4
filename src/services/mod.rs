/// Lock-guarded dispatch of game actions.
pub mod action_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Image generation collaborator and blob storage.
pub mod generation_service;
/// Health check service.
pub mod health_service;
/// Advisory per-room lock guarding read-modify-write cycles.
pub mod room_lock;
/// Room lifecycle: creation, joining, lookups.
pub mod room_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor with reconnection and degraded mode.
pub mod storage_supervisor;
