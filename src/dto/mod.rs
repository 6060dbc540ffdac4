//! Request and response payloads exposed over HTTP and SSE.

/// Game action envelope for `POST /rooms/{code}/action`.
pub mod action;
/// Image generation request and response bodies.
pub mod generate;
/// Health check response body.
pub mod health;
/// Room creation, join and snapshot payloads.
pub mod room;
/// Server-sent event payloads.
pub mod sse;
pub mod validation;
