//! Library crate for prompt-clash-back, exposing modules for binaries and integration tests.

/// Runtime configuration loaded from file and environment.
pub mod config;
/// Storage backends and the room persistence trait.
pub mod dao;
/// Request, response and event payload types.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum routers and handlers.
pub mod routes;
/// Business logic sitting between routes and storage.
pub mod services;
/// Shared application state and the game state machine.
pub mod state;
