//! Travelbot backend: persona-voiced remarks about the place a phone is at.
//!
//! A request carries a coordinate. The [`place`] resolver turns it into a
//! short summary of the nearest notable place, the [`persona`] catalog picks
//! who is talking, the [`prompt`] composer writes the prompt, and the
//! [`generator`] asks a language model for the remark. [`commentary`] ties
//! the stages together and [`routes`] exposes them over HTTP.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs, dead_code)]

/// In-process expiring cache
pub mod cache;

/// The location-to-commentary pipeline
pub mod commentary;

/// Remark generation via a chat-completion service
pub mod generator;

/// Outbound HTTP client construction
pub mod http_client;

/// Request gates
pub mod middleware;

/// Builtin and custom personas
pub mod persona;

/// Coordinate to place summary
pub mod place;

/// Prompt composition and surface localization
pub mod prompt;

/// HTTP routes
pub mod routes;

/// Server bootstrap
pub mod server;

/// Configuration, environment and error types
pub mod types;
