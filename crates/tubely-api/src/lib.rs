//! Tubely API Library
//!
//! The HTTP surface of the ingestion pipeline: bearer-token identity, upload
//! and read handlers, error rendering and application setup.

mod handlers;
mod telemetry;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
