//! REST API client module for the Pawport account service.
//!
//! The API uses JWT bearer token authentication obtained through the
//! login endpoint; the token is carried on logout and refresh calls.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthPayload};
pub use error::ApiError;
