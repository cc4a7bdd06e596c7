//! Data models for the Pawport account API.

pub mod user;

pub use user::UserProfile;
