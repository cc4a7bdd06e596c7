//! Account and session client for the Pawport pet-adoption service.
//!
//! The core is [`auth::SessionManager`], which owns the authentication
//! lifecycle (register, login, logout, refresh) over the REST API in
//! [`api`]. [`app::App`] is the interactive CLI shell around it.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod models;
