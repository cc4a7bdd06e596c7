//! Authentication module: the session lifecycle and its storage.
//!
//! This module provides:
//! - `SessionManager`: register, login, logout, refresh
//! - `Session`: in-memory token/profile pair with token persistence
//! - `CredentialStore`: secure OS-level credential storage via keyring

pub mod credentials;
pub mod manager;
pub mod session;

pub use credentials::{CredentialStore, Credentials};
pub use manager::SessionManager;
pub use session::{Session, SessionData};
