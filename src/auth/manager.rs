//! The session lifecycle: register, login, logout, refresh.
//!
//! `SessionManager` is the only writer of [`Session`] and of the API
//! client's bearer token. Each operation makes at most one network call,
//! never retries, and reports failures as the normalized error code.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::credentials::Credentials;
use crate::auth::session::{Session, SessionData};

pub struct SessionManager {
    api: ApiClient,
    session: Session,
}

impl SessionManager {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self { api, session }
    }

    /// Read access for collaborators; they never write the session directly.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Create an account. Success does not log the user in and nothing
    /// in the session changes either way.
    pub async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.api.register(credentials).await.map_err(|e| {
            warn!(code = %e.code(), "registration failed");
            e
        })?;
        info!(email = %credentials.email, "registration accepted");
        Ok(())
    }

    /// Log in. On success the bearer token is activated first, then the
    /// token and profile are committed to the session as one value and
    /// the token is persisted. On failure everything is left untouched.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), ApiError> {
        let payload = self.api.login(credentials).await.map_err(|e| {
            warn!(code = %e.code(), "login failed");
            e
        })?;

        self.api.set_token(payload.token.clone());
        self.session.update(SessionData {
            token: payload.token,
            user: payload.user,
            created_at: Utc::now(),
        });
        if let Err(e) = self.session.save() {
            warn!(error = %e, "failed to persist session token");
        }

        info!("login successful");
        Ok(())
    }

    /// Log out on the server, then deactivate the bearer token and clear
    /// the session. If the server does not confirm, nothing is cleared
    /// locally; the caller decides whether to retry or discard by hand.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        self.api.logout().await.map_err(|e| {
            warn!(code = %e.code(), "logout failed, keeping local session");
            e
        })?;

        self.api.clear_token();
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "failed to remove persisted session token");
        }

        info!("logged out");
        Ok(())
    }

    /// Restore the session from the stored token: activate the bearer
    /// token, fetch the current profile, commit both.
    ///
    /// Without a token this fails locally and sends nothing. On a failed
    /// profile fetch the token stays attached: the fetch failing does not
    /// disprove the token, and a genuinely expired one surfaces as its
    /// own rejection on the next call.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let Some(token) = self.session.token().map(str::to_owned) else {
            debug!("no stored token, skipping refresh request");
            return Err(ApiError::NoSession);
        };

        self.api.set_token(token);
        let payload = self.api.refresh().await.map_err(|e| {
            warn!(code = %e.code(), "refresh failed");
            e
        })?;

        self.api.set_token(payload.token.clone());
        self.session.update(SessionData {
            token: payload.token,
            user: payload.user,
            created_at: Utc::now(),
        });
        if let Err(e) = self.session.save() {
            warn!(error = %e, "failed to persist session token");
        }

        info!("session refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Base URL with nothing listening: connecting is refused immediately.
    fn refused_base_url() -> String {
        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind loopback port");
        let addr = listener.local_addr().expect("Failed to read local addr");
        drop(listener);
        format!("http://{}", addr)
    }

    fn manager_at(base_url: &str) -> (SessionManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let api = ApiClient::new(base_url).expect("Failed to build client");
        let session = Session::new(dir.path().to_path_buf());
        (SessionManager::new(api, session), dir)
    }

    fn credentials() -> Credentials {
        Credentials {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_refresh_without_token_fails_locally() {
        // The base URL has nothing behind it; a network attempt would
        // surface as a transport error, not the fixed precondition code.
        let (mut manager, _dir) = manager_at(&refused_base_url());

        let err = manager.refresh().await.expect_err("Refresh must fail");
        assert!(matches!(err, ApiError::NoSession));
        assert_eq!(err.code(), "Error: No user to refresh");
        assert!(!manager.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_transport_failure_leaves_session_empty() {
        let (mut manager, _dir) = manager_at(&refused_base_url());

        let err = manager
            .login(&credentials())
            .await
            .expect_err("Login must fail");
        assert!(matches!(err, ApiError::Network(_)));
        assert!(!err.code().is_empty());

        assert!(manager.session().token().is_none());
        assert!(manager.session().user().is_none());
        assert!(manager.api().token().is_none());
    }

    #[tokio::test]
    async fn test_register_transport_failure_leaves_session_empty() {
        let (mut manager, _dir) = manager_at(&refused_base_url());

        manager
            .register(&credentials())
            .await
            .expect_err("Register must fail");
        assert!(!manager.session().is_authenticated());
        assert!(manager.api().token().is_none());

        // And refresh still reports the precondition, proving register
        // stored nothing.
        let err = manager.refresh().await.expect_err("Refresh must fail");
        assert!(matches!(err, ApiError::NoSession));
    }

    #[tokio::test]
    async fn test_logout_transport_failure_keeps_local_state() {
        let (mut manager, _dir) = manager_at(&refused_base_url());
        manager.api.set_token("T1".to_string());
        manager.session.update(SessionData {
            token: "T1".to_string(),
            user: Default::default(),
            created_at: Utc::now(),
        });

        let err = manager.logout().await.expect_err("Logout must fail");
        assert!(matches!(err, ApiError::Network(_)));

        assert_eq!(manager.session().token(), Some("T1"));
        assert!(manager.session().is_authenticated());
        assert_eq!(manager.api().token(), Some("T1"));
    }
}
