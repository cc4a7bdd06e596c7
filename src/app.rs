//! Interactive account flows for the CLI.
//!
//! `App` wires the config, the persisted session, and the API client
//! together, and drives the session manager from terminal prompts. It
//! owns presentation only; all session mutation happens in the manager.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::auth::{CredentialStore, Credentials, Session, SessionManager};
use crate::config::Config;

/// Environment variables for non-interactive credentials
const EMAIL_ENV: &str = "PAWPORT_EMAIL";
const PASSWORD_ENV: &str = "PAWPORT_PASSWORD";

pub struct App {
    config: Config,
    manager: SessionManager,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        // Restore the persisted token so refresh can pick it up
        let mut session = Session::new(cache_dir);
        let restored = session.load();
        debug!(?restored, "Session loaded");

        let api = ApiClient::new(config.api_base_url())?;
        debug!(base_url = api.base_url(), "API client configured");

        Ok(Self {
            config,
            manager: SessionManager::new(api, session),
        })
    }

    /// Create an account: prompt for credentials, confirm the password,
    /// register. Does not log in.
    pub async fn register(&mut self) -> Result<()> {
        let email = self.prompt_email()?;
        let password = Self::prompt_password()?;
        let confirm = rpassword::prompt_password("Confirm password: ")?;
        if password != confirm {
            anyhow::bail!("Passwords do not match");
        }
        if email.is_empty() || password.is_empty() {
            anyhow::bail!("Email and password required");
        }

        let credentials = Credentials { email, password };
        self.manager.register(&credentials).await?;

        println!("Registration accepted. You can now log in.");
        Ok(())
    }

    /// Log in, offering the stored password for a known email.
    pub async fn login(&mut self) -> Result<()> {
        let email = self.prompt_email()?;

        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) if !password.is_empty() => password,
            _ => {
                if CredentialStore::has_credentials(&email) && Self::confirm_stored_password()? {
                    CredentialStore::get_password(&email)?
                } else {
                    Self::prompt_password()?
                }
            }
        };

        if email.is_empty() || password.is_empty() {
            anyhow::bail!("Email and password required");
        }

        let credentials = Credentials {
            email: email.clone(),
            password,
        };
        self.manager.login(&credentials).await?;

        if let Err(e) = CredentialStore::store(&email, &credentials.password) {
            warn!(error = %e, "Failed to store credentials");
        }

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        let name = self
            .manager
            .session()
            .user()
            .map(|u| u.display_name().to_string())
            .unwrap_or_default();
        println!("Logged in as {}.", name);
        Ok(())
    }

    /// Log out on the server. On failure the local session stays as it
    /// was, since the server did not confirm.
    pub async fn logout(&mut self) -> Result<()> {
        self.manager.logout().await?;
        println!("Logged out.");
        Ok(())
    }

    /// Refresh the session from the stored token and print the profile.
    pub async fn whoami(&mut self) -> Result<()> {
        self.manager.refresh().await?;

        if let Some(user) = self.manager.session().user() {
            println!("{}", user.display_name());
            if let Some(ref email) = user.email {
                println!("  email: {}", email);
            }
            if let Some(ref city) = user.city {
                println!("  city:  {}", city);
            }
            if let Some(ref phone) = user.phone {
                println!("  phone: {}", phone);
            }
        }
        Ok(())
    }

    /// Show what is known locally without touching the network.
    pub fn status(&self) -> Result<()> {
        let session = self.manager.session();
        match (session.token(), session.restored_at()) {
            (Some(_), Some(saved_at)) => {
                println!(
                    "Stored session token found (saved {}).",
                    saved_at.format("%Y-%m-%d %H:%M UTC")
                );
                println!("Run `pawport whoami` to refresh it.");
            }
            (Some(_), None) => println!("Session active."),
            (None, _) => println!("Not logged in."),
        }
        if let Some(ref email) = self.config.last_email {
            println!("Last email: {}", email);
        }
        Ok(())
    }

    fn prompt_email(&self) -> Result<String> {
        if let Ok(email) = std::env::var(EMAIL_ENV) {
            if !email.is_empty() {
                return Ok(email);
            }
        }

        match self.config.last_email {
            Some(ref last) => {
                print!("Email [{}]: ", last);
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                let input = input.trim();

                if input.is_empty() {
                    Ok(last.clone())
                } else {
                    Ok(input.to_string())
                }
            }
            None => {
                print!("Email: ");
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                Ok(input.trim().to_string())
            }
        }
    }

    fn prompt_password() -> Result<String> {
        let password = rpassword::prompt_password("Password: ")?;
        Ok(password)
    }

    fn confirm_stored_password() -> Result<bool> {
        print!("Use stored password? [Y/n]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_lowercase() != "n")
    }
}
