//! Pawport CLI - account client for the Pawport pet-adoption service.
//!
//! Subcommands drive the session lifecycle: register, login, logout,
//! whoami (refresh), status. Errors print as their normalized code.

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pawport::app::App;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: pawport <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  register   Create an account");
    eprintln!("  login      Log in and store the session token");
    eprintln!("  logout     Log out and discard the session token");
    eprintln!("  whoami     Refresh the session and show the profile");
    eprintln!("  status     Show local session state");
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("pawport starting");

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("status");

    let result = run(command).await;

    info!("pawport shutting down");

    if let Err(e) = result {
        // The error display is the normalized code; print it as-is.
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: &str) -> Result<()> {
    match command {
        "help" | "--help" | "-h" => {
            print_usage();
            return Ok(());
        }
        "register" | "login" | "logout" | "whoami" | "refresh" | "status" => {}
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {}", other);
        }
    }

    let mut app = App::new()?;
    match command {
        "register" => app.register().await,
        "login" => app.login().await,
        "logout" => app.logout().await,
        "whoami" | "refresh" => app.whoami().await,
        "status" => app.status(),
        _ => unreachable!(),
    }
}
