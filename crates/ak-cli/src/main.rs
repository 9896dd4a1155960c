//! ak - account client CLI
//!
//! The in-repo consumer of the session/profile state: signs in, edits the
//! profile, and runs the account-recovery flows against the hosted backend.
//!
//! # Examples
//!
//! ```bash
//! # Sign in (the profile row is created lazily on first sign-in)
//! ak login user@example.com secret1
//!
//! # Update the profile
//! ak profile update --nickname ferris --phone 01012345678
//!
//! # Recover a forgotten email
//! ak find-email --name Kim --phone 01012345678
//! ```

mod cli;
mod commands;
mod logger;

use crate::cli::Cli;
use crate::commands::{Commands, ProfileCommands};

use ak_client::{AuthClient, Client, SessionStore};
use ak_config::{Config, ConfigError};
use ak_core::{ProfileUpdate, count_digits, format_phone};
use ak_session::{AuthState, SessionManager};

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use log::warn;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional; real environment variables win either way
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logger::initialize(&config.logging) {
        eprintln!("Failed to initialize logger: {err}");
        return ExitCode::FAILURE;
    }
    config.log_summary();

    let session_path = match config.session_path() {
        Ok(path) => path,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let client = Arc::new(Client::new(&config.backend.url, &config.backend.anon_key));
    let auth = Arc::new(AuthClient::new(
        Arc::clone(&client),
        SessionStore::new(session_path),
    ));
    let manager = Arc::new(SessionManager::new(client, Arc::clone(&auth)));
    let event_loop = manager.spawn_event_loop();

    // Report the persisted session (or none) and let the startup
    // reconciliation settle before running the command.
    if let Err(err) = auth.initialize() {
        warn!("Failed to read persisted session: {err}");
        manager.handle_session_event(None).await;
    }
    settle(&manager, |s| !s.loading).await;

    let result = run(cli.command, &manager, &auth).await;

    event_loop.abort();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<Config, ConfigError> {
    let config = Config::load()?;
    config.validate()?;

    Ok(config)
}

async fn run(
    command: Commands,
    manager: &Arc<SessionManager>,
    auth: &Arc<AuthClient>,
) -> Result<(), String> {
    match command {
        Commands::Login { email, password } => {
            manager
                .sign_in(&email, &password)
                .await
                .map_err(|e| e.to_string())?;

            match settle(manager, |s| s.is_authenticated() && !s.loading).await {
                Some(state) if state.needs_profile_setup() => {
                    println!("Signed in. Complete your profile with `ak profile update`.");
                }
                Some(_) => println!("Signed in."),
                None => println!("Signed in; profile is still loading."),
            }
            Ok(())
        }

        Commands::Signup { email, password } => {
            manager
                .sign_up(&email, &password)
                .await
                .map_err(|e| e.to_string())?;

            println!("Account created. Check your inbox if email confirmation is enabled.");
            Ok(())
        }

        Commands::Logout => {
            manager.sign_out().await;
            println!("Signed out.");
            Ok(())
        }

        Commands::Refresh => {
            let session = auth.refresh_session().await.map_err(|e| e.to_string())?;
            println!("Session refreshed for {}", session.user.id);
            Ok(())
        }

        Commands::Status => {
            print_status(&manager.state());
            Ok(())
        }

        Commands::Profile { action } => match action {
            ProfileCommands::Show => {
                let state = manager.state();
                let profile = state
                    .profile
                    .ok_or_else(|| "No profile loaded. Sign in first.".to_string())?;

                println!(
                    "{}",
                    serde_json::to_string_pretty(&profile).map_err(|e| e.to_string())?
                );
                Ok(())
            }

            ProfileCommands::Update {
                name,
                nickname,
                phone,
                birth_day,
            } => {
                let birth_day = match birth_day {
                    Some(raw) => Some(
                        raw.parse::<NaiveDate>()
                            .map_err(|_| "Birth day must be formatted as YYYY-MM-DD".to_string())?,
                    ),
                    None => None,
                };

                let changes = ProfileUpdate {
                    name,
                    nick_name: nickname,
                    phone: phone.as_deref().map(format_phone),
                    birth_day,
                };
                let profile = manager
                    .update_profile(changes)
                    .await
                    .map_err(|e| e.to_string())?;

                println!("Profile updated:");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&profile).map_err(|e| e.to_string())?
                );
                Ok(())
            }
        },

        Commands::Nickname { candidate } => {
            let available = manager
                .check_nickname_availability(&candidate)
                .await
                .map_err(|e| e.to_string())?;

            if available {
                println!("`{}` is available.", candidate.trim());
            } else {
                println!("`{}` is already in use.", candidate.trim());
            }
            Ok(())
        }

        Commands::FindEmail { name, phone } => {
            // screen-level checks, before any backend round trip
            if name.trim().is_empty() {
                return Err("Name is required.".to_string());
            }
            if phone.trim().is_empty() {
                return Err("Phone number is required.".to_string());
            }
            if count_digits(&phone) < 10 {
                return Err("Enter a complete phone number.".to_string());
            }

            let masked = manager
                .find_email_by_info(&name, &format_phone(&phone))
                .await
                .map_err(|e| e.to_string())?;

            println!("Your email is {masked}");
            Ok(())
        }

        Commands::ResetPassword { email } => {
            manager
                .reset_password(&email)
                .await
                .map_err(|e| e.to_string())?;

            println!("Password-reset link sent. Check your inbox.");
            Ok(())
        }
    }
}

/// Wait until the published state matches, or give up after the settle
/// timeout (the state is eventually consistent with the event stream).
async fn settle<F>(manager: &SessionManager, condition: F) -> Option<AuthState>
where
    F: FnMut(&AuthState) -> bool,
{
    let mut rx = manager.subscribe();

    tokio::time::timeout(SETTLE_TIMEOUT, rx.wait_for(condition))
        .await
        .ok()?
        .ok()
        .map(|state| state.clone())
}

fn print_status(state: &AuthState) {
    match &state.identity {
        Some(identity) => {
            println!(
                "Signed in as {}",
                identity.email.as_deref().unwrap_or("<no email>")
            );
            match &state.profile {
                Some(profile) => {
                    println!("Nickname:  {}", profile.nick_name.as_deref().unwrap_or("-"));
                    println!("Name:      {}", profile.name.as_deref().unwrap_or("-"));
                    println!("Phone:     {}", profile.phone.as_deref().unwrap_or("-"));
                    println!(
                        "Birth day: {}",
                        profile
                            .birth_day
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "-".to_string())
                    );
                }
                None => println!("Profile not set up yet; run `ak profile update`."),
            }
        }
        None => println!("Signed out."),
    }
}
