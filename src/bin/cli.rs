//! HomeSec CLI
//!
//! Command-line front end for the home-security backend:
//! - Sign in, register and sign out
//! - Show or watch the device status panel
//! - Manage contact details and passwords

use anyhow::{bail, Context};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{Input, Password};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use homesec::auth::{
    change_password, request_password_reset, reset_password, save_profile, submit_login,
    submit_register, LoginForm, PasswordChangeForm, ProfileForm, RegisterForm, SubmitError,
};
use homesec::config::{generate_default_config, Config};
use homesec::poller::{PollOutcome, StatusPoller};
use homesec::session::{SessionFile, SessionMarker};
use homesec::status::{render, Alert, AlertFeed, Panel};
use homesec::upstream::HomeSecClient;
use homesec::validation::{
    validate_email, validate_login_device_id, validate_model, validate_password, validate_phone,
    validate_register_device_id,
};

#[derive(Parser)]
#[command(name = "homesec-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Home security dashboard on the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: Option<String>,
        /// Numeric device ID
        #[arg(short, long)]
        device_id: Option<String>,
        /// Numeric password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        email: Option<String>,
        /// Device model
        #[arg(short, long)]
        model: Option<String>,
        /// Numeric device ID
        #[arg(short, long)]
        device_id: Option<String>,
        /// Phone number (01/07 followed by 8 digits)
        #[arg(short, long)]
        phone: Option<String>,
        /// Numeric password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Render the device status panel once
    Status,

    /// Keep the device status panel up to date
    Watch {
        /// Poll interval in milliseconds (default: from config)
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },

    /// List alerts from the backend
    Alerts,

    /// Update phone number and/or email
    Profile {
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Password management
    #[command(subcommand)]
    Password(PasswordCommand),

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PasswordCommand {
    /// Change the password of the signed-in account
    Change,
    /// Email a password-reset link
    ResetRequest {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Set a new password with the emailed token
    Reset {
        /// Token from the reset email
        token: String,
    },
}

/// A failure already printed for the user
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Reported(String);

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<Reported>() => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let config = Config::resolve(cli.config.as_deref())?;
    homesec::logging::init(&config.logging);

    let client = HomeSecClient::new(config.upstream.client_config())?;
    let session = SessionFile::new(&config.session.file);

    match cli.command {
        Commands::Login {
            email,
            device_id,
            password,
        } => {
            if let Some(notice) = already_signed_in(&session)? {
                println!("{}", notice);
                return Ok(());
            }

            let email = prompt_or(email, "Email", validate_email)?;
            let password = password_or(password, "Password")?;
            let device_id = prompt_or(device_id, "Device ID", validate_login_device_id)?;

            let outcome = submit_login(&client, LoginForm::new(email, password, device_id))
                .await
                .or_else(report)?;
            session.save(&outcome.marker)?;

            println!("Signed in as {}", outcome.marker.email);
        }

        Commands::Register {
            email,
            model,
            device_id,
            phone,
            password,
        } => {
            let email = prompt_or(email, "Email", validate_email)?;
            let password = password_or(password, "Password")?;
            let model = prompt_or(model, "Device model", validate_model)?;
            let device_id = prompt_or(device_id, "Device ID", validate_register_device_id)?;
            let phone = match phone {
                Some(phone) => phone,
                None => Input::<String>::new()
                    .with_prompt("Phone (optional)")
                    .allow_empty(true)
                    .validate_with(|input: &String| check(validate_phone(input.trim())))
                    .interact_text()?,
            };

            let form = RegisterForm {
                email,
                password,
                model,
                device_id,
                phone,
            };
            let response = submit_register(&client, form).await.or_else(report)?;

            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("Registration successful. You can now sign in.");
            }
        }

        Commands::Logout => {
            if let Err(e) = client.logout().await {
                tracing::warn!(error = %e, "Remote logout failed");
            }
            tracing::debug!(path = %session.path().display(), "Clearing session marker");
            if session.clear()? {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
        }

        Commands::Whoami => {
            let marker = require_session(&session)?;
            let user = match client.current_user().await {
                Ok(user) => Some(user),
                Err(e) if e.is_transport() => {
                    eprintln!("Backend unreachable, showing local session only");
                    None
                }
                Err(e) => {
                    tracing::debug!(error = %e, "No account details");
                    None
                }
            };
            let device = client.current_device().await.ok();

            if cli.format == OutputFormat::Json {
                let body = serde_json::json!({ "session": marker, "user": user, "device": device });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("Email:      {}", marker.email);
                println!("Device ID:  {}", marker.device_id);
                println!("Signed in:  {}", marker.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
                if let Some(phone) = user.as_ref().and_then(|u| u["phone"].as_str()) {
                    println!("Phone:      {}", phone);
                }
                if let Some(model) = device.as_ref().and_then(|d| d["model"].as_str()) {
                    println!("Model:      {}", model);
                }
            }
        }

        Commands::Status => {
            require_session(&session)?;
            let snapshot = client
                .device_status()
                .await
                .context("Error fetching device status")?;
            let panel = render(&snapshot);

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&panel)?),
                OutputFormat::Table => print_panel(&panel),
            }
        }

        Commands::Watch { interval_ms } => {
            require_session(&session)?;
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.poller.interval());
            watch(client, interval, cli.format).await;
        }

        Commands::Alerts => {
            require_session(&session)?;
            let body = client.alerts().await.context("Error fetching alerts")?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
                OutputFormat::Table => {
                    let mut feed = AlertFeed::default();
                    // Oldest first so the feed ends up newest first
                    for (time, message) in alert_entries(&body).into_iter().rev() {
                        match time {
                            Some(time) => feed.push_alert(Alert::at(time, message)),
                            None => feed.push(message),
                        }
                    }
                    for line in feed.lines() {
                        println!("{}", line);
                    }
                }
            }
        }

        Commands::Profile { phone, email } => {
            require_session(&session)?;
            if phone.is_none() && email.is_none() {
                bail!("Nothing to update: pass --phone and/or --email");
            }

            let form = ProfileForm {
                phone: phone.clone(),
                email: email.clone(),
            };
            save_profile(&client, form).await.or_else(report)?;

            if let Some(email) = email {
                let mut marker = require_session(&session)?;
                marker.email = email.trim().to_string();
                session.save(&marker)?;
            }
            println!("Profile updated");
        }

        Commands::Password(command) => match command {
            PasswordCommand::Change => {
                require_session(&session)?;
                let form = PasswordChangeForm {
                    current: Password::new().with_prompt("Current password").interact()?,
                    new: Password::new()
                        .with_prompt("New password")
                        .validate_with(|input: &String| check(validate_password(input)))
                        .interact()?,
                    confirm: Password::new().with_prompt("Confirm new password").interact()?,
                };
                change_password(&client, form).await.or_else(report)?;
                println!("Password changed");
            }
            PasswordCommand::ResetRequest { email } => {
                let email = prompt_or(email, "Email", validate_email)?;
                let message = request_password_reset(&client, &email)
                    .await
                    .or_else(report)?;
                println!(
                    "{}",
                    message.unwrap_or_else(|| "Check your email for a reset link.".to_string())
                );
            }
            PasswordCommand::Reset { token } => {
                let new_password = Password::new()
                    .with_prompt("New password")
                    .validate_with(|input: &String| check(validate_password(input)))
                    .with_confirmation("Confirm new password", "Passwords don't match.")
                    .interact()?;
                reset_password(&client, &token, &new_password)
                    .await
                    .or_else(report)?;
                println!("Password reset. You can now sign in.");
            }
        },

        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Poll until Ctrl+C, redrawing the panel and feeding changes into the alert feed
async fn watch(client: HomeSecClient, interval: Duration, format: OutputFormat) {
    let poller = StatusPoller::new(std::sync::Arc::new(client), interval);
    let every_ms = poller.interval().as_millis();
    let mut feed = AlertFeed::default();

    let on_poll = |outcome: &PollOutcome| {
        let PollOutcome::Updated { panel, changes } = outcome else {
            return;
        };

        for change in changes {
            feed.push(change.to_string());
        }

        match format {
            OutputFormat::Json => {
                if let Ok(line) = serde_json::to_string(panel) {
                    println!("{}", line);
                }
            }
            OutputFormat::Table => {
                // Clear the screen and redraw
                print!("\x1b[2J\x1b[H");
                print_panel(panel);
                println!();
                println!("Alerts:");
                for line in feed.lines().iter().take(10) {
                    println!("  {}", line);
                }
                println!();
                println!("Polling every {} ms, Ctrl+C to stop", every_ms);
            }
        }
    };

    tokio::select! {
        _ = poller.run(on_poll) => {},
        _ = tokio::signal::ctrl_c() => {
            poller.stop().await;
        },
    }
}

fn print_panel(panel: &Panel) {
    println!("{:<18} {:<20} {}", "Device", "State", "Class");
    println!("{}", "-".repeat(50));

    for view in &panel.views {
        println!(
            "{:<18} {:<20} {}",
            view.element.label(),
            view.text,
            view.add_class.unwrap_or("-")
        );
    }
}

/// Alerts from `/api/alerts`, in the order the backend sent them
///
/// The time is the backend's RFC 3339 timestamp when it sent a readable one.
fn alert_entries(body: &Value) -> Vec<(Option<DateTime<Local>>, String)> {
    let items = body
        .as_array()
        .or_else(|| body.get("alerts").and_then(Value::as_array));

    let Some(items) = items else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(text) => (None, text.clone()),
            other => {
                let message = ["message", "alert", "text"]
                    .iter()
                    .find_map(|key| other.get(*key).and_then(Value::as_str))
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string());
                (alert_time(other), message)
            }
        })
        .collect()
}

fn alert_time(item: &Value) -> Option<DateTime<Local>> {
    ["timestamp", "time", "created_at", "createdAt"]
        .iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|time| time.with_timezone(&Local))
}

/// Notice to print instead of signing in again
fn already_signed_in(session: &SessionFile) -> anyhow::Result<Option<String>> {
    Ok(session
        .load()?
        .map(|marker| format!("Already signed in as {}", marker.email)))
}

fn require_session(session: &SessionFile) -> anyhow::Result<SessionMarker> {
    match session.load()? {
        Some(marker) => Ok(marker),
        None => bail!("Not signed in. Run `homesec-cli login` first."),
    }
}

fn check(message: String) -> Result<(), String> {
    if message.is_empty() {
        Ok(())
    } else {
        Err(message)
    }
}

/// Use the flag value, or prompt with the validator attached
fn prompt_or(value: Option<String>, prompt: &str, validate: fn(&str) -> String) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }

    let input = Input::<String>::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| check(validate(input.trim())))
        .interact_text()?;
    Ok(input)
}

fn password_or(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }

    let password = Password::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| check(validate_password(input)))
        .interact()?;
    Ok(password)
}

/// Print a submission failure the way the forms show it
fn report<T>(err: SubmitError) -> anyhow::Result<T> {
    let lines: Vec<String> = match err {
        SubmitError::Invalid(errors) => errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect(),
        other => vec![other.to_string()],
    };
    for line in &lines {
        eprintln!("{}", line);
    }
    Err(Reported(lines.join("\n")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(body: &Value) -> Vec<String> {
        alert_entries(body).into_iter().map(|(_, message)| message).collect()
    }

    #[test]
    fn test_alert_messages_from_array() {
        let body = json!([
            { "message": "Motion detected" },
            "Front door opened",
            { "id": 3 }
        ]);
        assert_eq!(
            messages(&body),
            vec!["Motion detected", "Front door opened", r#"{"id":3}"#]
        );
    }

    #[test]
    fn test_alert_messages_wrapped() {
        let body = json!({ "alerts": [{ "alert": "RFID tag scanned" }] });
        assert_eq!(messages(&body), vec!["RFID tag scanned"]);
        assert!(messages(&json!({ "message": "none" })).is_empty());
    }

    #[test]
    fn test_alert_uses_backend_timestamp() {
        let body = json!([
            { "message": "Motion detected", "timestamp": "2024-03-01T08:15:30Z" },
            { "message": "Door opened", "createdAt": "yesterday" },
            "Smoke detected"
        ]);
        let entries = alert_entries(&body);

        let expected = DateTime::parse_from_rfc3339("2024-03-01T08:15:30Z")
            .unwrap()
            .with_timezone(&Local);
        assert_eq!(entries[0].0, Some(expected));
        assert_eq!(entries[1].0, None);
        assert_eq!(entries[2].0, None);

        let (time, message) = entries.into_iter().next().unwrap();
        let alert = Alert::at(time.unwrap(), message);
        assert_eq!(alert.time, expected.format("%H:%M:%S").to_string());
    }

    #[test]
    fn test_already_signed_in() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionFile::new(dir.path().join("session.json"));
        assert_eq!(already_signed_in(&session).unwrap(), None);

        session
            .save(&SessionMarker::new("jane@example.com", "42"))
            .unwrap();
        assert_eq!(
            already_signed_in(&session).unwrap().as_deref(),
            Some("Already signed in as jane@example.com")
        );
    }

    #[test]
    fn test_report_returns_error_instead_of_exiting() {
        let mut errors = homesec::validation::FieldErrors::new();
        errors.check(homesec::validation::Field::Email, "Email is required.".to_string());

        let err = report::<()>(SubmitError::Invalid(errors)).unwrap_err();
        assert!(err.is::<Reported>());
        assert!(err.to_string().contains("Email is required."));
    }

    #[test]
    fn test_check() {
        assert!(check(String::new()).is_ok());
        assert_eq!(check("Email is required.".into()), Err("Email is required.".to_string()));
    }

    #[test]
    fn test_cli_parses_password_subcommand() {
        let cli = Cli::try_parse_from(["homesec-cli", "--format", "json", "password", "reset", "tok"])
            .unwrap();
        assert!(cli.format == OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Password(PasswordCommand::Reset { ref token }) if token == "tok"
        ));
    }
}
