//! `babylog` - CLI for the baby log engine
//!
//! This binary drives the reconciliation controller from the command line:
//! session gate, profile onboarding, event composition, analytics, family
//! metrics, and the session stopwatch.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::bail;
use chrono::Local;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use babylog::analytics::build_analytics;
use babylog::cli::{
    Cli, Command, ConfigCommand, EventCommand, LoginCommand, ProfileCommand, StopwatchCommand,
};
use babylog::model::{current_time_value, daily_quote, PhotoAttachment};
use babylog::stopwatch::{format_elapsed, Stopwatch};
use babylog::{init_logging, CacheStore, Config, Controller, HttpApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Login(cmd) => handle_login(&mut restored(&config), &cmd).await,
        Command::Logout => handle_logout(&mut restored(&config)),
        Command::Status(cmd) => handle_status(&config, &restored(&config), cmd.json),
        Command::Profile(cmd) => handle_profile(&mut restored(&config), cmd).await,
        Command::Event(cmd) => handle_event(&mut restored(&config), cmd).await,
        Command::Analytics(cmd) => handle_analytics(&mut restored(&config), cmd.json).await,
        Command::Family(cmd) => handle_family(&mut restored(&config), cmd.json).await,
        Command::Stopwatch(cmd) => handle_stopwatch(&config, &cmd).await,
        Command::Health => handle_health(&restored(&config)).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

/// Build a controller against the configured endpoints and restore cached
/// state.
fn restored(config: &Config) -> Controller<HttpApi> {
    let mut controller = Controller::new(HttpApi::new(&config.api), CacheStore::new(config));
    controller.restore();
    controller
}

fn ensure_logged_in(controller: &Controller<HttpApi>) -> anyhow::Result<()> {
    if !controller.state().logged_in {
        bail!("Log in first: babylog login <email> --password <password>");
    }
    Ok(())
}

/// Print the controller's current status line, if any.
fn print_status(controller: &Controller<HttpApi>) {
    if let Some(status) = &controller.state().status {
        println!("{status}");
    }
}

async fn handle_login(
    controller: &mut Controller<HttpApi>,
    cmd: &LoginCommand,
) -> anyhow::Result<()> {
    controller
        .login(&cmd.email, &cmd.password, cmd.remember)
        .await?;
    println!("Logged in as {}.", controller.state().email);
    if cmd.remember {
        println!("Session remembered on this device.");
    }
    println!("{}", daily_quote());
    Ok(())
}

fn handle_logout(controller: &mut Controller<HttpApi>) -> anyhow::Result<()> {
    controller.logout()?;
    println!("Logged out.");
    Ok(())
}

fn handle_status(
    config: &Config,
    controller: &Controller<HttpApi>,
    json: bool,
) -> anyhow::Result<()> {
    let state = controller.state();
    let today = Local::now().format("%A, %B %-d").to_string();
    let selected_name = state
        .selected_id
        .as_deref()
        .and_then(|id| state.profiles.iter().find(|p| p.id == id))
        .map(|p| p.name.clone());

    if json {
        let status = serde_json::json!({
            "date": today,
            "logged_in": state.logged_in,
            "email": state.email,
            "profiles_cached": state.profiles.len(),
            "selected": state.selected_id,
            "view": state.sync_note.to_string(),
            "data_dir": config.data_dir(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("babylog status");
        println!("--------------");
        println!("Date:       {today}");
        if state.logged_in {
            println!("Signed in:  yes ({})", state.email);
        } else {
            println!("Signed in:  no");
        }
        println!("Profiles:   {} cached", state.profiles.len());
        match &selected_name {
            Some(name) => println!("Selected:   {name}"),
            None => println!("Selected:   none"),
        }
        println!("View:       {}", state.sync_note);
        println!("Data dir:   {}", config.data_dir().display());
        println!();
        println!("{}", daily_quote());
    }
    Ok(())
}

async fn handle_profile(
    controller: &mut Controller<HttpApi>,
    cmd: ProfileCommand,
) -> anyhow::Result<()> {
    match cmd {
        ProfileCommand::Create {
            name,
            birth_date,
            theme,
        } => {
            ensure_logged_in(controller)?;
            controller.set_theme(theme.into());
            match controller.create_profile(&name, &birth_date).await {
                Ok(()) => print_status(controller),
                Err(err) if err.is_remote_failure() => {
                    debug!("profile creation failed: {err}");
                    println!("Could not create profile.");
                }
                Err(err) => return Err(err.into()),
            }
        }
        ProfileCommand::List { json } => {
            let state = controller.state();
            if json {
                println!("{}", serde_json::to_string_pretty(&state.profiles)?);
            } else if state.profiles.is_empty() {
                println!("No cached profiles yet. Create one with: babylog profile create");
            } else {
                for profile in &state.profiles {
                    let marker = if state.selected_id.as_deref() == Some(profile.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!(
                        "{marker} {}  ({}, theme {})",
                        profile.name, profile.id, profile.theme
                    );
                }
            }
        }
        ProfileCommand::Select { id } => {
            ensure_logged_in(controller)?;
            match controller.select_profile(&id).await {
                Ok(()) => {
                    let state = controller.state();
                    println!("{}", state.sync_note);
                    println!("{} event(s) loaded.", state.entries.len());
                }
                Err(err) if err.is_remote_failure() => {
                    debug!("sync failed: {err}");
                    print_status(controller);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(())
}

async fn handle_event(
    controller: &mut Controller<HttpApi>,
    cmd: EventCommand,
) -> anyhow::Result<()> {
    ensure_logged_in(controller)?;
    match cmd {
        EventCommand::Add {
            preset,
            note,
            time,
            mood,
            photo,
        } => {
            if let Some(label) = &preset {
                controller.select_preset(label)?;
            }
            let draft = controller.draft_mut();
            if let Some(text) = note {
                draft.text = text;
            }
            draft.time = Some(time.unwrap_or_else(current_time_value));
            draft.mood = mood.into();
            if let Some(path) = photo {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                controller.attach_photo(PhotoAttachment {
                    url: format!("file://{}", path.display()),
                    name,
                });
            }
            match controller.add_event().await {
                Ok(()) => {
                    print_status(controller);
                    println!("{} event(s) on the timeline.", controller.state().entries.len());
                }
                Err(err) if err.is_remote_failure() => {
                    debug!("add event failed: {err}");
                    println!("Could not add event.");
                }
                Err(err) => return Err(err.into()),
            }
        }
        EventCommand::List { json } => {
            match controller.refresh_timeline().await {
                Ok(()) => {}
                Err(err) if err.is_remote_failure() => {
                    debug!("timeline refresh failed: {err}");
                    print_status(controller);
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            }
            let state = controller.state();
            if json {
                println!("{}", serde_json::to_string_pretty(&state.entries)?);
            } else if state.entries.is_empty() {
                println!("No events yet for this baby.");
            } else {
                for entry in &state.entries {
                    println!("{}  {}", entry.time, entry.notes);
                    println!("      {}", entry.mood.description());
                    if !entry.photo_name.is_empty() {
                        println!("      photo: {}", entry.photo_name);
                    }
                }
                println!();
                println!("{}", state.sync_note);
            }
        }
    }
    Ok(())
}

async fn handle_analytics(
    controller: &mut Controller<HttpApi>,
    json: bool,
) -> anyhow::Result<()> {
    ensure_logged_in(controller)?;
    match controller.refresh_timeline().await {
        Ok(()) => {}
        Err(err) if err.is_remote_failure() => {
            debug!("timeline refresh failed: {err}");
            print_status(controller);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }

    let snapshot = build_analytics(&controller.state().entries);
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Analytics Snapshot ({} events)", snapshot.total);
    println!();
    for segment in &snapshot.segments {
        let width = segment.count * 24 / snapshot.max_value;
        println!(
            "  {:<8} {:<24} {}",
            segment.bucket.label(),
            "#".repeat(width),
            segment.count
        );
    }
    println!();
    println!("Event mix:");
    for span in &snapshot.spans {
        match span.bucket {
            Some(bucket) => println!(
                "  {:<8} {:>6.1}° - {:>6.1}°",
                bucket.label(),
                span.start_deg,
                span.end_deg
            ),
            None => println!("  (no events yet)"),
        }
    }
    Ok(())
}

async fn handle_family(controller: &mut Controller<HttpApi>, json: bool) -> anyhow::Result<()> {
    ensure_logged_in(controller)?;
    controller.open_family_admin().await;

    let metrics = &controller.state().family_metrics;
    if json {
        println!("{}", serde_json::to_string_pretty(metrics)?);
        return Ok(());
    }

    println!("Overall Family Metrics");
    println!("----------------------");
    println!("Total events:   {}", metrics.total_events);
    println!(
        "Top event type: {} ({} logged)",
        metrics.top_event_label(),
        metrics.top_event_count
    );
    println!();
    if metrics.per_child.is_empty() {
        println!("No child metrics yet.");
    } else {
        let max_count = metrics
            .per_child
            .iter()
            .map(|child| child.count)
            .max()
            .unwrap_or(0)
            .max(1);
        println!("Events by child:");
        for child in &metrics.per_child {
            let width = child.count * 24 / max_count;
            println!("  {:<12} {:<24} {}", child.name, "#".repeat(width), child.count);
        }
    }
    println!();
    if metrics.inactive_children.is_empty() {
        println!("All children have recent logged events.");
    } else {
        println!("Inactive: {}", metrics.inactive_children.join(", "));
    }
    Ok(())
}

async fn handle_stopwatch(config: &Config, cmd: &StopwatchCommand) -> anyhow::Result<()> {
    let mut watch = Stopwatch::new();
    watch.start();
    println!("Session stopwatch running. Press Enter to stop.");

    let mut ticker = tokio::time::interval(config.refresh_interval());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                print!("\r{}", format_elapsed(watch.elapsed_ms()));
                std::io::stdout().flush()?;
            }
            line = lines.next_line() => {
                let _ = line;
                break;
            }
        }
    }
    watch.pause();

    let elapsed = watch.elapsed_ms();
    println!("\r{}", format_elapsed(elapsed));
    if let Some(note) = &cmd.note {
        if elapsed == 0 {
            println!("Start the stopwatch first to capture a duration.");
        } else {
            println!("{}", watch.merge_into_note(note));
        }
    }
    Ok(())
}

async fn handle_health(controller: &Controller<HttpApi>) -> anyhow::Result<()> {
    println!("Checking...");
    match controller.health_check().await {
        Ok(_) => println!("API healthy"),
        Err(err) => {
            debug!("health check failed: {err}");
            println!("Health check failed");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[api]");
                println!("  Base URL:      {}", config.api.base_url);
                println!("  Health URL:    {}", config.api.health_url);
                println!();
                println!("[cache]");
                println!("  Data dir:      {}", config.data_dir().display());
                println!("  Profiles:      {}", config.profiles_path().display());
                println!("  Session:       {}", config.session_path().display());
                println!();
                println!("[timer]");
                println!("  Refresh (ms):  {}", config.timer.refresh_interval_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
