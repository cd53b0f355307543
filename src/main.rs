//! Ratewatch - USD/KRW exchange rate monitor
//!
//! Polls a 30-day rate series, prints the dashboard to the terminal and
//! scores the current exchange advantage after every successful refresh.
//!
//! # Usage
//! ```sh
//! MODE=mock cargo run -- watch
//! cargo run -- analyze
//! cargo run -- prefs set --email me@example.com --at-9am true
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ratewatch::application::refresh::{RefreshState, RefreshStatus};
use ratewatch::application::system::Application;
use ratewatch::config::{Config, Mode};
use ratewatch::interfaces::console::ConsoleReporter;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Exchange rate monitor", long_about = None)]
struct Cli {
    /// Use the synthetic feed and offline analysis regardless of MODE
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the dashboard up to date until Ctrl+C
    Watch {
        /// Exit after the first completed refresh
        #[arg(long)]
        once: bool,

        /// Print only the headline rate
        #[arg(long)]
        no_chart: bool,
    },
    /// Fetch once and print the AI narrative for the current series
    Analyze,
    /// Show or update notification preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    Show,
    Set {
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        at_9am: Option<bool>,

        #[arg(long)]
        at_6pm: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(log_layer)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if cli.mock {
        config.mode = Mode::Mock;
    }
    info!(
        "Ratewatch {} (Mode={:?}, Pair={})",
        env!("CARGO_PKG_VERSION"),
        config.mode,
        config.feed.pair
    );

    let app = Application::build(config)?;

    match cli.command {
        Commands::Watch { once, no_chart } => watch(&app, once, no_chart).await,
        Commands::Analyze => analyze(&app).await,
        Commands::Prefs { action } => prefs(&app, action),
    }
}

fn reporter(app: &Application, no_chart: bool) -> ConsoleReporter {
    let reporter = ConsoleReporter::new(app.config.feed.pair.to_string());
    if no_chart {
        reporter.without_chart()
    } else {
        reporter
    }
}

async fn watch(app: &Application, once: bool, no_chart: bool) -> Result<()> {
    info!("Watching. Press Ctrl+C to stop.");

    // Polled for the whole session, including while a score is in flight
    let ctrl_c = tokio::signal::ctrl_c();
    let shutdown = async {
        match ctrl_c.await {
            Ok(()) => info!("Shutdown signal received."),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    reporter(app, no_chart)
        .watch(
            &app.scheduler,
            app.analysis.clone(),
            once,
            shutdown,
            |text| print!("{}", text),
        )
        .await;
    Ok(())
}

async fn analyze(app: &Application) -> Result<()> {
    let reporter = reporter(app, true);
    let (tx, mut rx) = mpsc::unbounded_channel::<Arc<RefreshState>>();
    let handle = app.scheduler.start(move |state| {
        let _ = tx.send(state);
    });

    let state = loop {
        let state = rx
            .recv()
            .await
            .context("refresh schedule ended before any result")?;
        if state.status != RefreshStatus::Loading {
            break state;
        }
    };
    handle.stop();

    print!("{}", reporter.render_state(&state));
    if !state.has_data() {
        return Ok(());
    }

    if let Some(advantage) = app.analysis.on_series(&state).await {
        print!("{}", reporter.render_advantage(&advantage));
    }
    let narrative = app.analysis.request_narrative(&state).await;
    print!("{}", reporter.render_narrative(&narrative));
    Ok(())
}

fn prefs(app: &Application, action: PrefsAction) -> Result<()> {
    let reporter = reporter(app, true);
    let mut current = app.preferences.load_or_default();

    if let PrefsAction::Set {
        email,
        at_9am,
        at_6pm,
    } = action
    {
        if let Some(email) = email {
            current.email = email.trim().to_string();
        }
        if let Some(flag) = at_9am {
            current.notify_at_9am = flag;
        }
        if let Some(flag) = at_6pm {
            current.notify_at_6pm = flag;
        }
        app.preferences.save(&current)?;
        println!("Settings saved.");
    }

    print!("{}", reporter.render_preferences(&current));
    Ok(())
}
