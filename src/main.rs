//! Desktop Pilot - Entry Point
//!
//! Loads configuration, wires the runtime context, and runs the control loop
//! on a single-threaded runtime until Ctrl-C.

use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

use desktop_pilot::core::config::PilotConfig;
use desktop_pilot::core::error::Result;
use desktop_pilot::effectors::DryRunEffects;
use desktop_pilot::planner::PlannerClient;
use desktop_pilot::runtime::{Orchestrator, RuntimeContext};

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "pilot.toml";

/// Voice-driven desktop automation agent
#[derive(Parser, Debug)]
#[command(name = "desktop-pilot")]
#[command(about = "Listen for a wake phrase, fetch a plan from the planner, and execute it")]
struct Args {
    /// TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Planner base URL (overrides config and PILOT_PLANNER_URL)
    #[arg(long)]
    planner_url: Option<String>,

    /// User identifier sent to the planner
    #[arg(long)]
    user_id: Option<String>,

    /// Wake phrase that starts a command cycle
    #[arg(long)]
    wake_phrase: Option<String>,

    /// Log desktop effects instead of performing them
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_directive = if args.verbose {
        "desktop_pilot=debug"
    } else {
        "desktop_pilot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive)),
        )
        .init();

    let config = load_config(&args)?;
    tracing::info!(
        planner = %config.planner.base_url,
        user_id = %config.user_id,
        dry_run = args.dry_run,
        "Desktop Pilot starting..."
    );

    // One control thread: listening, planning and execution never overlap
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let ctx = if args.dry_run {
        RuntimeContext::dry_run(&config, DryRunEffects::default())
    } else {
        RuntimeContext::from_config(&config)
    };
    let planner = PlannerClient::from_config(&config)?;
    let orchestrator = Orchestrator::new(&ctx, planner, &config);

    rt.block_on(async {
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = stop_tx.send(true);
                }
                Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
            }
        });

        orchestrator.run(stop_rx).await;
    });

    Ok(())
}

/// defaults -> TOML file -> PILOT_* environment -> command-line flags
fn load_config(args: &Args) -> Result<PilotConfig> {
    let mut config = match &args.config {
        Some(path) => PilotConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            PilotConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => PilotConfig::default(),
    };

    config.apply_env();

    if let Some(url) = &args.planner_url {
        config.planner.base_url = url.clone();
    }
    if let Some(user_id) = &args.user_id {
        config.user_id = user_id.clone();
    }
    if let Some(phrase) = &args.wake_phrase {
        config.wake_phrase = phrase.clone();
    }

    config.validate()?;
    Ok(config)
}
