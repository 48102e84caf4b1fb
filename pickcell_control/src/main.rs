//! # Pickcell Control Binary
//!
//! Motion-choreography and state/event-dispatch core for the pickcell
//! pick-and-place machine.
//!
//! # Usage
//!
//! ```bash
//! # Run against the simulation driver
//! pickcell_control --config config/cell.toml --simulate
//!
//! # Verbose logging
//! pickcell_control -s -v
//! ```

#![deny(warnings)]

use clap::Parser;
use pickcell_common::config::CellConfig;
use pickcell_control::arm::ArmController;
use pickcell_control::lift::LiftController;
use pickcell_control::manager::CellManager;
use pickcell_hal::sim::{SimAxis, SimOutput};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Pause between periodic `tick()` invocations of the active state.
const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Pickcell Control - motion choreography and state/event dispatch
#[derive(Parser, Debug)]
#[command(name = "pickcell_control")]
#[command(version)]
#[command(about = "Pick-and-place cell controller with state/event dispatch")]
#[command(long_about = None)]
struct Args {
    /// Path to the cell configuration file (cell.toml)
    #[arg(short, long, default_value = "/etc/pickcell/cell.toml")]
    config: PathBuf,

    /// Force the simulation driver
    #[arg(short = 's', long)]
    simulate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("cell startup failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    setup_tracing(&args);

    info!("pickcell control v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = if args.config.exists() {
        info!("loading configuration from {:?}", args.config);
        CellConfig::load(&args.config)?
    } else {
        warn!(
            "configuration file {:?} not found, using defaults",
            args.config
        );
        CellConfig::default()
    };

    if !args.simulate {
        // The simulation backend is the only driver built so far.
        warn!("no hardware driver available, falling back to simulation");
    }
    info!("simulation driver selected");

    let lift = LiftController::new(
        SimAxis::new("lift", config.lift.speed_mm_s),
        SimOutput::new("gate"),
        SimOutput::new("feeder"),
        config.lift.clone(),
        config.motion.clone(),
    );
    let arm = ArmController::new(
        SimAxis::new("arm", config.arm.speed_rev_s),
        SimOutput::new("gripper"),
        SimOutput::new("carriage"),
        config.arm.clone(),
        config.motion.clone(),
    );

    let mut manager = CellManager::new(Box::new(lift), Box::new(arm));

    let running = Arc::new(AtomicBool::new(true));
    let running_handler = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("received shutdown signal");
        running_handler.store(false, Ordering::SeqCst);
    })?;

    // The cell must start from a known calibrated position before it can
    // accept events.
    manager.startup()?;
    info!(
        "cell ready: protocol id {:#010x}, active state {}",
        manager.protocol_id(),
        manager.active()
    );

    while running.load(Ordering::SeqCst) {
        if let Err(e) = manager.tick() {
            error!("tick failed: {e}");
        }
        std::thread::sleep(TICK_INTERVAL);
    }

    info!("pickcell control shutdown complete");
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
