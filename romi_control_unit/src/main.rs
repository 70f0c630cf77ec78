//! # Romi Control Unit
//!
//! Console-driven position controller for a single brushless actuator.
//!
//! Startup sequence:
//! 1. Load and validate the TOML configuration (built-in defaults when
//!    the file is absent).
//! 2. Create the configured drive adapter from the drive registry.
//! 3. Perform RT setup (no-ops without the `rt` feature).
//! 4. Run the actuator `setup()` step, binding sensor and power stage.
//! 5. Enter the paced cycle loop; bring-up continues over the console
//!    (`C`, `K`, `E 1`).
//!
//! Ctrl-C clears the running flag; the loop disables the power stage
//! and exits after the current cycle.

use clap::Parser;
use romi_common::config::ControllerConfig;
use romi_common::consts::DEFAULT_CONFIG_PATH;
use romi_control_unit::command::CommandRegistry;
use romi_control_unit::console::ConsoleTransport;
use romi_control_unit::controller::ActuatorController;
use romi_control_unit::cycle::{CycleRunner, rt_setup};
use romi_hal::DriveRegistry;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Romi Control Unit — single-actuator position control
#[derive(Parser, Debug)]
#[command(name = "romi_control_unit")]
#[command(version)]
#[command(about = "Console-driven position controller for one brushless actuator")]
struct Args {
    /// Path to the controller configuration TOML.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Force the simulation drive regardless of configuration.
    #[arg(short, long)]
    simulate: bool,

    /// Drive adapter override (takes precedence over the config file).
    #[arg(long, value_name = "NAME")]
    drive: Option<String>,

    /// CPU core to pin the cycle thread to.
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority.
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("Romi Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Romi Control Unit shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ControllerConfig::load_or_default(&args.config)?;
    if let Some(ref drive) = args.drive {
        config.drive = drive.clone();
    }
    if args.simulate {
        config.drive = "simulation".to_string();
    }
    info!(
        "Config OK: drive={}, cycle_time={}µs",
        config.drive, config.cycle_time_us
    );

    let drive = DriveRegistry::with_builtin().create_drive(&config.drive)?;

    // RT setup (mlockall, affinity, scheduler).
    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let cycle_time = Duration::from_micros(u64::from(config.cycle_time_us));
    let mut controller = ActuatorController::new(config, drive);

    // Sensor and power stage are bound once at boot; the rest of the
    // bring-up happens over the console.
    controller.setup()?;

    // Signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let transport = ConsoleTransport::start(CommandRegistry::with_builtin())?;
    let mut runner = CycleRunner::new(controller, transport, cycle_time, running);
    info!("Actuator ready, entering cycle loop");

    if let Err(e) = runner.run() {
        error!("Cycle loop error: {e}");
        return Err(Box::new(e) as Box<dyn std::error::Error>);
    }

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
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
