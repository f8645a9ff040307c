//! # Link Publisher Binary
//!
//! Runs the Link publishing system against a simulated host at the host's
//! tick interval, or inspects the live record.
//!
//! # Usage
//!
//! ```bash
//! # Publish with defaults (presence-watched /dev/shm/MumbleLink.<uid>)
//! link_publisher
//!
//! # Use a config file, verbose logging
//! link_publisher --config config/link_publisher.toml -v
//!
//! # Run 500 ticks then exit
//! link_publisher --ticks 500
//!
//! # Print the record the consumer currently sees
//! link_publisher --inspect
//! ```

use clap::Parser;
use link::consts::DEFAULT_CONFIG_PATH;
use link_publisher::inspect::{frame_to_json, read_frame};
use link_publisher::{LinkSystem, PublisherConfig, PublisherResult, SimulatedHost, TickRuntime};
use link_shared_memory::LinkChannelManager;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Link Publisher - positional audio bridge
#[derive(Parser, Debug)]
#[command(name = "link_publisher")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Publishes player pose into the Link shared memory record")]
#[command(long_about = None)]
struct Args {
    /// Path to the configuration file. Defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Stop after this many ticks
    #[arg(long, value_name = "N")]
    ticks: Option<u64>,

    /// Print the current record as JSON and exit
    #[arg(long)]
    inspect: bool,
}

fn main() {
    let args = Args::parse();

    // The log level comes from the config, so no subscriber exists yet.
    let config =
        match PublisherConfig::resolve(args.config.as_deref(), Path::new(DEFAULT_CONFIG_PATH)) {
            Ok(config) => config,
            Err(e) => {
                let path = args.config.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
                eprintln!("Link publisher failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        };

    setup_tracing(&args, &config);

    if let Err(e) = run(&args, &config) {
        error!("Link publisher failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, config: &PublisherConfig) -> PublisherResult<()> {
    if args.inspect {
        let manager = LinkChannelManager::from_config(&config.link);
        let frame = read_frame(manager.path())?;
        println!("{}", frame_to_json(&frame)?);
        return Ok(());
    }

    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let mut host = SimulatedHost::new(config.simulation.clone());
    let mut system = LinkSystem::from_config(&config.link);

    let mut runtime = TickRuntime::new(config.link.tick_interval());
    if let Some(ticks) = args.ticks {
        runtime = runtime.with_max_ticks(ticks);
    }

    let running = runtime.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    runtime.run(&mut host, &mut system)?;

    let stats = system.stats();
    info!(
        "Link publisher shutdown complete ({} published, {} skipped)",
        stats.published, stats.skipped
    );
    Ok(())
}

/// Setup tracing subscriber from CLI flags and the configured level.
fn setup_tracing(args: &Args, config: &PublisherConfig) {
    let level = if args.verbose {
        Level::DEBUG.to_string()
    } else {
        config.shared.log_level.as_directive().to_string()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
