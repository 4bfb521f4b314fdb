//! chainprog - HV5523/HV3418 shift register chain programmer
//!
//! Programs the 96-bit configuration of a two-chip high-voltage driver
//! chain through a bit-banged adapter, reads the chain back and verifies
//! it.
//!
//! # Architecture
//!
//! - `chainprog-core` holds the protocol: register encoding, the two-pass
//!   sequencer, readback verification, the channel map and settings
//! - port backends (`chainprog-dummy`, `chainprog-ftdi`) implement the
//!   `DigitalPort` trait and are selected with `--programmer`

mod cli;
mod commands;
mod programmers;

use std::path::Path;
use std::time::Duration;

use chainprog_core::{FailurePolicy, Settings};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            programmer,
            log_dir,
            settle_us,
            abort_on_open_failure,
            pins,
            pattern,
        } => {
            let pins = commands::resolve_pins(&settings, &pins)?;
            let pattern = commands::resolve_pattern(&settings, &pattern)?;

            let mut config = settings.sequencer_config();
            if let Some(us) = settle_us {
                config.settle = Duration::from_micros(us);
            }
            if abort_on_open_failure {
                config.failure_policy = FailurePolicy::AbortOnOpenFailure;
            }

            let programmer = programmer.as_deref().unwrap_or(settings.programmer());
            let log_dir = log_dir.or_else(|| settings.session.log_dir.clone());

            let port = programmers::open_port(programmer, &pins)?;
            commands::run_session(port, pins, &pattern, config, log_dir.as_deref())
        }
        Commands::Show { pins, pattern } => {
            let pins = commands::resolve_pins(&settings, &pins)?;
            let pattern = commands::resolve_pattern(&settings, &pattern)?;
            commands::show_pattern(&pins, &pattern);
            Ok(())
        }
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
        Commands::ListDevices => commands::list_devices(),
    }
}

/// Load the settings file, or the built-in defaults when none is given
fn load_settings(path: Option<&Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let settings = Settings::from_toml_file(path)?;
            log::info!("Loaded settings from {}", path.display());
            Ok(settings)
        }
        None => Ok(Settings::default()),
    }
}
