//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    let mut names = Vec::new();
    if cfg!(feature = "dummy") {
        names.push("dummy");
    }
    if cfg!(feature = "ftdi") {
        names.push("ftdi");
    }
    format!(
        "Programmer to use, as name[:key=value,...] [available: {}]",
        names.join(", ")
    )
}

#[derive(Parser)]
#[command(name = "chainprog")]
#[command(
    author,
    version,
    about = "HV5523/HV3418 shift register chain programmer",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (TOML format)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Pin assignment overrides shared across commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PinArgs {
    /// Chip select / latch enable pin (0-7)
    #[arg(long)]
    pub cs: Option<u8>,

    /// Clock pin (0-7)
    #[arg(long, alias = "sck")]
    pub ck: Option<u8>,

    /// Data out pin, adapter to chain (0-7)
    #[arg(long, alias = "mosi")]
    pub dout: Option<u8>,

    /// Data in pin, chain to adapter (0-7)
    #[arg(long, alias = "miso")]
    pub din: Option<u8>,
}

/// Pattern options shared across commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PatternArgs {
    /// Full 96-bit pattern: 96 bits of 0/1, or 0x followed by 24 hex digits
    #[arg(long)]
    pub pattern: Option<String>,

    /// Switch on every LV channel
    #[arg(long)]
    pub all_lv: bool,

    /// Switch on every HV channel
    #[arg(long)]
    pub all_hv: bool,

    /// LV channels to switch on (comma-separated, 1-25)
    #[arg(long, value_delimiter = ',')]
    pub lv_on: Vec<u8>,

    /// HV channels to switch on (comma-separated, 1-25)
    #[arg(long, value_delimiter = ',')]
    pub hv_on: Vec<u8>,

    /// LV channels to switch off (comma-separated, 1-25)
    #[arg(long, value_delimiter = ',')]
    pub lv_off: Vec<u8>,

    /// HV channels to switch off (comma-separated, 1-25)
    #[arg(long, value_delimiter = ',')]
    pub hv_off: Vec<u8>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Program a pattern into the chain, read it back and verify
    Run {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: Option<String>,

        /// Directory for the session trace file
        #[arg(short, long)]
        log_dir: Option<PathBuf>,

        /// Delay after every register write, in microseconds
        #[arg(long)]
        settle_us: Option<u64>,

        /// Stop the session if the device cannot be opened
        #[arg(long)]
        abort_on_open_failure: bool,

        #[command(flatten)]
        pins: PinArgs,

        #[command(flatten)]
        pattern: PatternArgs,
    },

    /// Show the pattern, register bytes and channel map without hardware
    Show {
        #[command(flatten)]
        pins: PinArgs,

        #[command(flatten)]
        pattern: PatternArgs,
    },

    /// List supported programmers
    ListProgrammers,

    /// List connected FTDI devices
    ListDevices,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "chainprog",
            "-vv",
            "run",
            "-p",
            "dummy:fail=write",
            "--sck",
            "5",
            "--lv-on",
            "1,2,3",
            "--all-hv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                programmer,
                pins,
                pattern,
                abort_on_open_failure,
                ..
            } => {
                assert_eq!(programmer.as_deref(), Some("dummy:fail=write"));
                assert_eq!(pins.ck, Some(5));
                assert_eq!(pins.cs, None);
                assert_eq!(pattern.lv_on, vec![1, 2, 3]);
                assert!(pattern.all_hv);
                assert!(!abort_on_open_failure);
            }
            _ => panic!("expected run command"),
        }
    }
}
