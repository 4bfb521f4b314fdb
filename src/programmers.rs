//! Programmer registration and dispatch
//!
//! This module provides a registry of the port backends compiled into the
//! binary and opens them from `name:key=value,...` programmer strings.

use std::collections::HashMap;

use chainprog_core::{DigitalPort, PinAssignment};

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &["sim"],
        description: "Simulated chain for testing (fail=<step>[+<step>],status=<code>)",
    });

    #[cfg(feature = "ftdi")]
    programmers.push(ProgrammerInfo {
        name: "ftdi",
        aliases: &["ft232h", "d2xx"],
        description: "FTDI async bit-bang (type=<dev>,port=<A-D>,baudrate=<N>,latency=<ms>)",
    });

    programmers
}

/// Parsed programmer parameters
#[derive(Debug)]
pub struct ProgrammerParams {
    /// Programmer name (canonical)
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl ProgrammerParams {
    /// Parameters as borrowed pairs, the form backends parse
    fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a programmer string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
pub fn parse_programmer_params(s: &str) -> Result<ProgrammerParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(ProgrammerParams {
        name: name.to_string(),
        params,
    })
}

/// Create the port for a programmer string
///
/// The port is returned closed; the sequencer opens it. `pins` is used by
/// backends that simulate the chain wiring.
#[allow(unused_variables)]
pub fn open_port(
    programmer: &str,
    pins: &PinAssignment,
) -> Result<Box<dyn DigitalPort>, Box<dyn std::error::Error>> {
    let params = parse_programmer_params(programmer)?;

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" | "sim" => open_dummy(&params, pins),

        #[cfg(feature = "ftdi")]
        "ftdi" | "ft232h" | "d2xx" => open_ftdi(&params),

        _ => Err(format!(
            "Unknown programmer: {} (available: {})",
            params.name,
            programmer_names_short()
        )
        .into()),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(
    params: &ProgrammerParams,
    pins: &PinAssignment,
) -> Result<Box<dyn DigitalPort>, Box<dyn std::error::Error>> {
    use chainprog_dummy::{parse_options, SimulatedChain};

    log::info!("Using simulated chain");
    let config =
        parse_options(&params.options()).map_err(|e| format!("Invalid dummy parameters: {}", e))?;
    Ok(Box::new(SimulatedChain::with_config(*pins, config)))
}

#[cfg(feature = "ftdi")]
fn open_ftdi(params: &ProgrammerParams) -> Result<Box<dyn DigitalPort>, Box<dyn std::error::Error>> {
    use chainprog_ftdi::{parse_options, FtdiPort};

    let config =
        parse_options(&params.options()).map_err(|e| format!("Invalid FTDI parameters: {}", e))?;
    log::info!(
        "Using FTDI {} channel {}",
        config.device_type.name(),
        config.interface.letter()
    );
    Ok(Box::new(FtdiPort::new(config)))
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}
