//! Program and verify the chain

use std::path::Path;

use chainprog_core::{
    compare, expected_readback, verify, Bank, BitPattern, ChannelMap, DiagnosticSink,
    DigitalPort, FileTrace, NullTrace, PinAssignment, Sequencer, SequencerConfig,
};

/// Run one session and report the readback
///
/// Device failures do not stop the session. The command fails afterwards if
/// any step failed or the readback is not the written pattern shifted by
/// one bit.
pub fn run_session(
    port: Box<dyn DigitalPort>,
    pins: PinAssignment,
    pattern: &BitPattern,
    config: SequencerConfig,
    log_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file_trace;
    let trace: &dyn DiagnosticSink = match log_dir {
        Some(dir) => {
            file_trace = FileTrace::in_dir(dir);
            println!("Writing session trace to {}", file_trace.path().display());
            &file_trace
        }
        None => &NullTrace,
    };

    println!("Pins:     {}", pins);
    println!("Pattern:  0x{}", pattern.to_hex());

    let outcome = Sequencer::new(port, pins, trace)
        .with_config(config)
        .run(pattern);

    verify(pattern, &outcome.captured, trace);
    let report = compare(pattern, &outcome.captured);

    println!("Readback: 0x{}", outcome.captured.to_hex());
    if report.matches_chain_offset {
        println!("Readback matches the written pattern (one-bit chain offset)");
    } else {
        let expected = expected_readback(pattern);
        println!(
            "Readback differs from the expected chain output at {} positions",
            expected.mismatches(&outcome.captured).len()
        );
    }

    println!();
    println!("Channel readback:");
    let readback = ChannelMap::from_pattern(outcome.captured);
    for bank in Bank::ALL {
        let on = readback.on_channels(bank);
        if on.is_empty() {
            println!("  {}: all off", bank);
        } else {
            let list: Vec<String> = on.iter().map(|ch| ch.to_string()).collect();
            println!("  {}: on {}", bank, list.join(", "));
        }
    }
    println!("{}", readback);

    if !outcome.is_clean() {
        return Err(format!(
            "{} device steps failed (first: {})",
            outcome.failures.len(),
            outcome.failures[0]
        )
        .into());
    }
    if !report.matches_chain_offset {
        return Err("Readback verification failed".into());
    }
    Ok(())
}
