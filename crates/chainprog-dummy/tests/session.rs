//! Full sessions against the simulated chain, traced to disk.

use std::fs;
use std::path::PathBuf;

use chainprog_core::{
    expected_readback, run_spi_sequence, Bank, ChannelMap, PinAssignment, PortStatus,
    TRACE_FILE_NAME,
};
use chainprog_dummy::{DummyConfig, FaultPlan, SimulatedChain};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "chainprog-session-{}-{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn session_trace_file() {
    let dir = scratch_dir("clean");
    let mut map = ChannelMap::all_off();
    map.set(Bank::Low, 1, true).unwrap();
    map.set(Bank::High, 10, true).unwrap();
    let pattern = map.into_pattern();

    let mut chain = SimulatedChain::new(PinAssignment::default());
    let captured = run_spi_sequence(&mut chain, 2, 3, 1, 0, &pattern, Some(&dir)).unwrap();
    assert_eq!(captured, expected_readback(&pattern));

    let text = fs::read_to_string(dir.join(TRACE_FILE_NAME)).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"CS: 2"));
    assert!(lines.contains(&"DIN: 0"));
    assert!(lines.contains(&"IO mask is: 0xFE"));
    assert!(lines.contains(&format!("Data: {}", pattern).as_str()));
    assert!(lines.contains(&format!("Read info: {}", captured).as_str()));
    // Raw comparison sees the chain offset as a mismatch
    assert!(lines
        .last()
        .is_some_and(|line| line.starts_with("That's not a match")));
    assert!(!text.contains("Device failed"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn session_trace_records_read_failures() {
    let dir = scratch_dir("faulty");
    let config = DummyConfig {
        faults: FaultPlan {
            read: true,
            ..FaultPlan::none()
        },
        status: PortStatus::OtherError,
    };
    let mut chain = SimulatedChain::with_config(PinAssignment::default(), config);
    let pattern = ChannelMap::all_off().into_pattern();

    let captured = run_spi_sequence(&mut chain, 2, 3, 1, 0, &pattern, Some(&dir)).unwrap();
    assert_eq!(captured.count_ones(), 0);

    let text = fs::read_to_string(dir.join(TRACE_FILE_NAME)).unwrap();
    assert_eq!(
        text.lines()
            .filter(|line| line.starts_with("Device failed step read")
                && line.ends_with("other error (status 18)"))
            .count(),
        192
    );
    // The chain itself was still programmed
    assert_eq!(chain.latched(), &pattern);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn second_session_replaces_trace() {
    let dir = scratch_dir("repeat");
    let pattern = ChannelMap::all_off().into_pattern();

    let mut chain = SimulatedChain::new(PinAssignment::default());
    run_spi_sequence(&mut chain, 2, 3, 1, 0, &pattern, Some(&dir)).unwrap();
    let first = fs::read_to_string(dir.join(TRACE_FILE_NAME)).unwrap();

    run_spi_sequence(&mut chain, 2, 3, 1, 0, &pattern, Some(&dir)).unwrap();
    let second = fs::read_to_string(dir.join(TRACE_FILE_NAME)).unwrap();

    assert_eq!(first.lines().count(), second.lines().count());

    fs::remove_dir_all(&dir).unwrap();
}
