//! Readback comparison

use crate::pattern::{BitPattern, CHAIN_BITS};
use crate::trace::DiagnosticSink;

/// Pattern the chain is expected to return after programming `written`
///
/// The HV3418 at the end of the chain shifts on the first rising clock edge
/// of a pass, before the HV5523 has presented the new bit, so the readback
/// lags by one position: `C[0] = P[95]` and `C[i] = P[i - 1]`.
pub fn expected_readback(written: &BitPattern) -> BitPattern {
    written.rotated_right(1)
}

/// Detailed comparison of a written and a captured pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadbackReport {
    /// All 96 positions are equal
    pub matches: bool,
    /// Positions that differ
    pub mismatches: Vec<usize>,
    /// The captured pattern equals [`expected_readback`] of the written one
    pub matches_chain_offset: bool,
}

/// Compare `written` against `read` without tracing
pub fn compare(written: &BitPattern, read: &BitPattern) -> ReadbackReport {
    let mismatches = written.mismatches(read);
    ReadbackReport {
        matches: mismatches.is_empty(),
        mismatches,
        matches_chain_offset: expected_readback(written) == *read,
    }
}

/// Element-wise equality over all 96 positions
///
/// Traces both patterns and the verdict.
pub fn verify(written: &BitPattern, read: &BitPattern, trace: &dyn DiagnosticSink) -> bool {
    let report = compare(written, read);

    trace.append_line(&format!("Write info: {}", written));
    trace.append_line(&format!("Read info: {}", read));

    if report.matches {
        log::info!("Readback matches the written pattern");
        trace.append_line("That's a match!");
    } else {
        log::info!(
            "Readback differs from the written pattern at {} positions",
            report.mismatches.len()
        );
        trace.append_line(&format!(
            "That's not a match ({} of {} bits differ)",
            report.mismatches.len(),
            CHAIN_BITS
        ));
    }

    report.matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::MemoryTrace;

    fn pattern() -> BitPattern {
        BitPattern::from_fn(|i| i >= 64)
    }

    #[test]
    fn test_verify_identical() {
        let trace = MemoryTrace::new();
        assert!(verify(&pattern(), &pattern(), &trace));
        assert_eq!(trace.lines().last().map(String::as_str), Some("That's a match!"));
    }

    #[test]
    fn test_single_flip_fails() {
        let trace = MemoryTrace::new();
        let mut read = pattern();
        read.set(47, true);

        assert!(!verify(&pattern(), &read, &trace));
        assert_eq!(compare(&pattern(), &read).mismatches, vec![47]);
        assert_eq!(trace.count_containing("not a match (1 of 96"), 1);
    }

    #[test]
    fn test_trace_contents() {
        let trace = MemoryTrace::new();
        verify(&pattern(), &pattern(), &trace);

        let lines = trace.lines();
        assert_eq!(lines[0], format!("Write info: {}", pattern()));
        assert_eq!(lines[1], format!("Read info: {}", pattern()));
    }

    #[test]
    fn test_chain_offset() {
        let written = pattern();
        let read = expected_readback(&written);
        assert!(!read[64]);
        assert!(read[65]);
        assert!(read[0]);

        let report = compare(&written, &read);
        assert!(!report.matches);
        assert!(report.matches_chain_offset);
        assert_eq!(report.mismatches, vec![0, 64]);
    }
}
