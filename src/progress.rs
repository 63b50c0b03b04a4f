//! Count-based progress checkpoints.
//!
//! Each pipeline phase owns its own [`ProgressReporter`]. A checkpoint fires on
//! the increment that makes `count % interval == 0`, so N increments always
//! produce exactly `floor(N / interval)` checkpoints regardless of how the
//! increments are grouped.

use std::fmt;
use std::num::NonZeroU64;

use log::info;

/// Default checkpoint interval: one message per million records.
pub const DEFAULT_PROGRESS_INTERVAL: NonZeroU64 = match NonZeroU64::new(1_000_000) {
    Some(n) => n,
    None => unreachable!(),
};

/// Stage of a run, used to label progress lines and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Reading entities from the source container
    Decode,
    /// Filtering and accepting nodes
    Accumulate,
    /// Serializing nodes to the output table
    Write,
    /// Loading a node table back into memory
    Load,
}

impl Phase {
    fn verb(self) -> &'static str {
        match self {
            Phase::Decode => "Decoded",
            Phase::Accumulate => "Processed",
            Phase::Write => "Wrote",
            Phase::Load => "Loaded",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Decode => "decode",
            Phase::Accumulate => "accumulate",
            Phase::Write => "write",
            Phase::Load => "load",
        };
        f.write_str(name)
    }
}

/// Monotonic counter that emits a log line every `interval` increments.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    phase: Phase,
    interval: NonZeroU64,
    count: u64,
    checkpoints: u64,
}

impl ProgressReporter {
    /// Create a reporter for `phase` with the given checkpoint interval.
    pub fn new(phase: Phase, interval: NonZeroU64) -> Self {
        Self {
            phase,
            interval,
            count: 0,
            checkpoints: 0,
        }
    }

    /// Create a reporter using [`DEFAULT_PROGRESS_INTERVAL`].
    pub fn with_default_interval(phase: Phase) -> Self {
        Self::new(phase, DEFAULT_PROGRESS_INTERVAL)
    }

    /// Record one increment.
    ///
    /// Returns the checkpoint number (1-based) when this increment lands on a
    /// multiple of the interval.
    pub fn record(&mut self) -> Option<u64> {
        self.count += 1;
        if self.count % self.interval.get() != 0 {
            return None;
        }

        self.checkpoints += 1;
        info!("{} {} nodes...", self.phase.verb(), format_count(self.count));
        Some(self.checkpoints)
    }

    /// Record `n` increments, one at a time.
    ///
    /// Returns the number of checkpoints crossed.
    pub fn record_many(&mut self, n: u64) -> u64 {
        (0..n).filter_map(|_| self.record()).count() as u64
    }

    /// Number of increments recorded so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of checkpoints emitted so far.
    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }

    /// Phase this reporter is attached to.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Checkpoint interval.
    pub fn interval(&self) -> NonZeroU64 {
        self.interval
    }
}

/// Render whole millions as `3M`, anything else as a plain integer.
fn format_count(count: u64) -> String {
    if count >= 1_000_000 && count % 1_000_000 == 0 {
        format!("{}M", count / 1_000_000)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    #[test]
    fn test_no_checkpoint_before_interval() {
        let mut reporter = ProgressReporter::new(Phase::Accumulate, interval(3));
        assert_eq!(reporter.record(), None);
        assert_eq!(reporter.record(), None);
        assert_eq!(reporter.checkpoints(), 0);
        assert_eq!(reporter.record(), Some(1));
        assert_eq!(reporter.count(), 3);
    }

    #[test]
    fn test_fresh_reporter_has_no_checkpoints() {
        let reporter = ProgressReporter::with_default_interval(Phase::Write);
        assert_eq!(reporter.count(), 0);
        assert_eq!(reporter.checkpoints(), 0);
        assert_eq!(reporter.interval(), DEFAULT_PROGRESS_INTERVAL);
    }

    #[test]
    fn test_checkpoint_count_is_floor_of_ratio() {
        for n in [0u64, 1, 9, 10, 11, 99, 100, 101, 250] {
            let mut reporter = ProgressReporter::new(Phase::Accumulate, interval(10));
            reporter.record_many(n);
            assert_eq!(reporter.checkpoints(), n / 10, "n = {}", n);
        }
    }

    #[test]
    fn test_bursts_do_not_skip_or_double_emit() {
        let mut reporter = ProgressReporter::new(Phase::Write, interval(4));
        assert_eq!(reporter.record_many(3), 0);
        // Crosses 4 and 8 in one burst.
        assert_eq!(reporter.record_many(6), 2);
        assert_eq!(reporter.count(), 9);
        assert_eq!(reporter.record_many(0), 0);
        assert_eq!(reporter.record_many(3), 1);
        assert_eq!(reporter.checkpoints(), 3);
    }

    #[test]
    fn test_reporters_are_independent() {
        let mut accumulate = ProgressReporter::new(Phase::Accumulate, interval(2));
        let mut write = ProgressReporter::new(Phase::Write, interval(2));
        accumulate.record_many(4);
        write.record();
        assert_eq!(accumulate.checkpoints(), 2);
        assert_eq!(write.checkpoints(), 0);
        assert_eq!(write.count(), 1);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(1_000_000), "1M");
        assert_eq!(format_count(12_000_000), "12M");
        assert_eq!(format_count(1_500_000), "1500000");
        assert_eq!(format_count(500), "500");
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Decode.to_string(), "decode");
        assert_eq!(Phase::Accumulate.to_string(), "accumulate");
        assert_eq!(Phase::Write.to_string(), "write");
    }
}
