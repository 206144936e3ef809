//! Per-master transaction counters.

use crate::protocol::ErrorFlags;

/// Counters for finished transactions.
///
/// A failed transaction increments every counter whose flag it carries, so
/// the per-kind counters may add up to more than `failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterStats {
    /// Transactions started.
    pub started: u64,
    /// Transactions finished without fault.
    pub completed: u64,
    /// Transactions finished with at least one fault.
    pub failed: u64,
    /// Illegal state faults.
    pub illegal_state: u64,
    /// Echo mismatches.
    pub echo_mismatch: u64,
    /// Timeouts.
    pub timeout: u64,
    /// Checksum mismatches.
    pub checksum_mismatch: u64,
    /// Serial port failures.
    pub transport: u64,
}

impl MasterStats {
    pub(crate) fn record_start(&mut self) {
        self.started += 1;
    }

    pub(crate) fn record_done(&mut self, errors: ErrorFlags) {
        if errors.is_ok() {
            self.completed += 1;
            return;
        }
        self.failed += 1;
        let counters = [
            (ErrorFlags::ILLEGAL_STATE, &mut self.illegal_state),
            (ErrorFlags::ECHO_MISMATCH, &mut self.echo_mismatch),
            (ErrorFlags::TIMEOUT, &mut self.timeout),
            (ErrorFlags::CHECKSUM_MISMATCH, &mut self.checksum_mismatch),
            (ErrorFlags::TRANSPORT, &mut self.transport),
        ];
        for (flag, counter) in counters {
            if errors.has(flag) {
                *counter += 1;
            }
        }
    }

    /// Fraction of finished transactions that failed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn failure_rate(&self) -> f64 {
        let finished = self.completed + self.failed;
        if finished == 0 {
            0.0
        } else {
            self.failed as f64 / finished as f64
        }
    }
}
