//! Transfer result types

use std::time::Duration;

/// Progress of the data phase of the current or last transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl TransferStats {
    /// Average throughput, or 0 before any time has elapsed.
    pub fn bytes_per_sec(&self) -> u64 {
        let millis = self.elapsed.as_millis();
        if millis == 0 {
            return 0;
        }
        (u128::from(self.bytes) * 1000 / millis) as u64
    }
}
