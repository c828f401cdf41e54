use tracing::info;

/// Counters collected during one pass over the input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub lines_read: u64,
    pub blank_lines: u64,
    pub malformed_lines: u64,
    pub records_decoded: u64,
    pub records_used: u64,
    pub records_skipped: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_lines(&mut self) {
        self.lines_read += 1;
    }

    pub fn inc_blank(&mut self) {
        self.blank_lines += 1;
    }

    pub fn inc_malformed(&mut self) {
        self.malformed_lines += 1;
    }

    pub fn inc_decoded(&mut self) {
        self.records_decoded += 1;
    }

    /// Record whether a decoded record qualified for the statistic being computed
    pub fn record_used(&mut self, used: bool) {
        if used {
            self.records_used += 1;
        } else {
            self.records_skipped += 1;
        }
    }

    pub fn lines(&self) -> u64 {
        self.lines_read
    }

    pub fn malformed(&self) -> u64 {
        self.malformed_lines
    }

    pub fn decoded(&self) -> u64 {
        self.records_decoded
    }

    pub fn used(&self) -> u64 {
        self.records_used
    }

    pub fn skipped(&self) -> u64 {
        self.records_skipped
    }

    /// One aggregate log line per pass
    pub fn log_summary(&self, statistic: &str, strategy: &str) {
        info!(
            statistic,
            strategy,
            lines = self.lines_read,
            blank = self.blank_lines,
            malformed = self.malformed_lines,
            decoded = self.records_decoded,
            used = self.records_used,
            skipped = self.records_skipped,
            "Scan complete"
        );
    }
}
