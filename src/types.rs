use serde::{Deserialize, Serialize};

/// Classification of a transport-level failure, kept after retries are
/// exhausted so the report can say why a probe never resolved.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Reset,
    Other,
}

/// One fully-resolved URL scheduled for a single probe run, retries included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTask {
    pub url: String,
    /// The wordlist entry (extension included, if any) behind this URL.
    pub word: String,
}

/// Terminal classification of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Status outside the excluded set: the path likely exists.
    Found(u16),
    /// 404 or an explicitly excluded status. A negative result, not an error.
    NotFound(u16),
    /// Transport failures persisted through every retry.
    Failed(TransportErrorKind),
    /// A transient HTTP status (5xx) persisted through every retry.
    Exhausted(u16),
}

/// The terminal, immutable result of one ProbeTask.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub url: String,
    pub word: String,
    pub status: ProbeStatus,
    pub elapsed_ms: u64,
    pub retries: u32,
    pub content_length: Option<u64>,
}

/// One reportable hit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FoundEntry {
    pub url: String,
    pub word: String,
    pub status: u16,
    pub content_length: Option<u64>,
    pub elapsed_ms: u64,
    pub timestamp: String,
}

/// Aggregate counters, readable mid-run via `Aggregator::snapshot`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub total: u64,
    /// Tasks admitted through the concurrency gate so far.
    pub attempted: u64,
    pub in_flight: u64,
    pub found: u64,
    pub not_found: u64,
    pub failed: u64,
    /// Retry attempts scheduled across all tasks.
    pub retried: u64,
}

impl RunStatistics {
    /// Probes that reached a terminal state.
    pub fn resolved(&self) -> u64 {
        self.found + self.not_found + self.failed
    }
}

/// Final report: statistics plus hits in completion order.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunReport {
    pub stats: RunStatistics,
    pub found: Vec<FoundEntry>,
}
