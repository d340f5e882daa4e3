use std::sync::{Arc, Mutex, MutexGuard};

use ::time::{format_description::well_known, OffsetDateTime};

use crate::types::{FoundEntry, Outcome, ProbeStatus, RunReport, RunStatistics};

/// Collects outcomes and live counters for one run.
///
/// The handle is cheap to clone and shared by every worker. All mutation
/// happens inside a single mutex, so `snapshot` can never observe a torn
/// update across counters.
#[derive(Clone, Debug)]
pub struct Aggregator {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    stats: RunStatistics,
    found: Vec<FoundEntry>,
}

impl Aggregator {
    pub fn new(total: u64) -> Self {
        let inner = Inner {
            stats: RunStatistics {
                total,
                ..RunStatistics::default()
            },
            found: Vec::new(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A task has passed the admission gate.
    pub fn task_admitted(&self) {
        self.lock().stats.attempted += 1;
    }

    pub fn attempt_started(&self) {
        self.lock().stats.in_flight += 1;
    }

    pub fn attempt_finished(&self) {
        self.lock().stats.in_flight -= 1;
    }

    /// A retry has been scheduled for a task.
    pub fn retry_recorded(&self) {
        self.lock().stats.retried += 1;
    }

    /// Record the terminal outcome of one task. Called exactly once per task.
    pub fn record(&self, outcome: Outcome) {
        let mut guard = self.lock();
        match outcome.status {
            ProbeStatus::Found(status) => {
                guard.stats.found += 1;
                guard.found.push(FoundEntry {
                    url: outcome.url,
                    word: outcome.word,
                    status,
                    content_length: outcome.content_length,
                    elapsed_ms: outcome.elapsed_ms,
                    timestamp: now_rfc3339(),
                });
            }
            ProbeStatus::NotFound(_) => guard.stats.not_found += 1,
            ProbeStatus::Failed(_) | ProbeStatus::Exhausted(_) => guard.stats.failed += 1,
        }
    }

    /// Consistent point-in-time view of the counters.
    pub fn snapshot(&self) -> RunStatistics {
        self.lock().stats
    }

    /// Consume the handle and produce the final report, found entries in
    /// completion order.
    pub fn finalize(self) -> RunReport {
        let inner = match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(|e| e.into_inner()),
            // Other handles still alive (cancelled run with workers draining):
            // copy the state out instead.
            Err(arc) => {
                let guard = arc.lock().unwrap_or_else(|e| e.into_inner());
                Inner {
                    stats: guard.stats,
                    found: guard.found.clone(),
                }
            }
        };
        RunReport {
            stats: inner.stats,
            found: inner.found,
        }
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransportErrorKind;

    fn outcome(url: &str, status: ProbeStatus) -> Outcome {
        Outcome {
            url: url.to_string(),
            word: url.rsplit('/').next().unwrap_or_default().to_string(),
            status,
            elapsed_ms: 5,
            retries: 0,
            content_length: Some(128),
        }
    }

    #[test]
    fn counters_track_each_outcome_class() {
        let agg = Aggregator::new(4);
        agg.record(outcome("http://t/a", ProbeStatus::Found(200)));
        agg.record(outcome("http://t/b", ProbeStatus::NotFound(404)));
        agg.record(outcome(
            "http://t/c",
            ProbeStatus::Failed(TransportErrorKind::Timeout),
        ));
        agg.record(outcome("http://t/d", ProbeStatus::Exhausted(503)));

        let stats = agg.snapshot();
        assert_eq!(stats.found, 1);
        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.resolved(), 4);
    }

    #[test]
    fn report_keeps_completion_order() {
        let agg = Aggregator::new(3);
        agg.record(outcome("http://t/second", ProbeStatus::Found(301)));
        agg.record(outcome("http://t/first", ProbeStatus::Found(200)));

        let report = agg.finalize();
        assert_eq!(report.found.len(), 2);
        assert_eq!(report.found[0].url, "http://t/second");
        assert_eq!(report.found[1].url, "http://t/first");
    }

    #[test]
    fn finalize_works_with_outstanding_clones() {
        let agg = Aggregator::new(1);
        let worker_handle = agg.clone();
        worker_handle.record(outcome("http://t/x", ProbeStatus::Found(200)));

        let report = agg.finalize();
        assert_eq!(report.found.len(), 1);
        assert_eq!(report.stats.found, 1);
    }
}
