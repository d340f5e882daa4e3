//! Bounded-concurrency probing engine.
//!
//! Drains the probe task list under a fixed concurrency bound, applies the
//! retry policy, and feeds the aggregator exactly one terminal outcome per
//! task. Per-task lifecycle: Pending -> InFlight -> {Success, Retryable,
//! Fatal}; a retrying task gives its permit back before the backoff sleep,
//! so backoff time never consumes concurrency budget.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::aggregator::Aggregator;
use crate::http::{ProbeResponse, Transport};
use crate::types::{Outcome, ProbeStatus, ProbeTask, TransportErrorKind};

/// Run-wide dispatch settings, fixed once probing starts.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Admission gate width: max simultaneously in-flight probes.
    pub concurrency: usize,
    /// Retries per task after the first attempt.
    pub retries: u32,
    /// Backoff before retry N+1 is `backoff_base * (N + 1)`, capped.
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    /// HTTP statuses treated as transient and retried.
    pub retryable_statuses: HashSet<u16>,
    /// Statuses recorded as not-found: 404 plus any user-excluded codes.
    pub excluded_statuses: HashSet<u16>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 50,
            retries: 3,
            backoff_base: Duration::from_millis(250),
            backoff_cap: Duration::from_secs(5),
            retryable_statuses: [500, 502, 503, 504].into_iter().collect(),
            excluded_statuses: [404].into_iter().collect(),
        }
    }
}

impl DispatchConfig {
    /// Add user-excluded status codes to the not-found set.
    pub fn with_excluded(mut self, codes: &[u16]) -> Self {
        self.excluded_statuses.extend(codes.iter().copied());
        self.excluded_statuses.insert(404);
        self
    }
}

/// Probe every task under the configured concurrency bound.
///
/// Returns once all admitted tasks have resolved. On cancellation no new
/// tasks are admitted and in-flight probes finish naturally; the aggregator
/// then holds a valid partial report.
pub async fn run_probes<T: Transport>(
    tasks: Vec<ProbeTask>,
    transport: T,
    config: DispatchConfig,
    cancel: CancellationToken,
    aggregator: Aggregator,
) -> Result<()> {
    let sem = Arc::new(Semaphore::new(config.concurrency.clamp(1, 5_000)));
    let config = Arc::new(config);
    let transport = Arc::new(transport);
    let mut set = JoinSet::new();

    for task in tasks {
        if cancel.is_cancelled() {
            break;
        }
        let permit = tokio::select! {
            permit = sem.clone().acquire_owned() => permit.expect("semaphore in scope"),
            _ = cancel.cancelled() => break,
        };
        aggregator.task_admitted();

        let sem = sem.clone();
        let config = config.clone();
        let transport = transport.clone();
        let cancel = cancel.clone();
        let aggregator = aggregator.clone();
        set.spawn(async move {
            probe_one(task, transport, config, sem, permit, cancel, aggregator).await;
        });
    }

    while set.join_next().await.is_some() {}
    Ok(())
}

/// Why an attempt did not reach a terminal state.
enum RetryCause {
    Transport(TransportErrorKind),
    Status(u16),
}

enum Attempt {
    Terminal(ProbeStatus, Option<u64>),
    Retryable(RetryCause),
}

/// Drive one task through its state machine until a terminal outcome.
#[allow(clippy::too_many_arguments)]
async fn probe_one<T: Transport>(
    task: ProbeTask,
    transport: Arc<T>,
    config: Arc<DispatchConfig>,
    sem: Arc<Semaphore>,
    first_permit: OwnedSemaphorePermit,
    cancel: CancellationToken,
    aggregator: Aggregator,
) {
    let start = Instant::now();
    let mut permit = Some(first_permit);
    let mut last_cause = RetryCause::Transport(TransportErrorKind::Other);

    for attempt in 0..=config.retries {
        let held = match permit.take() {
            Some(p) => p,
            // Re-admission after a backoff: queue for a fresh slot.
            None => {
                tokio::select! {
                    p = sem.clone().acquire_owned() => p.expect("semaphore in scope"),
                    _ = cancel.cancelled() => return,
                }
            }
        };

        aggregator.attempt_started();
        let result = transport.fetch(&task.url).await;
        aggregator.attempt_finished();
        drop(held);

        match classify(result, &config) {
            Attempt::Terminal(status, content_length) => {
                aggregator.record(Outcome {
                    url: task.url,
                    word: task.word,
                    status,
                    elapsed_ms: start.elapsed().as_millis() as u64,
                    retries: attempt,
                    content_length,
                });
                return;
            }
            Attempt::Retryable(cause) => {
                last_cause = cause;
                if attempt == config.retries {
                    break;
                }
                aggregator.retry_recorded();
                tokio::select! {
                    _ = sleep(backoff_delay(&config, attempt)) => {}
                    _ = cancel.cancelled() => return,
                }
            }
        }
    }

    // Retries exhausted.
    let status = match last_cause {
        RetryCause::Transport(kind) => ProbeStatus::Failed(kind),
        RetryCause::Status(code) => ProbeStatus::Exhausted(code),
    };
    aggregator.record(Outcome {
        url: task.url,
        word: task.word,
        status,
        elapsed_ms: start.elapsed().as_millis() as u64,
        retries: config.retries,
        content_length: None,
    });
}

fn classify(
    result: Result<ProbeResponse, TransportErrorKind>,
    config: &DispatchConfig,
) -> Attempt {
    match result {
        Err(kind) => Attempt::Retryable(RetryCause::Transport(kind)),
        Ok(resp) if config.retryable_statuses.contains(&resp.status) => {
            Attempt::Retryable(RetryCause::Status(resp.status))
        }
        Ok(resp) if config.excluded_statuses.contains(&resp.status) => {
            Attempt::Terminal(ProbeStatus::NotFound(resp.status), resp.content_length)
        }
        Ok(resp) => Attempt::Terminal(ProbeStatus::Found(resp.status), resp.content_length),
    }
}

fn backoff_delay(config: &DispatchConfig, attempt: u32) -> Duration {
    config
        .backoff_base
        .saturating_mul(attempt + 1)
        .min(config.backoff_cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly_and_caps() {
        let config = DispatchConfig {
            backoff_base: Duration::from_millis(100),
            backoff_cap: Duration::from_millis(250),
            ..DispatchConfig::default()
        };
        assert_eq!(backoff_delay(&config, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(&config, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(&config, 2), Duration::from_millis(250));
        assert_eq!(backoff_delay(&config, 9), Duration::from_millis(250));
    }

    #[test]
    fn classification_policy() {
        let config = DispatchConfig::default().with_excluded(&[403]);

        let as_status = |s| classify(Ok(ProbeResponse { status: s, content_length: None }), &config);
        assert!(matches!(
            as_status(200),
            Attempt::Terminal(ProbeStatus::Found(200), _)
        ));
        assert!(matches!(
            as_status(301),
            Attempt::Terminal(ProbeStatus::Found(301), _)
        ));
        assert!(matches!(
            as_status(404),
            Attempt::Terminal(ProbeStatus::NotFound(404), _)
        ));
        assert!(matches!(
            as_status(403),
            Attempt::Terminal(ProbeStatus::NotFound(403), _)
        ));
        assert!(matches!(
            as_status(503),
            Attempt::Retryable(RetryCause::Status(503))
        ));
        assert!(matches!(
            classify(Err(TransportErrorKind::Timeout), &config),
            Attempt::Retryable(RetryCause::Transport(TransportErrorKind::Timeout))
        ));
    }
}
