//! Bounded-concurrency runner for per-record work.
//!
//! Migration and cascade delete touch every record of a category. Each record
//! is an independent unit: one failure is logged and counted, and the rest of
//! the batch keeps going. Nothing is rolled back.

use std::future::Future;

use collector_core::{defaults, Result};
use tokio::task::JoinSet;
use tracing::{error, warn};

/// Counts from one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Units whose task reported a write.
    pub changed: usize,
    /// Units that needed no write.
    pub unchanged: usize,
    /// Units whose task failed or panicked.
    pub failed: usize,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.changed + self.unchanged + self.failed
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    limit: usize,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(defaults::MIGRATION_CONCURRENCY)
    }
}

impl BatchRunner {
    /// A runner keeping at most `limit` tasks in flight (minimum 1).
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run `task` for every item.
    ///
    /// The task resolves to `Ok(true)` when it wrote something, `Ok(false)`
    /// when there was nothing to do. `label` names the batch in logs.
    pub async fn run<T, F, Fut>(&self, label: &'static str, items: Vec<T>, task: F) -> BatchOutcome
    where
        T: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        let mut outcome = BatchOutcome::default();
        let mut tasks = JoinSet::new();

        for item in items {
            if tasks.len() >= self.limit {
                if let Some(joined) = tasks.join_next().await {
                    record(label, &mut outcome, joined);
                }
            }
            tasks.spawn(task(item));
        }

        while let Some(joined) = tasks.join_next().await {
            record(label, &mut outcome, joined);
        }
        outcome
    }
}

fn record(
    label: &'static str,
    outcome: &mut BatchOutcome,
    joined: std::result::Result<Result<bool>, tokio::task::JoinError>,
) {
    match joined {
        Ok(Ok(true)) => outcome.changed += 1,
        Ok(Ok(false)) => outcome.unchanged += 1,
        Ok(Err(e)) => {
            warn!(batch = label, error = %e, "Batch item failed, continuing");
            outcome.failed += 1;
        }
        Err(e) => {
            error!(batch = label, error = ?e, "Batch task panicked");
            outcome.failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collector_core::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_counts_each_outcome() {
        let runner = BatchRunner::new(2);
        let outcome = runner
            .run("test", vec![0, 1, 2, 3, 4, 5], |n| async move {
                match n % 3 {
                    0 => Ok(true),
                    1 => Ok(false),
                    _ => Err(Error::Storage(format!("item {n}"))),
                }
            })
            .await;

        assert_eq!(outcome.changed, 2);
        assert_eq!(outcome.unchanged, 2);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.total(), 6);
    }

    #[tokio::test]
    async fn test_never_exceeds_limit() {
        let runner = BatchRunner::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let outcome = runner
            .run("test", (0..20).collect(), |_| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(true)
                }
            })
            .await;

        assert_eq!(outcome.changed, 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcome = BatchRunner::default()
            .run("test", Vec::<u32>::new(), |_| async { Ok(true) })
            .await;
        assert_eq!(outcome, BatchOutcome::default());
    }

    #[test]
    fn test_limit_floor() {
        assert_eq!(BatchRunner::new(0).limit(), 1);
    }
}
