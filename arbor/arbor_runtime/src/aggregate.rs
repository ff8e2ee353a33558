//! Error collection for concurrent fan-out.
//!
//! Every unit of a fan-out level is awaited to completion; failures are
//! gathered in dispatch order and reported together once the level is done.

use arbor_core::{AggregateError, Error, Result};
use tokio::task::JoinHandle;
use tracing::warn;

/// A labelled unit of work spawned onto the runtime.
pub type Unit<T> = (String, JoinHandle<Result<T>>);

/// Sink for the failures of one fan-out level.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<Error>,
}

impl ErrorCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure
    pub fn push(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Record the failure of `result`, if any, and pass the success through
    pub fn check<T>(&mut self, label: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Unit {} failed: {}", label, err);
                self.push(err);
                None
            }
        }
    }

    /// Await every unit, in dispatch order, and collect its outcome. A unit
    /// that panicked or was cancelled counts as failed.
    pub async fn join<T>(&mut self, units: Vec<Unit<T>>) -> Vec<T> {
        let mut values = Vec::with_capacity(units.len());
        for (label, handle) in units {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(Error::Runtime(format!(
                    "unit {label} did not complete: {join_err}"
                ))),
            };
            if let Some(value) = self.check(&label, result) {
                values.push(value);
            }
        }
        values
    }

    /// Number of failures collected
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no failure was collected
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The aggregate of everything collected, if anything was
    pub fn into_aggregate(self) -> Option<AggregateError> {
        AggregateError::from_errors(self.errors)
    }

    /// `Ok` when nothing failed, otherwise an [`Error::Aggregate`]
    pub fn finish(self) -> Result<()> {
        match self.into_aggregate() {
            Some(aggregate) => Err(aggregate.into()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_collector_is_ok() {
        let collector = ErrorCollector::new();
        assert!(collector.is_empty());
        assert!(collector.finish().is_ok());
    }

    #[tokio::test]
    async fn test_join_waits_for_all_units() {
        let units: Vec<Unit<u32>> = (0..4u32)
            .map(|i| {
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(u64::from(4 - i) * 5)).await;
                    if i % 2 == 0 {
                        Ok(i)
                    } else {
                        Err(Error::Runtime(format!("unit {i}")))
                    }
                });
                (format!("u{i}"), handle)
            })
            .collect();

        let mut collector = ErrorCollector::new();
        let values = collector.join(units).await;
        assert_eq!(values, vec![0, 2]);
        assert_eq!(collector.len(), 2);

        match collector.finish() {
            Err(Error::Aggregate(aggregate)) => {
                let messages: Vec<String> =
                    aggregate.errors().iter().map(|e| e.to_string()).collect();
                assert_eq!(messages, vec!["Runtime error: unit 1", "Runtime error: unit 3"]);
            }
            other => panic!("expected aggregate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panicked_unit_is_a_failure() {
        let handle: JoinHandle<Result<()>> = tokio::spawn(async { panic!("boom") });
        let mut collector = ErrorCollector::new();
        collector.join(vec![("panicky".to_string(), handle)]).await;
        assert_eq!(collector.len(), 1);
    }
}
