//! Live Monitor - background sampling loop
//!
//! Owns a sensor reader and its own pipeline instance, completely
//! separate from the simulation stream. Each tick reads the host,
//! ingests, and publishes a snapshot; the HTTP layer only ever reads
//! published state. Scoring failures are recorded on the snapshot and
//! counted, and the loop keeps polling: whether to retry is the
//! caller's call, the monitor's job is to keep observing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::collector::SensorReader;
use crate::logic::dataset::{DatasetLogger, SampleSource};
use crate::logic::features::{FeatureVector, InertiaWeights};
use crate::logic::model::{RiskVerdict, Scorer};
use crate::logic::pipeline::TelemetryPipeline;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One published tick of the live stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f32,
    pub temperature: f32,
    pub features: Option<FeatureVector>,
    pub verdict: Option<RiskVerdict>,
    pub error: Option<String>,
}

/// Monitor state for the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub ticks: u64,
    pub scoring_errors: u64,
    pub poll_interval_ms: u64,
    pub latest: Option<LiveSnapshot>,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("live monitor already running")]
    AlreadyRunning,

    #[error("live monitor not running")]
    NotRunning,
}

// ============================================================================
// LIVE MONITOR
// ============================================================================

struct MonitorInner {
    running: AtomicBool,
    /// Bumped by every start and stop. A loop only ticks while it holds
    /// the current value, so a stale loop retires on its next wakeup
    /// even when the running flag has already been re-flipped.
    epoch: AtomicU64,
    ticks: AtomicU64,
    scoring_errors: AtomicU64,
    latest: RwLock<Option<LiveSnapshot>>,
    history: RwLock<VecDeque<LiveSnapshot>>,
}

/// Cheap-to-clone handle; all shared state lives behind the inner Arc.
#[derive(Clone)]
pub struct LiveMonitor {
    inner: Arc<MonitorInner>,
    scorer: Arc<dyn Scorer>,
    dataset: Option<Arc<DatasetLogger>>,
    poll_interval: Duration,
    horizon_secs: u64,
    weights: InertiaWeights,
    history_cap: usize,
}

impl LiveMonitor {
    pub fn new(
        scorer: Arc<dyn Scorer>,
        dataset: Option<Arc<DatasetLogger>>,
        poll_interval: Duration,
        horizon_secs: u64,
        weights: InertiaWeights,
        history_cap: usize,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                running: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                ticks: AtomicU64::new(0),
                scoring_errors: AtomicU64::new(0),
                latest: RwLock::new(None),
                history: RwLock::new(VecDeque::new()),
            }),
            scorer,
            dataset,
            poll_interval,
            horizon_secs,
            weights,
            history_cap,
        }
    }

    /// Spawn the sampling loop. Errors if already running.
    pub fn start(&self) -> Result<(), MonitorError> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::AlreadyRunning);
        }
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let inner = self.inner.clone();
        let scorer = self.scorer.clone();
        let dataset = self.dataset.clone();
        let interval = self.poll_interval;
        let horizon_secs = self.horizon_secs;
        let weights = self.weights;
        let history_cap = self.history_cap;

        tokio::spawn(async move {
            monitor_loop(
                inner,
                epoch,
                scorer,
                dataset,
                interval,
                horizon_secs,
                weights,
                history_cap,
            )
            .await;
        });

        tracing::info!("Live monitor started (interval: {:?})", self.poll_interval);
        Ok(())
    }

    /// Signal the loop to stop after its current tick.
    pub fn stop(&self) -> Result<(), MonitorError> {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return Err(MonitorError::NotRunning);
        }
        // Invalidate the loop's epoch as well: a start() arriving before
        // the loop wakes from its sleep re-flips the running flag, and
        // the stale epoch is what keeps the old loop from surviving
        // alongside the new one.
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Live monitor stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            running: self.is_running(),
            ticks: self.inner.ticks.load(Ordering::SeqCst),
            scoring_errors: self.inner.scoring_errors.load(Ordering::SeqCst),
            poll_interval_ms: self.poll_interval.as_millis() as u64,
            latest: self.inner.latest.read().clone(),
        }
    }

    /// Most recent snapshots, oldest first.
    pub fn history(&self, limit: usize) -> Vec<LiveSnapshot> {
        let history = self.inner.history.read();
        let skip = history.len().saturating_sub(limit);
        history.iter().skip(skip).cloned().collect()
    }
}

// ============================================================================
// SAMPLING LOOP
// ============================================================================

async fn monitor_loop(
    inner: Arc<MonitorInner>,
    epoch: u64,
    scorer: Arc<dyn Scorer>,
    dataset: Option<Arc<DatasetLogger>>,
    interval: Duration,
    horizon_secs: u64,
    weights: InertiaWeights,
    history_cap: usize,
) {
    tracing::info!("Live monitor loop started");

    let mut reader = SensorReader::new();
    let mut pipeline = TelemetryPipeline::new(horizon_secs, weights, scorer);

    while inner.running.load(Ordering::SeqCst) && inner.epoch.load(Ordering::SeqCst) == epoch {
        let sample = reader.read_sample();

        let snapshot = match pipeline.ingest(sample) {
            Ok(verdict) => {
                let features = pipeline.last_features().cloned();
                if let (Some(logger), Some(features)) = (&dataset, &features) {
                    logger.record(SampleSource::Live, features, &verdict);
                }
                LiveSnapshot {
                    timestamp: sample.timestamp,
                    cpu_percent: sample.cpu_percent,
                    temperature: sample.temperature,
                    features,
                    verdict: Some(verdict),
                    error: None,
                }
            }
            Err(e) => {
                inner.scoring_errors.fetch_add(1, Ordering::SeqCst);
                tracing::error!("Live ingest failed: {}", e);
                LiveSnapshot {
                    timestamp: sample.timestamp,
                    cpu_percent: sample.cpu_percent,
                    temperature: sample.temperature,
                    features: None,
                    verdict: None,
                    error: Some(e.to_string()),
                }
            }
        };

        *inner.latest.write() = Some(snapshot.clone());
        {
            let mut history = inner.history.write();
            history.push_back(snapshot);
            while history.len() > history_cap {
                history.pop_front();
            }
        }
        inner.ticks.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(interval).await;
    }

    tracing::info!("Live monitor loop exited");
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::classifier::stub::StubScorer;

    fn test_monitor() -> LiveMonitor {
        LiveMonitor::new(
            Arc::new(StubScorer),
            None,
            Duration::from_millis(10),
            60,
            InertiaWeights::default(),
            16,
        )
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let monitor = test_monitor();
        assert!(!monitor.is_running());

        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert!(matches!(
            monitor.start(),
            Err(MonitorError::AlreadyRunning)
        ));

        monitor.stop().unwrap();
        assert!(!monitor.is_running());
        assert!(matches!(monitor.stop(), Err(MonitorError::NotRunning)));
    }

    #[tokio::test]
    async fn test_loop_publishes_snapshots() {
        let monitor = test_monitor();
        monitor.start().unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;
        monitor.stop().unwrap();

        let status = monitor.status();
        assert!(status.ticks >= 1);

        let latest = status.latest.expect("loop should have published a snapshot");
        assert!((0.0..=100.0).contains(&latest.cpu_percent));
        assert!(latest.verdict.is_some(), "stub scorer never fails: {:?}", latest.error);

        let history = monitor.history(10);
        assert!(!history.is_empty());
        assert!(history.len() <= 10);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let monitor = LiveMonitor::new(
            Arc::new(StubScorer),
            None,
            Duration::from_millis(5),
            60,
            InertiaWeights::default(),
            4,
        );
        monitor.start().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        monitor.stop().unwrap();

        assert!(monitor.history(100).len() <= 4);
    }

    #[tokio::test]
    async fn test_stop_start_toggle_keeps_single_loop() {
        let interval = Duration::from_millis(25);
        let observe = Duration::from_millis(400);

        fn fresh(interval: Duration) -> LiveMonitor {
            LiveMonitor::new(
                Arc::new(StubScorer),
                None,
                interval,
                60,
                InertiaWeights::default(),
                64,
            )
        }

        // Baseline: one uninterrupted run.
        let monitor = fresh(interval);
        monitor.start().unwrap();
        tokio::time::sleep(observe).await;
        monitor.stop().unwrap();
        let baseline = monitor.status().ticks;
        assert!(baseline >= 2, "baseline loop never got going");

        // Restart while the first loop is still mid-sleep. The retired
        // loop must not keep ticking alongside its replacement, so the
        // tick rate stays that of a single loop.
        let monitor = fresh(interval);
        monitor.start().unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        monitor.stop().unwrap();
        monitor.start().unwrap();
        tokio::time::sleep(observe).await;
        monitor.stop().unwrap();
        let toggled = monitor.status().ticks;

        assert!(
            toggled <= baseline + baseline / 2,
            "restart doubled the sampling rate: baseline {} ticks, toggled {}",
            baseline,
            toggled
        );
    }
}
