//! Rolling Window - time-bounded sample history
//!
//! Holds the recent samples of one telemetry stream, ordered by timestamp
//! and bounded by a time horizon rather than a count. Eviction happens on
//! every push: samples strictly older than `newest - horizon` are dropped,
//! a sample sitting exactly on the cutoff stays.

use std::collections::VecDeque;

use chrono::Duration;

use crate::logic::sample::RawSample;

pub struct RollingWindow {
    samples: VecDeque<RawSample>,
    horizon: Duration,
}

impl RollingWindow {
    pub fn new(horizon_secs: u64) -> Self {
        // chrono::Duration holds at most i64::MAX milliseconds; anything
        // larger saturates instead of wrapping to a negative horizon.
        let horizon_secs = horizon_secs.min(i64::MAX as u64 / 1000);
        Self {
            samples: VecDeque::new(),
            horizon: Duration::seconds(horizon_secs as i64),
        }
    }

    /// Append a sample and evict everything that fell out of the horizon.
    /// Ordering is the caller's contract; the window does not re-sort.
    pub fn push(&mut self, sample: RawSample) {
        self.samples.push_back(sample);
        self.evict();
    }

    fn evict(&mut self) {
        let newest_ts = match self.samples.back() {
            Some(s) => s.timestamp,
            None => return,
        };
        let cutoff = newest_ts - self.horizon;
        while let Some(front) = self.samples.front() {
            if front.timestamp < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn newest(&self) -> Option<&RawSample> {
        self.samples.back()
    }

    pub fn oldest(&self) -> Option<&RawSample> {
        self.samples.front()
    }

    /// Mean CPU over every sample currently in the window. 0.0 when empty.
    pub fn avg_cpu(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: f64 = self.samples.iter().map(|s| s.cpu_percent as f64).sum();
        (total / self.samples.len() as f64) as f32
    }

    /// Mean temperature over every sample currently in the window.
    pub fn avg_temperature(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: f64 = self.samples.iter().map(|s| s.temperature as f64).sum();
        (total / self.samples.len() as f64) as f32
    }

    /// Signed temperature slope across the window, in degrees C per second.
    /// 0.0 with fewer than two samples or a zero time span.
    pub fn temp_rate_of_change(&self) -> f32 {
        let (oldest, newest) = match (self.samples.front(), self.samples.back()) {
            (Some(o), Some(n)) if self.samples.len() >= 2 => (o, n),
            _ => return 0.0,
        };
        let elapsed = (newest.timestamp - oldest.timestamp).num_milliseconds() as f32 / 1000.0;
        if elapsed <= 0.0 {
            return 0.0;
        }
        (newest.temperature - oldest.temperature) / elapsed
    }

    /// Seconds between the oldest and newest sample. 0.0 with fewer than two.
    pub fn span_secs(&self) -> f32 {
        match (self.samples.front(), self.samples.back()) {
            (Some(o), Some(n)) => (n.timestamp - o.timestamp).num_milliseconds() as f32 / 1000.0,
            _ => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawSample> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

// ============================================================================
// TESTS
// ============================================================================
