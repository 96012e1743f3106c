//! Server statistics aggregation
//!
//! A single mutex guards all fields so readers never observe a half-updated
//! snapshot. Counters are monotonic; `queue_length` and `active_generations`
//! are instantaneous gauges. The tracker lives for the whole process,
//! constructed once in `main` and shared by `Arc`.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use utoipa::ToSchema;

#[derive(Debug)]
struct StatsInner {
    total_requests: u64,
    successful_generations: u64,
    failed_generations: u64,
    queue_length: usize,
    active_generations: usize,
    last_generation: Option<DateTime<Utc>>,
}

/// Thread-safe server statistics tracker
pub struct ServerStats {
    start_wall: DateTime<Utc>,
    start_instant: Instant,
    inner: Mutex<StatsInner>,
}

/// Point-in-time copy of all statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub successful_generations: u64,
    pub failed_generations: u64,
    pub queue_length: usize,
    pub active_generations: usize,
    pub start_time: DateTime<Utc>,
    pub last_generation: Option<DateTime<Utc>>,
    pub uptime_secs: f64,
}

impl ServerStats {
    /// Create a tracker with zeroed counters and `start_time` = now
    pub fn new() -> Self {
        Self {
            start_wall: Utc::now(),
            start_instant: Instant::now(),
            inner: Mutex::new(StatsInner {
                total_requests: 0,
                successful_generations: 0,
                failed_generations: 0,
                queue_length: 0,
                active_generations: 0,
                last_generation: None,
            }),
        }
    }

    pub fn record_request(&self) {
        self.inner.lock().total_requests += 1;
    }

    /// Record a successful generation and stamp the completion time
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.successful_generations += 1;
        inner.last_generation = Some(Utc::now());
    }

    pub fn record_failure(&self) {
        self.inner.lock().failed_generations += 1;
    }

    pub fn set_queue_length(&self, length: usize) {
        self.inner.lock().queue_length = length;
    }

    pub fn set_active_generations(&self, count: usize) {
        self.inner.lock().active_generations = count;
    }

    /// Copy all fields and derive uptime
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock();
        StatsSnapshot {
            total_requests: inner.total_requests,
            successful_generations: inner.successful_generations,
            failed_generations: inner.failed_generations,
            queue_length: inner.queue_length,
            active_generations: inner.active_generations,
            start_time: self.start_wall,
            last_generation: inner.last_generation,
            uptime_secs: self.start_instant.elapsed().as_secs_f64(),
        }
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_zeroed() {
        let stats = ServerStats::new();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.successful_generations, 0);
        assert_eq!(snapshot.failed_generations, 0);
        assert!(snapshot.last_generation.is_none());
    }

    #[test]
    fn test_success_stamps_last_generation() {
        let stats = ServerStats::new();
        stats.record_success();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.successful_generations, 1);
        assert!(snapshot.last_generation.is_some());
    }

    #[test]
    fn test_gauges_are_instantaneous() {
        let stats = ServerStats::new();
        stats.set_queue_length(3);
        stats.set_active_generations(1);
        assert_eq!(stats.snapshot().queue_length, 3);
        stats.set_queue_length(0);
        stats.set_active_generations(0);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.queue_length, 0);
        assert_eq!(snapshot.active_generations, 0);
    }
}
