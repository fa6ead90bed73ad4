use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// One completed request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub endpoint: String,
    pub duration: Duration,
    pub response_bytes: u64,
    pub cost: f64,
    /// `None` when no response arrived.
    pub status: Option<u16>,
}

/// Aggregate view over every request recorded so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub count: u64,
    pub total: f64,
    pub average: f64,
    pub failures: u64,
    pub total_duration_ms: f64,
    pub total_bytes: u64,
}

#[derive(Default)]
struct Totals {
    count: u64,
    cost: f64,
    duration_ms: f64,
    bytes: u64,
    failures: u64,
    recent: VecDeque<Sample>,
}

/// Running totals of request samples.
///
/// Only scalar totals are kept for the summary. The last `capacity` samples are
/// retained for diagnostics, oldest evicted first.
pub struct MetricsAggregator {
    totals: Mutex<Totals>,
    capacity: usize,
}

impl MetricsAggregator {
    pub fn new(capacity: usize) -> Self {
        MetricsAggregator {
            totals: Mutex::new(Totals::default()),
            capacity,
        }
    }

    pub fn record(&self, sample: Sample) {
        self.push(sample, false);
    }

    /// Records an attempt that failed. It counts towards `count` and the average
    /// like any other request, and is also tallied in `failures`.
    pub fn record_failure(&self, sample: Sample) {
        self.push(sample, true);
    }

    fn push(&self, sample: Sample, failed: bool) {
        let mut totals = self.totals.lock();
        totals.count += 1;
        if failed {
            totals.failures += 1;
        }
        totals.cost += sample.cost;
        totals.duration_ms += sample.duration.as_secs_f64() * 1000.0;
        totals.bytes += sample.response_bytes;

        if self.capacity == 0 {
            return;
        }
        if totals.recent.len() == self.capacity {
            totals.recent.pop_front();
        }
        totals.recent.push_back(sample);
    }

    pub fn summary(&self) -> MetricsSummary {
        let totals = self.totals.lock();
        let average = if totals.count == 0 {
            0.0
        } else {
            totals.cost / totals.count as f64
        };

        MetricsSummary {
            count: totals.count,
            total: totals.cost,
            average,
            failures: totals.failures,
            total_duration_ms: totals.duration_ms,
            total_bytes: totals.bytes,
        }
    }

    /// Most recent samples, oldest first.
    pub fn recent(&self) -> Vec<Sample> {
        self.totals.lock().recent.iter().cloned().collect()
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        MetricsAggregator::new(100)
    }
}
