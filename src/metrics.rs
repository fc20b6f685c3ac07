//! Request and prediction statistics for the query service.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept before the oldest half is dropped
const LATENCY_WINDOW: usize = 10_000;

/// Query operations tracked by the metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    ListClients,
    ClientInfo,
    ColumnValues,
    PredictDefault,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::ListClients,
        Operation::ClientInfo,
        Operation::ColumnValues,
        Operation::PredictDefault,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ListClients => "client_list",
            Operation::ClientInfo => "client",
            Operation::ColumnValues => "data",
            Operation::PredictDefault => "predict_default",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Terminal outcome of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NotFound,
    BadRequest,
    Conflict,
    Failed,
}

impl Outcome {
    const COUNT: usize = 5;

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::NotFound => "not_found",
            Outcome::BadRequest => "bad_request",
            Outcome::Conflict => "conflict",
            Outcome::Failed => "failed",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn all() -> [Outcome; Self::COUNT] {
        [
            Outcome::Success,
            Outcome::NotFound,
            Outcome::BadRequest,
            Outcome::Conflict,
            Outcome::Failed,
        ]
    }
}

/// Metrics collector shared by all request handlers
pub struct ServiceMetrics {
    /// Requests by operation and outcome
    requests: [[AtomicU64; Outcome::COUNT]; 4],
    /// Request latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Predicted default probability distribution buckets
    score_buckets: [AtomicU64; 10],
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests: Default::default(),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: Default::default(),
            start_time: Instant::now(),
        }
    }

    /// Record a completed request
    pub fn record_request(&self, operation: Operation, outcome: Outcome, latency: Duration) {
        self.requests[operation.index()][outcome.index()].fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.latencies.write() {
            times.push(latency.as_micros() as u64);
            if times.len() > LATENCY_WINDOW {
                times.drain(0..LATENCY_WINDOW / 2);
            }
        }
    }

    /// Record a served default probability
    pub fn record_prediction(&self, proba_default: f64) {
        let bucket = (proba_default * 10.0).clamp(0.0, 9.0) as usize;
        self.score_buckets[bucket].fetch_add(1, Ordering::Relaxed);
    }

    /// Requests recorded for one operation and outcome
    pub fn request_count(&self, operation: Operation, outcome: Outcome) -> u64 {
        self.requests[operation.index()][outcome.index()].load(Ordering::Relaxed)
    }

    /// Requests recorded across all operations and outcomes
    pub fn total_requests(&self) -> u64 {
        self.requests
            .iter()
            .flatten()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    /// Latency statistics over the current window
    pub fn latency_stats(&self) -> LatencyStats {
        let times = match self.latencies.read() {
            Ok(times) => times.clone(),
            Err(_) => return LatencyStats::default(),
        };
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = times;
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: at(0.50),
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Requests per second since startup
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_requests() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Predicted default probability distribution
    pub fn score_distribution(&self) -> [u64; 10] {
        std::array::from_fn(|i| self.score_buckets[i].load(Ordering::Relaxed))
    }

    /// Serializable view of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut requests = BTreeMap::new();
        for operation in Operation::ALL {
            let by_outcome: BTreeMap<&'static str, u64> = Outcome::all()
                .into_iter()
                .map(|outcome| (outcome.as_str(), self.request_count(operation, outcome)))
                .filter(|(_, count)| *count > 0)
                .collect();
            requests.insert(operation.as_str(), by_outcome);
        }

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            total_requests: self.total_requests(),
            throughput: self.throughput(),
            requests,
            latency: self.latency_stats(),
            default_probability_buckets: self.score_distribution(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let total = self.total_requests();
        let latency = self.latency_stats();
        let throughput = self.throughput();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║             LOAN DEFAULT API - METRICS SUMMARY               ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Requests Served: {:>10}  │  Throughput: {:>8.1} req/s   ║",
            total, throughput
        );
        info!(
            "║ Latency (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5}    ║",
            latency.mean_us, latency.p50_us, latency.p95_us, latency.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        for operation in Operation::ALL {
            let success = self.request_count(operation, Outcome::Success);
            let failed: u64 = Outcome::all()
                .into_iter()
                .filter(|o| *o != Outcome::Success)
                .map(|o| self.request_count(operation, o))
                .sum();
            info!(
                "║   {:16}: {:>8} ok {:>8} failed                  ║",
                operation.as_str(),
                success,
                failed
            );
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Default Probability Distribution:                            ║");
        let score_dist = self.score_distribution();
        let predictions: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            let pct = if predictions > 0 {
                (count as f64 / predictions as f64) * 100.0
            } else {
                0.0
            };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Request latency statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Metrics as served by `GET /metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub total_requests: u64,
    pub throughput: f64,
    pub requests: BTreeMap<&'static str, BTreeMap<&'static str, u64>>,
    pub latency: LatencyStats,
    pub default_probability_buckets: [u64; 10],
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_request(Operation::ClientInfo, Outcome::Success, Duration::from_micros(100));
        metrics.record_request(Operation::ClientInfo, Outcome::NotFound, Duration::from_micros(50));
        metrics.record_request(Operation::PredictDefault, Outcome::Success, Duration::from_micros(300));

        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.request_count(Operation::ClientInfo, Outcome::NotFound), 1);
        assert_eq!(metrics.request_count(Operation::ColumnValues, Outcome::Success), 0);

        let latency = metrics.latency_stats();
        assert_eq!(latency.count, 3);
        assert_eq!(latency.mean_us, 150);
        assert_eq!(latency.max_us, 300);
    }

    #[test]
    fn test_score_buckets() {
        let metrics = ServiceMetrics::new();
        metrics.record_prediction(0.0);
        metrics.record_prediction(0.18);
        metrics.record_prediction(0.95);
        metrics.record_prediction(1.0);

        let dist = metrics.score_distribution();
        assert_eq!(dist[0], 1);
        assert_eq!(dist[1], 1);
        assert_eq!(dist[9], 2);
        assert_eq!(dist.iter().sum::<u64>(), 4);
    }

    #[test]
    fn test_empty_latency_stats() {
        let metrics = ServiceMetrics::new();
        assert_eq!(metrics.latency_stats().count, 0);
    }

    #[test]
    fn test_snapshot_serialization() {
        let metrics = ServiceMetrics::new();
        metrics.record_request(Operation::ColumnValues, Outcome::BadRequest, Duration::from_micros(10));

        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["total_requests"], 1);
        assert_eq!(json["requests"]["data"]["bad_request"], 1);
        assert_eq!(json["default_probability_buckets"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let metrics = ServiceMetrics::new();
        for _ in 0..(LATENCY_WINDOW + 1) {
            metrics.record_request(Operation::ListClients, Outcome::Success, Duration::from_micros(1));
        }
        assert!(metrics.latency_stats().count <= LATENCY_WINDOW as u64);
        assert_eq!(metrics.total_requests(), LATENCY_WINDOW as u64 + 1);
    }
}
