//! In-process metrics for the scoring service.
//!
//! Counters are atomics; latency samples and the score distribution live
//! behind `RwLock`s with bounded reservoirs. The scrape endpoint renders
//! everything in Prometheus text exposition format.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Cap on retained latency samples; the reservoir halves once it fills.
const MAX_LATENCY_SAMPLES: usize = 10_000;

/// Metrics collector shared across request handling.
pub struct ServiceMetrics {
    /// Total predictions served
    pub predictions_total: AtomicU64,
    /// Requests rejected as client errors
    pub client_errors_total: AtomicU64,
    /// Prediction latencies (in microseconds)
    latencies_us: RwLock<Vec<u64>>,
    /// Probability distribution buckets [0.0-0.1) .. [0.9-1.0]
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for uptime reporting
    start_time: Instant,
}

/// Latency percentiles over the retained samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            predictions_total: AtomicU64::new(0),
            client_errors_total: AtomicU64::new(0),
            latencies_us: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record one served prediction.
    pub fn record_prediction(&self, latency: Duration, probability: f64) {
        self.predictions_total.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut latencies) = self.latencies_us.write() {
            latencies.push(latency.as_micros() as u64);
            if latencies.len() > MAX_LATENCY_SAMPLES {
                latencies.drain(0..MAX_LATENCY_SAMPLES / 2);
            }
        }

        let bucket = ((probability * 10.0) as usize).min(9);
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record one rejected request.
    pub fn record_client_error(&self) {
        self.client_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Latency percentiles over the retained samples.
    pub fn latency_stats(&self) -> LatencyStats {
        let latencies = match self.latencies_us.read() {
            Ok(l) => l,
            Err(_) => return LatencyStats::default(),
        };
        if latencies.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = latencies.clone();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[((count as f64 * 0.95) as usize).min(count - 1)],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
        }
    }

    /// Snapshot of the score distribution buckets.
    pub fn score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    /// Seconds since the service started.
    pub fn uptime_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render_prometheus(&self) -> String {
        let predictions = self.predictions_total.load(Ordering::Relaxed);
        let client_errors = self.client_errors_total.load(Ordering::Relaxed);
        let latency = self.latency_stats();
        let buckets = self.score_distribution();

        let mut out = String::with_capacity(1024);

        out.push_str("# HELP lendscore_predictions_total Number of predictions served\n");
        out.push_str("# TYPE lendscore_predictions_total counter\n");
        out.push_str(&format!("lendscore_predictions_total {}\n", predictions));

        out.push_str("# HELP lendscore_client_errors_total Requests rejected as client errors\n");
        out.push_str("# TYPE lendscore_client_errors_total counter\n");
        out.push_str(&format!("lendscore_client_errors_total {}\n", client_errors));

        out.push_str("# HELP lendscore_predict_latency_microseconds Prediction latency percentiles\n");
        out.push_str("# TYPE lendscore_predict_latency_microseconds summary\n");
        out.push_str(&format!(
            "lendscore_predict_latency_microseconds{{quantile=\"0.5\"}} {}\n",
            latency.p50_us
        ));
        out.push_str(&format!(
            "lendscore_predict_latency_microseconds{{quantile=\"0.95\"}} {}\n",
            latency.p95_us
        ));
        out.push_str(&format!(
            "lendscore_predict_latency_microseconds{{quantile=\"0.99\"}} {}\n",
            latency.p99_us
        ));
        out.push_str(&format!(
            "lendscore_predict_latency_microseconds_count {}\n",
            latency.count
        ));

        out.push_str("# HELP lendscore_score_distribution Served probabilities by decile bucket\n");
        out.push_str("# TYPE lendscore_score_distribution gauge\n");
        for (i, count) in buckets.iter().enumerate() {
            out.push_str(&format!(
                "lendscore_score_distribution{{bucket=\"{:.1}-{:.1}\"}} {}\n",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count
            ));
        }

        out.push_str("# HELP lendscore_uptime_seconds Seconds since service start\n");
        out.push_str("# TYPE lendscore_uptime_seconds gauge\n");
        out.push_str(&format!("lendscore_uptime_seconds {:.1}\n", self.uptime_seconds()));

        out
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}
