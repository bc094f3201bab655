//! Detection Metrics
//!
//! Counters and latency tracking for structural checks:
//! - Checks performed, injections detected, clean queries
//! - Detections per template
//! - Latency histogram with percentiles
//!
//! Export formats:
//! - Prometheus text format
//! - JSON format

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::timing::duration_ms;

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetricsConfig {
    /// Enable metrics collection
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Track detections per template
    #[serde(default = "default_true")]
    pub per_template_metrics: bool,
    /// Enable latency histograms
    #[serde(default = "default_true")]
    pub latency_histograms: bool,
    /// Histogram bucket boundaries (ms)
    #[serde(default = "default_buckets")]
    pub histogram_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_template_metrics: true,
            latency_histograms: true,
            histogram_buckets: default_buckets(),
        }
    }
}

fn default_true() -> bool {
    true
}

// Checks are sub-millisecond string rewrites, so the buckets start small
fn default_buckets() -> Vec<f64> {
    vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]
}

/// Detection metrics collector
pub struct DetectionMetrics {
    config: MetricsConfig,

    checks_total: AtomicU64,
    injections_detected: AtomicU64,
    clean_total: AtomicU64,

    // Keyed by template label
    detections_by_template: RwLock<HashMap<String, u64>>,

    latency_histogram: RwLock<Histogram>,

    start_time: Instant,
}

impl DetectionMetrics {
    /// Create a new metrics collector
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            latency_histogram: RwLock::new(Histogram::new(config.histogram_buckets.clone())),
            config,
            checks_total: AtomicU64::new(0),
            injections_detected: AtomicU64::new(0),
            clean_total: AtomicU64::new(0),
            detections_by_template: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Record the outcome of one check
    pub fn record_check(&self, template: &str, detected: bool) {
        if !self.config.enabled {
            return;
        }

        self.checks_total.fetch_add(1, Ordering::Relaxed);
        if detected {
            self.injections_detected.fetch_add(1, Ordering::Relaxed);
            if self.config.per_template_metrics {
                let mut by_template = self.detections_by_template.write();
                *by_template.entry(template.to_string()).or_insert(0) += 1;
            }
        } else {
            self.clean_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record check latency
    pub fn record_latency(&self, duration: Duration) {
        if self.config.enabled && self.config.latency_histograms {
            self.latency_histogram.write().observe(duration_ms(duration));
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics in Prometheus text format
    pub fn prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP sqlguard_checks_total Total number of structural checks\n");
        output.push_str("# TYPE sqlguard_checks_total counter\n");
        output.push_str(&format!(
            "sqlguard_checks_total {}\n",
            self.checks_total.load(Ordering::Relaxed)
        ));

        output.push_str("# HELP sqlguard_injections_detected Checks whose skeleton diverged\n");
        output.push_str("# TYPE sqlguard_injections_detected counter\n");
        output.push_str(&format!(
            "sqlguard_injections_detected {}\n",
            self.injections_detected.load(Ordering::Relaxed)
        ));

        output.push_str("# HELP sqlguard_clean_total Checks whose skeleton matched\n");
        output.push_str("# TYPE sqlguard_clean_total counter\n");
        output.push_str(&format!(
            "sqlguard_clean_total {}\n",
            self.clean_total.load(Ordering::Relaxed)
        ));

        if self.config.per_template_metrics {
            output.push_str("# HELP sqlguard_detections_by_template Detections by template\n");
            output.push_str("# TYPE sqlguard_detections_by_template counter\n");
            let by_template = self.detections_by_template.read();
            for (template, count) in by_template.iter() {
                output.push_str(&format!(
                    "sqlguard_detections_by_template{{template=\"{}\"}} {}\n",
                    escape_label(template),
                    count
                ));
            }
        }

        if self.config.latency_histograms {
            output.push_str("# HELP sqlguard_check_latency_ms Check latency in milliseconds\n");
            output.push_str("# TYPE sqlguard_check_latency_ms histogram\n");
            let histogram = self.latency_histogram.read();
            for (bound, count) in histogram.buckets() {
                output.push_str(&format!(
                    "sqlguard_check_latency_ms_bucket{{le=\"{}\"}} {}\n",
                    bound, count
                ));
            }
            output.push_str(&format!(
                "sqlguard_check_latency_ms_bucket{{le=\"+Inf\"}} {}\n",
                histogram.count()
            ));
            output.push_str(&format!("sqlguard_check_latency_ms_sum {}\n", histogram.sum()));
            output.push_str(&format!(
                "sqlguard_check_latency_ms_count {}\n",
                histogram.count()
            ));
        }

        output.push_str("# HELP sqlguard_uptime_seconds Seconds since the collector started\n");
        output.push_str("# TYPE sqlguard_uptime_seconds gauge\n");
        output.push_str(&format!("sqlguard_uptime_seconds {}\n", self.uptime_secs()));

        output
    }

    /// Export metrics as JSON
    pub fn json(&self) -> serde_json::Value {
        let histogram = self.latency_histogram.read();
        let by_template = self.detections_by_template.read();

        serde_json::json!({
            "checks": {
                "total": self.checks_total.load(Ordering::Relaxed),
                "injections": self.injections_detected.load(Ordering::Relaxed),
                "clean": self.clean_total.load(Ordering::Relaxed)
            },
            "detections_by_template": by_template.clone(),
            "latency": {
                "p50_ms": histogram.percentile(50.0),
                "p90_ms": histogram.percentile(90.0),
                "p99_ms": histogram.percentile(99.0),
                "mean_ms": histogram.mean(),
                "count": histogram.count()
            },
            "uptime_seconds": self.uptime_secs()
        })
    }

    /// Get summary statistics
    pub fn summary(&self) -> MetricsSummary {
        let histogram = self.latency_histogram.read();

        MetricsSummary {
            checks_total: self.checks_total.load(Ordering::Relaxed),
            injections_detected: self.injections_detected.load(Ordering::Relaxed),
            clean_total: self.clean_total.load(Ordering::Relaxed),
            latency_p50_ms: histogram.percentile(50.0),
            latency_p99_ms: histogram.percentile(99.0),
            latency_mean_ms: histogram.mean(),
            uptime_secs: self.uptime_secs(),
        }
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.checks_total.store(0, Ordering::Relaxed);
        self.injections_detected.store(0, Ordering::Relaxed);
        self.clean_total.store(0, Ordering::Relaxed);
        self.detections_by_template.write().clear();
        *self.latency_histogram.write() = Histogram::new(self.config.histogram_buckets.clone());
    }
}

impl Default for DetectionMetrics {
    fn default() -> Self {
        Self::new(MetricsConfig::default())
    }
}

/// Summary of metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub checks_total: u64,
    pub injections_detected: u64,
    pub clean_total: u64,
    pub latency_p50_ms: f64,
    pub latency_p99_ms: f64,
    pub latency_mean_ms: f64,
    pub uptime_secs: u64,
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Fixed-bucket histogram with a sliding window of raw samples for percentiles
struct Histogram {
    buckets: Vec<(f64, u64)>,
    sum: f64,
    count: u64,
    /// Most recent observations, oldest first
    window: VecDeque<f64>,
}

const MAX_SAMPLES: usize = 10_000;

impl Histogram {
    fn new(bucket_bounds: Vec<f64>) -> Self {
        Self {
            buckets: bucket_bounds.into_iter().map(|b| (b, 0)).collect(),
            sum: 0.0,
            count: 0,
            window: VecDeque::new(),
        }
    }

    fn observe(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;

        if self.window.len() == MAX_SAMPLES {
            self.window.pop_front();
        }
        self.window.push_back(value);

        self.buckets
            .iter_mut()
            .filter(|(bound, _)| value <= *bound)
            .for_each(|(_, hits)| *hits += 1);
    }

    fn buckets(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.buckets.iter().copied()
    }

    fn sum(&self) -> f64 {
        self.sum
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Nearest-rank percentile over the sample window
    fn percentile(&self, p: f64) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }

        let mut samples: Vec<f64> = self.window.iter().copied().collect();
        let last = samples.len() - 1;
        let rank = (((p / 100.0) * last as f64).round() as usize).min(last);
        *samples.select_nth_unstable_by(rank, f64::total_cmp).1
    }
}
