//! Query Guard
//!
//! Binds a static template once and checks runtime queries against it. The
//! template skeleton is computed at construction; each check normalizes only
//! the runtime query. Results are identical to calling
//! [`is_injection`](crate::comparator::is_injection) with the same template.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::comparator::Comparison;
use crate::metrics::{DetectionMetrics, MetricsConfig};
use crate::normalizer::Skeleton;
use crate::timing::{duration_ms, measure, TimedDetection};

/// Structural injection guard for one static template
pub struct QueryGuard {
    /// Label used in logs and per-template metrics
    label: String,
    /// Template as authored
    template: String,
    /// Normalized template
    skeleton: Skeleton,
    metrics: Arc<DetectionMetrics>,
}

impl QueryGuard {
    /// Create a guard with its own metrics collector
    pub fn new(template: &str) -> Self {
        Self::with_metrics(template, Arc::new(DetectionMetrics::new(MetricsConfig::default())))
    }

    /// Create a guard that reports into a shared metrics collector
    pub fn with_metrics(template: &str, metrics: Arc<DetectionMetrics>) -> Self {
        let skeleton = Skeleton::of(template);

        info!(
            template_len = template.len(),
            skeleton = %skeleton,
            "Query guard initialized"
        );

        Self {
            label: template.to_string(),
            template: template.to_string(),
            skeleton,
            metrics,
        }
    }

    /// Set the label used for logs and metrics (defaults to the template text)
    pub fn labeled(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn metrics(&self) -> &Arc<DetectionMetrics> {
        &self.metrics
    }

    /// Compare a runtime query against the bound template
    pub fn check(&self, runtime_query: &str) -> Comparison {
        self.evaluate(runtime_query).1
    }

    /// True iff the runtime query diverges from the bound template
    pub fn is_injection(&self, runtime_query: &str) -> bool {
        self.check(runtime_query).is_injection()
    }

    /// Check a runtime query and report how long the comparison took
    pub fn timed_check(&self, runtime_query: &str) -> TimedDetection {
        let (elapsed, comparison) = self.evaluate(runtime_query);
        TimedDetection {
            elapsed_ms: duration_ms(elapsed),
            detected: comparison.is_injection(),
        }
    }

    // Only normalization and the equality test are timed
    fn evaluate(&self, runtime_query: &str) -> (Duration, Comparison) {
        let (elapsed, (runtime, detected)) = measure(|| {
            let runtime = Skeleton::of(runtime_query);
            let detected = runtime != self.skeleton;
            (runtime, detected)
        });
        let comparison = Comparison::between(self.skeleton.clone(), runtime);

        self.metrics.record_check(&self.label, detected);
        self.metrics.record_latency(elapsed);

        if detected {
            warn!(
                template = %self.label,
                divergence = comparison.divergence,
                runtime_skeleton = %comparison.runtime,
                "Structural divergence from template"
            );
        } else {
            debug!(
                template = %self.label,
                elapsed_ms = duration_ms(elapsed),
                "Runtime query matches template"
            );
        }

        (elapsed, comparison)
    }
}
