//! Detection Report
//!
//! Runs a harness configuration through the detector and renders the results:
//! the normal and injected sample checks, a per-attack timing table and a
//! normal-vs-injected timing comparison. Rendering targets any `io::Write`.

use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;

use crate::config::HarnessConfig;
use crate::engine::QueryGuard;
use crate::metrics::{DetectionMetrics, MetricsSummary};
use crate::timing::{compare_timings_with_warmup, duration_ms, measure_with_warmup};

const SECTION_WIDTH: usize = 50;

/// Result of checking one sample query
#[derive(Debug, Clone, Serialize)]
pub struct QueryCheck {
    pub original: String,
    pub normalized: String,
    pub detected: bool,
}

/// Timed detection of one catalog entry
#[derive(Debug, Clone, Serialize)]
pub struct AttackTiming {
    pub name: String,
    pub elapsed_ms: f64,
    pub detected: bool,
}

/// Timing of the normal sample against the injected sample
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TimeComparison {
    pub normal_ms: f64,
    pub injected_ms: f64,
}

/// Complete detection report
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub template: String,
    pub template_skeleton: String,
    pub normal: QueryCheck,
    pub injected: QueryCheck,
    pub attacks: Vec<AttackTiming>,
    pub timing: TimeComparison,
    pub metrics: MetricsSummary,
}

impl Report {
    /// Run every check the configuration describes
    pub fn run(config: &HarnessConfig) -> Self {
        let metrics = Arc::new(DetectionMetrics::new(config.metrics.clone()));
        let guard = QueryGuard::with_metrics(&config.template, Arc::clone(&metrics));

        info!(
            attacks = config.attacks.len(),
            warmup_iterations = config.warmup_iterations,
            "Running detection report"
        );

        let normal = sample_check(&guard, &config.normal_query);
        let injected = sample_check(&guard, &config.injected_query);

        let attacks = config
            .attacks
            .iter()
            .map(|case| {
                let (elapsed, detected) =
                    measure_with_warmup(&config.template, &case.query, config.warmup_iterations);
                metrics.record_check(guard.label(), detected);
                metrics.record_latency(elapsed);
                AttackTiming {
                    name: case.name.clone(),
                    elapsed_ms: duration_ms(elapsed),
                    detected,
                }
            })
            .collect();

        let (normal_ms, injected_ms) = compare_timings_with_warmup(
            &config.template,
            &config.normal_query,
            &config.injected_query,
            config.warmup_iterations,
        );

        Self {
            template: config.template.clone(),
            template_skeleton: guard.skeleton().to_string(),
            normal,
            injected,
            attacks,
            timing: TimeComparison {
                normal_ms,
                injected_ms,
            },
            metrics: metrics.summary(),
        }
    }

    /// Number of catalog entries flagged as injections
    pub fn detected_attacks(&self) -> usize {
        self.attacks.iter().filter(|a| a.detected).count()
    }

    /// Render the report as a plain-text table
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_sample(out, "normal", &self.normal)?;
        writeln!(out, "\n{}\n", "-".repeat(SECTION_WIDTH))?;
        write_sample(out, "injected", &self.injected)?;

        writeln!(out, "\nResponse Time for Different Attack Types:")?;
        writeln!(out, "-----------------------------------------")?;
        writeln!(
            out,
            "{:<15} {:<20} {:<10}",
            "Attack Type", "Detection Time (ms)", "Result"
        )?;
        writeln!(out, "{}", "-".repeat(SECTION_WIDTH))?;
        for attack in &self.attacks {
            writeln!(
                out,
                "{:<15} {:<20.4} {}",
                attack.name,
                attack.elapsed_ms,
                verdict(attack.detected)
            )?;
        }

        writeln!(out, "\nComputation Time Comparison:")?;
        writeln!(out, "---------------------------")?;
        writeln!(out, "Normal query: {:.4} ms", self.timing.normal_ms)?;
        writeln!(out, "Injected query: {:.4} ms", self.timing.injected_ms)?;

        Ok(())
    }

    /// Render the report as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn sample_check(guard: &QueryGuard, query: &str) -> QueryCheck {
    let comparison = guard.check(query);
    QueryCheck {
        original: query.to_string(),
        normalized: comparison.runtime.to_string(),
        detected: comparison.is_injection(),
    }
}

fn write_sample<W: Write>(out: &mut W, kind: &str, check: &QueryCheck) -> io::Result<()> {
    writeln!(out, "Testing {} query...", kind)?;
    writeln!(out, "Original: {}", check.original)?;
    writeln!(out, "Normalized: {}", check.normalized)?;
    if check.detected {
        writeln!(out, "RESULT: SQL injection detected!")
    } else {
        writeln!(out, "RESULT: No SQL injection detected.")
    }
}

fn verdict(detected: bool) -> &'static str {
    if detected {
        "Detected"
    } else {
        "Not Detected"
    }
}
