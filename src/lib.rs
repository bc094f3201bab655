//! Zentinel SQL Guard Library
//!
//! Structural SQL injection detection. A runtime query is compared against the
//! static template it was built from after both are reduced to a skeleton:
//! quoted literals collapse to `''` and numeric values after comparison
//! operators are dropped. Value substitution keeps the skeleton intact;
//! injected syntax does not.
//!
//! # Features
//!
//! - **Normalizer**: two fixed rewrite passes, total over all input
//! - **Comparator**: exact skeleton equality with divergence offset
//! - **Query Guard**: template bound once, checked many times, with metrics
//! - **Report**: timing table over a catalog of named attacks
//!
//! The detector is a heuristic. Injected text that normalizes to the template
//! skeleton is missed, and legitimate values containing quotes are flagged.
//!
//! # Example
//!
//! ```
//! use zentinel_sqlguard::{is_injection, normalize};
//!
//! let template = "SELECT * FROM STUDENT WHERE RNO='$rollno' AND NAME='$name';";
//!
//! assert!(!is_injection(template, "SELECT * FROM STUDENT WHERE RNO='1001' AND NAME='AJAY';"));
//! assert!(is_injection(template, "SELECT * FROM STUDENT WHERE RNO='1' OR '1'='1' AND NAME='AJAY';"));
//! assert_eq!(normalize("WHERE age>=18"), "WHERE age>= ");
//! ```

pub mod catalog;
pub mod comparator;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod normalizer;
pub mod report;
pub mod timing;

// Re-exports for convenience
pub use catalog::{AttackCase, AttackCatalog};
pub use comparator::{compare, is_injection, Comparison};
pub use config::{HarnessConfig, HarnessConfigJson};
pub use engine::QueryGuard;
pub use error::ConfigError;
pub use metrics::{DetectionMetrics, MetricsConfig, MetricsSummary};
pub use normalizer::{normalize, Skeleton};
pub use report::Report;
pub use timing::{
    compare_timings, compare_timings_with_warmup, measure_with_warmup, time_with_warmup,
    timed_is_injection, TimedDetection,
};
