//! Query Normalizer
//!
//! Reduces a SQL query to its structural skeleton by stripping the tokens that
//! carry values:
//! - Single-quoted literals collapse to an empty literal (`''`)
//! - Digit runs after a comparison operator are removed, leaving the operator
//!   followed by one space
//!
//! The passes run in that order. Neither pass fails: text that does not match
//! (unbalanced quotes, non-SQL input) is carried into the skeleton unchanged.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Replacement for every quoted literal
pub const EMPTY_LITERAL: &str = "''";

// Quoted literal: a quote, any run of non-quote characters, a quote
static QUOTED_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'[^']*'").unwrap());

// Comparison operator followed by a numeric value. Alternation order matters:
// `>` is tried before `>=`, so `>=18` only matches through the `>=` branch.
// The gap also admits the information separators U+001C..U+001F, which
// `\s` (Unicode White_Space) leaves out.
static NUMERIC_COMPARISON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(=|>|<|>=|<=)[\s\x1C-\x1F]*\d+").unwrap());

/// Normalize a query into its skeleton string
pub fn normalize(query: &str) -> String {
    let without_literals = strip_literals(query);
    strip_numeric_comparisons(&without_literals)
}

/// First pass: collapse each quoted literal into `''`
pub fn strip_literals(query: &str) -> String {
    QUOTED_LITERAL.replace_all(query, EMPTY_LITERAL).into_owned()
}

/// Second pass: drop the numeric value after each comparison operator
pub fn strip_numeric_comparisons(query: &str) -> String {
    NUMERIC_COMPARISON.replace_all(query, "${1} ").into_owned()
}

/// Structural shape of a query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Skeleton(String);

impl Skeleton {
    /// Normalize `query` into a skeleton
    pub fn of(query: &str) -> Self {
        Skeleton(normalize(query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Skeleton {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
