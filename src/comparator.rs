//! Structural Comparator
//!
//! Normalizes a static template and a runtime query and compares the two
//! skeletons by exact text equality. Legitimate value substitution leaves the
//! skeleton unchanged; injected syntax (extra quotes, keywords, terminators)
//! survives normalization and shows up as a mismatch.

use serde::Serialize;

use crate::normalizer::Skeleton;

/// Outcome of comparing a runtime query against a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    /// Skeleton of the static template
    pub template: Skeleton,
    /// Skeleton of the runtime query
    pub runtime: Skeleton,
    /// Byte offset of the first difference between the skeletons
    pub divergence: Option<usize>,
}

impl Comparison {
    /// Compare two pre-computed skeletons
    pub fn between(template: Skeleton, runtime: Skeleton) -> Self {
        let divergence = first_divergence(template.as_str(), runtime.as_str());
        Self {
            template,
            runtime,
            divergence,
        }
    }

    /// True when the skeletons differ
    pub fn is_injection(&self) -> bool {
        self.divergence.is_some()
    }

    /// Runtime skeleton text from the divergence point on
    pub fn divergent_tail(&self) -> Option<&str> {
        self.divergence.and_then(|at| self.runtime.as_str().get(at..))
    }
}

/// Normalize both queries and compare their skeletons
pub fn compare(static_query: &str, runtime_query: &str) -> Comparison {
    Comparison::between(Skeleton::of(static_query), Skeleton::of(runtime_query))
}

/// True iff the runtime query's skeleton differs from the template's
pub fn is_injection(static_query: &str, runtime_query: &str) -> bool {
    Skeleton::of(static_query) != Skeleton::of(runtime_query)
}

/// Offset of the first differing character, or `None` for equal strings.
/// When one string is a prefix of the other, the offset is the shorter length.
fn first_divergence(a: &str, b: &str) -> Option<usize> {
    if a == b {
        return None;
    }

    let mut left = a.char_indices();
    let mut right = b.chars();
    loop {
        match (left.next(), right.next()) {
            (Some((_, l)), Some(r)) if l == r => continue,
            (Some((at, _)), _) => return Some(at),
            (None, _) => return Some(a.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "SELECT * FROM STUDENT WHERE RNO='$rollno' AND NAME='$name';";

    #[test]
    fn test_legitimate_values_match() {
        let runtime = "SELECT * FROM STUDENT WHERE RNO='1001' AND NAME='AJAY';";
        assert!(!is_injection(TEMPLATE, runtime));

        let comparison = compare(TEMPLATE, runtime);
        assert!(!comparison.is_injection());
        assert_eq!(comparison.template, comparison.runtime);
        assert_eq!(comparison.divergent_tail(), None);
    }

    #[test]
    fn test_tautology_diverges() {
        let runtime = "SELECT * FROM STUDENT WHERE RNO='1' OR '1'='1' AND NAME='AJAY';";
        let comparison = compare(TEMPLATE, runtime);

        assert!(comparison.is_injection());
        assert_eq!(
            comparison.runtime.as_str(),
            "SELECT * FROM STUDENT WHERE RNO='' OR ''='' AND NAME='';"
        );
        assert_eq!(comparison.divergent_tail(), Some("OR ''='' AND NAME='';"));
    }

    #[test]
    fn test_piggy_backed_diverges() {
        let runtime =
            "SELECT * FROM STUDENT WHERE RNO='1001'; DROP TABLE STUDENT;--' AND NAME='AJAY';";
        assert!(is_injection(TEMPLATE, runtime));
        assert_eq!(
            compare(TEMPLATE, runtime).runtime.as_str(),
            "SELECT * FROM STUDENT WHERE RNO=''; DROP TABLE STUDENT;--''AJAY';"
        );
    }

    #[test]
    fn test_truncated_runtime_diverges_at_end() {
        let comparison = compare("SELECT a FROM t;", "SELECT a FROM t");
        assert_eq!(comparison.divergence, Some(15));
        assert_eq!(comparison.divergent_tail(), Some(""));
    }

    #[test]
    fn test_longer_runtime_diverges_at_template_end() {
        let comparison = compare("SELECT a FROM t", "SELECT a FROM t; DROP TABLE t");
        assert_eq!(comparison.divergence, Some(15));
        assert_eq!(comparison.divergent_tail(), Some("; DROP TABLE t"));
    }

    #[test]
    fn test_divergence_on_char_boundary() {
        let comparison = compare("NAME='é' é", "NAME='x' ü");
        assert_eq!(comparison.divergence, Some("NAME='' ".len()));
    }

    #[test]
    fn test_separator_before_numeric_value_matches() {
        assert!(!is_injection("id=0", "id=\x1c5"));
        assert!(!is_injection("SELECT * FROM t WHERE id=0", "SELECT * FROM t WHERE id=\x1f42"));
    }

    #[test]
    fn test_comparison_is_case_and_whitespace_sensitive() {
        assert!(is_injection("select a", "SELECT a"));
        assert!(is_injection("SELECT a", "SELECT  a"));
        assert!(is_injection("SELECT a", "SELECT a "));
    }

    #[test]
    fn test_garbage_input_never_panics() {
        assert!(!is_injection("", ""));
        assert!(is_injection("'", "''"));
        assert!(!is_injection("'''", "'x''"));
    }
}
