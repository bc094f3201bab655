//! Attack Catalog
//!
//! Ordered, immutable table of named attack queries used to exercise a
//! template. The built-in catalog targets the student lookup template.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Template the built-in catalog is written against
pub const DEFAULT_TEMPLATE: &str = "SELECT * FROM STUDENT WHERE RNO='$rollno' AND NAME='$name';";

/// Legitimate instantiation of [`DEFAULT_TEMPLATE`]
pub const DEFAULT_NORMAL_QUERY: &str = "SELECT * FROM STUDENT WHERE RNO='1001' AND NAME='AJAY';";

/// Injected instantiation of [`DEFAULT_TEMPLATE`]
pub const DEFAULT_INJECTED_QUERY: &str =
    "SELECT * FROM STUDENT WHERE RNO='1' OR '1'='1'--' AND NAME='AJAY';";

/// A named attack query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackCase {
    pub name: String,
    pub query: String,
}

impl AttackCase {
    pub fn new(name: &str, query: &str) -> Self {
        Self {
            name: name.to_string(),
            query: query.to_string(),
        }
    }
}

/// Ordered set of attack cases with unique names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttackCatalog {
    cases: Vec<AttackCase>,
}

impl AttackCatalog {
    /// Build a catalog, rejecting empty input and duplicate names
    pub fn from_cases(cases: Vec<AttackCase>) -> Result<Self, ConfigError> {
        if cases.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        for (i, case) in cases.iter().enumerate() {
            if cases[..i].iter().any(|c| c.name == case.name) {
                return Err(ConfigError::DuplicateAttack(case.name.clone()));
            }
        }

        Ok(Self { cases })
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttackCase> {
        self.cases.iter()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Look up an attack by name
    pub fn get(&self, name: &str) -> Option<&AttackCase> {
        self.cases.iter().find(|c| c.name == name)
    }
}

impl Default for AttackCatalog {
    fn default() -> Self {
        Self {
            cases: vec![
                AttackCase::new(
                    "Tautology",
                    "SELECT * FROM STUDENT WHERE RNO='1' OR '1'='1' AND NAME='AJAY';",
                ),
                AttackCase::new(
                    "Union",
                    "SELECT * FROM STUDENT WHERE RNO='1' UNION SELECT username, password FROM users--' AND NAME='AJAY';",
                ),
                AttackCase::new(
                    "Comment",
                    "SELECT * FROM STUDENT WHERE RNO='1'--' AND NAME='AJAY';",
                ),
                AttackCase::new(
                    "Piggy-backed",
                    "SELECT * FROM STUDENT WHERE RNO='1001'; DROP TABLE STUDENT;--' AND NAME='AJAY';",
                ),
            ],
        }
    }
}

impl<'a> IntoIterator for &'a AttackCatalog {
    type Item = &'a AttackCase;
    type IntoIter = std::slice::Iter<'a, AttackCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::is_injection;

    #[test]
    fn test_default_catalog_order() {
        let catalog = AttackCatalog::default();
        let names: Vec<_> = catalog.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Tautology", "Union", "Comment", "Piggy-backed"]);
    }

    #[test]
    fn test_default_catalog_detected() {
        for case in &AttackCatalog::default() {
            assert!(
                is_injection(DEFAULT_TEMPLATE, &case.query),
                "Failed to detect {}",
                case.name
            );
        }
    }

    #[test]
    fn test_default_queries() {
        assert!(!is_injection(DEFAULT_TEMPLATE, DEFAULT_NORMAL_QUERY));
        assert!(is_injection(DEFAULT_TEMPLATE, DEFAULT_INJECTED_QUERY));
    }

    #[test]
    fn test_from_cases_rejects_empty() {
        assert!(matches!(
            AttackCatalog::from_cases(vec![]),
            Err(ConfigError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_from_cases_rejects_duplicates() {
        let result = AttackCatalog::from_cases(vec![
            AttackCase::new("Union", "a"),
            AttackCase::new("Comment", "b"),
            AttackCase::new("Union", "c"),
        ]);
        assert!(matches!(result, Err(ConfigError::DuplicateAttack(name)) if name == "Union"));
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = AttackCatalog::default();
        assert!(catalog.get("Comment").is_some());
        assert!(catalog.get("Blind").is_none());
        assert_eq!(catalog.len(), 4);
    }
}
