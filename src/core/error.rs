use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EavError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(ValidationReport),

    #[error("Unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, EavError>;

impl EavError {
    /// Validation failure for a single attribute.
    pub fn validation(slug: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation(ValidationReport::single(slug, reason))
    }
}

/// Per-attribute validation failures collected during a full-entity check.
///
/// A save must report every offending slug, not just the first, so the
/// caller (typically a form layer) can highlight all bad fields at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    failures: Vec<(String, String)>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(slug: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.add(slug, reason);
        report
    }

    pub fn add(&mut self, slug: impl Into<String>, reason: impl Into<String>) {
        self.failures.push((slug.into(), reason.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// `(slug, reason)` pairs in the order the failures were recorded.
    pub fn failures(&self) -> &[(String, String)] {
        &self.failures
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.failures.iter().map(|(slug, _)| slug.as_str()).collect()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.failures.iter().any(|(s, _)| s == slug)
    }

    /// Ok if no failures were recorded, the full report otherwise.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EavError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: ")?;
        for (i, (slug, reason)) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "'{}': {}", slug, reason)?;
        }
        Ok(())
    }
}

impl From<serde_json::Error> for EavError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_collects_all_failures() {
        let mut report = ValidationReport::new();
        report.add("rating", "cannot be blank");
        report.add("tags", "must be a string");

        assert_eq!(report.len(), 2);
        assert!(report.contains("rating"));
        assert!(report.contains("tags"));

        let err = report.into_result().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'rating'"));
        assert!(message.contains("'tags'"));
    }

    #[test]
    fn test_empty_report_is_ok() {
        assert!(ValidationReport::new().into_result().is_ok());
    }
}
