//! Aggregated request validation.
//!
//! Each endpoint declares its required-field checks up front and collects
//! every failure before answering, so a request missing three fields learns
//! about all three at once instead of one per round trip.

use std::fmt;

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collects field checks for one request.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Require a non-blank string value.
    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, format!("{field} is required"));
        }
    }

    /// Record a failure unless `ok` holds.
    pub fn check(&mut self, field: &'static str, ok: bool, message: impl Into<String>) {
        if !ok {
            self.push(field, message);
        }
    }

    /// Consume the validator, failing if any check was recorded.
    ///
    /// # Errors
    ///
    /// Returns all collected [`FieldError`]s as one [`ValidationErrors`].
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

/// All field failures for one request, rendered as a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_ok_when_no_errors() {
        let mut v = Validator::new();
        v.require("name", "Rice Cooker");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_require_rejects_blank() {
        let mut v = Validator::new();
        v.require("name", "   ");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].field, "name");
        assert_eq!(errors.to_string(), "name is required");
    }

    #[test]
    fn test_collects_all_failures() {
        let mut v = Validator::new();
        v.require("name", "");
        v.require("email", "");
        v.check("price", false, "price must be a positive number");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.errors().len(), 3);
        assert_eq!(
            errors.to_string(),
            "name is required; email is required; price must be a positive number"
        );
    }

    #[test]
    fn test_check_passes_when_ok() {
        let mut v = Validator::new();
        v.check("quantity", true, "quantity must be positive");
        assert!(v.finish().is_ok());
    }
}
