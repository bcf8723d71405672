//! Error types for Horizon Forms.
//!
//! Construction-time errors (`DuplicateRegistration`, `InvalidDependency`,
//! `DependencyTargetNotFound`, `CallbackNotFound`, `OptionsProviderNotFound`,
//! `LocalizationMissing`) abort form construction. Per-field validation
//! failures are not errors: they are recorded as a part's invalid state.

/// A specialized Result type for Horizon Forms operations.
pub type Result<T> = std::result::Result<T, FormError>;

/// The error type for form construction, localization and commit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// A builder is already registered for this descriptor kind.
    #[error("Field builder for kind '{kind}' already exists and override is not allowed")]
    DuplicateRegistration { kind: String },

    /// A localization key could not be resolved.
    #[error("Local key '{key}' not found for language '{language}'")]
    LocalizationMissing { key: String, language: String },

    /// A dependency declaration is malformed (e.g. names its own member).
    #[error("Invalid dependency on member '{member}': {reason}")]
    InvalidDependency { member: String, reason: String },

    /// A dependency names a member that is not bound on the form.
    #[error("Dependency target '{member}' not found")]
    DependencyTargetNotFound { member: String },

    /// No update callback could be resolved for a dependency.
    #[error("Dependency callback '{callback}' not found in type '{type_name}'")]
    CallbackNotFound { callback: String, type_name: String },

    /// A selection field names an options provider that does not exist.
    #[error("Options provider '{provider}' not found in type '{type_name}'")]
    OptionsProviderNotFound { provider: String, type_name: String },

    /// Commit was attempted while at least one field is invalid.
    #[error("Invalid input in: {}", invalid.join(", "))]
    FormInvalid { invalid: Vec<String> },

    /// A value of an unexpected type reached a typed preview or member setter.
    #[error("Expected a value of type {expected}, got {got}")]
    UnsupportedInputType {
        expected: &'static str,
        got: &'static str,
    },

    /// Configuration could not be parsed.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl FormError {
    /// Create a localization error.
    pub fn localization_missing(key: impl Into<String>, language: impl Into<String>) -> Self {
        Self::LocalizationMissing {
            key: key.into(),
            language: language.into(),
        }
    }

    /// Create an invalid dependency error.
    pub fn invalid_dependency(member: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDependency {
            member: member.into(),
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn unsupported_input(expected: &'static str, got: &'static str) -> Self {
        Self::UnsupportedInputType { expected, got }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error aborts form construction.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRegistration { .. }
                | Self::LocalizationMissing { .. }
                | Self::InvalidDependency { .. }
                | Self::DependencyTargetNotFound { .. }
                | Self::CallbackNotFound { .. }
                | Self::OptionsProviderNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_invalid_lists_members() {
        let err = FormError::FormInvalid {
            invalid: vec!["name".into(), "age".into()],
        };
        assert_eq!(err.to_string(), "Invalid input in: name, age");
        assert!(!err.is_construction_error());
    }

    #[test]
    fn test_construction_errors() {
        assert!(FormError::invalid_dependency("a", "self").is_construction_error());
        assert!(FormError::localization_missing("k", "en").is_construction_error());
        assert!(!FormError::unsupported_input("bool", "text").is_construction_error());
    }
}
