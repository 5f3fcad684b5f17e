//! Configuration error types.

use std::fmt;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

/// Configuration-related errors. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file `{0}` not found in this directory or any parent")]
    NotFound(PathBuf),

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),

    // No #[from]: the diagnostics already render every message
    #[error("{0}")]
    Invalid(ConfigDiagnostics),
}

/// One invalid field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    /// Dotted field path, e.g. `site.url`
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{} {} {}",
            "[".dimmed(),
            self.field.cyan(),
            "]".dimmed(),
            "→".red(),
            self.message
        )
    }
}

/// Validation errors collected across all sections, reported at once.
#[derive(Debug, Default, Clone)]
pub struct ConfigDiagnostics {
    errors: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(ConfigDiagnostic {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ConfigDiagnostic] {
        &self.errors
    }

    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(self))
        }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.errors.len();
        writeln!(
            f,
            "invalid configuration ({count} error{}):",
            if count == 1 { "" } else { "s" }
        )?;
        for (i, diag) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_diagnostics_ok() {
        assert!(ConfigDiagnostics::new().into_result().is_ok());
    }

    #[test]
    fn test_diagnostics_collect_all() {
        let mut diag = ConfigDiagnostics::new();
        diag.error("site.url", "must be absolute");
        diag.error("site.title", "must not be empty");

        let err = diag.into_result().unwrap_err();
        let ConfigError::Invalid(diag) = &err else {
            panic!("expected Invalid, got {err:?}");
        };
        assert_eq!(diag.errors().len(), 2);

        let text = err.to_string();
        assert!(text.contains("2 errors"));
        assert!(text.contains("must be absolute"));
        assert!(text.contains("must not be empty"));
    }
}
