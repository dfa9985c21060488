//! Error types shared by discovery, planning and configuration

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MpaError>;

/// A single configuration field that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `html.template`
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All violations found in one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(pub Vec<FieldViolation>);

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, violation) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}. {} {}", index + 1, violation.field, violation.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MpaError {
    #[error("invalid options in mpa config\n{0}")]
    Config(Violations),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid extension pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("no pages selected, choose at least one")]
    EmptySelection,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize build plan: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl MpaError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}
