//! Error types for rule evaluation and descriptor loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for proto-conventions operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a rule invocation or a load.
///
/// Convention violations are never errors; they are reported as
/// [`Annotation`](crate::rules::Annotation)s.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A plugin option has a value of the wrong shape
    #[error("invalid value for option \"{key}\": {reason}")]
    InvalidOption {
        /// The option key, e.g. `required_entity_fields`
        key: String,
        /// What was wrong with the value
        reason: String,
    },

    /// The configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Failed to read an input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A serialized descriptor set could not be decoded
    #[error("failed to decode FileDescriptorSet: {0}")]
    DescriptorDecode(#[from] protobuf::Error),

    /// Proto sources could not be parsed into descriptors
    #[error("failed to load proto sources: {0}")]
    Load(String),

    /// The rule or extension registry failed its consistency check
    #[error("invalid registry: {0}")]
    Registry(String),
}

impl Error {
    pub(crate) fn invalid_option(key: &str, reason: impl Into<String>) -> Self {
        Error::InvalidOption {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
