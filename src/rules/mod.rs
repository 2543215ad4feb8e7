//! API convention rules
//!
//! Lint rules check a single version of the schema; breaking rules compare it
//! against a previous version. Every rule is a pure function of its
//! [`CheckRequest`] and can run concurrently with any other.

pub mod config;
pub mod engine;
pub mod entity;
pub mod extensions;
pub mod method_options;
pub mod permissions;
pub mod registry;
pub mod required_fields;
pub mod types;
pub mod validators;

pub use config::{CheckConfig, PluginOptions, RuleSelection};
pub use engine::{CheckEngine, CheckResult, RuleFailure};
pub use registry::{RuleSpec, RuleType};
pub use types::{Annotation, CheckRequest, FileLocation, ValidationError};
