//! Rule execution engine
//!
//! Selects rules from the configuration, runs them over one request and
//! collects their annotations. A rule that fails (e.g. on a malformed option)
//! is recorded and the remaining rules still run.

use crate::descriptor::FileDescriptor;
use crate::error::{Error, Result};
use crate::rules::config::{CheckConfig, RuleSelection};
use crate::rules::extensions;
use crate::rules::registry::{self, RuleType};
use crate::rules::types::{Annotation, CheckRequest};
use serde::Serialize;
use tracing::{debug, warn};

/// A rule that aborted instead of producing annotations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub rule_id: String,
    pub error: String,
}

/// Result of a check run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    /// Annotations in rule order, then in evaluation order within each rule
    pub annotations: Vec<Annotation>,
    /// Rules that ran to completion
    pub executed_rules: Vec<String>,
    /// Rules that aborted
    pub failed_rules: Vec<RuleFailure>,
}

impl CheckResult {
    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.annotations.is_empty() && self.failed_rules.is_empty()
    }
}

/// Main engine for running lint and breaking rules
#[derive(Debug)]
pub struct CheckEngine {
    // Stateless; rules come from the static registry.
    _private: (),
}

impl CheckEngine {
    /// Creates an engine after validating the extension and rule registries.
    pub fn new() -> Result<Self> {
        extensions::verify_registry()?;
        registry::verify_rules().map_err(Error::Registry)?;
        Ok(Self { _private: () })
    }

    /// Runs the selected lint rules over `files`.
    pub fn lint(&self, files: &[FileDescriptor], config: &CheckConfig) -> CheckResult {
        let request = CheckRequest::new(files, &config.options);
        self.run(RuleType::Lint, &config.lint, &request)
    }

    /// Runs the selected breaking rules, comparing `files` against `against_files`.
    pub fn breaking(
        &self,
        files: &[FileDescriptor],
        against_files: &[FileDescriptor],
        config: &CheckConfig,
    ) -> CheckResult {
        let request = CheckRequest::new(files, &config.options).with_against(against_files);
        self.run(RuleType::Breaking, &config.breaking, &request)
    }

    fn run(&self, rule_type: RuleType, selection: &RuleSelection, request: &CheckRequest<'_>) -> CheckResult {
        let mut result = CheckResult::default();

        for spec in registry::rules() {
            if spec.rule_type != rule_type || !selection.is_selected(spec.id, spec.default) {
                continue;
            }

            match (spec.handler)(request) {
                Ok(annotations) => {
                    debug!(rule = spec.id, annotations = annotations.len(), "rule executed");
                    result.executed_rules.push(spec.id.to_string());
                    result.annotations.extend(annotations);
                }
                Err(err) => {
                    warn!(rule = spec.id, error = %err, "rule failed");
                    result.failed_rules.push(RuleFailure {
                        rule_id: spec.id.to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        result
    }
}
