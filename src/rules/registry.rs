//! Static table of every rule the engine can run

use crate::error::Result;
use crate::rules::method_options::{self, METHOD_OPTIONS_RULE_ID};
use crate::rules::permissions::{self, PERMISSIONS_BREAKING_RULE_ID};
use crate::rules::required_fields::{
    self, REQUIRED_ENTITY_FIELDS_RULE_ID, REQUIRED_REQUEST_FIELDS_RULE_ID,
};
use crate::rules::types::{Annotation, CheckRequest};
use serde::Serialize;
use std::collections::HashSet;

/// Whether a rule inspects one version of the files or compares two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleType {
    Lint,
    Breaking,
}

pub type RuleHandler = fn(&CheckRequest<'_>) -> Result<Vec<Annotation>>;

/// Description of a single rule
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub id: &'static str,
    pub purpose: &'static str,
    pub rule_type: RuleType,
    /// Run when the configuration does not name rules explicitly
    pub default: bool,
    pub handler: RuleHandler,
}

const RULES: &[RuleSpec] = &[
    RuleSpec {
        id: REQUIRED_ENTITY_FIELDS_RULE_ID,
        purpose: "Checks that all entity-related messages (e.g: Cluster) define a known set of fields.",
        rule_type: RuleType::Lint,
        default: true,
        handler: required_fields::check_entity_fields,
    },
    RuleSpec {
        id: REQUIRED_REQUEST_FIELDS_RULE_ID,
        purpose: "Checks that all request messages (e.g: ListClustersRequest) define a known set of fields.",
        rule_type: RuleType::Lint,
        default: true,
        handler: required_fields::check_request_fields,
    },
    RuleSpec {
        id: METHOD_OPTIONS_RULE_ID,
        purpose: "Checks that all rpc methods define a set of required options.",
        rule_type: RuleType::Lint,
        default: true,
        handler: method_options::check_method_options,
    },
    RuleSpec {
        id: PERMISSIONS_BREAKING_RULE_ID,
        purpose: "Checks for breaking changes in method permissions.",
        rule_type: RuleType::Breaking,
        default: true,
        handler: permissions::check_permissions_breaking,
    },
];

/// All registered rules, in execution order.
pub fn rules() -> &'static [RuleSpec] {
    RULES
}

pub fn rule(id: &str) -> Option<&'static RuleSpec> {
    RULES.iter().find(|r| r.id == id)
}

/// Checks rule IDs are unique, SCREAMING_SNAKE_CASE and documented.
pub fn verify_rules() -> std::result::Result<(), String> {
    let mut seen = HashSet::new();
    for spec in RULES {
        if !seen.insert(spec.id) {
            return Err(format!("Duplicate rule ID: {}", spec.id));
        }
        if spec.purpose.is_empty() {
            return Err(format!("Rule {} has no purpose", spec.id));
        }
        if !spec.id.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
            return Err(format!("Rule ID {} is not SCREAMING_SNAKE_CASE", spec.id));
        }
    }
    Ok(())
}
