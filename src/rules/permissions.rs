//! QDRANT_CLOUD_PERMISSIONS_BREAKING - detects breaking changes in method permissions
//!
//! A method's permissions are combined with AND logic when
//! `requires_all_permissions` is `true` (the default) and with OR logic when it
//! is `false`.
//!
//! Breaking:
//! - adding permissions to a method that had none
//! - removing all permissions from a method
//! - switching from OR to AND
//! - any change of the permission set under AND
//! - removing a permission under OR
//!
//! Not breaking:
//! - switching from AND to OR
//! - adding a permission under OR
//! - new methods, which have nothing to be compared against

use crate::descriptor::{MethodDescriptor, OptionValue};
use crate::error::Result;
use crate::rules::extensions::{PERMISSIONS, REQUIRES_ALL_PERMISSIONS};
use crate::rules::types::{Annotation, CheckRequest, bracket_list};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub const PERMISSIONS_BREAKING_RULE_ID: &str = "QDRANT_CLOUD_PERMISSIONS_BREAKING";

/// Permission configuration of one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionConfig {
    /// Trimmed, non-empty, sorted and unique
    pub permissions: Vec<String>,
    /// `true` = AND (default), `false` = OR
    pub requires_all: bool,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            permissions: Vec::new(),
            requires_all: true,
        }
    }
}

impl PermissionConfig {
    pub fn new<I, S>(permissions: I, requires_all: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let permissions: BTreeSet<String> = permissions
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            permissions: permissions.into_iter().collect(),
            requires_all,
        }
    }

    /// Reads the permission options of a method.
    pub fn from_method(method: &MethodDescriptor) -> Self {
        let permissions = method
            .option(PERMISSIONS)
            .and_then(OptionValue::as_strings)
            .unwrap_or_default();
        let requires_all = method
            .option(REQUIRES_ALL_PERMISSIONS)
            .and_then(OptionValue::as_bool)
            .unwrap_or(true);
        Self::new(permissions, requires_all)
    }

    fn has_permissions(&self) -> bool {
        !self.permissions.is_empty()
    }

    fn permission_set(&self) -> BTreeSet<&str> {
        self.permissions.iter().map(String::as_str).collect()
    }
}

/// Decides whether going from `against` to `current` can deny a caller that
/// was previously allowed.
pub fn is_breaking_change(against: &PermissionConfig, current: &PermissionConfig) -> bool {
    if against == current {
        return false;
    }

    if against.requires_all != current.requires_all {
        // AND -> OR only widens access; OR -> AND narrows it.
        return !against.requires_all;
    }

    match (against.has_permissions(), current.has_permissions()) {
        (false, true) | (true, false) => true,
        (true, true) if against.requires_all => against.permissions != current.permissions,
        (true, true) => {
            let current_set = current.permission_set();
            against
                .permissions
                .iter()
                .any(|p| !current_set.contains(p.as_str()))
        }
        (false, false) => false,
    }
}

/// Which wording a breaking change is reported with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakingReason {
    /// The method had permissions and now has none
    AllRemoved,
    /// The method had no permissions and now has some
    Added,
    /// `requires_all_permissions` changed
    LogicChanged,
    /// The permission set changed under the same logic
    SetChanged,
}

/// Classifies a change, returning `None` when it is not breaking.
pub fn classify(against: &PermissionConfig, current: &PermissionConfig) -> Option<BreakingReason> {
    if !is_breaking_change(against, current) {
        return None;
    }

    let reason = if !current.has_permissions() {
        BreakingReason::AllRemoved
    } else if !against.has_permissions() {
        BreakingReason::Added
    } else if against.requires_all != current.requires_all {
        BreakingReason::LogicChanged
    } else {
        BreakingReason::SetChanged
    };
    Some(reason)
}

impl BreakingReason {
    pub fn message(self, method: &str, against: &PermissionConfig, current: &PermissionConfig) -> String {
        match self {
            BreakingReason::AllRemoved => format!(
                "Method \"{method}\" had permissions {} but now has no permissions, this is a breaking change",
                bracket_list(&against.permissions)
            ),
            BreakingReason::Added => format!(
                "Method \"{method}\" had no permissions but now requires permissions {}, this is a breaking change",
                bracket_list(&current.permissions)
            ),
            BreakingReason::LogicChanged => format!(
                "Method \"{method}\" permissions logic changed from requires_all={} to requires_all={} with permissions {} to {}, this is a breaking change",
                against.requires_all,
                current.requires_all,
                bracket_list(&against.permissions),
                bracket_list(&current.permissions)
            ),
            BreakingReason::SetChanged => format!(
                "Method \"{method}\" permissions changed from {} to {} (requires_all={}), this is a breaking change",
                bracket_list(&against.permissions),
                bracket_list(&current.permissions),
                current.requires_all
            ),
        }
    }
}

pub fn check_permissions_breaking(request: &CheckRequest<'_>) -> Result<Vec<Annotation>> {
    let against_methods: HashMap<&str, &MethodDescriptor> = request
        .checked_against_files()
        .flat_map(|file| file.methods())
        .map(|method| (method.full_name.as_str(), method))
        .collect();

    let mut annotations = Vec::new();
    for file in request.checked_files() {
        for method in file.methods() {
            let Some(against_method) = against_methods.get(method.full_name.as_str()) else {
                debug!(method = %method.full_name, "new method, nothing to compare");
                continue;
            };

            let against = PermissionConfig::from_method(against_method);
            let current = PermissionConfig::from_method(method);
            if let Some(reason) = classify(&against, &current) {
                annotations.push(Annotation::at(
                    PERMISSIONS_BREAKING_RULE_ID,
                    reason.message(&method.full_name, &against, &current),
                    file,
                    method.span,
                ));
            }
        }
    }

    Ok(annotations)
}
