//! QDRANT_CLOUD_METHOD_OPTIONS - every RPC method sets the required options
//!
//! By default a method must declare its permissions and an HTTP binding.
//! Methods that opt out of authentication do not need permissions, and a
//! method with permissions must not carry an empty account scoping expression.

use crate::descriptor::{FileDescriptor, MethodDescriptor, OptionValue};
use crate::error::Result;
use crate::rules::extensions::{self, ACCOUNT_ID_EXPRESSION, HTTP, PERMISSIONS, REQUIRES_AUTHENTICATION};
use crate::rules::types::{Annotation, CheckRequest};

pub const METHOD_OPTIONS_RULE_ID: &str = "QDRANT_CLOUD_METHOD_OPTIONS";
pub const METHOD_OPTIONS_OPTION_KEY: &str = "required_method_options";

pub const DEFAULT_REQUIRED_METHOD_OPTIONS: &[&str] = &[PERMISSIONS, HTTP];

pub fn check_method_options(request: &CheckRequest<'_>) -> Result<Vec<Annotation>> {
    let required = request
        .options
        .string_list_or(METHOD_OPTIONS_OPTION_KEY, DEFAULT_REQUIRED_METHOD_OPTIONS)?;

    let mut annotations = Vec::new();
    for file in request.checked_files() {
        for method in file.methods() {
            annotations.extend(check_method(file, method, &required));
        }
    }
    Ok(annotations)
}

fn check_method(file: &FileDescriptor, method: &MethodDescriptor, required: &[String]) -> Vec<Annotation> {
    let mut annotations = Vec::new();

    for key in required {
        let Some(extension) = extensions::lookup(key) else {
            annotations.push(Annotation::unanchored(
                METHOD_OPTIONS_RULE_ID,
                format!("extension key \"{key}\" does not exist"),
            ));
            continue;
        };

        if extension.full_name == PERMISSIONS && is_authentication_exempt(method) {
            continue;
        }

        if !method.has_option(extension.full_name) {
            annotations.push(Annotation::at(
                METHOD_OPTIONS_RULE_ID,
                format!(
                    "Method \"{}\" does not define the \"{}\" option",
                    method.full_name, extension.full_name
                ),
                file,
                method.span,
            ));
        }
    }

    if has_empty_account_scope(method) {
        annotations.push(Annotation::at(
            METHOD_OPTIONS_RULE_ID,
            format!(
                "Method \"{}\" defines permissions but its \"{}\" option is empty",
                method.full_name, ACCOUNT_ID_EXPRESSION
            ),
            file,
            method.span,
        ));
    }

    annotations
}

/// `requires_authentication = false` marks a public method.
fn is_authentication_exempt(method: &MethodDescriptor) -> bool {
    method
        .option(REQUIRES_AUTHENTICATION)
        .and_then(OptionValue::as_bool)
        == Some(false)
}

fn has_permissions(method: &MethodDescriptor) -> bool {
    method
        .option(PERMISSIONS)
        .and_then(OptionValue::as_strings)
        .is_some_and(|perms| perms.iter().any(|p| !p.trim().is_empty()))
}

/// Permissions are set and the scoping expression is present but blank.
fn has_empty_account_scope(method: &MethodDescriptor) -> bool {
    if !has_permissions(method) {
        return false;
    }
    method
        .option(ACCOUNT_ID_EXPRESSION)
        .and_then(OptionValue::as_str)
        .is_some_and(|expr| expr.trim().is_empty())
}
