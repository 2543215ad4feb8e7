//! Field and message validators used by the required-fields rules

use crate::descriptor::{FieldDescriptor, MessageDescriptor};
use crate::rules::types::{ValidationError, bracket_list};
use std::collections::HashSet;

/// Discouraged field name -> preferred field name
pub const DISCOURAGED_FIELD_NAMES: &[(&str, &str)] = &[
    ("updated_at", "last_modified_at"),
    ("cloud_region", "cloud_provider_region_id"),
];

/// A check applied to each field of a message
pub trait FieldValidator {
    fn check_field(&self, field: &FieldDescriptor) -> Option<ValidationError>;
}

/// A check applied to a message as a whole
pub trait MessageValidator {
    fn check_message(&self, message: &MessageDescriptor) -> Option<ValidationError>;
}

/// Returns the names in `required` that `message` does not declare.
///
/// The result follows the order of `required` and lists each name once.
pub fn missing_fields(message: &MessageDescriptor, required: &[String]) -> Vec<String> {
    let declared: HashSet<&str> = message.field_names().collect();
    let mut reported = HashSet::new();

    required
        .iter()
        .filter(|name| !declared.contains(name.as_str()))
        .filter(|name| reported.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Requires a message to declare a set of fields.
#[derive(Debug, Clone)]
pub struct RequiredFields {
    /// Label used in the message, e.g. `Entity` or `Request`
    kind: &'static str,
    fields: Vec<String>,
}

impl RequiredFields {
    pub fn new(kind: &'static str, fields: Vec<String>) -> Self {
        Self { kind, fields }
    }
}

impl MessageValidator for RequiredFields {
    fn check_message(&self, message: &MessageDescriptor) -> Option<ValidationError> {
        let missing = missing_fields(message, &self.fields);
        if missing.is_empty() {
            return None;
        }
        Some(ValidationError::new(
            format!(
                "{} \"{}\" is missing required fields: {}",
                self.kind,
                message.name,
                bracket_list(&missing)
            ),
            message.span,
        ))
    }
}

/// Flags field names that have a preferred replacement.
#[derive(Debug, Clone, Copy)]
pub struct DiscouragedFieldNames {
    mapping: &'static [(&'static str, &'static str)],
}

impl DiscouragedFieldNames {
    pub fn new(mapping: &'static [(&'static str, &'static str)]) -> Self {
        Self { mapping }
    }
}

impl Default for DiscouragedFieldNames {
    fn default() -> Self {
        Self::new(DISCOURAGED_FIELD_NAMES)
    }
}

impl FieldValidator for DiscouragedFieldNames {
    fn check_field(&self, field: &FieldDescriptor) -> Option<ValidationError> {
        let (_, preferred) = self
            .mapping
            .iter()
            .find(|(discouraged, preferred)| *discouraged == field.name && *preferred != field.name)?;

        Some(ValidationError::new(
            format!(
                "field \"{}\" is discouraged, use \"{}\" instead",
                field.name, preferred
            ),
            field.span,
        ))
    }
}

/// Runs all field validators over every field, then the message validators.
///
/// Field-level errors come first, in field declaration order.
pub fn validate_message(
    message: &MessageDescriptor,
    field_validators: &[&dyn FieldValidator],
    message_validators: &[&dyn MessageValidator],
) -> Vec<ValidationError> {
    let field_errors = message.fields.iter().flat_map(|field| {
        field_validators
            .iter()
            .filter_map(move |validator| validator.check_field(field))
    });
    let message_errors = message_validators
        .iter()
        .filter_map(|validator| validator.check_message(message));

    field_errors.chain(message_errors).collect()
}
