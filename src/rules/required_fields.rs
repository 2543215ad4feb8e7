//! Required-field rules for entity and request messages
//!
//! - `QDRANT_CLOUD_REQUIRED_ENTITY_FIELDS`: entity messages (e.g. `Book`, found
//!   through `ListBooks`/`GetBook`/...) declare a common set of fields and
//!   avoid discouraged field names.
//! - `QDRANT_CLOUD_REQUIRED_REQUEST_FIELDS`: `List*Request`, `Get*Request` and
//!   `Delete*Request` messages declare a common set of fields.

use crate::error::Result;
use crate::rules::entity::{CRUD_METHOD_PREFIXES, CrudKind, EnglishSingularizer, extract_entity_names};
use crate::rules::types::{Annotation, CheckRequest};
use crate::rules::validators::{
    DiscouragedFieldNames, MessageValidator, RequiredFields, validate_message,
};
use tracing::debug;

pub const REQUIRED_ENTITY_FIELDS_RULE_ID: &str = "QDRANT_CLOUD_REQUIRED_ENTITY_FIELDS";
pub const REQUIRED_ENTITY_FIELDS_OPTION_KEY: &str = "required_entity_fields";
pub const REQUIRED_REQUEST_FIELDS_RULE_ID: &str = "QDRANT_CLOUD_REQUIRED_REQUEST_FIELDS";
pub const REQUIRED_REQUEST_FIELDS_OPTION_KEY: &str = "required_request_fields";

pub const DEFAULT_REQUIRED_ENTITY_FIELDS: &[&str] = &["id", "name", "account_id", "created_at"];
pub const DEFAULT_REQUIRED_REQUEST_FIELDS: &[&str] = &["account_id"];

/// QDRANT_CLOUD_REQUIRED_ENTITY_FIELDS - checks entity messages define the common fields
pub fn check_entity_fields(request: &CheckRequest<'_>) -> Result<Vec<Annotation>> {
    let required = request
        .options
        .string_list_or(REQUIRED_ENTITY_FIELDS_OPTION_KEY, DEFAULT_REQUIRED_ENTITY_FIELDS)?;
    let required = RequiredFields::new("Entity", required);
    let discouraged = DiscouragedFieldNames::default();
    let singularizer = EnglishSingularizer;

    let mut annotations = Vec::new();
    for file in request.checked_files() {
        for entity in extract_entity_names(file, &singularizer) {
            // An inferred name without a matching message is not an entity of this file.
            let Some(message) = file.message_by_name(&entity) else {
                debug!(file = %file.name, entity = %entity, "no message for inferred entity");
                continue;
            };

            annotations.extend(
                validate_message(message, &[&discouraged], &[&required])
                    .into_iter()
                    .map(|error| error.into_annotation(REQUIRED_ENTITY_FIELDS_RULE_ID, file)),
            );
        }
    }

    Ok(annotations)
}

/// QDRANT_CLOUD_REQUIRED_REQUEST_FIELDS - checks List/Get/Delete request messages define the common fields
pub fn check_request_fields(request: &CheckRequest<'_>) -> Result<Vec<Annotation>> {
    let required = request
        .options
        .string_list_or(REQUIRED_REQUEST_FIELDS_OPTION_KEY, DEFAULT_REQUIRED_REQUEST_FIELDS)?;
    let required = RequiredFields::new("Request", required);

    let mut annotations = Vec::new();
    for file in request.checked_files() {
        for message in file.all_messages() {
            if !is_checked_request(&message.name) {
                continue;
            }
            if let Some(error) = required.check_message(message) {
                annotations.push(error.into_annotation(REQUIRED_REQUEST_FIELDS_RULE_ID, file));
            }
        }
    }

    Ok(annotations)
}

/// Create/Update requests are exempt; they would need an `{entity}_id` check instead.
fn is_checked_request(message_name: &str) -> bool {
    message_name.ends_with("Request")
        && CRUD_METHOD_PREFIXES
            .iter()
            .any(|(prefix, kind)| *kind == CrudKind::Collection && message_name.starts_with(prefix))
}
