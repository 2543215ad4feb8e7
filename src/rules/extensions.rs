//! Registry of the custom method options the rules understand
//!
//! Custom options arrive as unknown fields on `MethodOptions`. The adapter
//! decodes them through this table, and the method-options rule validates
//! configured keys against it.

use crate::error::{Error, Result};
use const_format::concatcp;
use std::collections::HashSet;

/// Package that declares the API's method-level extensions
pub const COMMON_PACKAGE: &str = "qdrant.cloud.common.v1";

/// Permissions a caller needs to invoke the method (repeated string)
pub const PERMISSIONS: &str = concatcp!(COMMON_PACKAGE, ".permissions");
/// Set to `false` to mark a method as callable without authentication
pub const REQUIRES_AUTHENTICATION: &str = concatcp!(COMMON_PACKAGE, ".requires_authentication");
/// Expression locating the account a request is scoped to
pub const ACCOUNT_ID_EXPRESSION: &str = concatcp!(COMMON_PACKAGE, ".account_id_expression");
/// `true` (default) = AND over permissions, `false` = OR
pub const REQUIRES_ALL_PERMISSIONS: &str = concatcp!(COMMON_PACKAGE, ".requires_all_permissions");
/// HTTP transcoding rule
pub const HTTP: &str = "google.api.http";

/// Wire shape of an extension value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    Bool,
    String,
    RepeatedString,
    Message,
}

/// A known extension of `google.protobuf.MethodOptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionInfo {
    pub full_name: &'static str,
    pub number: u32,
    pub kind: ExtensionKind,
}

const EXTENSIONS: &[ExtensionInfo] = &[
    ExtensionInfo {
        full_name: PERMISSIONS,
        number: 50001,
        kind: ExtensionKind::RepeatedString,
    },
    ExtensionInfo {
        full_name: REQUIRES_AUTHENTICATION,
        number: 50002,
        kind: ExtensionKind::Bool,
    },
    ExtensionInfo {
        full_name: ACCOUNT_ID_EXPRESSION,
        number: 50003,
        kind: ExtensionKind::String,
    },
    ExtensionInfo {
        full_name: REQUIRES_ALL_PERMISSIONS,
        number: 50004,
        kind: ExtensionKind::Bool,
    },
    ExtensionInfo {
        full_name: HTTP,
        number: 72295728,
        kind: ExtensionKind::Message,
    },
];

/// All registered extensions.
pub fn registry() -> &'static [ExtensionInfo] {
    EXTENSIONS
}

/// Resolves an option key such as `google.api.http`.
pub fn lookup(full_name: &str) -> Option<&'static ExtensionInfo> {
    EXTENSIONS.iter().find(|e| e.full_name == full_name)
}

/// Resolves a `MethodOptions` field number.
pub fn lookup_number(number: u32) -> Option<&'static ExtensionInfo> {
    EXTENSIONS.iter().find(|e| e.number == number)
}

/// Checks that no name or field number is registered twice.
pub fn verify_registry() -> Result<()> {
    let mut names = HashSet::new();
    let mut numbers = HashSet::new();
    for extension in EXTENSIONS {
        if !names.insert(extension.full_name) {
            return Err(Error::Registry(format!(
                "duplicate extension name: {}",
                extension.full_name
            )));
        }
        if !numbers.insert(extension.number) {
            return Err(Error::Registry(format!(
                "duplicate extension number {} ({})",
                extension.number, extension.full_name
            )));
        }
    }
    Ok(())
}
