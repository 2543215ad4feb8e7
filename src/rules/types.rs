//! Core types shared by all rules

use crate::descriptor::{FileDescriptor, Span};
use crate::rules::config::PluginOptions;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input handed to every rule handler
#[derive(Debug, Clone, Copy)]
pub struct CheckRequest<'a> {
    /// Files being checked, dependencies included
    pub files: &'a [FileDescriptor],
    /// Previous version of the files; empty for lint rules
    pub against_files: &'a [FileDescriptor],
    pub options: &'a PluginOptions,
}

impl<'a> CheckRequest<'a> {
    pub fn new(files: &'a [FileDescriptor], options: &'a PluginOptions) -> Self {
        Self {
            files,
            against_files: &[],
            options,
        }
    }

    pub fn with_against(mut self, against_files: &'a [FileDescriptor]) -> Self {
        self.against_files = against_files;
        self
    }

    /// Files to check, imports excluded.
    pub fn checked_files(&self) -> impl Iterator<Item = &'a FileDescriptor> + use<'a> {
        self.files.iter().filter(|f| !f.is_import)
    }

    /// Previous files to compare against, imports excluded.
    pub fn checked_against_files(&self) -> impl Iterator<Item = &'a FileDescriptor> + use<'a> {
        self.against_files.iter().filter(|f| !f.is_import)
    }
}

/// A convention violation reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// The rule that produced this annotation
    pub rule_id: String,
    /// Human-readable description of the violation
    pub message: String,
    /// Where the violation is anchored; absent for request-level problems.
    /// Positions are zero when the descriptor carries no source span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_location: Option<FileLocation>,
}

/// Location of an annotation inside a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLocation {
    pub file_name: String,
    pub start_line: i32,
    pub start_column: i32,
    pub end_line: i32,
    pub end_column: i32,
}

impl FileLocation {
    pub fn new(file_name: &str, span: Span) -> Self {
        Self {
            file_name: file_name.to_string(),
            start_line: span.start_line,
            start_column: span.start_column,
            end_line: span.end_line,
            end_column: span.end_column,
        }
    }

    /// A location naming only the file, for descriptors without source info.
    pub fn file_only(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            start_line: 0,
            start_column: 0,
            end_line: 0,
            end_column: 0,
        }
    }
}

impl Annotation {
    /// An annotation anchored at `span` inside `file`. Without a span only
    /// the file is recorded.
    pub fn at(rule_id: &str, message: String, file: &FileDescriptor, span: Option<Span>) -> Self {
        let location = match span {
            Some(span) => FileLocation::new(&file.name, span),
            None => FileLocation::file_only(&file.name),
        };
        Self {
            rule_id: rule_id.to_string(),
            message,
            file_location: Some(location),
        }
    }

    /// An annotation with no location.
    pub fn unanchored(rule_id: &str, message: String) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            message,
            file_location: None,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file_location {
            // Lines and columns are stored 0-based.
            Some(loc) => write!(
                f,
                "{}:{}:{}: {} ({})",
                loc.file_name,
                loc.start_line + 1,
                loc.start_column + 1,
                self.message,
                self.rule_id
            ),
            None => write!(f, "{} ({})", self.message, self.rule_id),
        }
    }
}

/// A single failed validator check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    /// Span of the offending message or field
    pub location: Option<Span>,
}

impl ValidationError {
    pub fn new(message: String, location: Option<Span>) -> Self {
        Self { message, location }
    }

    pub fn into_annotation(self, rule_id: &str, file: &FileDescriptor) -> Annotation {
        Annotation::at(rule_id, self.message, file, self.location)
    }
}

/// Formats names the way annotation messages list them: `[a b c]`.
pub fn bracket_list<S: AsRef<str>>(items: &[S]) -> String {
    let joined: Vec<&str> = items.iter().map(|s| s.as_ref()).collect();
    format!("[{}]", joined.join(" "))
}
