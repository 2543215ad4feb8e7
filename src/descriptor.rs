//! Read-only descriptor tree the rules operate on.
//!
//! The tree mirrors the parts of `FileDescriptorProto` that the rules care
//! about: messages with their fields, services with their methods, decoded
//! custom method options and source spans. It is built by
//! [`normalize`](crate::normalize) and never mutated by a rule.

use std::collections::BTreeMap;

//==============================================================================
// Source locations
//==============================================================================

/// A source span copied verbatim from `SourceCodeInfo` (0-based lines and columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start_line: i32,
    pub start_column: i32,
    pub end_line: i32,
    pub end_column: i32,
}

impl Span {
    pub fn new(start_line: i32, start_column: i32, end_line: i32, end_column: i32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Decodes the `span` field of a `SourceCodeInfo.Location`.
    ///
    /// Three elements mean the span starts and ends on the same line.
    pub fn from_source_span(span: &[i32]) -> Option<Self> {
        match *span {
            [start_line, start_column, end_column] => {
                Some(Self::new(start_line, start_column, start_line, end_column))
            }
            [start_line, start_column, end_line, end_column] => {
                Some(Self::new(start_line, start_column, end_line, end_column))
            }
            _ => None,
        }
    }
}

//==============================================================================
// Option values
//==============================================================================

/// A decoded custom option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    String(String),
    /// Every occurrence of a repeated string option, in declaration order
    Strings(Vec<String>),
    /// Encoded message payload; only its presence is inspected
    Message(Vec<u8>),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            OptionValue::Strings(values) => Some(values),
            _ => None,
        }
    }
}

//==============================================================================
// Descriptor tree
//==============================================================================

/// A protobuf file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileDescriptor {
    /// Path of the file relative to its include root, e.g. `simple.proto`
    pub name: String,
    pub package: Option<String>,
    pub messages: Vec<MessageDescriptor>,
    pub services: Vec<ServiceDescriptor>,
    /// Set for files pulled in only as dependencies; rules skip them
    pub is_import: bool,
}

/// A message type, possibly nested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageDescriptor {
    pub name: String,
    pub full_name: String,
    pub fields: Vec<FieldDescriptor>,
    pub nested_messages: Vec<MessageDescriptor>,
    pub span: Option<Span>,
}

/// A field declared on a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: i32,
    /// Scalar kind (`string`, `int64`, ...) or the fully qualified type name
    pub type_name: String,
    pub span: Option<Span>,
}

/// A service definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub full_name: String,
    pub methods: Vec<MethodDescriptor>,
    pub span: Option<Span>,
}

/// An RPC method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodDescriptor {
    pub name: String,
    pub full_name: String,
    pub input_type: String,
    pub output_type: String,
    /// Custom options keyed by extension full name
    pub options: BTreeMap<String, OptionValue>,
    pub span: Option<Span>,
}

/// Joins a scope (package or parent full name) and a simple name.
pub fn qualify(scope: Option<&str>, name: &str) -> String {
    match scope {
        Some(scope) if !scope.is_empty() => format!("{scope}.{name}"),
        _ => name.to_string(),
    }
}

impl FileDescriptor {
    pub fn new(name: &str, package: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            package: package.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: MessageDescriptor) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_service(mut self, service: ServiceDescriptor) -> Self {
        self.services.push(service);
        self
    }

    /// Looks up a top-level message by its simple name.
    pub fn message_by_name(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// All messages of the file, nested ones included, in declaration order.
    pub fn all_messages(&self) -> Vec<&MessageDescriptor> {
        fn walk<'a>(messages: &'a [MessageDescriptor], out: &mut Vec<&'a MessageDescriptor>) {
            for message in messages {
                out.push(message);
                walk(&message.nested_messages, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.messages, &mut out);
        out
    }

    /// All methods of all services, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.services.iter().flat_map(|s| s.methods.iter())
    }
}

impl MessageDescriptor {
    pub fn new(name: &str, package: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            full_name: qualify(package, name),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, name: &str, number: i32, type_name: &str) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            number,
            type_name: type_name.to_string(),
            span: None,
        });
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

impl ServiceDescriptor {
    pub fn new(name: &str, package: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            full_name: qualify(package, name),
            ..Default::default()
        }
    }

    /// Adds a method; its full name is derived from the service's.
    pub fn with_method(mut self, mut method: MethodDescriptor) -> Self {
        method.full_name = qualify(Some(&self.full_name), &method.name);
        self.methods.push(method);
        self
    }
}

impl MethodDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            full_name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_option(mut self, key: &str, value: OptionValue) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }
}
