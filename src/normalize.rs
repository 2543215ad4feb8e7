//! Converts the raw `FileDescriptorProto` AST from the `protobuf` crate
//! into the read-only [`FileDescriptor`] tree the rules work on.

use crate::descriptor::{
    FieldDescriptor, FileDescriptor, MessageDescriptor, MethodDescriptor, OptionValue,
    ServiceDescriptor, Span, qualify,
};
use crate::rules::extensions::{self, ExtensionKind};
use protobuf::UnknownValueRef;
use protobuf::descriptor::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto,
    ServiceDescriptorProto,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{trace, warn};

// Field numbers used in `SourceCodeInfo.Location.path`.
const FILE_MESSAGE_TYPE: i32 = 4;
const FILE_SERVICE: i32 = 6;
const MESSAGE_FIELD: i32 = 2;
const MESSAGE_NESTED_TYPE: i32 = 3;
const SERVICE_METHOD: i32 = 2;

/// Source spans of a file keyed by descriptor path.
struct SpanIndex(HashMap<Vec<i32>, Span>);

impl SpanIndex {
    fn new(file: &FileDescriptorProto) -> Self {
        let mut spans = HashMap::new();
        if let Some(info) = file.source_code_info.as_ref() {
            for location in &info.location {
                if let Some(span) = Span::from_source_span(&location.span) {
                    // The first location recorded for a path covers the whole element.
                    spans.entry(location.path.clone()).or_insert(span);
                }
            }
        }
        SpanIndex(spans)
    }

    fn get(&self, path: &[i32]) -> Option<Span> {
        self.0.get(path).copied()
    }
}

fn child_path(parent: &[i32], field: i32, index: usize) -> Vec<i32> {
    let mut path = parent.to_vec();
    path.push(field);
    path.push(index as i32);
    path
}

pub fn normalize_file(file: &FileDescriptorProto, is_import: bool) -> FileDescriptor {
    let spans = SpanIndex::new(file);
    let package = file.package.as_deref().filter(|p| !p.is_empty());

    let mut descriptor = FileDescriptor::new(file.name(), package);
    descriptor.is_import = is_import;

    for (index, msg) in file.message_type.iter().enumerate() {
        let path = child_path(&[], FILE_MESSAGE_TYPE, index);
        descriptor
            .messages
            .push(normalize_message(msg, package, &path, &spans));
    }

    for (index, svc) in file.service.iter().enumerate() {
        let path = child_path(&[], FILE_SERVICE, index);
        descriptor
            .services
            .push(normalize_service(svc, package, &path, &spans));
    }

    descriptor
}

fn normalize_message(
    msg: &DescriptorProto,
    scope: Option<&str>,
    path: &[i32],
    spans: &SpanIndex,
) -> MessageDescriptor {
    let mut message = MessageDescriptor::new(msg.name(), scope);
    message.span = spans.get(path);

    for (index, field) in msg.field.iter().enumerate() {
        let field_path = child_path(path, MESSAGE_FIELD, index);
        message
            .fields
            .push(normalize_field(field, spans.get(&field_path)));
    }

    for (index, nested) in msg.nested_type.iter().enumerate() {
        let nested_path = child_path(path, MESSAGE_NESTED_TYPE, index);
        let nested = normalize_message(nested, Some(&message.full_name), &nested_path, spans);
        message.nested_messages.push(nested);
    }

    message
}

fn normalize_field(field: &FieldDescriptorProto, span: Option<Span>) -> FieldDescriptor {
    // For primitive types, `type_name` is empty and `type` is set.
    let type_name = if field.type_name().is_empty() {
        format!("{:?}", field.type_())
            .to_lowercase()
            .replace("type_", "")
    } else {
        field.type_name().to_string()
    };

    FieldDescriptor {
        name: field.name().to_string(),
        number: field.number(),
        type_name,
        span,
    }
}

fn normalize_service(
    svc: &ServiceDescriptorProto,
    package: Option<&str>,
    path: &[i32],
    spans: &SpanIndex,
) -> ServiceDescriptor {
    let mut service = ServiceDescriptor::new(svc.name(), package);
    service.span = spans.get(path);

    for (index, method) in svc.method.iter().enumerate() {
        let method_path = child_path(path, SERVICE_METHOD, index);
        service.methods.push(MethodDescriptor {
            name: method.name().to_string(),
            full_name: qualify(Some(&service.full_name), method.name()),
            input_type: method.input_type().to_string(),
            output_type: method.output_type().to_string(),
            options: decode_method_options(method),
            span: spans.get(&method_path),
        });
    }

    service
}

/// Decodes registered custom options from the unknown fields of `MethodOptions`.
fn decode_method_options(method: &MethodDescriptorProto) -> BTreeMap<String, OptionValue> {
    let mut options = BTreeMap::new();
    let Some(method_options) = method.options.as_ref() else {
        return options;
    };

    for (number, value) in method_options.special_fields.unknown_fields().iter() {
        let Some(extension) = extensions::lookup_number(number) else {
            trace!(number, method = method.name(), "skipping unregistered method option");
            continue;
        };
        let key = extension.full_name.to_string();

        match (extension.kind, value) {
            (ExtensionKind::Bool, UnknownValueRef::Varint(raw)) => {
                options.insert(key, OptionValue::Bool(raw != 0));
            }
            (ExtensionKind::String, UnknownValueRef::LengthDelimited(bytes)) => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                options.insert(key, OptionValue::String(text));
            }
            (ExtensionKind::RepeatedString, UnknownValueRef::LengthDelimited(bytes)) => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                if let OptionValue::Strings(values) = options
                    .entry(key)
                    .or_insert_with(|| OptionValue::Strings(Vec::new()))
                {
                    values.push(text);
                }
            }
            (ExtensionKind::Message, UnknownValueRef::LengthDelimited(bytes)) => {
                options.insert(key, OptionValue::Message(bytes.to_vec()));
            }
            (kind, _) => {
                warn!(
                    option = extension.full_name,
                    method = method.name(),
                    ?kind,
                    "method option has an unexpected wire type, ignoring it"
                );
            }
        }
    }

    options
}
