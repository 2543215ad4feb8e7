//! Builders for `FileDescriptorProto`s carrying custom method options the way
//! protoc encodes them: as unknown fields on `MethodOptions`. Fixtures parsed
//! from `.proto` sources live under `tests/testdata`.

#![allow(dead_code)]

use proto_conventions::descriptor::FileDescriptor;
use proto_conventions::normalize;
use proto_conventions::rules::extensions;
use protobuf::MessageField;
use protobuf::descriptor::{
    FileDescriptorProto, MethodDescriptorProto, MethodOptions, ServiceDescriptorProto,
    SourceCodeInfo, source_code_info,
};
use std::path::PathBuf;

/// Option values for one method.
#[derive(Default)]
pub struct MethodSpec {
    pub name: &'static str,
    pub permissions: Vec<&'static str>,
    pub requires_all: Option<bool>,
    pub requires_authentication: Option<bool>,
    pub account_id_expression: Option<&'static str>,
    pub http: bool,
    /// `[start_line, start_column, end_line, end_column]`
    pub span: Vec<i32>,
}

/// A fixture directory under `tests/testdata`.
pub fn testdata(dir: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/testdata")
        .join(dir)
}

fn field_number(key: &str) -> u32 {
    extensions::lookup(key).expect("registered extension").number
}

fn method_proto(spec: &MethodSpec) -> MethodDescriptorProto {
    let mut options = MethodOptions::new();
    let unknown = options.special_fields.mut_unknown_fields();
    for permission in &spec.permissions {
        unknown.add_length_delimited(
            field_number(extensions::PERMISSIONS),
            permission.as_bytes().to_vec(),
        );
    }
    if let Some(requires_all) = spec.requires_all {
        unknown.add_varint(field_number(extensions::REQUIRES_ALL_PERMISSIONS), requires_all as u64);
    }
    if let Some(requires_auth) = spec.requires_authentication {
        unknown.add_varint(field_number(extensions::REQUIRES_AUTHENTICATION), requires_auth as u64);
    }
    if let Some(expression) = spec.account_id_expression {
        unknown.add_length_delimited(
            field_number(extensions::ACCOUNT_ID_EXPRESSION),
            expression.as_bytes().to_vec(),
        );
    }
    if spec.http {
        // HttpRule { get: "/v1/items" } = field 2, length-delimited.
        let mut rule = vec![0x12, 9];
        rule.extend_from_slice(b"/v1/items");
        unknown.add_length_delimited(field_number(extensions::HTTP), rule);
    }

    let mut method = MethodDescriptorProto::new();
    method.set_name(spec.name.to_string());
    method.set_input_type(".test.Request".to_string());
    method.set_output_type(".test.Response".to_string());
    method.options = MessageField::some(options);
    method
}

/// A `service.proto` in package `test` with a single `TestService`.
pub fn service_file(methods: &[MethodSpec]) -> FileDescriptor {
    let mut service = ServiceDescriptorProto::new();
    service.set_name("TestService".to_string());

    let mut info = SourceCodeInfo::new();
    for (index, spec) in methods.iter().enumerate() {
        service.method.push(method_proto(spec));
        if !spec.span.is_empty() {
            let mut location = source_code_info::Location::new();
            location.path = vec![6, 0, 2, index as i32];
            location.span = spec.span.clone();
            info.location.push(location);
        }
    }

    let mut file = FileDescriptorProto::new();
    file.set_name("service.proto".to_string());
    file.set_package("test".to_string());
    file.service.push(service);
    file.source_code_info = MessageField::some(info);

    normalize::normalize_file(&file, false)
}
