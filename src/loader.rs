//! Loads descriptor trees from `.proto` sources or serialized descriptor sets.

use crate::descriptor::FileDescriptor;
use crate::error::{Error, Result};
use crate::normalize;
use protobuf::Message;
use protobuf::descriptor::FileDescriptorSet;
use protobuf_parse::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parses `inputs` (paths relative to `include`) and returns every file of
/// the resulting descriptor set. Dependencies that were not listed as inputs
/// are flagged with [`FileDescriptor::is_import`].
pub fn load_proto_files<P: AsRef<Path>>(include: P, inputs: &[&str]) -> Result<Vec<FileDescriptor>> {
    let include = include.as_ref();
    let input_paths: Vec<PathBuf> = inputs.iter().map(|input| include.join(input)).collect();

    let parsed = Parser::new()
        .pure()
        .include(include)
        .inputs(&input_paths)
        .file_descriptor_set()
        .map_err(|e| Error::Load(format!("{e:#}")))?;

    debug!(
        include = %include.display(),
        files = parsed.file.len(),
        "parsed proto sources"
    );
    Ok(from_descriptor_set(&parsed, inputs))
}

/// Writes in-memory sources into a temporary include root and loads them.
///
/// Each entry is `(relative path, content)`; all entries are treated as inputs.
pub fn load_proto_sources(sources: &[(&str, &str)]) -> Result<Vec<FileDescriptor>> {
    let temp_dir = tempfile::tempdir().map_err(|source| Error::FileRead {
        path: std::env::temp_dir(),
        source,
    })?;

    for (name, content) in sources {
        let path = temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::FileRead {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, content).map_err(|source| Error::FileRead {
            path: path.clone(),
            source,
        })?;
    }

    let names: Vec<&str> = sources.iter().map(|(name, _)| *name).collect();
    load_proto_files(temp_dir.path(), &names)
}

/// Reads a binary `FileDescriptorSet`, e.g. from
/// `protoc --include_source_info --descriptor_set_out` or `buf build -o`.
///
/// When `inputs` is empty every file in the set is checked.
pub fn load_descriptor_set<P: AsRef<Path>>(path: P, inputs: &[&str]) -> Result<Vec<FileDescriptor>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let set = FileDescriptorSet::parse_from_bytes(&bytes)?;
    debug!(path = %path.display(), files = set.file.len(), "decoded descriptor set");
    Ok(from_descriptor_set(&set, inputs))
}

fn from_descriptor_set(set: &FileDescriptorSet, inputs: &[&str]) -> Vec<FileDescriptor> {
    let inputs: HashSet<&str> = inputs.iter().copied().collect();
    set.file
        .iter()
        .map(|file| {
            let is_import = !inputs.is_empty() && !inputs.contains(file.name());
            normalize::normalize_file(file, is_import)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_inline_sources_marks_imports() {
        let files = load_proto_sources(&[(
            "library.proto",
            r#"
syntax = "proto3";
package library.v1;

import "google/protobuf/timestamp.proto";

message Book {
  string id = 1;
  google.protobuf.Timestamp created_at = 2;
}
"#,
        )])
        .expect("sources should parse");

        let library = files
            .iter()
            .find(|f| f.name == "library.proto")
            .expect("input file present");
        assert!(!library.is_import);
        assert_eq!(library.messages[0].full_name, "library.v1.Book");
        assert_eq!(library.messages[0].fields[1].type_name, ".google.protobuf.Timestamp");

        assert!(
            files
                .iter()
                .filter(|f| f.name != "library.proto")
                .all(|f| f.is_import)
        );
    }

    #[test]
    fn test_missing_descriptor_set_is_an_error() {
        let err = load_descriptor_set("/nonexistent/image.binpb", &[]).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
