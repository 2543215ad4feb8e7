//! Rule selection and plugin options, loaded from a buf-style YAML file

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Name under which this crate's options appear in the `plugins` list
pub const PLUGIN_NAME: &str = "proto-conventions";

/// Which rules of one type (lint or breaking) to run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSelection {
    /// Rules to run; empty means every rule marked as default
    #[serde(default, rename = "use")]
    pub use_rules: Vec<String>,
    /// Rules to skip even if selected
    #[serde(default)]
    pub except: Vec<String>,
}

impl RuleSelection {
    pub fn is_selected(&self, rule_id: &str, is_default: bool) -> bool {
        if self.except.iter().any(|r| r == rule_id) {
            return false;
        }
        if self.use_rules.is_empty() {
            return is_default;
        }
        self.use_rules.iter().any(|r| r == rule_id)
    }
}

/// Named option values passed to every rule invocation.
///
/// Values are kept untyped until a rule asks for them, so a malformed value
/// only fails the rule that reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginOptions(BTreeMap<String, Value>);

impl PluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn with_string_list(mut self, key: &str, values: &[&str]) -> Self {
        let list = values.iter().map(|v| Value::String(v.to_string())).collect();
        self.insert(key, Value::Sequence(list));
        self
    }

    /// Reads a string-list option; an absent key yields an empty list.
    pub fn string_list(&self, key: &str) -> Result<Vec<String>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(Error::invalid_option(
                        key,
                        format!("expected a list of strings, found element {other:?}"),
                    )),
                })
                .collect(),
            Some(other) => Err(Error::invalid_option(
                key,
                format!("expected a list of strings, found {other:?}"),
            )),
        }
    }

    /// Reads a string-list option, falling back to `default` when it is absent or empty.
    pub fn string_list_or(&self, key: &str, default: &[&str]) -> Result<Vec<String>> {
        let values = self.string_list(key)?;
        if values.is_empty() {
            return Ok(default.iter().map(|s| s.to_string()).collect());
        }
        Ok(values)
    }
}

/// Full configuration for a check run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckConfig {
    pub lint: RuleSelection,
    pub breaking: RuleSelection,
    pub options: PluginOptions,
}

impl CheckConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct PluginEntry {
            plugin: String,
            #[serde(default)]
            options: BTreeMap<String, Value>,
        }

        #[derive(Deserialize)]
        struct ConfigFile {
            #[serde(default)]
            lint: Option<RuleSelection>,
            #[serde(default)]
            breaking: Option<RuleSelection>,
            #[serde(default)]
            plugins: Vec<PluginEntry>,
        }

        let config_file: ConfigFile = serde_yaml::from_str(yaml)?;

        let mut options = PluginOptions::new();
        for entry in config_file
            .plugins
            .into_iter()
            .filter(|entry| plugin_matches(&entry.plugin))
        {
            for (key, value) in entry.options {
                options.insert(&key, value);
            }
        }

        Ok(Self {
            lint: config_file.lint.unwrap_or_default(),
            breaking: config_file.breaking.unwrap_or_default(),
            options,
        })
    }
}

/// `plugin` may be a bare name, a path, or a path followed by arguments.
fn plugin_matches(plugin: &str) -> bool {
    plugin
        .split_whitespace()
        .next()
        .and_then(|command| Path::new(command).file_name())
        .is_some_and(|name| name.to_str() == Some(PLUGIN_NAME))
}
