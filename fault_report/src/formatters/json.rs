//! JSON formatter

use super::Formatter;
use crate::config::ReportPreferences;
use fault_core::{ErrorRecord, Metadata};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOptions {
    /// Spaces per nesting level; 0 renders a single line
    pub indent_size: usize,
    pub show_metadata: bool,
    pub show_timestamp: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            indent_size: 2,
            show_metadata: true,
            show_timestamp: true,
        }
    }
}

/// Records as JSON objects, chains as JSON arrays
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    options: JsonOptions,
}

impl JsonFormatter {
    pub fn new(options: JsonOptions) -> Self {
        Self { options }
    }

    /// Single-line output, as used for JSON lines
    pub fn compact() -> Self {
        Self::new(JsonOptions {
            indent_size: 0,
            ..JsonOptions::default()
        })
    }

    pub fn from_preferences(preferences: &ReportPreferences) -> Self {
        Self::new(JsonOptions {
            indent_size: preferences.json_indent,
            show_metadata: preferences.show_metadata,
            show_timestamp: preferences.show_timestamp,
        })
    }

    /// The object written for one record
    pub fn to_value(&self, error: &ErrorRecord, options: &JsonOptions) -> Value {
        let mut object = Metadata::new();
        object.insert("message".to_string(), Value::from(error.message()));
        object.insert("name".to_string(), Value::from(error.name()));
        object.insert("severity".to_string(), Value::from(error.severity().as_str()));
        if let Some(code) = error.code() {
            object.insert("code".to_string(), Value::from(code));
        }
        if options.show_timestamp {
            object.insert("timestamp".to_string(), Value::from(error.timestamp_iso()));
        }
        if options.show_metadata {
            if let Some(metadata) = error.metadata() {
                object.insert("metadata".to_string(), Value::Object(metadata.clone()));
            }
        }
        Value::Object(object)
    }

    pub fn format_with(&self, error: &ErrorRecord, options: &JsonOptions) -> String {
        render(&self.to_value(error, options), options.indent_size)
    }

    pub fn format_chain_with(&self, error: &ErrorRecord, options: &JsonOptions) -> String {
        let items = error.chain().map(|node, _| self.to_value(node, options));
        render(&Value::Array(items), options.indent_size)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, error: &ErrorRecord) -> String {
        self.format_with(error, &self.options)
    }

    fn format_chain(&self, error: &ErrorRecord) -> String {
        self.format_chain_with(error, &self.options)
    }
}

fn render(value: &Value, indent_size: usize) -> String {
    if indent_size == 0 {
        return value.to_string();
    }

    let indent = vec![b' '; indent_size];
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(&indent));
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(buffer).unwrap_or_else(|_| value.to_string()),
        // Fallback to compact output if pretty printing fails
        Err(_) => value.to_string(),
    }
}
