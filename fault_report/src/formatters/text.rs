//! Plain text formatter

use super::{indent_continuation, tree_prefix, Formatter};
use crate::config::ReportPreferences;
use fault_core::chain::map_chain;
use fault_core::ErrorRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOptions {
    pub show_metadata: bool,
    pub show_timestamp: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            show_metadata: true,
            show_timestamp: true,
        }
    }
}

/// `name: message`, optionally timestamped and followed by metadata
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    options: TextOptions,
}

impl TextFormatter {
    pub fn new(options: TextOptions) -> Self {
        Self { options }
    }

    pub fn from_preferences(preferences: &ReportPreferences) -> Self {
        Self::new(TextOptions {
            show_metadata: preferences.show_metadata,
            show_timestamp: preferences.show_timestamp,
        })
    }

    pub fn options(&self) -> TextOptions {
        self.options
    }

    pub fn format_with(&self, error: &ErrorRecord, options: &TextOptions) -> String {
        let mut result = format!("{}: {}", error.name(), error.message());

        if options.show_timestamp {
            result = format!("[{}] {}", error.timestamp_iso(), result);
        }

        if options.show_metadata {
            if let Some(metadata) = error.metadata().filter(|m| !m.is_empty()) {
                result.push_str(&format!("\nMetadata: {}", Value::Object(metadata.clone())));
            }
        }

        result
    }

    /// Chain rendered as a tree, causes nested under the record they caused
    pub fn format_chain_with(&self, error: &ErrorRecord, options: &TextOptions) -> String {
        map_chain(error, |node, index| {
            format!(
                "{}{}",
                tree_prefix(index),
                indent_continuation(&self.format_with(node, options), index)
            )
        })
        .join("\n")
    }
}

impl Formatter for TextFormatter {
    fn format(&self, error: &ErrorRecord) -> String {
        self.format_with(error, &self.options)
    }

    fn format_chain(&self, error: &ErrorRecord) -> String {
        self.format_chain_with(error, &self.options)
    }
}
