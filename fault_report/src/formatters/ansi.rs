//! ANSI terminal formatter

use super::text::{TextFormatter, TextOptions};
use super::{indent_continuation, tree_prefix, Formatter};
use crate::config::ReportPreferences;
use fault_core::chain::map_chain;
use fault_core::{ErrorRecord, Severity};
use owo_colors::{OwoColorize, Style};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsiOptions {
    pub colors: bool,
    pub show_metadata: bool,
    pub show_timestamp: bool,
}

impl Default for AnsiOptions {
    fn default() -> Self {
        Self {
            colors: true,
            show_metadata: false,
            show_timestamp: false,
        }
    }
}

/// Colored single-line output; plain text when colors are off
#[derive(Debug, Clone, Default)]
pub struct AnsiFormatter {
    options: AnsiOptions,
}

/// Style of the error name for a severity
pub fn severity_style(severity: Severity) -> Style {
    let bold = Style::new().bold();
    match severity {
        Severity::Critical => bold.magenta(),
        Severity::Error => bold.red(),
        Severity::Warning => bold.yellow(),
        Severity::Info => bold.cyan(),
        Severity::Debug => bold.bright_black(),
    }
}

impl AnsiFormatter {
    pub fn new(options: AnsiOptions) -> Self {
        Self { options }
    }

    pub fn from_preferences(preferences: &ReportPreferences) -> Self {
        Self::new(AnsiOptions {
            colors: preferences.enable_colors,
            show_metadata: preferences.show_metadata,
            show_timestamp: preferences.show_timestamp,
        })
    }

    pub fn options(&self) -> AnsiOptions {
        self.options
    }

    pub fn format_with(&self, error: &ErrorRecord, options: &AnsiOptions) -> String {
        if !options.colors {
            return TextFormatter::default().format_with(error, &plain(options));
        }

        let mut result = format!(
            "{}: {}",
            error.name().style(severity_style(error.severity())),
            error.message()
        );

        if options.show_timestamp {
            let stamp = format!("[{}]", error.timestamp_iso());
            result = format!("{} {}", stamp.bright_black(), result);
        }

        if options.show_metadata {
            if let Some(metadata) = error.metadata().filter(|m| !m.is_empty()) {
                let line = format!("Metadata: {}", Value::Object(metadata.clone()));
                result.push_str(&format!("\n{}", line.dimmed()));
            }
        }

        result
    }

    pub fn format_chain_with(&self, error: &ErrorRecord, options: &AnsiOptions) -> String {
        if !options.colors {
            return TextFormatter::default().format_chain_with(error, &plain(options));
        }

        map_chain(error, |node, index| {
            let branch = tree_prefix(index);
            let branch = if branch.is_empty() {
                branch
            } else {
                branch.dimmed().to_string()
            };
            format!(
                "{}{}",
                branch,
                indent_continuation(&self.format_with(node, options), index)
            )
        })
        .join("\n")
    }
}

fn plain(options: &AnsiOptions) -> TextOptions {
    TextOptions {
        show_metadata: options.show_metadata,
        show_timestamp: options.show_timestamp,
    }
}

impl Formatter for AnsiFormatter {
    fn format(&self, error: &ErrorRecord) -> String {
        self.format_with(error, &self.options)
    }

    fn format_chain(&self, error: &ErrorRecord) -> String {
        self.format_chain_with(error, &self.options)
    }
}
