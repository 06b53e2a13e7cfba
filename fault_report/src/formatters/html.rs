//! HTML formatter

use super::Formatter;
use crate::config::ReportPreferences;
use fault_core::catalog::escape_text;
use fault_core::ErrorRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlOptions {
    pub show_metadata: bool,
    pub show_timestamp: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            show_metadata: true,
            show_timestamp: true,
        }
    }
}

/// One `<div>` per record; user-supplied text is escaped
#[derive(Debug, Clone, Default)]
pub struct HtmlFormatter {
    options: HtmlOptions,
}

impl HtmlFormatter {
    pub fn new(options: HtmlOptions) -> Self {
        Self { options }
    }

    pub fn from_preferences(preferences: &ReportPreferences) -> Self {
        Self::new(HtmlOptions {
            show_metadata: preferences.show_metadata,
            show_timestamp: preferences.show_timestamp,
        })
    }

    pub fn format_with(&self, error: &ErrorRecord, options: &HtmlOptions) -> String {
        let mut html = format!(
            "<div class=\"error {} severity-{}\">\n  <strong>{}</strong>: {}",
            lower_first(error.name()),
            error.severity(),
            escape_text(error.name()),
            escape_text(error.message())
        );

        if options.show_timestamp {
            html.push_str(&format!(
                "\n  <span class=\"timestamp\">{}</span>",
                error.timestamp_iso()
            ));
        }

        if options.show_metadata {
            if let Some(metadata) = error.metadata().filter(|m| !m.is_empty()) {
                html.push_str(&format!(
                    "\n  <pre class=\"metadata\">{}</pre>",
                    escape_text(&Value::Object(metadata.clone()).to_string())
                ));
            }
        }

        html.push_str("\n</div>");
        html
    }

    pub fn format_chain_with(&self, error: &ErrorRecord, options: &HtmlOptions) -> String {
        let items: Vec<String> = error
            .chain()
            .map(|node, _| self.format_with(node, options));
        format!("<div class=\"error-chain\">\n{}\n</div>", items.join("\n"))
    }
}

impl Formatter for HtmlFormatter {
    fn format(&self, error: &ErrorRecord) -> String {
        self.format_with(error, &self.options)
    }

    fn format_chain(&self, error: &ErrorRecord) -> String {
        self.format_chain_with(error, &self.options)
    }
}

/// `ValidationError` becomes `validationError`
fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fault_core::class::{ErrorClass, BASE};

    static VALIDATION: ErrorClass = ErrorClass::derive("ValidationError", &BASE);

    const BARE: HtmlOptions = HtmlOptions {
        show_metadata: false,
        show_timestamp: false,
    };

    #[test]
    fn test_escapes_message() {
        let error = ErrorRecord::builder("<script>alert('x')</script>")
            .class(&VALIDATION)
            .build()
            .unwrap();
        let html = HtmlFormatter::new(BARE).format(&error);
        assert_eq!(
            html,
            "<div class=\"error validationError severity-error\">\n  <strong>ValidationError</strong>: \
             &lt;script&gt;alert(&#039;x&#039;)&lt;&#x2F;script&gt;\n</div>"
        );
    }

    #[test]
    fn test_metadata_and_timestamp() {
        let error = ErrorRecord::builder("bad")
            .meta("field", "<name>")
            .build()
            .unwrap();
        let html = HtmlFormatter::default().format(&error);
        assert!(html.contains(&format!(
            "<span class=\"timestamp\">{}</span>",
            error.timestamp_iso()
        )));
        assert!(html.contains("<pre class=\"metadata\">{&quot;field&quot;:&quot;&lt;name&gt;&quot;}</pre>"));
    }

    #[test]
    fn test_chain_wrapper() {
        let root = ErrorRecord::builder("root").build().unwrap();
        let top = ErrorRecord::builder("top").cause(root).build().unwrap();
        let html = HtmlFormatter::new(BARE).format_chain(&top);
        assert!(html.starts_with("<div class=\"error-chain\">\n<div class=\"error handlerError"));
        assert!(html.ends_with("</div>\n</div>"));
        assert_eq!(html.matches("<strong>").count(), 2);
    }

    #[test]
    fn test_lower_first() {
        assert_eq!(lower_first("HandlerError"), "handlerError");
        assert_eq!(lower_first(""), "");
    }
}
