//! Formatters turn records and chains into text
//!
//! Every formatter implements [`Formatter`]. Options are fixed when the
//! formatter is built; the inherent `format_with` methods accept one-off
//! options instead.

pub mod ansi;
pub mod html;
pub mod json;
pub mod text;

pub use ansi::{AnsiFormatter, AnsiOptions};
pub use html::{HtmlFormatter, HtmlOptions};
pub use json::{JsonFormatter, JsonOptions};
pub use text::{TextFormatter, TextOptions};

use crate::config::compile_time::formatting::{CHAIN_BRANCH, CHAIN_INDENT};
use fault_core::chain::map_chain;
use fault_core::ErrorRecord;

/// Renders a record, and by default its chain one record per line
pub trait Formatter: Send + Sync {
    fn format(&self, error: &ErrorRecord) -> String;

    fn format_chain(&self, error: &ErrorRecord) -> String {
        map_chain(error, |node, _| self.format(node)).join("\n")
    }
}

/// Prefix for the chain element at `index`: nothing for the head, then an
/// indented branch marker one level deeper per step
pub(crate) fn tree_prefix(index: usize) -> String {
    if index == 0 {
        String::new()
    } else {
        format!("{}{}", CHAIN_INDENT.repeat(index - 1), CHAIN_BRANCH)
    }
}

/// Prefix every line after the first of `rendered` so multi-line entries
/// stay aligned under their branch
pub(crate) fn indent_continuation(rendered: &str, index: usize) -> String {
    if index == 0 {
        return rendered.to_string();
    }
    let padding = CHAIN_INDENT.repeat(index);
    rendered.replace('\n', &format!("\n{}", padding))
}
