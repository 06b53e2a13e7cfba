//! # Code Catalogs
//!
//! A [`Dictionary`] maps stable error codes to message templates with an
//! optional severity. Dictionaries are registered per [`ErrorClass`] and
//! inherited down the hierarchy; [`ErrorRecord::from_code`] builds a record
//! whose message and severity come from the entry for a code.
//!
//! Templates use `{{ key }}` placeholders filled from the record metadata:
//!
//! ```rust
//! use fault_core::catalog::format_message;
//! use serde_json::json;
//!
//! let metadata = json!({"name": "Ana"});
//! let message = format_message("Hello {{ name }}", metadata.as_object().unwrap()).unwrap();
//! assert_eq!(message, "Hello Ana");
//! ```

use crate::args::{resolve_arguments, ErrorArg};
use crate::class::{ClassKey, ErrorClass, BASE};
use crate::config::compile_time::catalog::{MAX_TEMPLATE_REPLACEMENTS, PLACEHOLDER_PATTERN};
use crate::config::compile_time::record::MAX_POSITIONAL_ARGUMENTS;
use crate::error::{FaultError, FaultResult};
use crate::record::{ErrorBuilder, ErrorRecord, Metadata};
use crate::severity::Severity;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

/// Class for records built from catalog codes
pub static CODE_ERROR: ErrorClass = ErrorClass::derive("CodeHandlerError", &BASE);

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Message template
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Application-defined fields carried along with the entry
    #[serde(flatten)]
    pub extra: Metadata,
}

impl CatalogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: None,
            extra: Metadata::new(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// Code to entry mapping
pub type Dictionary = BTreeMap<String, CatalogEntry>;

// ============================================================================
// LOADING
// ============================================================================

/// Parse a dictionary from a JSON object of entries
pub fn dictionary_from_json(text: &str) -> FaultResult<Dictionary> {
    serde_json::from_str(text).map_err(|e| {
        FaultError::invalid_argument(&format!("invalid JSON dictionary: {}", e))
    })
}

/// Parse a dictionary from TOML tables, one per code
pub fn dictionary_from_toml(text: &str) -> FaultResult<Dictionary> {
    toml::from_str(text).map_err(|e| {
        FaultError::invalid_argument(&format!("invalid TOML dictionary: {}", e))
    })
}

/// Load a dictionary file, choosing the parser by extension
pub fn load_dictionary<P: AsRef<Path>>(path: P) -> FaultResult<Dictionary> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        FaultError::invalid_argument(&format!(
            "cannot read dictionary '{}': {}",
            path.display(),
            e
        ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => dictionary_from_toml(&text),
        Some("json") => dictionary_from_json(&text),
        _ => Err(FaultError::invalid_argument(&format!(
            "unsupported dictionary format '{}': expected .json or .toml",
            path.display()
        ))),
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

static PLACEHOLDER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn placeholder_pattern() -> FaultResult<&'static Regex> {
    PLACEHOLDER
        .get_or_init(|| Regex::new(PLACEHOLDER_PATTERN))
        .as_ref()
        .map_err(|e| {
            FaultError::invalid_state(&format!("placeholder pattern does not compile: {}", e))
        })
}

/// Look up `code` and expand its template with `metadata`
///
/// The code is trimmed before lookup. The returned entry is a copy; the
/// dictionary is never modified.
pub fn resolve_entry(
    dictionary: &Dictionary,
    code: &str,
    metadata: Option<&Value>,
) -> FaultResult<CatalogEntry> {
    let entry = dictionary
        .get(code.trim())
        .ok_or_else(|| FaultError::not_found("Error code", code))?;

    let mut resolved = entry.clone();
    if let Some(metadata) = metadata {
        let metadata = metadata
            .as_object()
            .ok_or_else(|| FaultError::invalid_argument("metadata must be an object"))?;
        resolved.message = format_message(&entry.message, metadata)?;
    }
    Ok(resolved)
}

/// Replace every `{{ key }}` in `template` with the metadata value for `key`
///
/// Values must be strings or numbers. Text that only looks like a
/// placeholder (unbalanced braces, inner whitespace) is kept verbatim.
pub fn format_message(template: &str, metadata: &Metadata) -> FaultResult<String> {
    let pattern = placeholder_pattern()?;
    let mut output = String::with_capacity(template.len());
    let mut last = 0;
    let mut replacements = 0usize;

    for captures in pattern.captures_iter(template) {
        let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        replacements += 1;
        if replacements > MAX_TEMPLATE_REPLACEMENTS {
            return Err(FaultError::resource_exhausted(
                "too many replacements in message template",
                MAX_TEMPLATE_REPLACEMENTS,
            ));
        }

        let key = key.as_str();
        let value = metadata
            .get(key)
            .ok_or_else(|| FaultError::not_found("Metadata key", key))?;
        let rendered = match value {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => {
                return Err(FaultError::invalid_argument(&format!(
                    "metadata key '{}' must be a string or number",
                    key
                )))
            }
        };

        output.push_str(&template[last..whole.start()]);
        output.push_str(&rendered);
        last = whole.end();
    }

    output.push_str(&template[last..]);
    Ok(output)
}

/// Escape the characters that are unsafe inside HTML text and attributes
pub fn escape_text(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '/' => escaped.push_str("&#x2F;"),
            '`' => escaped.push_str("&#x60;"),
            other => escaped.push(other),
        }
    }
    escaped
}

// ============================================================================
// PER-CLASS DICTIONARIES
// ============================================================================

/// Process-wide dictionaries keyed by class identity
#[derive(Default)]
pub struct DictionaryRegistry {
    dictionaries: RwLock<HashMap<ClassKey, Arc<Dictionary>>>,
}

static GLOBAL_DICTIONARIES: OnceLock<DictionaryRegistry> = OnceLock::new();

impl DictionaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static DictionaryRegistry {
        GLOBAL_DICTIONARIES.get_or_init(DictionaryRegistry::new)
    }

    /// Attach `dictionary` to `class`; a class holds at most one
    pub fn register(&self, class: &'static ErrorClass, dictionary: Dictionary) -> FaultResult<()> {
        let mut dictionaries = self
            .dictionaries
            .write()
            .map_err(|_| FaultError::poisoned("dictionary registry"))?;
        if dictionaries.contains_key(&class.key()) {
            return Err(FaultError::already_registered(class.name(), "dictionary"));
        }
        dictionaries.insert(class.key(), Arc::new(dictionary));
        Ok(())
    }

    /// Detach the dictionary of `class`, returning whether one was present
    pub fn clear(&self, class: &'static ErrorClass) -> FaultResult<bool> {
        let mut dictionaries = self
            .dictionaries
            .write()
            .map_err(|_| FaultError::poisoned("dictionary registry"))?;
        Ok(dictionaries.remove(&class.key()).is_some())
    }

    /// Nearest dictionary along the lineage of `class`
    pub fn resolve(&self, class: &'static ErrorClass) -> FaultResult<Arc<Dictionary>> {
        let dictionaries = self
            .dictionaries
            .read()
            .map_err(|_| FaultError::poisoned("dictionary registry"))?;
        class
            .lineage()
            .find_map(|ancestor| dictionaries.get(&ancestor.key()).cloned())
            .ok_or_else(|| {
                FaultError::invalid_state(&format!(
                    "a dictionary must be registered for {} or an ancestor before creating coded errors",
                    class.name()
                ))
            })
    }
}

impl ErrorClass {
    /// Attach a dictionary to this class in the global registry
    pub fn register_dictionary(
        &'static self,
        dictionary: Dictionary,
    ) -> FaultResult<&'static ErrorClass> {
        DictionaryRegistry::global().register(self, dictionary)?;
        Ok(self)
    }

    pub fn clear_dictionary(&'static self) -> FaultResult<bool> {
        DictionaryRegistry::global().clear(self)
    }
}

// ============================================================================
// CODE-DRIVEN RECORDS
// ============================================================================

impl ErrorRecord {
    /// Build a record whose message and severity come from a catalog code
    ///
    /// When the first argument is text it replaces the catalog message and
    /// the remaining arguments are resolved as metadata and cause. Otherwise
    /// the catalog template is expanded with the metadata found among the
    /// arguments. The entry severity applies unless the entry has none.
    pub fn from_code(
        class: &'static ErrorClass,
        code: &str,
        args: Vec<ErrorArg>,
    ) -> FaultResult<ErrorRecord> {
        if args.len() > MAX_POSITIONAL_ARGUMENTS {
            return Err(FaultError::invalid_argument(&format!(
                "at most {} arguments may follow the code, got {}",
                MAX_POSITIONAL_ARGUMENTS,
                args.len()
            )));
        }

        let dictionary = DictionaryRegistry::global().resolve(class)?;
        let code = code.trim();
        let mut args = args.into_iter();

        let (message, entry, resolved) = match args.next() {
            Some(ErrorArg::Text(message)) | Some(ErrorArg::Value(Value::String(message))) => {
                let entry = resolve_entry(&dictionary, code, None)?;
                let resolved = resolve_arguments(Some(code.into()), args.next(), args.next());
                (message, entry, resolved)
            }
            other => {
                let resolved = resolve_arguments(Some(code.into()), other, args.next());
                let metadata = resolved.metadata.clone().map(Value::Object);
                let entry = resolve_entry(&dictionary, code, metadata.as_ref())?;
                (entry.message.clone(), entry, resolved)
            }
        };

        let mut builder = ErrorBuilder::new(message).class(class).arguments(resolved);
        if let Some(severity) = entry.severity {
            builder = builder.severity(severity);
        }
        builder.build()
    }
}
