//! Placeholder substitution: `{{name}}` token replacement with fallback
//! policy.
//!
//! Pure text transformation with no external state. Token grammar is
//! `{{identifier}}` where the identifier matches `[A-Za-z0-9_]+`.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Map of substitution variables. Values are JSON so numeric and null
/// contact fields pass through without pre-stringification.
pub type VariableMap = HashMap<String, Value>;

/// Errors from placeholder substitution.
#[derive(Debug, Error)]
pub enum SubstitutionError {
    /// Strict mode found a placeholder with no variable backing it.
    #[error("missing variable: {0}")]
    MissingVariable(String),
}

/// Behaviour flags for [`substitute`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionOptions {
    /// Fail on any unresolved placeholder instead of emptying it.
    pub strict: bool,
    /// Keep unresolved `{{name}}` tokens verbatim instead of emptying them.
    pub keep_placeholders: bool,
    /// Suppress the per-token warning for unresolved placeholders.
    pub suppress_warnings: bool,
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder token pattern is valid")
    })
}

/// Render a variable value as replacement text. Null becomes empty.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replace every `{{name}}` token in `text` from `variables`.
///
/// Per-token policy: a present, non-null variable is stringified in place;
/// a present null becomes the empty string; an absent variable fails in
/// strict mode, and otherwise is emptied (or kept verbatim under
/// `keep_placeholders`) with a warning unless warnings are suppressed.
///
/// # Errors
///
/// Returns [`SubstitutionError::MissingVariable`] naming the first
/// unresolved token when `options.strict` is set. The whole substitution
/// for that text is aborted.
pub fn substitute(
    text: &str,
    variables: &VariableMap,
    options: SubstitutionOptions,
) -> Result<String, SubstitutionError> {
    if options.strict {
        if let Some(missing) = extract_placeholders(text)
            .into_iter()
            .find(|name| !variables.contains_key(name))
        {
            return Err(SubstitutionError::MissingVariable(missing));
        }
    }
    let replaced = token_pattern().replace_all(text, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match variables.get(name) {
            Some(value) => stringify(value),
            None => {
                if !options.suppress_warnings {
                    warn!(placeholder = name, "no variable for placeholder");
                }
                if options.keep_placeholders {
                    caps[0].to_string()
                } else {
                    String::new()
                }
            }
        }
    });
    Ok(replaced.into_owned())
}

/// Distinct placeholder names in `text`, in order of first appearance.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in token_pattern().captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Outcome of a dry-run placeholder check.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// True when every placeholder in the text has a variable.
    pub valid: bool,
    /// Placeholder names with no variable backing them.
    pub missing: Vec<String>,
}

/// Check `text` against `variables` without substituting. Pure; no
/// warnings, no side effects. Usable for pre-flight checks.
pub fn validate(text: &str, variables: &VariableMap) -> ValidationReport {
    let missing: Vec<String> = extract_placeholders(text)
        .into_iter()
        .filter(|name| !variables.contains_key(name))
        .collect();
    ValidationReport {
        valid: missing.is_empty(),
        missing,
    }
}
