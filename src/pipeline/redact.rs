//! Sensitive-field redaction
//!
//! Caller-supplied proposal inputs are scanned for identifying keys before
//! they can reach any prompt. This runs unconditionally inside proposal
//! assembly; callers cannot bypass it.

use std::collections::BTreeMap;

/// Key substrings that mark a caller-supplied field as identifying
const SENSITIVE_KEY_TERMS: &[&str] = &[
    "name", "email", "phone", "address", "social", "birth", "sin", "ssn", "personal", "identity",
    "passport", "license", "health",
];

/// Replace the values of identifying fields with placeholder tokens.
///
/// A key matches when any denylist term is a case-insensitive substring of
/// it. Matched keys are rewritten to their human-readable form and their
/// values become `[YOUR <KEY> HERE]` tokens; everything else passes through
/// untouched.
#[inline]
pub fn redact_inputs(inputs: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    inputs
        .iter()
        .map(|(key, value)| {
            if is_sensitive_key(key) {
                let readable = humanize_key(key);
                let placeholder = format!("[YOUR {} HERE]", readable.to_uppercase());
                (readable, placeholder)
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEY_TERMS.iter().any(|term| lower.contains(term))
}

/// Render a field key for humans: split camelCase and snake_case compounds
/// into words and title-case each one ("firstName" -> "First Name").
#[inline]
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && current.chars().last().is_some_and(char::is_lowercase) {
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let titled: Vec<String> = words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect();
    titled.join(" ")
}
