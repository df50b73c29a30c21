//! Grant type classification
//!
//! A grant has no stored type: it is inferred per request from whatever
//! content the caller supplies, via a single generation call whose free-text
//! reply is normalized by `interpret_reply`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a grant is intended for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantType {
    Organization,
    Individual,
}

impl GrantType {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            GrantType::Organization => "ORGANIZATION",
            GrantType::Individual => "INDIVIDUAL",
        }
    }
}

impl fmt::Display for GrantType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a free-text reply to the classification prompt into a label.
///
/// "company"/"organization" win over "individual" when both appear, and
/// anything unrecognized falls back to Organization. The fallback is part of
/// the contract, not error handling: ambiguous grants get the
/// organization-oriented prompt family downstream.
#[inline]
pub fn interpret_reply(reply: &str) -> GrantType {
    let lower = reply.to_lowercase();
    if lower.contains("company") || lower.contains("organization") {
        GrantType::Organization
    } else if lower.contains("individual") {
        GrantType::Individual
    } else {
        GrantType::Organization
    }
}
