// Grant record loading and normalization
// Turns the raw grants JSON into flat text documents plus a metadata projection

#[cfg(test)]
mod tests;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{GrantRagError, Result};

/// Field order for the flattened text rendering. The order is load-bearing:
/// chunk boundaries for a record are only reproducible across builds if the
/// rendering never changes. Missing fields render as empty values, never
/// omitted.
const TEXT_FIELDS: &[(&str, &str)] = &[
    ("Program Name", "program_name"),
    ("Program Source", "program_source"),
    ("Program Type", "program_type"),
    ("Program Target", "program_target"),
    ("Description", "description"),
    ("Program Status", "program_status"),
    ("Main Industry", "main_industry"),
    ("Location", "location"),
    ("Country", "country"),
    ("Min Employees", "min_employees"),
    ("Max Employees", "max_employees"),
    ("Min Revenue", "min_revenue"),
    ("Max Revenue", "max_revenue"),
    ("Target Audience", "target_audience"),
    ("Open Date", "open_date"),
    ("Close Date", "close_date"),
    ("Min Funding", "min_funding"),
    ("Max Funding", "max_funding"),
    ("Amount", "amount"),
    ("Unit", "unit"),
    ("Selling Internationally", "selling_internationally"),
    ("Incorporated", "incorporated"),
    ("For Profit", "for_profit"),
    ("Indigenous Group", "indigenous_group"),
    ("URL", "url"),
];

/// One raw grant program record. The upstream data set has no schema worth
/// trusting, so the record is an arbitrary key/value mapping with a total
/// accessor that never fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantRecord {
    fields: Map<String, Value>,
}

/// Fixed metadata projection carried with every chunk of a grant document.
/// Always derivable from the owning record; never holds computed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantMetadata {
    pub program_id: String,
    pub program_name: String,
    pub program_status: String,
    pub location: String,
    pub country: String,
    pub target_audience: String,
    pub main_industry: String,
}

/// A normalized grant: flat labeled text plus the metadata projection
#[derive(Debug, Clone, PartialEq)]
pub struct GrantDocument {
    pub text: String,
    pub metadata: GrantMetadata,
}

impl GrantRecord {
    /// Render a field as text. Absent and null fields are empty strings;
    /// numbers and booleans render as their JSON text.
    #[inline]
    pub fn field(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// The record's `program_id`, rendered as an opaque label (it is not
    /// guaranteed unique or present upstream).
    #[inline]
    pub fn program_id(&self) -> String {
        self.field("program_id")
    }

    /// Flatten the record into a labeled text document with the fixed field
    /// order, and project out the chunk metadata. Pure and total.
    #[inline]
    pub fn normalize(&self) -> GrantDocument {
        let mut text = String::new();
        for (label, key) in TEXT_FIELDS {
            text.push_str(label);
            text.push_str(": ");
            text.push_str(&self.field(key));
            text.push('\n');
        }

        GrantDocument {
            text,
            metadata: GrantMetadata {
                program_id: self.field("program_id"),
                program_name: self.field("program_name"),
                program_status: self.field("program_status"),
                location: self.field("location"),
                country: self.field("country"),
                target_audience: self.field("target_audience"),
                main_industry: self.field("main_industry"),
            },
        }
    }
}

/// Load the grants JSON array from disk.
///
/// The upstream export is known to contain stray ASCII control characters
/// that break JSON parsing, so the raw text is scrubbed before it reaches
/// serde. A file that still fails to parse is unusable build input and is
/// reported as such, not silently replaced.
#[inline]
pub fn load_grants(path: &Path) -> Result<Vec<GrantRecord>> {
    if !path.exists() {
        return Err(GrantRagError::IndexUnavailable(format!(
            "grants file not found: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)?;
    let cleaned = scrub_control_chars(&raw);
    if cleaned.len() != raw.len() {
        debug!(
            "Stripped {} control characters from {}",
            raw.len() - cleaned.len(),
            path.display()
        );
    }

    let grants: Vec<GrantRecord> = serde_json::from_str(&cleaned).map_err(|e| {
        GrantRagError::IndexUnavailable(format!(
            "failed to parse grants file {}: {}",
            path.display(),
            e
        ))
    })?;

    info!("Loaded {} grant records from {}", grants.len(), path.display());
    Ok(grants)
}

fn scrub_control_chars(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\u{00}'..='\u{1f}' | '\u{7f}'))
        .collect()
}
