//! Request validation
//!
//! Every handler validates its payload before any work begins. A rejected
//! request is distinct from a generation failure: it surfaces as an error
//! response, never as placeholder text.

use std::collections::BTreeMap;

use crate::{GrantRagError, Result};

use super::DEFAULT_SEARCH_LIMIT;

pub const MAX_SEARCH_LIMIT: usize = 50;

/// Reject empty or whitespace-only required fields
#[inline]
pub fn require_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GrantRagError::Validation(format!("No {} provided", field)));
    }
    Ok(())
}

/// Reject proposal requests that carry no applicant fields at all
#[inline]
pub fn require_inputs(inputs: &BTreeMap<String, String>) -> Result<()> {
    if inputs.is_empty() {
        return Err(GrantRagError::Validation(
            "No user inputs provided".to_string(),
        ));
    }
    Ok(())
}

/// Resolve the search result count, applying the default and bounds.
/// A zero count is a configuration error, not a validation error.
#[inline]
pub fn resolve_search_limit(k: Option<usize>) -> Result<usize> {
    let k = k.unwrap_or(DEFAULT_SEARCH_LIMIT);
    if k == 0 {
        return Err(GrantRagError::Config(
            "search limit must be at least 1".to_string(),
        ));
    }
    if k > MAX_SEARCH_LIMIT {
        return Err(GrantRagError::Validation(format!(
            "search limit {} exceeds maximum of {}",
            k, MAX_SEARCH_LIMIT
        )));
    }
    Ok(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_rejected() {
        assert!(require_non_empty("", "query").is_err());
        assert!(require_non_empty("   ", "query").is_err());
        assert!(require_non_empty("young artist funding", "query").is_ok());
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(require_inputs(&BTreeMap::new()).is_err());

        let inputs = BTreeMap::from([("budget".to_string(), "5000".to_string())]);
        assert!(require_inputs(&inputs).is_ok());
    }

    #[test]
    fn search_limit_defaults_and_bounds() {
        assert_eq!(
            resolve_search_limit(None).expect("default limit"),
            DEFAULT_SEARCH_LIMIT
        );
        assert_eq!(resolve_search_limit(Some(10)).expect("explicit limit"), 10);

        assert!(matches!(
            resolve_search_limit(Some(0)),
            Err(GrantRagError::Config(_))
        ));
        assert!(matches!(
            resolve_search_limit(Some(MAX_SEARCH_LIMIT + 1)),
            Err(GrantRagError::Validation(_))
        ));
    }
}
