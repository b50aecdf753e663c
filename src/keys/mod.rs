//! Location key resolution.
//!
//! Users type keys as `"NY"`, `"New York"`, or `"NY:Albany"`. Resolution
//! substitutes known state abbreviations with their full names so the keys
//! match the dataset's `state` column. Unknown abbreviations pass through
//! unchanged (identity fallback); only a missing or malformed map file is an
//! error.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::LocationKey;
use crate::error::AppError;

/// Abbreviation -> canonical full name, loaded once per run.
pub type AbbreviationMap = HashMap<String, String>;

/// Resolve raw key strings against the abbreviation map at `map_path`.
///
/// An empty key list returns empty immediately and never touches the map
/// file; callers rely on this short-circuit (the default all-states key set
/// is computed later, after ingest). Input order is preserved and keys are
/// not deduplicated.
pub fn resolve_keys(raw: &[String], map_path: &Path) -> Result<Vec<LocationKey>, AppError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let map = crate::io::abbrev::load_abbrev_map(map_path)?;
    Ok(raw
        .iter()
        .map(|entry| resolve_key(&LocationKey::parse(entry), &map))
        .collect())
}

/// Substitute the state part of a key if the map knows the abbreviation.
///
/// For compound keys only the state part is substituted; the county part is
/// passed through verbatim.
pub fn resolve_key(key: &LocationKey, map: &AbbreviationMap) -> LocationKey {
    let state = map
        .get(&key.state)
        .cloned()
        .unwrap_or_else(|| key.state.clone());
    LocationKey {
        state,
        county: key.county.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_map() -> AbbreviationMap {
        let mut map = HashMap::new();
        map.insert("NY".to_string(), "New York".to_string());
        map.insert("CA".to_string(), "California".to_string());
        map
    }

    #[test]
    fn known_abbreviation_is_substituted() {
        let key = resolve_key(&LocationKey::parse("NY"), &test_map());
        assert_eq!(key.to_string(), "New York");
    }

    #[test]
    fn compound_key_substitutes_state_only() {
        let key = resolve_key(&LocationKey::parse("NY:Albany"), &test_map());
        assert_eq!(key.state, "New York");
        assert_eq!(key.county.as_deref(), Some("Albany"));
    }

    #[test]
    fn unknown_key_is_identity() {
        let key = resolve_key(&LocationKey::parse("Avalon"), &test_map());
        assert_eq!(key.to_string(), "Avalon");

        let key = resolve_key(&LocationKey::parse("Avalon:Alder"), &test_map());
        assert_eq!(key.to_string(), "Avalon:Alder");
    }

    #[test]
    fn empty_keys_skip_the_map_file_entirely() {
        // The path does not exist; resolution must not try to open it.
        let missing = PathBuf::from("/nonexistent/state-codes.json");
        let resolved = resolve_keys(&[], &missing).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn missing_map_is_fatal_when_keys_are_present() {
        let missing = PathBuf::from("/nonexistent/state-codes.json");
        let err = resolve_keys(&["NY".to_string()], &missing).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn order_is_preserved_without_deduplication() {
        let map = test_map();
        let raw = ["CA", "NY", "CA"];
        let resolved: Vec<String> = raw
            .iter()
            .map(|r| resolve_key(&LocationKey::parse(r), &map).to_string())
            .collect();
        assert_eq!(resolved, vec!["California", "New York", "California"]);
    }
}
