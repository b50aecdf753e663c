//! State abbreviation map loading.
//!
//! The map is a JSON object of `{"NY": "New York", ...}` pairs. It is read
//! once per run, before key resolution, and is read-only afterwards. A
//! missing or malformed file is a fatal configuration error; unknown
//! abbreviations are not (resolution falls back to identity).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::AppError;
use crate::keys::AbbreviationMap;

/// Load the abbreviation map from a JSON object file.
pub fn load_abbrev_map(path: &Path) -> Result<AbbreviationMap, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!(
            "Failed to open abbreviation map '{}': {e}",
            path.display()
        ))
    })?;
    parse_abbrev_map(file)
        .map_err(|e| AppError::config(format!("Invalid abbreviation map '{}': {e}", path.display())))
}

/// Parse the map from any reader; kept separate so tests can feed strings.
pub fn parse_abbrev_map(reader: impl Read) -> Result<AbbreviationMap, serde_json::Error> {
    serde_json::from_reader(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_json_object() {
        let map = parse_abbrev_map(r#"{"NY": "New York", "CA": "California"}"#.as_bytes()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("NY").map(String::as_str), Some("New York"));
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(parse_abbrev_map(r#"["NY", "New York"]"#.as_bytes()).is_err());
        assert!(parse_abbrev_map("not json".as_bytes()).is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_abbrev_map(Path::new("/nonexistent/state-codes.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
