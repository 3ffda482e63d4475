//! # File I/O
//!
//! Worksheet persistence:
//! - **Atomic saves**: write to `.tmp`, sync, then rename over the target
//! - **Version validation**: refuse files from an incompatible schema
//! - **Item files**: a single [`CalculationItem`] as JSON, for `fincalc eval`
//!
//! ```rust,no_run
//! use fincalc_core::file_io::{load_worksheet, save_worksheet};
//! use fincalc_core::worksheet::Worksheet;
//! use std::path::Path;
//!
//! let sheet = Worksheet::new("Household", "Sam");
//! save_worksheet(&sheet, Path::new("household.fcw"))?;
//! let loaded = load_worksheet(Path::new("household.fcw"))?;
//! # Ok::<(), fincalc_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::calculations::CalculationItem;
use crate::errors::{CalcError, CalcResult};
use crate::worksheet::{Worksheet, SCHEMA_VERSION};

/// Save a worksheet with atomic write semantics.
///
/// The JSON goes to `<path>.tmp` first and is renamed into place after an
/// fsync, so an interrupted save never leaves a truncated worksheet.
pub fn save_worksheet(sheet: &Worksheet, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(sheet).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), items = sheet.item_count(), "worksheet saved");
    Ok(())
}

/// Load a worksheet and check its schema version.
pub fn load_worksheet(path: &Path) -> CalcResult<Worksheet> {
    let contents =
        fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let sheet: Worksheet = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid worksheet JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&sheet.meta.version)?;
    sheet.settings.policy.validate()?;

    tracing::debug!(path = %path.display(), items = sheet.item_count(), "worksheet loaded");
    Ok(sheet)
}

/// Read one tagged calculator input from a JSON file.
pub fn load_item(path: &Path) -> CalcResult<CalculationItem> {
    let contents =
        fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    parse_item(&contents)
}

/// Parse one tagged calculator input from JSON text.
///
/// A JSON object without a `"type"` tag is reported as a missing field.
pub fn parse_item(json: &str) -> CalcResult<CalculationItem> {
    let invalid = |e: serde_json::Error| CalcError::SerializationError {
        reason: format!("Invalid calculation item: {}", e),
    };
    let value: serde_json::Value = serde_json::from_str(json).map_err(invalid)?;
    if value.is_object() && value.get("type").is_none() {
        return Err(CalcError::missing_field("type"));
    }
    serde_json::from_value(value).map_err(invalid)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Major versions must match; within 0.x the file's minor may not be newer.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Option<(u32, u32)> {
        let mut parts = v.split('.').map(|p| p.parse::<u32>());
        let major = parts.next()?.ok()?;
        let minor = parts.next().and_then(|p| p.ok()).unwrap_or(0);
        Some((major, minor))
    };

    let (file_major, file_minor) = parse(file_version).ok_or_else(mismatch)?;
    let (current_major, current_minor) = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file_major != current_major {
        return Err(mismatch());
    }
    if current_major == 0 && file_minor > current_minor {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::CreditPayoffInput;

    fn sample() -> Worksheet {
        let mut sheet = Worksheet::new("Household", "Sam");
        sheet.add_item(CalculationItem::CreditPayoff(CreditPayoffInput {
            label: "Visa".to_string(),
            balance: 5_000.0,
            annual_rate_pct: 18.0,
            monthly_payment: 200.0,
            target_months: Some(24),
        }));
        sheet
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("household.fcw");

        let sheet = sample();
        save_worksheet(&sheet, &path).unwrap();

        let loaded = load_worksheet(&path).unwrap();
        assert_eq!(loaded, sheet);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atomic.fcw");

        save_worksheet(&sample(), &path).unwrap();
        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());
        assert_eq!(tmp_path_for(&path), dir.path().join("atomic.fcw.tmp"));
    }

    #[test]
    fn test_save_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.fcw");

        save_worksheet(&Worksheet::new("First", "Sam"), &path).unwrap();
        save_worksheet(&Worksheet::new("Second", "Sam"), &path).unwrap();
        assert_eq!(load_worksheet(&path).unwrap().meta.title, "Second");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_worksheet(&dir.path().join("nope.fcw")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.fcw");

        let mut sheet = sample();
        sheet.meta.version = "0.9.0".to_string();
        save_worksheet(&sheet, &path).unwrap();

        let err = load_worksheet(&path).unwrap_err();
        assert!(matches!(err, CalcError::VersionMismatch { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_worksheet(file.path()).unwrap_err();
        assert!(matches!(err, CalcError::SerializationError { .. }));
    }

    #[test]
    fn test_load_item() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "type": "Lumpsum", "amount": 100000, "expected_return_pct": 12, "years": 10 }}"#
        )
        .unwrap();

        let item = load_item(file.path()).unwrap();
        assert_eq!(item.calc_type(), "Lump Sum");
        assert!(parse_item(r#"{ "type": "Unknown" }"#).is_err());
    }

    #[test]
    fn test_parse_item_without_type_tag() {
        let err = parse_item(r#"{ "amount": 120.0 }"#).unwrap_err();
        assert_eq!(err, CalcError::missing_field("type"));
        assert_eq!(err.error_code(), "MISSING_FIELD");

        let err = parse_item("[1, 2]").unwrap_err();
        assert!(matches!(err, CalcError::SerializationError { .. }));
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
