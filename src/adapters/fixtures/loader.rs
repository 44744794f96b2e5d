use std::fs;
use std::path::Path;

use crate::adapters::store::DataLoadError;
use crate::domain::Snapshot;

/// Parse a JSON array of snapshots and validate each one
pub fn parse_series(content: &str) -> Result<Vec<Snapshot>, DataLoadError> {
    let snapshots: Vec<Snapshot> = serde_json::from_str(content)?;
    if snapshots.is_empty() {
        return Err(DataLoadError::Empty);
    }

    for (index, snapshot) in snapshots.iter().enumerate() {
        snapshot.validate().map_err(|e| DataLoadError::Malformed {
            index,
            reason: e.to_string(),
        })?;
    }

    Ok(snapshots)
}

/// Read and parse a fixture file
pub fn load_series(path: &Path) -> Result<Vec<Snapshot>, DataLoadError> {
    let content = fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_series(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::fixtures::sample;

    fn series_json(snapshots: &[Snapshot]) -> String {
        serde_json::to_string(snapshots).unwrap()
    }

    #[test]
    fn test_parse_series() {
        let json = series_json(&[sample("Jan", 1.0, 2.0), sample("Feb", 3.0, 4.0)]);
        let series = parse_series(&json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].battery_status.system_maintenance.version, "Feb");
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(matches!(parse_series("[]"), Err(DataLoadError::Empty)));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(parse_series("{not json"), Err(DataLoadError::Json(_))));
        assert!(matches!(parse_series(r#"[{"weather": 1}]"#), Err(DataLoadError::Json(_))));
    }

    #[test]
    fn test_parse_reports_malformed_index() {
        let mut bad = sample("Feb", 1.0, 1.0);
        bad.battery_status.soh = 101.0;
        let json = series_json(&[sample("Jan", 1.0, 1.0), bad]);

        match parse_series(&json) {
            Err(DataLoadError::Malformed { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("SOH"));
            }
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_series_from_file() {
        let path = std::env::temp_dir().join(format!("solardash-loader-{}.json", std::process::id()));
        fs::write(&path, series_json(&[sample("Mar", 5.0, 5.0)])).unwrap();

        let series = load_series(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].power_generation.total_power(), 10.0);
    }

    #[test]
    fn test_bundled_fixtures_load() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");

        let live = load_series(&data.join("live.json")).unwrap();
        assert_eq!(live.len(), 12);
        let history = load_series(&data.join("hist.json")).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_load_series_missing_file() {
        let err = load_series(Path::new("/nonexistent/solardash/live.json")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/solardash/live.json"));
    }
}
