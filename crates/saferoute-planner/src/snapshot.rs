//! Hotspot snapshot loading.
//!
//! A snapshot is a JSON array of hotspot records, or an object wrapping that
//! array under `"hotspots"`. Records the core normalizer rejects are counted
//! and skipped; the rest of the snapshot still loads.

use saferoute_core::models::Hotspot;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read hotspot snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("hotspot snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("hotspot snapshot must be an array or an object with a \"hotspots\" array")]
    UnexpectedShape,
}

#[derive(Debug, Clone, Default)]
pub struct HotspotSnapshot {
    hotspots: Vec<Hotspot>,
    skipped: usize,
}

impl HotspotSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, SnapshotError> {
        let records = match value {
            Value::Array(records) => records,
            Value::Object(map) => match map.get("hotspots") {
                Some(Value::Array(records)) => records,
                _ => return Err(SnapshotError::UnexpectedShape),
            },
            _ => return Err(SnapshotError::UnexpectedShape),
        };

        let mut snapshot = Self::empty();
        for record in records {
            match Hotspot::from_record(record) {
                Some(hotspot) => snapshot.hotspots.push(hotspot),
                None => snapshot.skipped += 1,
            }
        }
        Ok(snapshot)
    }

    /// Read and parse a snapshot file.
    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Like [`HotspotSnapshot::read`], but a missing or malformed file yields
    /// an empty snapshot so planning can continue without risk data.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(snapshot) => {
                if snapshot.skipped > 0 {
                    tracing::warn!(
                        path = %path.display(),
                        skipped = snapshot.skipped,
                        "ignored hotspot records without usable coordinates"
                    );
                }
                tracing::info!(
                    path = %path.display(),
                    hotspots = snapshot.hotspots.len(),
                    "loaded hotspot snapshot"
                );
                snapshot
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "hotspot snapshot unavailable, planning without risk data"
                );
                Self::empty()
            }
        }
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    /// Records dropped during normalization.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_snapshot(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "saferoute-snapshot-{}-{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).expect("write snapshot");
        path
    }

    #[test]
    fn accepts_bare_array_and_counts_skipped_records() {
        let snapshot = HotspotSnapshot::from_value(&json!([
            { "lat": 12.97, "lng": 77.59, "intensity": 120 },
            { "center": { "lat": "12.98", "lng": "77.60" }, "count": 30 },
            { "intensity": 500 },
            "not a record"
        ]))
        .expect("snapshot");

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.skipped(), 2);
        assert!((snapshot.hotspots()[1].lat - 12.98).abs() < 1e-9);
    }

    #[test]
    fn accepts_wrapped_array() {
        let snapshot = HotspotSnapshot::from_json_str(
            r#"{"generated_at": "2024-05-01", "hotspots": [{"lat": 1, "lng": 2, "intensity": 10, "radius": 80}]}"#,
        )
        .expect("snapshot");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.hotspots()[0].radius_m, 80.0);
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(matches!(
            HotspotSnapshot::from_value(&json!({ "points": [] })),
            Err(SnapshotError::UnexpectedShape)
        ));
        assert!(matches!(
            HotspotSnapshot::from_value(&json!(42)),
            Err(SnapshotError::UnexpectedShape)
        ));
        assert!(matches!(
            HotspotSnapshot::from_json_str("[{"),
            Err(SnapshotError::Parse(_))
        ));
    }

    #[test]
    fn reads_snapshot_from_disk() {
        let path = temp_snapshot("read", r#"[{"lat": 0, "lng": 0, "intensity": 250}]"#);
        let snapshot = HotspotSnapshot::read(&path).expect("snapshot");
        let _ = fs::remove_file(&path);

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.hotspots()[0].severity().is_high_risk());
    }

    #[test]
    fn load_degrades_to_empty() {
        let missing = std::env::temp_dir().join("saferoute-snapshot-does-not-exist.json");
        assert!(matches!(
            HotspotSnapshot::read(&missing),
            Err(SnapshotError::Io { .. })
        ));
        assert!(HotspotSnapshot::load(&missing).is_empty());

        let malformed = temp_snapshot("malformed", "not json");
        let snapshot = HotspotSnapshot::load(&malformed);
        let _ = fs::remove_file(&malformed);
        assert!(snapshot.is_empty());
    }
}
