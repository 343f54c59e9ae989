//! Manifest export: JSON and CSV renderings of a build's archive list.

use std::path::Path;

use anyhow::{bail, Context, Result};
use barvault_core::ArtifactManifestEntry;

/// On-disk manifest format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    #[default]
    Json,
    Csv,
}

impl ManifestFormat {
    /// Infer from a file extension; anything but `.csv` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

impl std::str::FromStr for ManifestFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => bail!("unknown manifest format '{other}' (expected json or csv)"),
        }
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_manifest_json(entries: &[ArtifactManifestEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).context("failed to serialize manifest to JSON")
}

pub fn import_manifest_json(json: &str) -> Result<Vec<ArtifactManifestEntry>> {
    serde_json::from_str(json).context("failed to deserialize manifest JSON")
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Columns: resource_type, archive_path, content_hash, produced_at
pub fn export_manifest_csv(entries: &[ArtifactManifestEntry]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["resource_type", "archive_path", "content_hash", "produced_at"])?;
    for e in entries {
        wtr.write_record([
            e.resource_type.as_str(),
            e.archive_path.as_str(),
            e.content_hash.as_str(),
            &e.produced_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write `entries` to `path`, creating parent directories.
pub fn write_manifest(path: &Path, entries: &[ArtifactManifestEntry], format: ManifestFormat) -> Result<()> {
    let body = match format {
        ManifestFormat::Json => export_manifest_json(entries)?,
        ManifestFormat::Csv => export_manifest_csv(entries)?,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create manifest dir: {}", dir.display()))?;
    }
    std::fs::write(path, body).with_context(|| format!("failed to write manifest: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entries() -> Vec<ArtifactManifestEntry> {
        let at = NaiveDate::from_ymd_opt(2024, 3, 20)
            .unwrap()
            .and_hms_opt(15, 31, 2)
            .unwrap();
        vec![
            ArtifactManifestEntry {
                resource_type: "sse.d1".into(),
                archive_path: "/srv/SSE/DAY/DAY.20240301".into(),
                content_hash: "00ff".into(),
                produced_at: at,
            },
            ArtifactManifestEntry {
                resource_type: "sse.d1".into(),
                archive_path: "/srv/SSE/DAY/DAY.20240318".into(),
                content_hash: "a1b2".into(),
                produced_at: at,
            },
        ]
    }

    #[test]
    fn json_roundtrip() {
        let json = export_manifest_json(&entries()).unwrap();
        assert_eq!(import_manifest_json(&json).unwrap(), entries());
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = export_manifest_csv(&entries()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "resource_type,archive_path,content_hash,produced_at");
        assert_eq!(lines[1], "sse.d1,/srv/SSE/DAY/DAY.20240301,00ff,2024-03-20T15:31:02");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn format_inference() {
        assert_eq!(ManifestFormat::from_path(Path::new("m.CSV")), ManifestFormat::Csv);
        assert_eq!(ManifestFormat::from_path(Path::new("m.json")), ManifestFormat::Json);
        assert_eq!("csv".parse::<ManifestFormat>().unwrap(), ManifestFormat::Csv);
        assert!("xml".parse::<ManifestFormat>().is_err());
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifests/2024/out.csv");
        write_manifest(&path, &entries(), ManifestFormat::Csv).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("resource_type,"));
    }
}
