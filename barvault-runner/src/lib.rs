//! Barvault Runner: build orchestration on top of `barvault-core`.
//!
//! This crate provides:
//! - TOML run configuration (sources, target folder, code ranges)
//! - Folder traversal that feeds files through a resource policy
//! - Per-resource builds, run in parallel across configured sources
//! - Daily build schedule
//! - Manifest export as JSON or CSV

pub mod build;
pub mod compressor;
pub mod config;
pub mod export;
pub mod schedule;

pub use build::{build_all, build_resource, build_selected, BuildError, BuildReport, ResourceKey};
pub use compressor::{translate_folder, TraversalOutcome, TraversalStats};
pub use config::{ConfigError, RunConfig, SourceConfig};
pub use export::{export_manifest_csv, export_manifest_json, write_manifest, ManifestFormat};
pub use schedule::BuildSchedule;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<ResourceKey>();
        assert_sync::<ResourceKey>();
    }

    #[test]
    fn reports_are_send() {
        assert_send::<BuildReport>();
        assert_send::<TraversalOutcome>();
        assert_send::<BuildError>();
    }
}
