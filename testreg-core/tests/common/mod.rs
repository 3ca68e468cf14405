//! Test helper functions for integration tests
//!
//! Shared across test files using the tests/common/ pattern.

#![allow(dead_code)]

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Once;
use testreg_core::catalog::{layout, ExtensionCatalog, PlatformCatalog, RegistryConfig};

pub const REGISTRY_ID: &str = "registry.acme.org";

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn registry_dir(base: &Path) -> std::path::PathBuf {
    layout::registry_dir(base, REGISTRY_ID)
}

/// Platforms document for one quarkus version of the test registry
pub fn load_bucket(base: &Path, quarkus_version: &str) -> Result<PlatformCatalog> {
    let path = layout::platforms_catalog_path(&registry_dir(base), Some(quarkus_version));
    PlatformCatalog::from_file(&path).with_context(|| format!("loading {}", path.display()))
}

pub fn load_root_platforms(base: &Path) -> Result<PlatformCatalog> {
    let path = layout::platforms_catalog_path(&registry_dir(base), None);
    PlatformCatalog::from_file(&path).with_context(|| format!("loading {}", path.display()))
}

pub fn load_descriptor(base: &Path) -> Result<RegistryConfig> {
    let path = layout::registry_descriptor_path(&registry_dir(base));
    RegistryConfig::from_file(&path).with_context(|| format!("loading {}", path.display()))
}

pub fn load_member(
    base: &Path,
    group: &str,
    artifact: &str,
    version: &str,
) -> Result<ExtensionCatalog> {
    let bom = testreg_core::catalog::ArtifactCoords::pom(group, artifact, version);
    let path = layout::member_catalog_path(&registry_dir(base), &bom);
    ExtensionCatalog::from_file(&path).with_context(|| format!("loading {}", path.display()))
}

/// Every `platforms.json` below the test registry
pub fn platform_documents(base: &Path) -> Vec<std::path::PathBuf> {
    fn walk(dir: &Path, found: &mut Vec<std::path::PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, found);
            } else if path.file_name().is_some_and(|name| name == layout::PLATFORMS_FILE) {
                found.push(path);
            }
        }
    }

    let mut found = Vec::new();
    walk(&registry_dir(base), &mut found);
    found.sort();
    found
}
