//! Summaries of a built registry tree

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use testreg_core::catalog::{layout, PlatformCatalog, RegistriesConfig, RegistryConfig};

#[derive(Debug, Serialize, Tabled)]
pub struct RegistryRow {
    #[tabled(rename = "Registry")]
    pub id: String,
    #[tabled(rename = "Enabled")]
    pub enabled: bool,
    #[tabled(rename = "Platforms")]
    pub platforms: bool,
    #[tabled(rename = "Non-platform")]
    pub non_platform: bool,
    #[tabled(rename = "Members")]
    pub members: usize,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ReleaseRow {
    #[tabled(rename = "Registry")]
    pub registry: String,
    #[tabled(rename = "Quarkus")]
    pub quarkus_version: String,
    #[tabled(rename = "Platform")]
    pub platform: String,
    #[tabled(rename = "Stream")]
    pub stream: String,
    #[tabled(rename = "Release")]
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct Inspection {
    pub registries: Vec<RegistryRow>,
    pub releases: Vec<ReleaseRow>,
}

pub fn inspect(base_dir: &Path) -> Result<Inspection> {
    let config_path = layout::client_config_path(base_dir);
    let config = RegistriesConfig::load_from_path(&config_path).with_context(|| {
        format!(
            "No registry client configuration at {}",
            config_path.display()
        )
    })?;

    let mut inspection = Inspection {
        registries: Vec::new(),
        releases: Vec::new(),
    };

    for entry in &config.registries {
        let registry_dir = layout::registry_dir(base_dir, &entry.id);
        let descriptor = RegistryConfig::from_file(&layout::registry_descriptor_path(&registry_dir))
            .with_context(|| format!("Failed to read descriptor of registry {}", entry.id))?;

        inspection.registries.push(RegistryRow {
            id: entry.id.clone(),
            enabled: entry.enabled,
            platforms: descriptor.platforms.as_ref().is_some_and(|p| !p.disabled),
            non_platform: descriptor
                .non_platform_extensions
                .as_ref()
                .is_some_and(|n| !n.disabled),
            members: count_files(&layout::members_dir(&registry_dir))?,
        });

        for quarkus_version in bucket_versions(&registry_dir)? {
            let catalog = PlatformCatalog::from_file(&layout::platforms_catalog_path(
                &registry_dir,
                Some(quarkus_version.as_str()),
            ))?;
            for (platform, stream, release) in catalog.releases() {
                inspection.releases.push(ReleaseRow {
                    registry: entry.id.clone(),
                    quarkus_version: quarkus_version.clone(),
                    platform: platform.to_string(),
                    stream: stream.to_string(),
                    version: release.version.clone(),
                });
            }
        }
    }

    Ok(inspection)
}

/// Quarkus versions that have a platforms document, sorted
fn bucket_versions(registry_dir: &Path) -> Result<Vec<String>> {
    let platforms_dir = layout::platforms_dir(registry_dir);
    if !platforms_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut versions = Vec::new();
    for entry in std::fs::read_dir(&platforms_dir)
        .with_context(|| format!("Failed to read {}", platforms_dir.display()))?
    {
        let entry = entry?;
        if entry.path().is_dir() {
            versions.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    versions.sort();
    Ok(versions)
}

fn count_files(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        if entry?.path().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

pub fn print_tables(inspection: &Inspection) {
    let registries = Table::new(&inspection.registries)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{registries}");

    if inspection.releases.is_empty() {
        println!("No platform releases");
        return;
    }

    let releases = Table::new(&inspection.releases)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{releases}");
}
