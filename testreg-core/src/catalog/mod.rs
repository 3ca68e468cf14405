//! Registry catalog documents and artifact store
//!
//! This module holds everything a built registry tree is made of: the
//! persisted document types, the POM synthesizer, the local package
//! store and the directory layout conventions.
//!
//! # Layout
//!
//! ```text
//! <base>/
//!     ├── config.yaml              ← Client configuration (all registries)
//!     ├── <registry>/
//!     │      ├── config.json       ← Registry descriptor (written last)
//!     │      ├── platforms/        ← Root and per-quarkus-version platform catalogs
//!     │      ├── non-platform/     ← Non-platform extension catalogs
//!     │      └── members/          ← Member extension catalogs
//!     ├── maven-repo/              ← Installed artifacts
//!     └── tmp/                     ← Staged artifact files
//! ```

mod coords;
mod extension;
mod installer;
pub mod layout;
mod platform;
mod pom;
mod registry;

pub use coords::{
    catalog_artifact_id, is_catalog_artifact_id, ArtifactCoords, PLATFORM_DESCRIPTOR_SUFFIX,
    TYPE_JAR, TYPE_JSON, TYPE_POM,
};
pub use extension::{Extension, ExtensionCatalog};
pub use installer::{ArtifactInstaller, InstalledArtifact, ResolverState, MAVEN_REPO_DIR};
pub use platform::{
    bucket_by_quarkus_version, Platform, PlatformCatalog, PlatformRelease, PlatformStream,
};
pub use pom::{Dependency, DependencyList, DependencyManagement, PomModel};
pub use registry::{
    registry_artifact, registry_group_id, RegistriesConfig, RegistryConfig,
    RegistryDescriptorConfig, RegistryNonPlatformExtensionsConfig, RegistryPlatformsConfig,
    RegistryQuarkusVersionsConfig, DEFAULT_REGISTRY_ARTIFACT_VERSION,
    DEFAULT_REGISTRY_DESCRIPTOR_ARTIFACT_ID,
    DEFAULT_REGISTRY_NON_PLATFORM_EXTENSIONS_CATALOG_ARTIFACT_ID,
    DEFAULT_REGISTRY_PLATFORMS_CATALOG_ARTIFACT_ID, EXTRA_CLIENT_FACTORY_URL,
    EXTRA_ENABLE_MAVEN_RESOLVER,
};

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use crate::error::{RegistryError, Result};

/// Write a document as pretty-printed JSON, creating parent directories
pub(crate) fn persist_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content =
        serde_json::to_string_pretty(value).map_err(|e| RegistryError::serialize(path, e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| RegistryError::io(path, e))?;

    tracing::debug!("Persisted {}", path.display());
    Ok(())
}

pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| RegistryError::serialize(path, e))
}
