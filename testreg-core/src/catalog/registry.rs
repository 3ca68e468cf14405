//! Registry configuration documents
//!
//! `RegistriesConfig` is the client configuration written to
//! `<base>/config.yaml`; `RegistryConfig` is both a registry entry of that
//! file and the registry descriptor written to `<base>/<id>/config.json`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::coords::{ArtifactCoords, TYPE_JSON};
use crate::error::{RegistryError, Result};

pub const DEFAULT_REGISTRY_DESCRIPTOR_ARTIFACT_ID: &str = "quarkus-registry-descriptor";
pub const DEFAULT_REGISTRY_PLATFORMS_CATALOG_ARTIFACT_ID: &str = "quarkus-platforms";
pub const DEFAULT_REGISTRY_NON_PLATFORM_EXTENSIONS_CATALOG_ARTIFACT_ID: &str =
    "quarkus-non-platform-extensions";
pub const DEFAULT_REGISTRY_ARTIFACT_VERSION: &str = "1.0-SNAPSHOT";

/// Registry extra pointing at the client implementation to load
pub const EXTRA_CLIENT_FACTORY_URL: &str = "client-factory-url";
/// Registry extra telling the client to resolve member BOMs through Maven
pub const EXTRA_ENABLE_MAVEN_RESOLVER: &str = "enable-maven-resolver";

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_true(value: &bool) -> bool {
    *value
}

fn default_true() -> bool {
    true
}

/// Client configuration (config.yaml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistriesConfig {
    #[serde(default, skip_serializing_if = "is_false")]
    pub debug: bool,

    /// Configured registries in insertion order
    #[serde(default)]
    pub registries: Vec<RegistryConfig>,
}

/// A registry entry / registry descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryConfig {
    pub id: String,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<RegistryDescriptorConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<RegistryPlatformsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_platform_extensions: Option<RegistryNonPlatformExtensionsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarkus_versions: Option<RegistryQuarkusVersionsConfig>,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryDescriptorConfig {
    pub artifact: ArtifactCoords,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryPlatformsConfig {
    pub artifact: ArtifactCoords,

    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,

    /// Member extension catalogs are published next to the platforms
    #[serde(default, skip_serializing_if = "is_false")]
    pub extension_catalogs_included: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryNonPlatformExtensionsConfig {
    pub artifact: ArtifactCoords,

    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

/// Which quarkus versions a registry recognizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryQuarkusVersionsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognized_versions_expression: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive_provider: bool,
}

/// Maven group id of a registry: dot-separated id segments in reverse
/// order (`registry.acme.org` becomes `org.acme.registry`)
pub fn registry_group_id(registry_id: &str) -> String {
    registry_id.rsplit('.').collect::<Vec<_>>().join(".")
}

/// Coordinates of one of the registry's JSON artifacts
pub fn registry_artifact(group_id: &str, artifact_id: &str) -> ArtifactCoords {
    ArtifactCoords::new(
        group_id,
        artifact_id,
        "",
        TYPE_JSON,
        DEFAULT_REGISTRY_ARTIFACT_VERSION,
    )
}

impl RegistryConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            descriptor: None,
            platforms: None,
            non_platform_extensions: None,
            quarkus_versions: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.extra.insert(key.to_string(), value.into());
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        super::load_json(path)
    }

    /// Write the descriptor as JSON
    pub fn persist(&self, path: &Path) -> Result<()> {
        super::persist_json(self, path)
    }
}

impl RegistriesConfig {
    /// Load client configuration from a YAML file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
        Self::from_yaml(&content).map_err(|e| RegistryError::serialize(path, e))
    }

    /// Parse client configuration from a YAML string
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml_ng::Error> {
        serde_yaml_ng::from_str(content)
    }

    /// Save client configuration as YAML
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml_ng::to_string(self).map_err(|e| RegistryError::serialize(path, e))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| RegistryError::io(path, e))?;

        tracing::debug!("Saved registry client configuration {}", path.display());
        Ok(())
    }

    /// Get a registry by id
    pub fn get_registry(&self, id: &str) -> Option<&RegistryConfig> {
        self.registries.iter().find(|r| r.id == id)
    }

    /// Add a registry entry, replacing an existing entry with the same id
    pub fn add_registry(&mut self, registry: RegistryConfig) {
        match self.registries.iter_mut().find(|r| r.id == registry.id) {
            Some(existing) => *existing = registry,
            None => self.registries.push(registry),
        }
    }
}
