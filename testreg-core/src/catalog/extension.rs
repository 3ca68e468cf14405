//! Extension catalog documents
//!
//! An extension catalog is contributed by one platform member BOM (members
//! directory) or by one non-platform quarkus version (non-platform directory).

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::coords::ArtifactCoords;
use crate::error::Result;

/// An extension catalog document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionCatalog {
    /// Catalog id (the catalog artifact coordinates as a string)
    pub id: String,

    /// Whether the catalog belongs to a platform member
    #[serde(default)]
    pub platform: bool,

    pub bom: ArtifactCoords,

    pub quarkus_core_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_quarkus_core_version: Option<String>,

    /// Extensions in insertion order; duplicates are kept
    #[serde(default)]
    pub extensions: Vec<Extension>,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// An extension listed in a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Extension {
    pub name: String,

    pub artifact: ArtifactCoords,

    /// Ids of the catalogs the extension originates from
    #[serde(default)]
    pub origins: Vec<String>,
}

impl Extension {
    /// Extension named after its artifact id, originating from `origin`
    pub fn new(artifact: ArtifactCoords, origin: &str) -> Self {
        Self {
            name: artifact.artifact_id.clone(),
            artifact,
            origins: vec![origin.to_string()],
        }
    }
}

impl ExtensionCatalog {
    pub fn new(id: impl Into<String>, bom: ArtifactCoords, quarkus_core_version: &str) -> Self {
        Self {
            id: id.into(),
            platform: false,
            bom,
            quarkus_core_version: quarkus_core_version.to_string(),
            upstream_quarkus_core_version: None,
            extensions: Vec::new(),
            metadata: serde_json::Map::new(),
        }
    }

    /// All extensions with the given artifact id
    pub fn extensions_named<'a>(
        &'a self,
        artifact_id: &'a str,
    ) -> impl Iterator<Item = &'a Extension> + 'a {
        self.extensions
            .iter()
            .filter(move |e| e.artifact.artifact_id == artifact_id)
    }

    /// Nested metadata value by key path, e.g. `["project", "properties"]`
    pub fn metadata_at(&self, path: &[&str]) -> Option<&serde_json::Value> {
        let (first, rest) = path.split_first()?;
        let mut value = self.metadata.get(*first)?;
        for key in rest {
            value = value.get(*key)?;
        }
        Some(value)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        super::load_json(path)
    }

    /// Write the catalog to `path`, creating parent directories
    pub fn persist(&self, path: &Path) -> Result<()> {
        super::persist_json(self, path)
    }
}

#[cfg(test)]
mod extension_tests {
    use super::*;
    use serde_json::json;

    fn sample_catalog() -> ExtensionCatalog {
        let bom = ArtifactCoords::pom("org.acme", "acme-bom", "1.0.0");
        let id = bom.to_catalog_artifact().to_string();
        let mut catalog = ExtensionCatalog::new(id.clone(), bom, "2.0.0");
        catalog.platform = true;
        catalog.extensions.push(Extension::new(
            ArtifactCoords::jar("org.acme", "acme-foo", "1.0.0"),
            &id,
        ));
        catalog.extensions.push(Extension::new(
            ArtifactCoords::jar("org.acme", "acme-foo", "1.0.0"),
            &id,
        ));
        catalog.metadata.insert(
            "project".to_string(),
            json!({"properties": {"maven-plugin-version": "1.0.0"}}),
        );
        catalog
    }

    #[test]
    fn test_duplicate_extensions_are_kept() {
        let catalog = sample_catalog();
        assert_eq!(catalog.extensions_named("acme-foo").count(), 2);
        assert_eq!(catalog.extensions[0].name, "acme-foo");
        assert_eq!(catalog.extensions[0].origins, vec![catalog.id.clone()]);
    }

    #[test]
    fn test_metadata_at() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.metadata_at(&["project", "properties", "maven-plugin-version"]),
            Some(&json!("1.0.0"))
        );
        assert!(catalog.metadata_at(&["project", "missing"]).is_none());
        assert!(catalog.metadata_at(&[]).is_none());
    }

    #[test]
    fn test_persist_and_load() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("members/catalog.json");
        let catalog = sample_catalog();

        catalog.persist(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"quarkus-core-version\": \"2.0.0\""));

        assert_eq!(ExtensionCatalog::from_file(&path).unwrap(), catalog);
    }
}
