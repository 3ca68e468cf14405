//! Minimal POM synthesis
//!
//! Every BOM and extension artifact installed by the builder comes with a
//! small POM. BOM POMs manage their catalog counterpart plus one entry per
//! extension; deployment POMs depend on their runtime artifact.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::coords::{catalog_artifact_id, ArtifactCoords, TYPE_JAR, TYPE_JSON, TYPE_POM};
use crate::error::{RegistryError, Result};

pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";
pub const MODEL_VERSION: &str = "4.0.0";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

fn pom_namespace() -> String {
    POM_NAMESPACE.to_string()
}

/// A POM document reduced to what the registry fixtures need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "project", rename_all = "camelCase")]
pub struct PomModel {
    #[serde(rename = "@xmlns", default = "pom_namespace")]
    pub xmlns: String,

    pub model_version: String,

    pub group_id: String,

    pub artifact_id: String,

    pub version: String,

    pub packaging: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_management: Option<DependencyManagement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencyList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyManagement {
    #[serde(default)]
    pub dependencies: DependencyList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyList {
    #[serde(rename = "dependency", default)]
    pub entries: Vec<Dependency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub group_id: String,

    pub artifact_id: String,

    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Dependency {
    /// Dependency entry for the given coordinates. Classifier is only
    /// written when present and type only when it is not `jar`.
    pub fn from_coords(coords: &ArtifactCoords) -> Self {
        Self {
            group_id: coords.group_id.clone(),
            artifact_id: coords.artifact_id.clone(),
            version: coords.version.clone(),
            classifier: coords
                .has_classifier()
                .then(|| coords.classifier.clone()),
            kind: (coords.kind != TYPE_JAR).then(|| coords.kind.clone()),
        }
    }

    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
            kind: None,
        }
    }
}

impl PomModel {
    /// Synthesize the model for `coords`: `pom` packaging and one managed
    /// dependency on the catalog document that describes it.
    pub fn init(coords: &ArtifactCoords) -> Self {
        let catalog = Dependency {
            group_id: coords.group_id.clone(),
            artifact_id: catalog_artifact_id(&coords.artifact_id),
            version: coords.version.clone(),
            classifier: Some(coords.version.clone()),
            kind: Some(TYPE_JSON.to_string()),
        };

        Self {
            xmlns: pom_namespace(),
            model_version: MODEL_VERSION.to_string(),
            group_id: coords.group_id.clone(),
            artifact_id: coords.artifact_id.clone(),
            version: coords.version.clone(),
            packaging: TYPE_POM.to_string(),
            dependency_management: Some(DependencyManagement {
                dependencies: DependencyList {
                    entries: vec![catalog],
                },
            }),
            dependencies: None,
        }
    }

    pub fn add_managed_dependency(&mut self, dependency: Dependency) {
        self.dependency_management
            .get_or_insert_with(DependencyManagement::default)
            .dependencies
            .entries
            .push(dependency);
    }

    pub fn add_dependency(&mut self, dependency: Dependency) {
        self.dependencies
            .get_or_insert_with(DependencyList::default)
            .entries
            .push(dependency);
    }

    pub fn managed_dependencies(&self) -> &[Dependency] {
        self.dependency_management
            .as_ref()
            .map(|dm| dm.dependencies.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn direct_dependencies(&self) -> &[Dependency] {
        self.dependencies
            .as_ref()
            .map(|d| d.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Render the model as an indented XML document
    pub fn to_xml(&self) -> std::result::Result<String, String> {
        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 2);
        self.serialize(serializer).map_err(|e| e.to_string())?;

        Ok(format!("{XML_DECLARATION}{body}\n"))
    }

    pub fn from_xml(xml: &str) -> std::result::Result<Self, String> {
        quick_xml::de::from_str(xml).map_err(|e| e.to_string())
    }

    /// Write the model to `path`, creating parent directories
    pub fn persist(&self, path: &Path) -> Result<()> {
        let xml = self
            .to_xml()
            .map_err(|message| RegistryError::serialize(path, message))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
        }
        std::fs::write(path, xml).map_err(|e| RegistryError::io(path, e))?;

        tracing::debug!("Persisted POM {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
        Self::from_xml(&xml).map_err(|message| RegistryError::serialize(path, message))
    }
}
