//! Artifact coordinates
//!
//! Coordinates identify every document and synthetic artifact the builder
//! produces. The string form is `group:artifact:classifier:type:version`
//! (the classifier may be empty), and `group:artifact:version` is accepted
//! as a shorthand for an unclassified jar.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::RegistryError;

/// Suffix that turns a BOM artifact id into its catalog artifact id
pub const PLATFORM_DESCRIPTOR_SUFFIX: &str = "-quarkus-platform-descriptor";

pub const TYPE_JAR: &str = "jar";
pub const TYPE_POM: &str = "pom";
pub const TYPE_JSON: &str = "json";

/// Immutable artifact identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactCoords {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: String,
    pub kind: String,
    pub version: String,
}

impl ArtifactCoords {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        classifier: impl Into<String>,
        kind: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: classifier.into(),
            kind: kind.into(),
            version: version.into(),
        }
    }

    pub fn jar(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group_id, artifact_id, "", TYPE_JAR, version)
    }

    pub fn pom(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group_id, artifact_id, "", TYPE_POM, version)
    }

    /// Same coordinates with another type and no classifier
    pub fn with_type(&self, kind: &str) -> Self {
        Self::new(
            self.group_id.clone(),
            self.artifact_id.clone(),
            "",
            kind,
            self.version.clone(),
        )
    }

    /// Same coordinates with another artifact id, keeping classifier and type
    pub fn with_artifact_id(&self, artifact_id: impl Into<String>) -> Self {
        Self::new(
            self.group_id.clone(),
            artifact_id,
            self.classifier.clone(),
            self.kind.clone(),
            self.version.clone(),
        )
    }

    pub fn has_classifier(&self) -> bool {
        !self.classifier.trim().is_empty()
    }

    /// Whether these coordinates already name a catalog artifact
    pub fn is_catalog_artifact(&self) -> bool {
        is_catalog_artifact_id(&self.artifact_id)
    }

    /// The JSON catalog counterpart of a BOM: suffixed artifact id,
    /// version as classifier, `json` type.
    pub fn to_catalog_artifact(&self) -> Self {
        if self.is_catalog_artifact() {
            return self.clone();
        }
        Self::new(
            self.group_id.clone(),
            catalog_artifact_id(&self.artifact_id),
            self.version.clone(),
            TYPE_JSON,
            self.version.clone(),
        )
    }

    /// File name inside a Maven-layout repository
    pub fn file_name(&self) -> String {
        if self.has_classifier() {
            format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, self.classifier, self.kind
            )
        } else {
            format!("{}-{}.{}", self.artifact_id, self.version, self.kind)
        }
    }

    /// Relative path inside a Maven-layout repository, e.g.
    /// `org/acme/acme-bom/1.0/acme-bom-1.0.pom`
    pub fn repository_path(&self) -> PathBuf {
        let mut path: PathBuf = self.group_id.split('.').collect();
        path.push(&self.artifact_id);
        path.push(&self.version);
        path.push(self.file_name());
        path
    }
}

pub fn is_catalog_artifact_id(artifact_id: &str) -> bool {
    artifact_id.ends_with(PLATFORM_DESCRIPTOR_SUFFIX)
}

pub fn catalog_artifact_id(artifact_id: &str) -> String {
    if is_catalog_artifact_id(artifact_id) {
        artifact_id.to_string()
    } else {
        format!("{artifact_id}{PLATFORM_DESCRIPTOR_SUFFIX}")
    }
}

impl fmt::Display for ArtifactCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.classifier, self.kind, self.version
        )
    }
}

impl FromStr for ArtifactCoords {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        tracing::trace!("parsing coordinates {:?}", s);

        let parts: Vec<&str> = s.split(':').collect();
        let coords = match parts.as_slice() {
            [group, artifact, version] => Self::jar(*group, *artifact, *version),
            [group, artifact, classifier, kind, version] => {
                let kind = if kind.is_empty() { TYPE_JAR } else { kind };
                Self::new(*group, *artifact, *classifier, kind, *version)
            }
            _ => {
                return Err(RegistryError::Config(format!(
                    "Invalid artifact coordinates '{s}'. Expected group:artifact:version \
                     or group:artifact:classifier:type:version"
                )))
            }
        };

        if coords.group_id.is_empty() || coords.artifact_id.is_empty() || coords.version.is_empty()
        {
            return Err(RegistryError::Config(format!(
                "Artifact coordinates '{s}' must have a group id, an artifact id and a version"
            )));
        }

        Ok(coords)
    }
}

impl Serialize for ArtifactCoords {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArtifactCoords {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod coords_tests {
    use super::*;

    #[test]
    fn test_display_keeps_empty_classifier() {
        let bom = ArtifactCoords::pom("org.acme", "acme-bom", "1.0.0");
        assert_eq!(bom.to_string(), "org.acme:acme-bom::pom:1.0.0");
    }

    #[test]
    fn test_parse_short_and_full_forms() {
        let short: ArtifactCoords = "org.acme:acme-ext:1.2".parse().unwrap();
        assert_eq!(short, ArtifactCoords::jar("org.acme", "acme-ext", "1.2"));

        let full: ArtifactCoords = "org.acme:acme-bom::pom:1.2".parse().unwrap();
        assert_eq!(full, ArtifactCoords::pom("org.acme", "acme-bom", "1.2"));

        let classified: ArtifactCoords = "org.acme:acme-desc:1.2:json:1.2".parse().unwrap();
        assert_eq!(classified.classifier, "1.2");
        assert_eq!(classified.kind, "json");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("org.acme:acme".parse::<ArtifactCoords>().is_err());
        assert!("org.acme::1.0".parse::<ArtifactCoords>().is_err());
        let err = "a:b:c:d".parse::<ArtifactCoords>().unwrap_err();
        assert!(err.to_string().contains("Invalid artifact coordinates"));
    }

    #[test]
    fn test_catalog_artifact_convention() {
        let bom = ArtifactCoords::pom("org.acme", "acme-bom", "2.0.0");
        let catalog = bom.to_catalog_artifact();
        assert_eq!(
            catalog.to_string(),
            "org.acme:acme-bom-quarkus-platform-descriptor:2.0.0:json:2.0.0"
        );
        assert!(catalog.is_catalog_artifact());
        assert_eq!(catalog.to_catalog_artifact(), catalog);
    }

    #[test]
    fn test_repository_path() {
        let jar = ArtifactCoords::jar("io.quarkus", "quarkus-core", "2.0.0");
        assert_eq!(
            jar.repository_path(),
            PathBuf::from("io/quarkus/quarkus-core/2.0.0/quarkus-core-2.0.0.jar")
        );

        let catalog = ArtifactCoords::pom("org.acme", "acme-bom", "1.0").to_catalog_artifact();
        assert_eq!(
            catalog.repository_path(),
            PathBuf::from(
                "org/acme/acme-bom-quarkus-platform-descriptor/1.0/acme-bom-quarkus-platform-descriptor-1.0-1.0.json"
            )
        );
    }

    #[test]
    fn test_serde_as_string() {
        let coords = ArtifactCoords::pom("org.acme", "acme-bom", "1.0");
        let json = serde_json::to_string(&coords).unwrap();
        assert_eq!(json, "\"org.acme:acme-bom::pom:1.0\"");
        let back: ArtifactCoords = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coords);
    }
}
