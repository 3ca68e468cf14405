//! YAML description of a registry tree
//!
//! A fixture mirrors the builder API so a whole registry setup can live in
//! a file next to the tests that use it:
//!
//! ```yaml
//! registries:
//!   - id: registry.acme.org
//!     recognized-quarkus-versions: "2.*"
//!     platforms:
//!       - key: org.acme.platform
//!         streams:
//!           - id: "1.0"
//!             releases:
//!               - version: 1.0.0
//!                 quarkus-version: 2.16.0.Final
//!                 core-member: true
//!                 members:
//!                   - artifact-id: acme-bom
//!                     extensions: [acme-rest, "io.quarkus:quarkus-arc:2.16.0.Final"]
//!     non-platform:
//!       - quarkus-version: 2.16.0.Final
//!         extensions: ["org.acme:acme-tools:1.0.0"]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::builder::RegistryClientBuilder;
use crate::catalog::ArtifactCoords;
use crate::error::{RegistryError, Result};

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_true(value: &bool) -> bool {
    *value
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryFixture {
    #[serde(default, skip_serializing_if = "is_false")]
    pub debug: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_factory_url: Option<String>,

    #[serde(default)]
    pub registries: Vec<RegistryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryEntry {
    pub id: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub external: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognized_quarkus_versions: Option<String>,

    /// Only meaningful with `recognized-quarkus-versions`
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub exclusive_provider: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<PlatformEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_platform: Vec<NonPlatformEntry>,
}

impl Default for RegistryEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            external: false,
            disabled: false,
            recognized_quarkus_versions: None,
            exclusive_provider: true,
            platforms: Vec::new(),
            non_platform: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformEntry {
    pub key: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<StreamEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StreamEntry {
    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub releases: Vec<ReleaseEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseEntry {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarkus_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_quarkus_version: Option<String>,

    /// Recorded in the archived platform catalog
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,

    /// Externally provided member BOMs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member_boms: Vec<ArtifactCoords>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub core_member: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MemberEntry {
    pub artifact_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionRef>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub align_plugins_on_quarkus_version: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maven_repos: Vec<MavenRepoEntry>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub default_codestart_extensions: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MavenRepoEntry {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NonPlatformEntry {
    pub quarkus_version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionRef>,
}

/// An extension given either as a bare artifact id (group and version come
/// from the owning member BOM) or as `group:artifact:version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExtensionRef {
    ArtifactId(String),
    Coords {
        group_id: String,
        artifact_id: String,
        version: String,
    },
}

impl FromStr for ExtensionRef {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [artifact_id] if !artifact_id.is_empty() => {
                Ok(ExtensionRef::ArtifactId(artifact_id.to_string()))
            }
            [group_id, artifact_id, version]
                if parts.iter().all(|part| !part.is_empty()) =>
            {
                Ok(ExtensionRef::Coords {
                    group_id: group_id.to_string(),
                    artifact_id: artifact_id.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(RegistryError::Config(format!(
                "Invalid extension '{s}', expected an artifact id or group:artifact:version"
            ))),
        }
    }
}

impl TryFrom<String> for ExtensionRef {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ExtensionRef> for String {
    fn from(value: ExtensionRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ExtensionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionRef::ArtifactId(artifact_id) => write!(f, "{artifact_id}"),
            ExtensionRef::Coords {
                group_id,
                artifact_id,
                version,
            } => write!(f, "{group_id}:{artifact_id}:{version}"),
        }
    }
}

impl RegistryFixture {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml_ng::from_str(content)
            .map_err(|e| RegistryError::Config(format!("Invalid registry fixture: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
        let fixture = Self::from_yaml(&content)?;
        debug!(
            "Loaded fixture {} with {} registries",
            path.display(),
            fixture.registries.len()
        );
        Ok(fixture)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| RegistryError::Config(format!("Failed to serialize fixture: {e}")))
    }

    /// Check everything the builder would only reject at build time
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for registry in &self.registries {
            if registry.id.trim().is_empty() {
                return Err(RegistryError::Config("Registry id is empty".to_string()));
            }
            if !seen.insert(registry.id.as_str()) {
                return Err(RegistryError::Config(format!(
                    "Registry {} is declared more than once",
                    registry.id
                )));
            }

            for platform in &registry.platforms {
                for stream in &platform.streams {
                    for release in &stream.releases {
                        if release.quarkus_version.is_none() {
                            return Err(RegistryError::Config(format!(
                                "Quarkus version has not been configured for platform release {}:{}:{}",
                                platform.key, stream.id, release.version
                            )));
                        }
                    }
                }
            }

            for catalog in &registry.non_platform {
                for extension in &catalog.extensions {
                    if let ExtensionRef::ArtifactId(artifact_id) = extension {
                        return Err(RegistryError::Config(format!(
                            "Non-platform extension {} of registry {} needs group:artifact:version",
                            artifact_id, registry.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Describe every registry of the fixture on `client`
    pub fn apply(&self, client: &mut RegistryClientBuilder) -> Result<()> {
        self.validate()?;

        for registry in &self.registries {
            let handle = client.new_registry(&registry.id);
            let handle = if registry.external {
                handle.external()
            } else {
                handle
            };
            let handle = if registry.disabled {
                handle.disabled()
            } else {
                handle
            };
            if let Some(expression) = &registry.recognized_quarkus_versions {
                handle.recognized_quarkus_versions_with(expression, registry.exclusive_provider);
            }

            for platform in &registry.platforms {
                client.new_registry(&registry.id).new_platform(&platform.key);
                for stream in &platform.streams {
                    for release in &stream.releases {
                        apply_release(client, &registry.id, &platform.key, &stream.id, release)?;
                    }
                }
            }

            for catalog in &registry.non_platform {
                let mut handle = client
                    .new_registry(&registry.id)
                    .new_non_platform_catalog(&catalog.quarkus_version);
                for extension in &catalog.extensions {
                    if let ExtensionRef::Coords {
                        group_id,
                        artifact_id,
                        version,
                    } = extension
                    {
                        handle = handle.add_extension(group_id, artifact_id, version);
                    }
                }
            }
        }
        Ok(())
    }

    /// Build the fixture's registry tree under `base_dir`
    pub fn build_into(&self, base_dir: &Path) -> Result<()> {
        let mut client = RegistryClientBuilder::new().base_dir(base_dir);
        if self.debug {
            client = client.debug();
        }
        if let Some(url) = &self.client_factory_url {
            client = client.client_factory_url(url);
        }

        self.apply(&mut client)?;
        client.build()?;
        info!("Fixture built into {}", base_dir.display());
        Ok(())
    }
}

fn apply_release(
    client: &mut RegistryClientBuilder,
    registry_id: &str,
    platform_key: &str,
    stream_id: &str,
    release: &ReleaseEntry,
) -> Result<()> {
    let stream = client
        .new_registry(registry_id)
        .new_platform(platform_key)
        .new_stream(stream_id);
    let mut handle = if release.archived {
        stream.new_archived_release(&release.version)
    } else {
        stream.new_release(&release.version)
    };

    if let Some(version) = &release.quarkus_version {
        handle = handle.quarkus_version(version);
    }
    if let Some(version) = &release.upstream_quarkus_version {
        handle = handle.upstream_quarkus_version(version);
    }
    for bom in &release.member_boms {
        handle = handle.add_member_bom(bom.clone());
    }

    if release.core_member {
        handle = handle.add_core_member()?.release();
    }

    for entry in &release.members {
        let mut member = handle.new_member(&entry.artifact_id);
        for extension in &entry.extensions {
            member = match extension {
                ExtensionRef::ArtifactId(artifact_id) => member.add_extension(artifact_id),
                ExtensionRef::Coords {
                    group_id,
                    artifact_id,
                    version,
                } => member.add_extension_coords(group_id, artifact_id, version),
            };
        }
        if entry.align_plugins_on_quarkus_version {
            member = member.align_plugins_on_quarkus_version()?;
        }
        for repo in &entry.maven_repos {
            member = member.add_project_maven_repo(&repo.id, &repo.url);
        }
        if entry.default_codestart_extensions {
            member = member.add_default_codestart_extensions()?;
        }
        handle = member.release();
    }
    Ok(())
}
