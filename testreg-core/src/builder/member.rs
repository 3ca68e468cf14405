use serde_json::{json, Value};

use super::client::RegistryClientBuilder;
use super::platform::{ReleaseBuilder, QUARKUS_GROUP_ID, QUARKUS_MAVEN_PLUGIN_ARTIFACT_ID};
use super::registry::RegistryBuilder;
use super::state::{object_entry, MemberState};
use crate::catalog::{ArtifactCoords, Dependency, Extension};
use crate::error::{RegistryError, Result};

pub const REST_ASSURED_VERSION: &str = "4.4.0";

/// Handle on a platform member catalog
pub struct MemberBuilder<'a> {
    client: &'a mut RegistryClientBuilder,
    registry: usize,
    member: usize,
}

impl<'a> MemberBuilder<'a> {
    pub(crate) fn new(
        client: &'a mut RegistryClientBuilder,
        registry: usize,
        member: usize,
    ) -> Self {
        Self {
            client,
            registry,
            member,
        }
    }

    pub(crate) fn state(&mut self) -> &mut MemberState {
        &mut self.client.registries[self.registry].members[self.member]
    }

    pub fn bom(&self) -> &ArtifactCoords {
        &self.client.registries[self.registry].members[self.member].bom
    }

    fn quarkus_version(&self) -> Result<String> {
        let registry = &self.client.registries[self.registry];
        let member = &registry.members[self.member];
        registry
            .catalogs
            .release(member.release)
            .and_then(|(_, _, release)| release.quarkus_core_version.clone())
            .ok_or_else(|| {
                RegistryError::Config(format!(
                    "Quarkus version has not been configured for the release of member {}",
                    member.bom
                ))
            })
    }

    /// Add an extension sharing the member BOM's group and version
    pub fn add_extension(self, artifact_id: &str) -> Self {
        let bom = self.bom().clone();
        self.add_extension_coords(&bom.group_id, artifact_id, &bom.version)
    }

    /// Add an extension and manage it in the member BOM. Repeated artifacts
    /// are listed again.
    pub fn add_extension_coords(
        mut self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
    ) -> Self {
        let artifact = ArtifactCoords::jar(group_id, artifact_id, version);
        let member = self.state();
        member
            .pom
            .add_managed_dependency(Dependency::from_coords(&artifact));
        member
            .extensions
            .push(Extension::new(artifact, &member.catalog_id));
        self
    }

    /// Point the member's Maven plugin properties at the quarkus release
    /// instead of the platform BOM
    pub fn align_plugins_on_quarkus_version(mut self) -> Result<Self> {
        let quarkus_version = self.quarkus_version()?;
        if let Some(properties) = self.state().project_properties() {
            properties.insert("maven-plugin-groupId".to_string(), QUARKUS_GROUP_ID.into());
            properties.insert(
                "maven-plugin-artifactId".to_string(),
                QUARKUS_MAVEN_PLUGIN_ARTIFACT_ID.into(),
            );
            properties.insert("maven-plugin-version".to_string(), quarkus_version.into());
        }
        Ok(self)
    }

    /// Add a Maven repository projects created from this member should use
    pub fn add_project_maven_repo(mut self, id: &str, url: &str) -> Self {
        let Some(maven) = object_entry(&mut self.state().metadata, "maven") else {
            return self;
        };
        let repositories = maven
            .entry("repositories".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !repositories.is_array() {
            *repositories = Value::Array(Vec::new());
        }
        if let Value::Array(repositories) = repositories {
            repositories.push(json!({
                "id": id,
                "url": url,
                "releases-enabled": "true",
                "snapshots-enabled": "true",
            }));
        }
        self
    }

    /// Add the extensions and test dependencies the default codestarts
    /// rely on
    pub fn add_default_codestart_extensions(self) -> Result<Self> {
        let quarkus_version = self.quarkus_version()?;
        let mut member = self
            .add_extension_coords(QUARKUS_GROUP_ID, "quarkus-arc", &quarkus_version)
            .add_extension_coords(QUARKUS_GROUP_ID, "quarkus-resteasy", &quarkus_version);

        let pom = &mut member.state().pom;
        pom.add_managed_dependency(Dependency::new(
            QUARKUS_GROUP_ID,
            "quarkus-junit5",
            &quarkus_version,
        ));
        pom.add_managed_dependency(Dependency::new(
            "io.rest-assured",
            "rest-assured",
            REST_ASSURED_VERSION,
        ));
        Ok(member)
    }

    pub fn release(self) -> ReleaseBuilder<'a> {
        let member = &self.client.registries[self.registry].members[self.member];
        let (stream, release) = (member.stream, member.release);
        ReleaseBuilder::new(self.client, self.registry, stream, release)
    }

    pub fn registry(self) -> RegistryBuilder<'a> {
        RegistryBuilder::new(self.client, self.registry)
    }
}
