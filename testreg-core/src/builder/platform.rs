//! Platform, stream and release handles
//!
//! Handles are consumed by each navigation step and carry indices into the
//! registry's catalog drafts instead of references to them, so going back
//! up the tree (`registry()`, `platform()`, `stream()`) is just a matter of
//! dropping an index.

use tracing::trace;

use super::client::RegistryClientBuilder;
use super::member::MemberBuilder;
use super::registry::RegistryBuilder;
use super::state::{
    CatalogSource, MemberState, RegistryState, ReleaseDraft, ReleaseRef, StreamRef,
};
use crate::catalog::ArtifactCoords;
use crate::error::{RegistryError, Result};

pub const QUARKUS_BOM_ARTIFACT_ID: &str = "quarkus-bom";
pub const QUARKUS_GROUP_ID: &str = "io.quarkus";
pub const QUARKUS_CORE_ARTIFACT_ID: &str = "quarkus-core";
pub const QUARKUS_MAVEN_PLUGIN_ARTIFACT_ID: &str = "quarkus-maven-plugin";
pub const COMPILER_PLUGIN_VERSION: &str = "3.8.1";
pub const SUREFIRE_PLUGIN_VERSION: &str = "3.0.0-M5";

pub struct PlatformBuilder<'a> {
    client: &'a mut RegistryClientBuilder,
    registry: usize,
    platform: usize,
}

impl<'a> PlatformBuilder<'a> {
    pub(crate) fn new(
        client: &'a mut RegistryClientBuilder,
        registry: usize,
        platform: usize,
    ) -> Self {
        Self {
            client,
            registry,
            platform,
        }
    }

    pub fn key(&self) -> &str {
        let state = &self.client.registries[self.registry];
        state
            .catalogs
            .get(CatalogSource::Live)
            .and_then(|catalog| catalog.platforms.get_index(self.platform))
            .map(|(key, _)| key.as_str())
            .unwrap_or_default()
    }

    /// Get or create a stream of this platform
    pub fn new_stream(self, id: &str) -> StreamBuilder<'a> {
        let stream = self.client.registries[self.registry]
            .catalogs
            .get_or_create(CatalogSource::Live)
            .platforms[self.platform]
            .get_or_create_stream(id);
        StreamBuilder {
            client: self.client,
            registry: self.registry,
            stream: StreamRef {
                platform: self.platform,
                stream,
            },
        }
    }

    pub fn registry(self) -> RegistryBuilder<'a> {
        RegistryBuilder::new(self.client, self.registry)
    }
}

pub struct StreamBuilder<'a> {
    client: &'a mut RegistryClientBuilder,
    registry: usize,
    stream: StreamRef,
}

impl<'a> StreamBuilder<'a> {
    /// Get or create a release in the live catalog
    pub fn new_release(self, version: &str) -> ReleaseBuilder<'a> {
        self.release_in(CatalogSource::Live, version)
    }

    /// Get or create a release in the archived catalog, mirroring this
    /// stream's platform key and id there
    pub fn new_archived_release(self, version: &str) -> ReleaseBuilder<'a> {
        self.release_in(CatalogSource::Archived, version)
    }

    fn release_in(self, source: CatalogSource, version: &str) -> ReleaseBuilder<'a> {
        let state = &mut self.client.registries[self.registry];

        let release = match source {
            CatalogSource::Live => {
                let stream = &mut state.catalogs.get_or_create(CatalogSource::Live).platforms
                    [self.stream.platform]
                    .streams[self.stream.stream];
                ReleaseRef {
                    source,
                    platform: self.stream.platform,
                    stream: self.stream.stream,
                    release: stream.get_or_create_release(version),
                }
            }
            CatalogSource::Archived => {
                let live = &state.catalogs.get_or_create(CatalogSource::Live).platforms
                    [self.stream.platform];
                let platform_key = live.key.clone();
                let stream_id = live.streams[self.stream.stream].id.clone();

                let archived = state.catalogs.get_or_create(CatalogSource::Archived);
                let platform = archived.get_or_create_platform(&platform_key);
                let stream = archived.platforms[platform].get_or_create_stream(&stream_id);
                ReleaseRef {
                    source,
                    platform,
                    stream,
                    release: archived.platforms[platform].streams[stream]
                        .get_or_create_release(version),
                }
            }
        };

        trace!("Release {:?} of registry {}", release, state.id);
        ReleaseBuilder {
            client: self.client,
            registry: self.registry,
            stream: self.stream,
            release,
        }
    }

    pub fn platform(self) -> PlatformBuilder<'a> {
        PlatformBuilder::new(self.client, self.registry, self.stream.platform)
    }

    pub fn registry(self) -> RegistryBuilder<'a> {
        RegistryBuilder::new(self.client, self.registry)
    }
}

pub struct ReleaseBuilder<'a> {
    client: &'a mut RegistryClientBuilder,
    registry: usize,
    stream: StreamRef,
    release: ReleaseRef,
}

impl<'a> ReleaseBuilder<'a> {
    pub(crate) fn new(
        client: &'a mut RegistryClientBuilder,
        registry: usize,
        stream: StreamRef,
        release: ReleaseRef,
    ) -> Self {
        Self {
            client,
            registry,
            stream,
            release,
        }
    }

    fn state(&mut self) -> &mut RegistryState {
        &mut self.client.registries[self.registry]
    }

    fn draft(&mut self) -> Option<&mut ReleaseDraft> {
        let release = self.release;
        self.state().catalogs.release_mut(release)
    }

    pub fn version(&self) -> &str {
        self.client.registries[self.registry]
            .catalogs
            .release(self.release)
            .map(|(_, _, release)| release.version.as_str())
            .unwrap_or_default()
    }

    pub fn is_archived(&self) -> bool {
        self.release.source == CatalogSource::Archived
    }

    pub fn quarkus_version(mut self, version: &str) -> Self {
        if let Some(draft) = self.draft() {
            draft.quarkus_core_version = Some(version.to_string());
        }
        self
    }

    pub fn upstream_quarkus_version(mut self, version: &str) -> Self {
        if let Some(draft) = self.draft() {
            draft.upstream_quarkus_core_version = Some(version.to_string());
        }
        self
    }

    /// Declare an externally provided member BOM. Clients then have to
    /// resolve member catalogs through Maven, so the registry asks for it.
    pub fn add_member_bom(mut self, bom: ArtifactCoords) -> Self {
        if let Some(draft) = self.draft() {
            draft.member_boms.push(bom);
        }
        self.state().enable_maven_resolver = true;
        self
    }

    /// Get or create the member with BOM `<platform key>:<artifact id>::pom:<release version>`.
    /// An existing member is moved under this release and stream.
    pub fn new_member(mut self, artifact_id: &str) -> MemberBuilder<'a> {
        let (release_ref, stream_ref) = (self.release, self.stream);
        let state = self.state();

        let (platform_key, version) = match state.catalogs.release(release_ref) {
            Some((platform_key, _, release)) => (platform_key.to_string(), release.version.clone()),
            None => (String::new(), String::new()),
        };
        let bom = ArtifactCoords::pom(platform_key, artifact_id, version);

        if let Some(release) = state.catalogs.release_mut(release_ref) {
            if !release.member_boms.contains(&bom) {
                release.member_boms.push(bom.clone());
            }
        }

        let entry = state.members.entry(bom.clone());
        let member = entry.index();
        let member_state = entry.or_insert_with(|| MemberState::new(bom, release_ref, stream_ref));
        member_state.release = release_ref;
        member_state.stream = stream_ref;
        MemberBuilder::new(self.client, self.registry, member)
    }

    /// Add the `quarkus-bom` member with `quarkus-core` and the build
    /// plugin properties a platform root BOM declares. Calling it again on
    /// the same release leaves the member as it is.
    pub fn add_core_member(mut self) -> Result<MemberBuilder<'a>> {
        let quarkus_version = self
            .draft()
            .and_then(|draft| draft.quarkus_core_version.clone());
        let Some(quarkus_version) = quarkus_version else {
            let state = &self.client.registries[self.registry];
            let path = state
                .catalogs
                .release(self.release)
                .map(|(p, s, r)| format!("{}:{}:{}", p, s, r.version))
                .unwrap_or_default();
            return Err(RegistryError::Config(format!(
                "Quarkus version has not been configured for platform release {}",
                path
            )));
        };

        let mut member = self.new_member(QUARKUS_BOM_ARTIFACT_ID);
        let core = ArtifactCoords::jar(QUARKUS_GROUP_ID, QUARKUS_CORE_ARTIFACT_ID, &quarkus_version);
        if !member
            .state()
            .extensions
            .iter()
            .any(|extension| extension.artifact == core)
        {
            member = member.add_extension_coords(
                QUARKUS_GROUP_ID,
                QUARKUS_CORE_ARTIFACT_ID,
                &quarkus_version,
            );
        }

        let bom = member.bom().clone();
        if let Some(properties) = member.state().project_properties() {
            properties.insert("maven-plugin-groupId".to_string(), bom.group_id.into());
            properties.insert(
                "maven-plugin-artifactId".to_string(),
                QUARKUS_MAVEN_PLUGIN_ARTIFACT_ID.into(),
            );
            properties.insert("maven-plugin-version".to_string(), bom.version.into());
            properties.insert(
                "compiler-plugin-version".to_string(),
                COMPILER_PLUGIN_VERSION.into(),
            );
            properties.insert(
                "surefire-plugin-version".to_string(),
                SUREFIRE_PLUGIN_VERSION.into(),
            );
        }
        Ok(member)
    }

    pub fn stream(self) -> StreamBuilder<'a> {
        StreamBuilder {
            client: self.client,
            registry: self.registry,
            stream: self.stream,
        }
    }

    pub fn registry(self) -> RegistryBuilder<'a> {
        RegistryBuilder::new(self.client, self.registry)
    }

    pub fn client_builder(self) -> &'a mut RegistryClientBuilder {
        self.client
    }
}
