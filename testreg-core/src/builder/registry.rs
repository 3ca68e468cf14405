//! Registry builder handle and registry persistence

use std::path::Path;
use tracing::{debug, info};

use super::artifacts::ArtifactSink;
use super::client::RegistryClientBuilder;
use super::non_platform::NonPlatformBuilder;
use super::platform::PlatformBuilder;
use super::state::{CatalogDraft, CatalogSource, NonPlatformState, RegistryState};
use crate::catalog::{
    bucket_by_quarkus_version, layout, registry_artifact, ArtifactCoords, ExtensionCatalog,
    PlatformCatalog, RegistryConfig, RegistryDescriptorConfig,
    RegistryNonPlatformExtensionsConfig, RegistryPlatformsConfig, RegistryQuarkusVersionsConfig,
    DEFAULT_REGISTRY_ARTIFACT_VERSION, DEFAULT_REGISTRY_DESCRIPTOR_ARTIFACT_ID,
    DEFAULT_REGISTRY_NON_PLATFORM_EXTENSIONS_CATALOG_ARTIFACT_ID,
    DEFAULT_REGISTRY_PLATFORMS_CATALOG_ARTIFACT_ID, EXTRA_CLIENT_FACTORY_URL,
    EXTRA_ENABLE_MAVEN_RESOLVER, TYPE_JSON,
};
use crate::error::{RegistryError, Result};

/// Handle on one registry of a [`RegistryClientBuilder`]
pub struct RegistryBuilder<'a> {
    client: &'a mut RegistryClientBuilder,
    registry: usize,
}

impl<'a> RegistryBuilder<'a> {
    pub(crate) fn new(client: &'a mut RegistryClientBuilder, registry: usize) -> Self {
        Self { client, registry }
    }

    fn state(&mut self) -> &mut RegistryState {
        &mut self.client.registries[self.registry]
    }

    pub fn id(&self) -> &str {
        &self.client.registries[self.registry].id
    }

    /// Maven group id of the registry artifacts
    pub fn group_id(&self) -> &str {
        &self.client.registries[self.registry].group_id
    }

    /// The registry is not served by the test client, so no client extras
    /// are written for it
    pub fn external(mut self) -> Self {
        self.state().external = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.state().enabled = false;
        self
    }

    /// Restrict the registry to quarkus versions matching `expression` as
    /// their exclusive provider
    pub fn recognized_quarkus_versions(self, expression: &str) -> Self {
        self.recognized_quarkus_versions_with(expression, true)
    }

    /// Restrict the registry to quarkus versions matching `expression`;
    /// an exclusive provider is the only source for those versions
    pub fn recognized_quarkus_versions_with(mut self, expression: &str, exclusive: bool) -> Self {
        self.state().quarkus_versions = Some(RegistryQuarkusVersionsConfig {
            recognized_versions_expression: Some(expression.to_string()),
            exclusive_provider: exclusive,
        });
        self
    }

    /// Replace the live platform catalog with a prepared one. Members stay
    /// attached to releases the new catalog still has and are dropped
    /// otherwise.
    pub fn platform_catalog(mut self, catalog: PlatformCatalog) -> Self {
        self.state().replace_live_catalog(CatalogDraft::from(catalog));
        self
    }

    pub fn new_platform(mut self, platform_key: &str) -> PlatformBuilder<'a> {
        let platform = self
            .state()
            .catalogs
            .get_or_create(CatalogSource::Live)
            .get_or_create_platform(platform_key);
        PlatformBuilder::new(self.client, self.registry, platform)
    }

    /// Get or create the non-platform catalog for a quarkus version
    pub fn new_non_platform_catalog(mut self, quarkus_version: &str) -> NonPlatformBuilder<'a> {
        let state = self.state();
        let id = ArtifactCoords::new(
            &state.group_id,
            DEFAULT_REGISTRY_NON_PLATFORM_EXTENSIONS_CATALOG_ARTIFACT_ID,
            quarkus_version,
            TYPE_JSON,
            DEFAULT_REGISTRY_ARTIFACT_VERSION,
        )
        .to_string();

        let entry = state.non_platform.entry(quarkus_version.to_string());
        let index = entry.index();
        entry.or_insert_with(|| NonPlatformState {
            catalog: ExtensionCatalog::new(
                id,
                ArtifactCoords::pom("io.quarkus", "quarkus-bom", quarkus_version),
                quarkus_version,
            ),
        });
        NonPlatformBuilder::new(self.client, self.registry, index)
    }

    pub fn client_builder(self) -> &'a mut RegistryClientBuilder {
        self.client
    }
}

/// Write one registry subtree and return its client configuration entry.
///
/// Releases are validated before anything is written, so a misconfigured
/// release leaves no platform catalogs behind. The descriptor is written
/// last and marks the registry as complete.
pub(crate) fn configure(
    registry: &RegistryState,
    registry_dir: &Path,
    client_factory_url: Option<&str>,
    sink: &mut ArtifactSink<'_>,
) -> Result<RegistryConfig> {
    info!("Configuring registry {}", registry.id);

    let platform_catalogs = registry.catalogs.finalize()?;
    let member_releases = registry
        .members
        .values()
        .map(|member| registry.release_snapshot(member.release))
        .collect::<Result<Vec<_>>>()?;

    if registry_dir.exists() {
        if !registry_dir.is_dir() {
            return Err(RegistryError::State(format!(
                "{} exists and is not a directory",
                registry_dir.display()
            )));
        }
        std::fs::remove_dir_all(registry_dir).map_err(|e| RegistryError::io(registry_dir, e))?;
    }
    std::fs::create_dir_all(registry_dir).map_err(|e| RegistryError::io(registry_dir, e))?;

    let mut entry = RegistryConfig::new(&registry.id);
    entry.enabled = registry.enabled;
    if !registry.external {
        if let Some(url) = client_factory_url {
            entry.set_extra(EXTRA_CLIENT_FACTORY_URL, url);
        }
        if registry.enable_maven_resolver {
            entry.set_extra(EXTRA_ENABLE_MAVEN_RESOLVER, true);
        }
    }

    let group_id = &registry.group_id;
    let mut descriptor = RegistryConfig::new(&registry.id);
    descriptor.descriptor = Some(RegistryDescriptorConfig {
        artifact: registry_artifact(group_id, DEFAULT_REGISTRY_DESCRIPTOR_ARTIFACT_ID),
    });
    descriptor.quarkus_versions = registry.quarkus_versions.clone();

    let mut platforms = RegistryPlatformsConfig {
        artifact: registry_artifact(group_id, DEFAULT_REGISTRY_PLATFORMS_CATALOG_ARTIFACT_ID),
        disabled: false,
        extension_catalogs_included: false,
    };
    if registry.catalogs.is_empty() {
        platforms.disabled = true;
    } else {
        for (source, catalog) in &platform_catalogs {
            if *source == CatalogSource::Live && !catalog.is_empty() {
                catalog.persist(&layout::platforms_catalog_path(registry_dir, None))?;
            }
        }
        let buckets = bucket_by_quarkus_version(platform_catalogs.iter().map(|(_, c)| c));
        for (quarkus_version, bucket) in &buckets {
            bucket.persist(&layout::platforms_catalog_path(
                registry_dir,
                Some(quarkus_version.as_str()),
            ))?;
        }
        debug!(
            "Registry {} publishes platforms for {} quarkus versions",
            registry.id,
            buckets.len()
        );
        platforms.extension_catalogs_included = !registry.members.is_empty();
    }
    descriptor.platforms = Some(platforms);

    let mut non_platform = RegistryNonPlatformExtensionsConfig {
        artifact: registry_artifact(
            group_id,
            DEFAULT_REGISTRY_NON_PLATFORM_EXTENSIONS_CATALOG_ARTIFACT_ID,
        ),
        disabled: false,
    };
    if registry.non_platform.is_empty() {
        non_platform.disabled = true;
    } else {
        for (quarkus_version, state) in &registry.non_platform {
            state
                .catalog
                .persist(&layout::non_platform_catalog_path(registry_dir, quarkus_version))?;
            sink.install_catalog_extensions(&state.catalog)?;
        }
    }
    descriptor.non_platform_extensions = Some(non_platform);

    for (member, (platform_key, stream_id, release)) in
        registry.members.values().zip(&member_releases)
    {
        let catalog = member.to_catalog(platform_key, stream_id, release);
        catalog.persist(&layout::member_catalog_path(registry_dir, &member.bom))?;
        sink.install_pom(&member.bom, &member.pom)?;
        sink.install_catalog_extensions(&catalog)?;
    }

    descriptor.persist(&layout::registry_descriptor_path(registry_dir))?;
    info!(
        "Registry {} written to {}",
        registry.id,
        registry_dir.display()
    );
    Ok(entry)
}
