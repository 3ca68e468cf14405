use super::client::RegistryClientBuilder;
use super::registry::RegistryBuilder;
use crate::catalog::{ArtifactCoords, Extension, ExtensionCatalog};

/// Handle on the non-platform extension catalog of one quarkus version
pub struct NonPlatformBuilder<'a> {
    client: &'a mut RegistryClientBuilder,
    registry: usize,
    catalog: usize,
}

impl<'a> NonPlatformBuilder<'a> {
    pub(crate) fn new(
        client: &'a mut RegistryClientBuilder,
        registry: usize,
        catalog: usize,
    ) -> Self {
        Self {
            client,
            registry,
            catalog,
        }
    }

    fn catalog_mut(&mut self) -> &mut ExtensionCatalog {
        &mut self.client.registries[self.registry].non_platform[self.catalog].catalog
    }

    pub fn catalog(&self) -> &ExtensionCatalog {
        &self.client.registries[self.registry].non_platform[self.catalog].catalog
    }

    pub fn add_extension(mut self, group_id: &str, artifact_id: &str, version: &str) -> Self {
        let catalog = self.catalog_mut();
        let extension = Extension::new(
            ArtifactCoords::jar(group_id, artifact_id, version),
            &catalog.id,
        );
        catalog.extensions.push(extension);
        self
    }

    pub fn registry(self) -> RegistryBuilder<'a> {
        RegistryBuilder::new(self.client, self.registry)
    }
}
