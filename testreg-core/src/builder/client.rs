use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::info;

use super::artifacts::ArtifactSink;
use super::registry::{configure, RegistryBuilder};
use super::state::RegistryState;
use crate::catalog::{layout, RegistriesConfig, ResolverState};
use crate::error::{RegistryError, Result};

/// Top-level builder of a test registry tree.
///
/// Owns every registry builder and the artifact resolver shared by them.
/// Nothing touches the filesystem until [`build`](Self::build).
///
/// ```no_run
/// use testreg_core::RegistryClientBuilder;
///
/// # fn main() -> testreg_core::Result<()> {
/// let mut client = RegistryClientBuilder::new().base_dir("/tmp/registry");
/// client
///     .new_registry("registry.acme.org")
///     .new_platform("org.acme.platform")
///     .new_stream("1.0")
///     .new_release("1.0.0")
///     .quarkus_version("2.16.0.Final")
///     .add_core_member()?
///     .add_extension("acme-rest");
/// client.build()
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RegistryClientBuilder {
    base_dir: Option<PathBuf>,
    debug: bool,
    client_factory_url: Option<String>,
    pub(crate) registries: IndexMap<String, RegistryState>,
    resolver: ResolverState,
}

impl RegistryClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Location of the registry client implementation written into every
    /// non-external registry entry
    pub fn client_factory_url(mut self, url: impl Into<String>) -> Self {
        self.client_factory_url = Some(url.into());
        self
    }

    pub fn get_base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Get or create the registry with the given id
    pub fn new_registry(&mut self, id: &str) -> RegistryBuilder<'_> {
        let entry = self.registries.entry(id.to_string());
        let index = entry.index();
        entry.or_insert_with(|| RegistryState::new(id));
        RegistryBuilder::new(self, index)
    }

    /// An already created registry
    pub fn registry(&mut self, id: &str) -> Option<RegistryBuilder<'_>> {
        let index = self.registries.get_index_of(id)?;
        Some(RegistryBuilder::new(self, index))
    }

    pub fn registry_ids(&self) -> impl Iterator<Item = &str> {
        self.registries.keys().map(String::as_str)
    }

    /// Write every registry and the client configuration under the base
    /// directory
    pub fn build(&mut self) -> Result<()> {
        let base_dir = self.base_dir.clone().ok_or_else(|| {
            RegistryError::State("The base directory has not been provided".to_string())
        })?;

        if !base_dir.exists() {
            std::fs::create_dir_all(&base_dir).map_err(|e| RegistryError::io(&base_dir, e))?;
        } else if !base_dir.is_dir() {
            return Err(RegistryError::State(format!(
                "{} exists and is not a directory",
                base_dir.display()
            )));
        }

        info!(
            "Building {} registries under {}",
            self.registries.len(),
            base_dir.display()
        );

        let client_factory_url = self
            .client_factory_url
            .clone()
            .or_else(default_client_factory_url);

        let mut config = RegistriesConfig {
            debug: self.debug,
            registries: Vec::with_capacity(self.registries.len()),
        };
        let mut sink = ArtifactSink::new(&base_dir, &mut self.resolver);
        for registry in self.registries.values() {
            let registry_dir = layout::registry_dir(&base_dir, &registry.id);
            let entry = configure(
                registry,
                &registry_dir,
                client_factory_url.as_deref(),
                &mut sink,
            )?;
            config.add_registry(entry);
        }

        config.save_to_path(&layout::client_config_path(&base_dir))?;
        info!("Registry client configuration written to {}", base_dir.display());
        Ok(())
    }
}

fn default_client_factory_url() -> Option<String> {
    std::env::current_exe()
        .ok()
        .map(|exe| format!("file://{}", exe.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_requires_base_dir() {
        let err = RegistryClientBuilder::new().build().unwrap_err();
        assert!(matches!(err, RegistryError::State(_)));
    }

    #[test]
    fn test_build_rejects_file_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let err = RegistryClientBuilder::new()
            .base_dir(&file)
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::State(_)));
    }

    #[test]
    fn test_new_registry_is_get_or_create() {
        let mut client = RegistryClientBuilder::new();
        client.new_registry("a.example");
        client.new_registry("b.example");
        client.new_registry("a.example");

        assert_eq!(
            client.registry_ids().collect::<Vec<_>>(),
            vec!["a.example", "b.example"]
        );
        assert!(client.registry("c.example").is_none());
    }

    #[test]
    fn test_empty_build_writes_client_config() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested/base");

        let mut client = RegistryClientBuilder::new().base_dir(&base).debug();
        client.build().unwrap();

        let config = RegistriesConfig::load_from_path(&layout::client_config_path(&base)).unwrap();
        assert!(config.debug);
        assert!(config.registries.is_empty());
    }
}
