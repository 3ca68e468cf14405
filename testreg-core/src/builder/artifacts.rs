//! Synthetic artifacts written during a build
//!
//! Every artifact is staged under `<base>/tmp` and then installed into the
//! local repository through the client builder's lazily created installer.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::{
    layout, ArtifactCoords, Dependency, ExtensionCatalog, InstalledArtifact, PomModel,
    ResolverState, TYPE_JAR, TYPE_POM,
};
use crate::error::{RegistryError, Result};

/// Entry of an extension runtime jar describing the extension
pub const EXTENSION_PROPERTIES_ENTRY: &str = "META-INF/quarkus-extension.properties";
/// Key of the deployment artifact in the extension properties
pub const DEPLOYMENT_ARTIFACT_PROPERTY: &str = "deployment-artifact";
pub const DEPLOYMENT_SUFFIX: &str = "-deployment";

/// Stages and installs artifacts for one build
pub(crate) struct ArtifactSink<'a> {
    base_dir: &'a Path,
    resolver: &'a mut ResolverState,
}

impl<'a> ArtifactSink<'a> {
    pub fn new(base_dir: &'a Path, resolver: &'a mut ResolverState) -> Self {
        Self { base_dir, resolver }
    }

    fn stage(&self, coords: &ArtifactCoords) -> Result<PathBuf> {
        let path = layout::staging_path(self.base_dir, coords);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
        }
        Ok(path)
    }

    fn install(&mut self, coords: &ArtifactCoords, staged: &Path) -> Result<InstalledArtifact> {
        let installer = self
            .resolver
            .get_or_init(&layout::maven_repo_dir(self.base_dir))?;
        installer.install(coords, staged)
    }

    pub fn install_pom(
        &mut self,
        coords: &ArtifactCoords,
        pom: &PomModel,
    ) -> Result<InstalledArtifact> {
        let coords = coords.with_type(TYPE_POM);
        let staged = self.stage(&coords)?;
        pom.persist(&staged)?;
        self.install(&coords, &staged)
    }

    pub fn install_jar(
        &mut self,
        coords: &ArtifactCoords,
        entries: &[(&str, &[u8])],
    ) -> Result<InstalledArtifact> {
        let coords = coords.with_type(TYPE_JAR);
        let staged = self.stage(&coords)?;
        write_jar(&staged, entries)?;
        self.install(&coords, &staged)
    }

    /// Install the runtime jar and POM of an extension together with its
    /// empty deployment jar and a deployment POM depending on the runtime
    pub fn install_extension(&mut self, runtime: &ArtifactCoords) -> Result<()> {
        let deployment = runtime.with_artifact_id(format!(
            "{}{}",
            runtime.artifact_id, DEPLOYMENT_SUFFIX
        ));

        let descriptor = extension_descriptor(&deployment);
        self.install_jar(
            runtime,
            &[(EXTENSION_PROPERTIES_ENTRY, descriptor.as_bytes())],
        )?;
        self.install_pom(runtime, &PomModel::init(runtime))?;

        self.install_jar(&deployment, &[])?;
        let mut deployment_pom = PomModel::init(&deployment);
        deployment_pom.add_dependency(Dependency::from_coords(&runtime.with_type(TYPE_JAR)));
        self.install_pom(&deployment, &deployment_pom)?;

        debug!("Installed extension artifacts for {}", runtime);
        Ok(())
    }

    pub fn install_catalog_extensions(&mut self, catalog: &ExtensionCatalog) -> Result<()> {
        for extension in &catalog.extensions {
            self.install_extension(&extension.artifact)?;
        }
        Ok(())
    }
}

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> Result<()> {
    let file = File::create(path).map_err(|e| RegistryError::io(path, e))?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    for (name, content) in entries {
        zip.start_file(*name, options)
            .map_err(|e| RegistryError::serialize(path, e))?;
        zip.write_all(content)
            .map_err(|e| RegistryError::io(path, e))?;
    }

    zip.finish().map_err(|e| RegistryError::serialize(path, e))?;
    Ok(())
}

/// Content of `META-INF/quarkus-extension.properties` for a runtime jar
pub(crate) fn extension_descriptor(deployment: &ArtifactCoords) -> String {
    let value = format!(
        "{}:{}:{}",
        deployment.group_id, deployment.artifact_id, deployment.version
    );
    format!(
        "#qs cli test\n{}={}\n",
        DEPLOYMENT_ARTIFACT_PROPERTY,
        escape_property_value(&value)
    )
}

/// Escape a value the way Java properties files store it
fn escape_property_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | ':' | '=' | '#' | '!' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_entry(jar: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(jar).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_extension_descriptor_escapes_colons() {
        let deployment = ArtifactCoords::jar("org.acme", "acme-ext-deployment", "1.0");
        assert_eq!(
            extension_descriptor(&deployment),
            "#qs cli test\ndeployment-artifact=org.acme\\:acme-ext-deployment\\:1.0\n"
        );
    }

    #[test]
    fn test_install_extension_quartet() {
        let temp_dir = TempDir::new().unwrap();
        let mut resolver = ResolverState::default();
        let runtime = ArtifactCoords::jar("org.acme", "acme-ext", "1.0");

        let mut sink = ArtifactSink::new(temp_dir.path(), &mut resolver);
        sink.install_extension(&runtime).unwrap();
        assert!(resolver.is_initialized());

        let repo = layout::maven_repo_dir(temp_dir.path());
        let runtime_jar = repo.join("org/acme/acme-ext/1.0/acme-ext-1.0.jar");
        assert!(read_entry(&runtime_jar, EXTENSION_PROPERTIES_ENTRY)
            .contains("deployment-artifact=org.acme\\:acme-ext-deployment\\:1.0"));
        assert!(repo.join("org/acme/acme-ext/1.0/acme-ext-1.0.pom").is_file());

        let deployment_jar =
            repo.join("org/acme/acme-ext-deployment/1.0/acme-ext-deployment-1.0.jar");
        let archive = zip::ZipArchive::new(File::open(&deployment_jar).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);

        let deployment_pom = PomModel::load(
            &repo.join("org/acme/acme-ext-deployment/1.0/acme-ext-deployment-1.0.pom"),
        )
        .unwrap();
        let dependency = &deployment_pom.direct_dependencies()[0];
        assert_eq!(dependency.artifact_id, "acme-ext");
        assert_eq!(dependency.version, "1.0");
    }

    #[test]
    fn test_reinstall_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let mut resolver = ResolverState::default();
        let coords = ArtifactCoords::jar("org.acme", "acme-lib", "1.0");

        let mut sink = ArtifactSink::new(temp_dir.path(), &mut resolver);
        let first = sink.install_jar(&coords, &[("a.txt", &b"one"[..])]).unwrap();
        let second = sink.install_jar(&coords, &[("a.txt", &b"two"[..])]).unwrap();

        assert_eq!(first.path, second.path);
        assert_ne!(first.digest, second.digest);
        assert_eq!(read_entry(&second.path, "a.txt"), "two");
    }
}
