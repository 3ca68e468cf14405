//! Artifact installation into the local package store
//!
//! Synthetic artifacts are staged as files and then copied into a
//! Maven-layout repository (`<base>/maven-repo`). Installing the same
//! coordinates again overwrites the previous content.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::coords::ArtifactCoords;
use crate::error::{RegistryError, Result};

/// Local repository directory name under the build's base directory
pub const MAVEN_REPO_DIR: &str = "maven-repo";

/// Result of installing one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    pub coords: ArtifactCoords,

    /// Location inside the local repository
    pub path: PathBuf,

    /// `sha256:<hex>` digest of the installed content
    pub digest: String,
}

/// Installer bound to one local repository
#[derive(Debug, Clone)]
pub struct ArtifactInstaller {
    local_repo: PathBuf,
}

impl ArtifactInstaller {
    /// Open (and create if needed) a local repository
    pub fn open(local_repo: impl Into<PathBuf>) -> Result<Self> {
        let local_repo = local_repo.into();

        if local_repo.exists() && !local_repo.is_dir() {
            return Err(RegistryError::State(format!(
                "Local repository {} exists and is not a directory",
                local_repo.display()
            )));
        }
        std::fs::create_dir_all(&local_repo).map_err(|e| RegistryError::io(&local_repo, e))?;

        tracing::debug!("Opened local repository {}", local_repo.display());
        Ok(Self { local_repo })
    }

    pub fn local_repo(&self) -> &Path {
        &self.local_repo
    }

    /// Location the artifact has (or would have) in the local repository
    pub fn artifact_path(&self, coords: &ArtifactCoords) -> PathBuf {
        self.local_repo.join(coords.repository_path())
    }

    /// Install `file` as `coords`. Last write wins.
    pub fn install(&self, coords: &ArtifactCoords, file: &Path) -> Result<InstalledArtifact> {
        let install_err = |reason: String| RegistryError::Install {
            coords: coords.to_string(),
            path: file.to_path_buf(),
            reason,
        };

        let bytes = std::fs::read(file).map_err(|e| install_err(e.to_string()))?;

        let target = self.artifact_path(coords);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| install_err(e.to_string()))?;
        }
        std::fs::write(&target, &bytes).map_err(|e| install_err(e.to_string()))?;

        let digest = sha256_digest(&bytes);
        tracing::debug!("Installed {} ({})", coords, digest);

        Ok(InstalledArtifact {
            coords: coords.clone(),
            path: target,
            digest,
        })
    }

    /// Check if an artifact is installed
    pub fn is_installed(&self, coords: &ArtifactCoords) -> bool {
        self.artifact_path(coords).is_file()
    }

    /// Resolve an installed artifact to its file
    pub fn resolve(&self, coords: &ArtifactCoords) -> Result<PathBuf> {
        let path = self.artifact_path(coords);
        if path.is_file() {
            Ok(path)
        } else {
            Err(RegistryError::NotInstalled(coords.to_string()))
        }
    }

    /// Digest of an installed artifact's current content
    pub fn digest(&self, coords: &ArtifactCoords) -> Result<String> {
        let path = self.resolve(coords)?;
        let bytes = std::fs::read(&path).map_err(|e| RegistryError::io(&path, e))?;
        Ok(sha256_digest(&bytes))
    }
}

fn sha256_digest(bytes: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(bytes)))
}

/// Lazily initialized installer shared by one client builder.
///
/// Initialization happens on first use; a failure is remembered and
/// reported again on every later use.
#[derive(Debug, Default)]
pub enum ResolverState {
    #[default]
    Uninitialized,
    Ready(ArtifactInstaller),
    Failed(String),
}

impl ResolverState {
    pub fn get_or_init(&mut self, local_repo: &Path) -> Result<&ArtifactInstaller> {
        if let ResolverState::Uninitialized = self {
            *self = match ArtifactInstaller::open(local_repo) {
                Ok(installer) => ResolverState::Ready(installer),
                Err(e) => {
                    tracing::error!("Failed to initialize artifact resolver: {}", e);
                    ResolverState::Failed(e.to_string())
                }
            };
        }

        match &*self {
            ResolverState::Ready(installer) => Ok(installer),
            ResolverState::Failed(reason) => Err(RegistryError::State(format!(
                "Failed to initialize artifact resolver: {reason}"
            ))),
            ResolverState::Uninitialized => Err(RegistryError::State(
                "Artifact resolver is not initialized".to_string(),
            )),
        }
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self, ResolverState::Uninitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_install_uses_repository_layout() {
        let temp_dir = TempDir::new().unwrap();
        let installer = ArtifactInstaller::open(temp_dir.path().join(MAVEN_REPO_DIR)).unwrap();
        let coords = ArtifactCoords::jar("org.acme", "acme-ext", "1.0");
        let file = write_file(temp_dir.path(), "staged.jar", "jar bytes");

        let installed = installer.install(&coords, &file).unwrap();

        assert_eq!(
            installed.path,
            temp_dir
                .path()
                .join("maven-repo/org/acme/acme-ext/1.0/acme-ext-1.0.jar")
        );
        assert!(installer.is_installed(&coords));
        assert_eq!(installer.resolve(&coords).unwrap(), installed.path);
    }

    #[test]
    fn test_reinstall_last_write_wins() {
        let temp_dir = TempDir::new().unwrap();
        let installer = ArtifactInstaller::open(temp_dir.path().join(MAVEN_REPO_DIR)).unwrap();
        let coords = ArtifactCoords::pom("org.acme", "acme-bom", "1.0");

        let first = installer
            .install(&coords, &write_file(temp_dir.path(), "a.pom", "first"))
            .unwrap();
        let second = installer
            .install(&coords, &write_file(temp_dir.path(), "b.pom", "second"))
            .unwrap();

        assert_ne!(first.digest, second.digest);
        assert_eq!(std::fs::read_to_string(&second.path).unwrap(), "second");
        assert_eq!(installer.digest(&coords).unwrap(), second.digest);
    }

    #[test]
    fn test_digest_is_prefixed_sha256_hex() {
        let temp_dir = TempDir::new().unwrap();
        let installer = ArtifactInstaller::open(temp_dir.path().join(MAVEN_REPO_DIR)).unwrap();
        let coords = ArtifactCoords::jar("org.acme", "acme-ext", "1.0");

        let installed = installer
            .install(&coords, &write_file(temp_dir.path(), "empty.jar", ""))
            .unwrap();

        assert_eq!(
            installed.digest,
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(installer.digest(&coords).unwrap(), installed.digest);
    }

    #[test]
    fn test_resolve_missing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let installer = ArtifactInstaller::open(temp_dir.path()).unwrap();
        let result = installer.resolve(&ArtifactCoords::jar("org.acme", "missing", "1.0"));
        assert!(matches!(result, Err(RegistryError::NotInstalled(_))));
    }

    #[test]
    fn test_install_missing_source_file() {
        let temp_dir = TempDir::new().unwrap();
        let installer = ArtifactInstaller::open(temp_dir.path()).unwrap();
        let result = installer.install(
            &ArtifactCoords::jar("org.acme", "acme-ext", "1.0"),
            &temp_dir.path().join("does-not-exist.jar"),
        );
        assert!(matches!(result, Err(RegistryError::Install { .. })));
    }

    #[test]
    fn test_resolver_state_is_lazy_singleton() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_dir.path().join(MAVEN_REPO_DIR);
        let mut state = ResolverState::default();
        assert!(!state.is_initialized());
        assert!(!repo.exists());

        let first = state.get_or_init(&repo).unwrap().local_repo().to_path_buf();
        assert!(repo.is_dir());
        let second = state.get_or_init(&temp_dir.path().join("other")).unwrap();
        assert_eq!(second.local_repo(), first);
    }

    #[test]
    fn test_resolver_failure_is_not_retried() {
        let temp_dir = TempDir::new().unwrap();
        let repo = write_file(temp_dir.path(), MAVEN_REPO_DIR, "not a directory");
        let mut state = ResolverState::default();

        assert!(matches!(state.get_or_init(&repo), Err(RegistryError::State(_))));

        std::fs::remove_file(&repo).unwrap();
        let again = state.get_or_init(&repo);
        assert!(matches!(again, Err(RegistryError::State(_))));
        assert!(!repo.exists());
    }
}
