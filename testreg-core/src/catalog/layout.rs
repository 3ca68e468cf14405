//! On-disk layout of a built registry tree
//!
//! ```text
//! <base>/config.yaml
//! <base>/<registry>/config.json
//! <base>/<registry>/platforms/platforms.json
//! <base>/<registry>/platforms/<quarkus-version>/platforms.json
//! <base>/<registry>/non-platform/<quarkus-version>.json
//! <base>/<registry>/members/<group>.<artifact>.<version>.json
//! <base>/maven-repo/...
//! <base>/tmp/<group path>/<artifact>/<version>/<artifact>-<version>.<type>
//! ```

use std::path::{Path, PathBuf};

use super::coords::ArtifactCoords;
use super::installer::MAVEN_REPO_DIR;

pub const CLIENT_CONFIG_FILE: &str = "config.yaml";
pub const REGISTRY_DESCRIPTOR_FILE: &str = "config.json";
pub const PLATFORMS_FILE: &str = "platforms.json";
pub const PLATFORMS_DIR: &str = "platforms";
pub const NON_PLATFORM_DIR: &str = "non-platform";
pub const MEMBERS_DIR: &str = "members";
pub const STAGING_DIR: &str = "tmp";

pub fn client_config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CLIENT_CONFIG_FILE)
}

pub fn registry_dir(base_dir: &Path, registry_id: &str) -> PathBuf {
    base_dir.join(registry_id)
}

pub fn registry_descriptor_path(registry_dir: &Path) -> PathBuf {
    registry_dir.join(REGISTRY_DESCRIPTOR_FILE)
}

pub fn platforms_dir(registry_dir: &Path) -> PathBuf {
    registry_dir.join(PLATFORMS_DIR)
}

/// Root platform catalog when `quarkus_version` is `None`, otherwise the
/// catalog bucket for that quarkus version
pub fn platforms_catalog_path(registry_dir: &Path, quarkus_version: Option<&str>) -> PathBuf {
    let dir = platforms_dir(registry_dir);
    match quarkus_version {
        Some(version) => dir.join(version).join(PLATFORMS_FILE),
        None => dir.join(PLATFORMS_FILE),
    }
}

pub fn non_platform_dir(registry_dir: &Path) -> PathBuf {
    registry_dir.join(NON_PLATFORM_DIR)
}

pub fn non_platform_catalog_path(registry_dir: &Path, quarkus_version: &str) -> PathBuf {
    non_platform_dir(registry_dir).join(format!("{quarkus_version}.json"))
}

pub fn members_dir(registry_dir: &Path) -> PathBuf {
    registry_dir.join(MEMBERS_DIR)
}

pub fn member_catalog_path(registry_dir: &Path, bom: &ArtifactCoords) -> PathBuf {
    members_dir(registry_dir).join(format!(
        "{}.{}.{}.json",
        bom.group_id, bom.artifact_id, bom.version
    ))
}

pub fn maven_repo_dir(base_dir: &Path) -> PathBuf {
    base_dir.join(MAVEN_REPO_DIR)
}

/// Where a synthesized artifact file is written before installation
pub fn staging_path(base_dir: &Path, coords: &ArtifactCoords) -> PathBuf {
    let mut path = base_dir.join(STAGING_DIR);
    path.extend(coords.group_id.split('.'));
    path.push(&coords.artifact_id);
    path.push(&coords.version);
    path.push(format!(
        "{}-{}.{}",
        coords.artifact_id, coords.version, coords.kind
    ));
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let base = Path::new("/base");
        let registry = registry_dir(base, "registry.acme.org");
        assert_eq!(registry, PathBuf::from("/base/registry.acme.org"));
        assert_eq!(
            platforms_catalog_path(&registry, None),
            PathBuf::from("/base/registry.acme.org/platforms/platforms.json")
        );
        assert_eq!(
            platforms_catalog_path(&registry, Some("2.0.0")),
            PathBuf::from("/base/registry.acme.org/platforms/2.0.0/platforms.json")
        );
        assert_eq!(
            non_platform_catalog_path(&registry, "2.0.0"),
            PathBuf::from("/base/registry.acme.org/non-platform/2.0.0.json")
        );
        assert_eq!(
            member_catalog_path(&registry, &ArtifactCoords::pom("org.acme", "acme-bom", "1.0")),
            PathBuf::from("/base/registry.acme.org/members/org.acme.acme-bom.1.0.json")
        );
    }

    #[test]
    fn test_staging_path_ignores_classifier() {
        let coords = ArtifactCoords::new("org.acme", "acme-ext", "tests", "jar", "1.0");
        assert_eq!(
            staging_path(Path::new("/base"), &coords),
            PathBuf::from("/base/tmp/org/acme/acme-ext/1.0/acme-ext-1.0.jar")
        );
    }
}
