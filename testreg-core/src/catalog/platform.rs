//! Platform catalog documents (platforms.json)
//!
//! A platform catalog lists platforms, their streams and the releases of
//! each stream. These are the persisted snapshot types: every release
//! carries the quarkus core version it is anchored to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::coords::ArtifactCoords;
use crate::error::Result;

/// A platform catalog (platforms.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformCatalog {
    /// Platforms in insertion order
    #[serde(default)]
    pub platforms: Vec<Platform>,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Platform {
    pub platform_key: String,

    #[serde(default)]
    pub streams: Vec<PlatformStream>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformStream {
    pub id: String,

    #[serde(default)]
    pub releases: Vec<PlatformRelease>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformRelease {
    pub version: String,

    pub quarkus_core_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_quarkus_core_version: Option<String>,

    #[serde(default)]
    pub member_boms: Vec<ArtifactCoords>,
}

impl Platform {
    pub fn new(platform_key: impl Into<String>) -> Self {
        Self {
            platform_key: platform_key.into(),
            streams: Vec::new(),
        }
    }

    pub fn stream(&self, id: &str) -> Option<&PlatformStream> {
        self.streams.iter().find(|s| s.id == id)
    }

    /// Get or create a stream by id
    pub fn stream_mut(&mut self, id: &str) -> &mut PlatformStream {
        let index = match self.streams.iter().position(|s| s.id == id) {
            Some(index) => index,
            None => {
                self.streams.push(PlatformStream::new(id));
                self.streams.len() - 1
            }
        };
        &mut self.streams[index]
    }
}

impl PlatformStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            releases: Vec::new(),
        }
    }

    pub fn release(&self, version: &str) -> Option<&PlatformRelease> {
        self.releases.iter().find(|r| r.version == version)
    }
}

impl PlatformCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    pub fn platform(&self, key: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.platform_key == key)
    }

    /// Get or create a platform by key
    pub fn platform_mut(&mut self, key: &str) -> &mut Platform {
        let index = match self.platforms.iter().position(|p| p.platform_key == key) {
            Some(index) => index,
            None => {
                self.platforms.push(Platform::new(key));
                self.platforms.len() - 1
            }
        };
        &mut self.platforms[index]
    }

    /// Append a release under `platform_key:stream_id`, creating the
    /// platform and stream shells when missing
    pub fn add_release(&mut self, platform_key: &str, stream_id: &str, release: PlatformRelease) {
        self.platform_mut(platform_key)
            .stream_mut(stream_id)
            .releases
            .push(release);
    }

    /// Look up a release by its `platform:stream:version` path
    pub fn release(
        &self,
        platform_key: &str,
        stream_id: &str,
        version: &str,
    ) -> Option<&PlatformRelease> {
        self.platform(platform_key)?
            .stream(stream_id)?
            .release(version)
    }

    /// Walk every release with its platform key and stream id
    pub fn releases(&self) -> impl Iterator<Item = (&str, &str, &PlatformRelease)> {
        self.platforms.iter().flat_map(|p| {
            p.streams.iter().flat_map(move |s| {
                s.releases
                    .iter()
                    .map(move |r| (p.platform_key.as_str(), s.id.as_str(), r))
            })
        })
    }

    pub fn release_count(&self) -> usize {
        self.releases().count()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Parse a catalog from JSON
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        super::load_json(path)
    }

    /// Write the catalog to `path`, creating parent directories
    pub fn persist(&self, path: &Path) -> Result<()> {
        super::persist_json(self, path)
    }
}

/// Group releases from several catalogs by quarkus core version.
///
/// Each bucket is a catalog holding only the releases anchored to that
/// version, under the same platform key and stream id they had in their
/// source catalog. Catalogs are walked in order, so earlier catalogs
/// contribute their releases first.
pub fn bucket_by_quarkus_version<'a>(
    catalogs: impl IntoIterator<Item = &'a PlatformCatalog>,
) -> BTreeMap<String, PlatformCatalog> {
    let mut buckets: BTreeMap<String, PlatformCatalog> = BTreeMap::new();

    for catalog in catalogs {
        for (platform_key, stream_id, release) in catalog.releases() {
            buckets
                .entry(release.quarkus_core_version.clone())
                .or_default()
                .add_release(platform_key, stream_id, release.clone());
        }
    }

    buckets
}

#[cfg(test)]
mod platform_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn release(version: &str, quarkus_version: &str) -> PlatformRelease {
        PlatformRelease {
            version: version.to_string(),
            quarkus_core_version: quarkus_version.to_string(),
            upstream_quarkus_core_version: None,
            member_boms: vec![],
        }
    }

    #[test]
    fn test_add_release_creates_shells_once() {
        let mut catalog = PlatformCatalog::new();
        catalog.add_release("org.acme", "1.0", release("1.0.0", "2.0.0"));
        catalog.add_release("org.acme", "1.0", release("1.0.1", "2.0.1"));
        catalog.add_release("org.acme", "2.0", release("2.0.0", "2.1.0"));

        assert_eq!(catalog.platforms.len(), 1);
        assert_eq!(catalog.platforms[0].streams.len(), 2);
        assert_eq!(catalog.release_count(), 3);
        assert!(catalog.release("org.acme", "1.0", "1.0.1").is_some());
        assert!(catalog.release("org.acme", "2.0", "1.0.1").is_none());
    }

    #[test]
    fn test_bucket_by_quarkus_version() {
        let mut live = PlatformCatalog::new();
        live.add_release("org.acme", "1.0", release("1.0.0", "2.0.0"));
        live.add_release("org.other", "5.x", release("5.1", "2.0.0"));
        live.add_release("org.acme", "1.1", release("1.1.0", "2.1.0"));

        let mut archived = PlatformCatalog::new();
        archived.add_release("org.acme", "1.0", release("0.9.0", "1.9.0"));

        let buckets = bucket_by_quarkus_version([&live, &archived]);

        assert_eq!(
            buckets.keys().cloned().collect::<Vec<_>>(),
            vec!["1.9.0", "2.0.0", "2.1.0"]
        );

        let shared = &buckets["2.0.0"];
        assert_eq!(shared.platforms.len(), 2);
        assert!(shared.release("org.acme", "1.0", "1.0.0").is_some());
        assert!(shared.release("org.other", "5.x", "5.1").is_some());

        assert_eq!(buckets["1.9.0"].release_count(), 1);
        assert!(buckets["1.9.0"].release("org.acme", "1.0", "0.9.0").is_some());
    }

    #[test]
    fn test_json_uses_kebab_case() {
        let mut catalog = PlatformCatalog::new();
        let mut r = release("1.0.0", "2.0.0");
        r.upstream_quarkus_core_version = Some("2.0.0.Final".to_string());
        r.member_boms
            .push(ArtifactCoords::pom("org.acme", "acme-bom", "1.0.0"));
        catalog.add_release("org.acme", "1.0", r);

        let json = serde_json::to_string(&catalog).unwrap();
        assert!(json.contains("\"platform-key\":\"org.acme\""));
        assert!(json.contains("\"quarkus-core-version\":\"2.0.0\""));
        assert!(json.contains("\"upstream-quarkus-core-version\":\"2.0.0.Final\""));
        assert!(json.contains("\"member-boms\":[\"org.acme:acme-bom::pom:1.0.0\"]"));
        assert!(!json.contains("metadata"));

        let parsed = PlatformCatalog::from_json(&json).unwrap();
        assert_eq!(parsed, catalog);
    }
}
