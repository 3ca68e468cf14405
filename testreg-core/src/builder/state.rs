//! Mutable builder-side state
//!
//! Drafts mirror the persisted catalog types but leave the quarkus core
//! version optional so releases can be described before it is known.
//! `finalize` turns a draft into its snapshot and enforces that every
//! release has one.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::catalog::{
    ArtifactCoords, Extension, ExtensionCatalog, PlatformCatalog, PlatformRelease, PomModel,
    RegistryQuarkusVersionsConfig,
};
use crate::error::{RegistryError, Result};
use tracing::debug;

/// Which of a registry's two platform catalogs an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogSource {
    /// Current releases
    Live,
    /// Superseded releases that must stay resolvable
    Archived,
}

impl CatalogSource {
    pub const ALL: [CatalogSource; 2] = [CatalogSource::Live, CatalogSource::Archived];
}

/// Position of a stream in the live catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StreamRef {
    pub platform: usize,
    pub stream: usize,
}

/// Position of a release in one of the catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReleaseRef {
    pub source: CatalogSource,
    pub platform: usize,
    pub stream: usize,
    pub release: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogDraft {
    pub(crate) platforms: IndexMap<String, PlatformDraft>,
}

#[derive(Debug, Clone)]
pub struct PlatformDraft {
    pub(crate) key: String,
    pub(crate) streams: IndexMap<String, StreamDraft>,
}

#[derive(Debug, Clone)]
pub struct StreamDraft {
    pub(crate) id: String,
    pub(crate) releases: IndexMap<String, ReleaseDraft>,
}

#[derive(Debug, Clone)]
pub struct ReleaseDraft {
    pub(crate) version: String,
    pub(crate) quarkus_core_version: Option<String>,
    pub(crate) upstream_quarkus_core_version: Option<String>,
    pub(crate) member_boms: Vec<ArtifactCoords>,
}

impl CatalogDraft {
    pub(crate) fn get_or_create_platform(&mut self, key: &str) -> usize {
        let entry = self.platforms.entry(key.to_string());
        let index = entry.index();
        entry.or_insert_with(|| PlatformDraft {
            key: key.to_string(),
            streams: IndexMap::new(),
        });
        index
    }

    pub(crate) fn release(&self, at: ReleaseRef) -> Option<(&str, &str, &ReleaseDraft)> {
        let (key, platform) = self.platforms.get_index(at.platform)?;
        let (id, stream) = platform.streams.get_index(at.stream)?;
        let (_, release) = stream.releases.get_index(at.release)?;
        Some((key.as_str(), id.as_str(), release))
    }

    pub(crate) fn stream_path(&self, at: StreamRef) -> Option<(&str, &str)> {
        let (key, platform) = self.platforms.get_index(at.platform)?;
        let (id, _) = platform.streams.get_index(at.stream)?;
        Some((key.as_str(), id.as_str()))
    }

    pub(crate) fn locate_stream(&self, platform_key: &str, stream_id: &str) -> Option<StreamRef> {
        let (platform, _, draft) = self.platforms.get_full(platform_key)?;
        let stream = draft.streams.get_index_of(stream_id)?;
        Some(StreamRef { platform, stream })
    }

    pub(crate) fn locate_release(
        &self,
        source: CatalogSource,
        platform_key: &str,
        stream_id: &str,
        version: &str,
    ) -> Option<ReleaseRef> {
        let at = self.locate_stream(platform_key, stream_id)?;
        let release = self.platforms[at.platform].streams[at.stream]
            .releases
            .get_index_of(version)?;
        Some(ReleaseRef {
            source,
            platform: at.platform,
            stream: at.stream,
            release,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Snapshot of the catalog; fails on the first release without a
    /// quarkus core version
    pub fn finalize(&self) -> Result<PlatformCatalog> {
        let mut catalog = PlatformCatalog::new();
        for platform in self.platforms.values() {
            let target = catalog.platform_mut(&platform.key);
            for stream in platform.streams.values() {
                let target = target.stream_mut(&stream.id);
                for release in stream.releases.values() {
                    target
                        .releases
                        .push(release.finalize(&platform.key, &stream.id)?);
                }
            }
        }
        Ok(catalog)
    }
}

impl From<PlatformCatalog> for CatalogDraft {
    fn from(catalog: PlatformCatalog) -> Self {
        let mut draft = CatalogDraft::default();
        for platform in catalog.platforms {
            let p = draft.get_or_create_platform(&platform.platform_key);
            for stream in platform.streams {
                let s = draft.platforms[p].get_or_create_stream(&stream.id);
                for release in stream.releases {
                    let r = draft.platforms[p].streams[s].get_or_create_release(&release.version);
                    let target = &mut draft.platforms[p].streams[s].releases[r];
                    target.quarkus_core_version = Some(release.quarkus_core_version);
                    target.upstream_quarkus_core_version = release.upstream_quarkus_core_version;
                    target.member_boms = release.member_boms;
                }
            }
        }
        draft
    }
}

impl PlatformDraft {
    pub(crate) fn get_or_create_stream(&mut self, id: &str) -> usize {
        let entry = self.streams.entry(id.to_string());
        let index = entry.index();
        entry.or_insert_with(|| StreamDraft {
            id: id.to_string(),
            releases: IndexMap::new(),
        });
        index
    }
}

impl StreamDraft {
    pub(crate) fn get_or_create_release(&mut self, version: &str) -> usize {
        let entry = self.releases.entry(version.to_string());
        let index = entry.index();
        entry.or_insert_with(|| ReleaseDraft {
            version: version.to_string(),
            quarkus_core_version: None,
            upstream_quarkus_core_version: None,
            member_boms: Vec::new(),
        });
        index
    }
}

impl ReleaseDraft {
    pub fn finalize(&self, platform_key: &str, stream_id: &str) -> Result<PlatformRelease> {
        let quarkus_core_version = self.quarkus_core_version.clone().ok_or_else(|| {
            RegistryError::Config(format!(
                "Quarkus version has not been configured for platform release {}:{}:{}",
                platform_key, stream_id, self.version
            ))
        })?;

        Ok(PlatformRelease {
            version: self.version.clone(),
            quarkus_core_version,
            upstream_quarkus_core_version: self.upstream_quarkus_core_version.clone(),
            member_boms: self.member_boms.clone(),
        })
    }
}

/// The live and archived catalogs of one registry, each created on demand
#[derive(Debug, Clone, Default)]
pub struct CatalogSet {
    live: Option<CatalogDraft>,
    archived: Option<CatalogDraft>,
}

impl CatalogSet {
    pub fn get(&self, source: CatalogSource) -> Option<&CatalogDraft> {
        match source {
            CatalogSource::Live => self.live.as_ref(),
            CatalogSource::Archived => self.archived.as_ref(),
        }
    }

    pub fn get_or_create(&mut self, source: CatalogSource) -> &mut CatalogDraft {
        match source {
            CatalogSource::Live => self.live.get_or_insert_with(CatalogDraft::default),
            CatalogSource::Archived => self.archived.get_or_insert_with(CatalogDraft::default),
        }
    }

    pub fn replace(&mut self, source: CatalogSource, draft: CatalogDraft) {
        match source {
            CatalogSource::Live => self.live = Some(draft),
            CatalogSource::Archived => self.archived = Some(draft),
        }
    }

    /// Neither catalog has been created
    pub fn is_empty(&self) -> bool {
        self.live.is_none() && self.archived.is_none()
    }

    /// Snapshots of the existing catalogs, live first
    pub fn finalize(&self) -> Result<Vec<(CatalogSource, PlatformCatalog)>> {
        CatalogSource::ALL
            .iter()
            .filter_map(|source| self.get(*source).map(|draft| (*source, draft)))
            .map(|(source, draft)| draft.finalize().map(|catalog| (source, catalog)))
            .collect()
    }

    pub(crate) fn release(&self, at: ReleaseRef) -> Option<(&str, &str, &ReleaseDraft)> {
        self.get(at.source)?.release(at)
    }

    pub(crate) fn release_mut(&mut self, at: ReleaseRef) -> Option<&mut ReleaseDraft> {
        let catalog = match at.source {
            CatalogSource::Live => self.live.as_mut(),
            CatalogSource::Archived => self.archived.as_mut(),
        }?;
        let (_, platform) = catalog.platforms.get_index_mut(at.platform)?;
        let (_, stream) = platform.streams.get_index_mut(at.stream)?;
        stream
            .releases
            .get_index_mut(at.release)
            .map(|(_, release)| release)
    }
}

/// A platform member catalog under construction
#[derive(Debug, Clone)]
pub(crate) struct MemberState {
    pub release: ReleaseRef,
    pub stream: StreamRef,
    pub bom: ArtifactCoords,
    pub catalog_id: String,
    pub extensions: Vec<Extension>,
    pub metadata: Map<String, Value>,
    pub pom: PomModel,
}

impl MemberState {
    pub fn new(bom: ArtifactCoords, release: ReleaseRef, stream: StreamRef) -> Self {
        Self {
            release,
            stream,
            catalog_id: bom.to_catalog_artifact().to_string(),
            pom: PomModel::init(&bom),
            bom,
            extensions: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// `metadata.project.properties`, created on first use
    pub fn project_properties(&mut self) -> Option<&mut Map<String, Value>> {
        object_entry(&mut self.metadata, "project")
            .and_then(|project| object_entry(project, "properties"))
    }

    /// Extension catalog for this member with the release info filled in
    pub fn to_catalog(
        &self,
        platform_key: &str,
        stream_id: &str,
        release: &PlatformRelease,
    ) -> ExtensionCatalog {
        let mut catalog = ExtensionCatalog::new(
            self.catalog_id.clone(),
            self.bom.clone(),
            &release.quarkus_core_version,
        );
        catalog.platform = true;
        catalog.upstream_quarkus_core_version = release.upstream_quarkus_core_version.clone();
        catalog.extensions = self.extensions.clone();
        catalog.metadata = self.metadata.clone();

        let members: Vec<Value> = release
            .member_boms
            .iter()
            .map(|bom| Value::String(bom.to_catalog_artifact().to_string()))
            .collect();
        let mut platform_release = Map::new();
        platform_release.insert("platform-key".to_string(), platform_key.into());
        platform_release.insert("stream".to_string(), stream_id.into());
        platform_release.insert("version".to_string(), release.version.clone().into());
        platform_release.insert("members".to_string(), Value::Array(members));
        catalog
            .metadata
            .insert("platform-release".to_string(), Value::Object(platform_release));

        catalog
    }
}

/// A non-platform extension catalog under construction
#[derive(Debug, Clone)]
pub(crate) struct NonPlatformState {
    pub catalog: ExtensionCatalog,
}

/// Everything one registry builder accumulates
#[derive(Debug, Clone)]
pub(crate) struct RegistryState {
    pub id: String,
    pub group_id: String,
    pub enabled: bool,
    pub external: bool,
    pub enable_maven_resolver: bool,
    pub quarkus_versions: Option<RegistryQuarkusVersionsConfig>,
    pub catalogs: CatalogSet,
    pub members: IndexMap<ArtifactCoords, MemberState>,
    pub non_platform: IndexMap<String, NonPlatformState>,
}

impl RegistryState {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            group_id: crate::catalog::registry_group_id(id),
            enabled: true,
            external: false,
            enable_maven_resolver: false,
            quarkus_versions: None,
            catalogs: CatalogSet::default(),
            members: IndexMap::new(),
            non_platform: IndexMap::new(),
        }
    }

    /// Swap in a new live catalog. Members are re-pointed at the release with
    /// the same platform key, stream id and version; members whose release
    /// is gone are dropped.
    pub fn replace_live_catalog(&mut self, catalog: CatalogDraft) {
        let paths: Vec<Option<(String, String, String)>> = self
            .members
            .values()
            .map(|member| {
                let (key, stream_id) = self
                    .catalogs
                    .get(CatalogSource::Live)?
                    .stream_path(member.stream)?;
                let (_, _, release) = self.catalogs.release(member.release)?;
                Some((key.to_string(), stream_id.to_string(), release.version.clone()))
            })
            .collect();

        self.catalogs.replace(CatalogSource::Live, catalog);

        let live = self.catalogs.get(CatalogSource::Live);
        let registry_id = &self.id;
        let mut paths = paths.into_iter();
        self.members.retain(|bom, member| {
            let Some(Some((key, stream_id, version))) = paths.next() else {
                debug!("Dropping member {} of registry {}", bom, registry_id);
                return false;
            };
            let Some(stream) = live.and_then(|c| c.locate_stream(&key, &stream_id)) else {
                debug!("Dropping member {} of registry {}", bom, registry_id);
                return false;
            };
            member.stream = stream;
            if member.release.source == CatalogSource::Live {
                let release = live.and_then(|catalog| {
                    catalog.locate_release(CatalogSource::Live, &key, &stream_id, &version)
                });
                match release {
                    Some(release) => member.release = release,
                    None => {
                        debug!("Dropping member {} of registry {}", bom, registry_id);
                        return false;
                    }
                }
            }
            true
        });
    }

    /// Finalized view of a referenced release with its platform key and
    /// stream id
    pub fn release_snapshot(&self, at: ReleaseRef) -> Result<(String, String, PlatformRelease)> {
        let (platform_key, stream_id, release) = self.catalogs.release(at).ok_or_else(|| {
            RegistryError::State(format!(
                "Release referenced by a member of registry {} no longer exists",
                self.id
            ))
        })?;
        let snapshot = release.finalize(platform_key, stream_id)?;
        Ok((platform_key.to_string(), stream_id.to_string(), snapshot))
    }
}

/// Nested object under `key`, replacing a non-object value
pub(crate) fn object_entry<'m>(
    map: &'m mut Map<String, Value>,
    key: &str,
) -> Option<&'m mut Map<String, Value>> {
    let value = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release_ref(source: CatalogSource) -> ReleaseRef {
        ReleaseRef {
            source,
            platform: 0,
            stream: 0,
            release: 0,
        }
    }

    fn draft_with_release(quarkus_version: Option<&str>) -> CatalogDraft {
        let mut draft = CatalogDraft::default();
        let p = draft.get_or_create_platform("org.acme");
        let s = draft.platforms[p].get_or_create_stream("1.0");
        let r = draft.platforms[p].streams[s].get_or_create_release("1.0.0");
        draft.platforms[p].streams[s].releases[r].quarkus_core_version =
            quarkus_version.map(str::to_string);
        draft
    }

    #[test]
    fn test_get_or_create_merges_keys() {
        let mut draft = CatalogDraft::default();
        assert_eq!(draft.get_or_create_platform("a"), 0);
        assert_eq!(draft.get_or_create_platform("b"), 1);
        assert_eq!(draft.get_or_create_platform("a"), 0);
        assert_eq!(draft.platforms.len(), 2);
    }

    #[test]
    fn test_finalize_requires_quarkus_version() {
        let err = draft_with_release(None).finalize().unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
        assert!(err.to_string().contains("org.acme:1.0:1.0.0"));

        let catalog = draft_with_release(Some("2.0.0")).finalize().unwrap();
        assert_eq!(
            catalog
                .release("org.acme", "1.0", "1.0.0")
                .unwrap()
                .quarkus_core_version,
            "2.0.0"
        );
    }

    #[test]
    fn test_snapshot_round_trips_through_draft() {
        let catalog = draft_with_release(Some("2.0.0")).finalize().unwrap();
        let draft = CatalogDraft::from(catalog.clone());
        assert_eq!(draft.finalize().unwrap(), catalog);
    }

    #[test]
    fn test_catalog_set_sources_are_separate() {
        let mut set = CatalogSet::default();
        assert!(set.is_empty());
        assert!(set.finalize().unwrap().is_empty());

        set.replace(CatalogSource::Archived, draft_with_release(Some("1.0.0")));
        assert!(!set.is_empty());
        assert!(set.get(CatalogSource::Live).is_none());
        assert!(set.release(release_ref(CatalogSource::Live)).is_none());
        assert!(set.release(release_ref(CatalogSource::Archived)).is_some());

        let finalized = set.finalize().unwrap();
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].0, CatalogSource::Archived);
    }

    #[test]
    fn test_release_mut_ignores_unknown_positions() {
        let mut set = CatalogSet::default();
        assert!(set.release_mut(release_ref(CatalogSource::Live)).is_none());

        set.replace(CatalogSource::Live, draft_with_release(None));
        let stale = ReleaseRef {
            platform: 3,
            ..release_ref(CatalogSource::Live)
        };
        assert!(set.release_mut(stale).is_none());
        assert!(set.release_mut(release_ref(CatalogSource::Live)).is_some());
    }

    #[test]
    fn test_replace_live_catalog_repoints_members() {
        let mut registry = RegistryState::new("registry.acme.org");
        let mut draft = CatalogDraft::default();
        draft.get_or_create_platform("org.other");
        let p = draft.get_or_create_platform("org.acme");
        let s = draft.platforms[p].get_or_create_stream("1.0");
        draft.platforms[p].streams[s].get_or_create_release("0.9.0");
        let r = draft.platforms[p].streams[s].get_or_create_release("1.0.0");
        registry.catalogs.replace(CatalogSource::Live, draft);

        let stream = StreamRef {
            platform: p,
            stream: s,
        };
        let kept = ArtifactCoords::pom("org.acme", "acme-bom", "1.0.0");
        let dropped = ArtifactCoords::pom("org.acme", "acme-old-bom", "0.9.0");
        registry.members.insert(
            kept.clone(),
            MemberState::new(
                kept.clone(),
                ReleaseRef {
                    source: CatalogSource::Live,
                    platform: p,
                    stream: s,
                    release: r,
                },
                stream,
            ),
        );
        registry.members.insert(
            dropped.clone(),
            MemberState::new(
                dropped.clone(),
                ReleaseRef {
                    source: CatalogSource::Live,
                    platform: p,
                    stream: s,
                    release: 0,
                },
                stream,
            ),
        );

        let mut fresh = draft_with_release(Some("2.0.0"));
        let acme = fresh.get_or_create_platform("org.acme");
        fresh.platforms[acme].streams[0].get_or_create_release("1.0.0");
        registry.replace_live_catalog(fresh);

        assert_eq!(registry.members.len(), 1);
        let member = &registry.members[&kept];
        assert_eq!(member.stream, StreamRef { platform: 0, stream: 0 });
        let (key, stream_id, release) = registry.catalogs.release(member.release).unwrap();
        assert_eq!((key, stream_id), ("org.acme", "1.0"));
        assert_eq!(release.version, "1.0.0");
    }

    #[test]
    fn test_object_entry_replaces_scalars() {
        let mut map = Map::new();
        map.insert("project".to_string(), Value::from("scalar"));
        object_entry(&mut map, "project")
            .unwrap()
            .insert("k".to_string(), Value::from(1));
        assert_eq!(map["project"]["k"], 1);
    }
}
