//! Integration tests for YAML registry fixtures

mod common;

use anyhow::Result;
use common::{init_test_logging, load_bucket, load_member, registry_dir, REGISTRY_ID};
use std::path::PathBuf;
use tempfile::TempDir;
use testreg_core::catalog::{layout, ExtensionCatalog, RegistriesConfig};
use testreg_core::{RegistryError, RegistryFixture};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/registry.yaml")
}

#[test]
fn test_fixture_builds_registry_tree() -> Result<()> {
    init_test_logging();
    let temp_dir = TempDir::new()?;
    let fixture = RegistryFixture::from_file(&fixture_path())?;
    fixture.build_into(temp_dir.path())?;

    let live = load_bucket(temp_dir.path(), "2.0.1.Final")?;
    let release = live.release("org.acme.platform", "2.0", "2.0.1").unwrap();
    assert_eq!(release.upstream_quarkus_core_version.as_deref(), Some("2.0.1"));
    assert_eq!(release.member_boms.len(), 2);

    let archived = load_bucket(temp_dir.path(), "1.13.7.Final")?;
    assert!(archived
        .release("org.acme.platform", "2.0", "1.9.0")
        .is_some());

    let member = load_member(temp_dir.path(), "org.acme.platform", "acme-bom", "2.0.1")?;
    let names: Vec<_> = member.extensions.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["acme-rest", "quarkus-arc"]);
    assert_eq!(member.extensions[0].artifact.group_id, "org.acme.platform");
    assert_eq!(
        member.metadata_at(&["project", "properties", "maven-plugin-version"]),
        Some(&serde_json::Value::from("2.0.1.Final"))
    );
    assert_eq!(
        member.upstream_quarkus_core_version.as_deref(),
        Some("2.0.1")
    );

    let core = load_member(temp_dir.path(), "org.acme.platform", "quarkus-bom", "2.0.1")?;
    assert_eq!(core.extensions[0].artifact.artifact_id, "quarkus-core");

    let non_platform = ExtensionCatalog::from_file(&layout::non_platform_catalog_path(
        &registry_dir(temp_dir.path()),
        "2.0.1.Final",
    ))?;
    assert_eq!(non_platform.extensions[0].name, "acme-tools");

    let config = RegistriesConfig::load_from_path(&layout::client_config_path(temp_dir.path()))?;
    assert_eq!(config.registries.len(), 2);
    assert_eq!(
        config.get_registry(REGISTRY_ID).unwrap().extra["client-factory-url"],
        "file:///opt/testreg/client.jar"
    );
    assert!(config
        .get_registry("registry.external.org")
        .unwrap()
        .extra
        .is_empty());
    Ok(())
}

#[test]
fn test_invalid_fixture_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut fixture = RegistryFixture::from_file(&fixture_path())?;
    fixture.registries[0].platforms[0].streams[0].releases[0].quarkus_version = None;

    let err = fixture.build_into(temp_dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::Config(_)));
    assert!(!layout::client_config_path(temp_dir.path()).exists());
    Ok(())
}

#[test]
fn test_missing_fixture_file() {
    let err = RegistryFixture::from_file(&PathBuf::from("/nonexistent/registry.yaml")).unwrap_err();
    assert!(matches!(err, RegistryError::Io { .. }));
}
