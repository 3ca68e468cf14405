//! Fluent builder graph for test registries
//!
//! A [`RegistryClientBuilder`] owns every registry and hands out small
//! handles that walk down the catalog tree:
//!
//! ```text
//! RegistryClientBuilder
//!   └── RegistryBuilder ──── NonPlatformBuilder
//!         └── PlatformBuilder
//!               └── StreamBuilder
//!                     └── ReleaseBuilder (live or archived)
//!                           └── MemberBuilder
//! ```
//!
//! Each level is get-or-create by its natural key, so describing the same
//! entity twice merges into one. All state stays in memory until
//! [`RegistryClientBuilder::build`].

mod artifacts;
mod client;
mod member;
mod non_platform;
mod platform;
mod registry;
mod state;

pub use artifacts::{DEPLOYMENT_ARTIFACT_PROPERTY, DEPLOYMENT_SUFFIX, EXTENSION_PROPERTIES_ENTRY};
pub use client::RegistryClientBuilder;
pub use member::MemberBuilder;
pub use non_platform::NonPlatformBuilder;
pub use platform::{
    PlatformBuilder, ReleaseBuilder, StreamBuilder, COMPILER_PLUGIN_VERSION,
    QUARKUS_BOM_ARTIFACT_ID, SUREFIRE_PLUGIN_VERSION,
};
pub use registry::RegistryBuilder;
pub use state::{CatalogDraft, CatalogSet, CatalogSource, PlatformDraft, ReleaseDraft, StreamDraft};
