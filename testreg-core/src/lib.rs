//! Test registry fixture builder
//!
//! Describes extension registries in memory (platforms, streams, releases,
//! member and non-platform catalogs) and writes them out as a registry
//! client configuration, catalog documents and a local Maven repository of
//! synthetic artifacts.

pub mod builder;
pub mod catalog;
pub mod error;
pub mod fixture;

pub use builder::{
    MemberBuilder, NonPlatformBuilder, PlatformBuilder, RegistryBuilder, RegistryClientBuilder,
    ReleaseBuilder, StreamBuilder,
};
pub use error::{RegistryError, Result};
pub use fixture::RegistryFixture;
