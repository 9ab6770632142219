//! Content-addressed bundle caching
//!
//! Bundles on disk are reused only while the sources they summarize are
//! unchanged. Staleness is decided by comparing SHA-256 digests of the current
//! source text against the digests recorded in the bundle.
//!
//! # Cache Lifetime
//!
//! | Table | Key | Populated | Evicted |
//! |-------|-----|-----------|---------|
//! | Folder catalog | output folder | first lookup in that folder | never |
//! | URI index | unit URI | first request for that URI | never |
//!
//! Tables are append-only for the life of their owner. Observing changes on
//! disk requires a new provider.

pub mod catalog;
pub mod consistency;
pub mod digest;
pub mod once_map;

pub use catalog::PackageCatalog;
pub use consistency::is_consistent;
pub use digest::content_hash;
pub use once_map::OnceMap;
