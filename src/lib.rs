//! pkglink - Incremental, cache-aware package linking
//!
//! Serves fully linked package summaries on demand. Precomputed bundles are
//! reused when their sources are unchanged, dependency closures are tracked
//! in an arena graph, and every package needed by a request is linked in a
//! single batch.
//!
//! ```rust,ignore
//! use pkglink::link::{LinkOptions, LinkedPackageProvider, SummaryLinker};
//! use pkglink::resolver::PackageMap;
//! use pkglink::resource::PhysicalResourceProvider;
//!
//! let mut packages = PackageMap::new();
//! packages.insert("http", "/work/http/lib", "/work/http/out");
//!
//! let mut provider = LinkedPackageProvider::new(
//!     Box::new(PhysicalResourceProvider),
//!     Box::new(packages),
//!     Box::new(SummaryLinker),
//!     sdk_bundle,
//!     LinkOptions::default(),
//! );
//! let closure = provider.linked_packages("package:http/http.src")?;
//! ```

pub mod bundle;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod link;
pub mod package;
pub mod resolver;
pub mod resource;
pub mod ui;
pub mod uri;

pub use error::{LinkError, LinkResult};
pub use link::{LinkOptions, LinkedPackageProvider};
pub use package::Package;
