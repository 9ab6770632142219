//! Incremental construction of package bundles

use super::format::{LinkedLibrary, PackageBundle, UnlinkedUnit};
use crate::cache::digest::content_hash;
use std::collections::BTreeMap;

/// Collects unit summaries and linked records, then produces a bundle.
///
/// Unlinked units keep insertion order; linked records are keyed by URI so
/// assembling the same records always yields identical bytes.
#[derive(Debug, Default)]
pub struct PackageBundleAssembler {
    unlinked: Vec<(String, String, UnlinkedUnit)>,
    linked: BTreeMap<String, LinkedLibrary>,
}

impl PackageBundleAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit summary, hashing the source text it was produced from
    pub fn add_unlinked_unit(
        &mut self,
        uri: impl Into<String>,
        source_text: &str,
        unit: UnlinkedUnit,
    ) -> &mut Self {
        self.add_unlinked_unit_with_hash(uri, content_hash(source_text), unit)
    }

    /// Add a unit summary with a precomputed content hash
    pub fn add_unlinked_unit_with_hash(
        &mut self,
        uri: impl Into<String>,
        hash: impl Into<String>,
        unit: UnlinkedUnit,
    ) -> &mut Self {
        self.unlinked.push((uri.into(), hash.into(), unit));
        self
    }

    pub fn add_linked_library(
        &mut self,
        uri: impl Into<String>,
        library: LinkedLibrary,
    ) -> &mut Self {
        self.linked.insert(uri.into(), library);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.unlinked.is_empty() && self.linked.is_empty()
    }

    pub fn assemble(self) -> PackageBundle {
        let mut bundle = PackageBundle::default();
        for (uri, hash, unit) in self.unlinked {
            bundle.unlinked_unit_uris.push(uri);
            bundle.unlinked_unit_hashes.push(hash);
            bundle.unlinked_units.push(unit);
        }
        bundle.linked_libraries = self.linked;
        bundle
    }
}
