//! Packages: the unit of linking granularity

use crate::bundle::PackageBundle;
use crate::error::{LinkError, LinkResult};
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One unlinked bundle plus, once computed, its linked result.
///
/// The linked slot is write-once: after a package is linked its bundle is
/// never replaced for the lifetime of the provider.
#[derive(Debug)]
pub struct Package {
    location: PathBuf,
    unlinked: PackageBundle,
    unit_uris: BTreeSet<String>,
    linked: OnceCell<PackageBundle>,
}

impl Package {
    pub fn new(location: impl Into<PathBuf>, unlinked: PackageBundle) -> Self {
        let unit_uris = unlinked.unlinked_unit_uris.iter().cloned().collect();
        Self {
            location: location.into(),
            unlinked,
            unit_uris,
            linked: OnceCell::new(),
        }
    }

    /// Path of the bundle file this package was read from
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn unlinked(&self) -> &PackageBundle {
        &self.unlinked
    }

    pub fn unit_uris(&self) -> &BTreeSet<String> {
        &self.unit_uris
    }

    pub fn contains_uri(&self, uri: &str) -> bool {
        self.unit_uris.contains(uri)
    }

    pub fn linked(&self) -> Option<&PackageBundle> {
        self.linked.get()
    }

    pub fn is_linked(&self) -> bool {
        self.linked.get().is_some()
    }

    /// Store the linked bundle. Fails if the package is already linked.
    pub(crate) fn set_linked(&self, bundle: PackageBundle) -> LinkResult<()> {
        self.linked
            .set(bundle)
            .map_err(|_| LinkError::AlreadyLinked(self.location.clone()))
    }
}
