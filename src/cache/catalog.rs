//! Package catalog
//!
//! Enumerates the bundles in an output folder, keeps those that decode and are
//! consistent with current sources, and answers "which package contains this
//! URI". Each folder is scanned once per catalog; later changes on disk are not
//! observed.

use super::consistency::is_consistent;
use super::once_map::OnceMap;
use crate::bundle::{is_bundle_file_name, PackageBundle};
use crate::package::Package;
use crate::resolver::UriResolver;
use crate::resource::ResourceProvider;
use crate::uri::normalize;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

/// Per-folder cache of validated packages
pub struct PackageCatalog {
    resources: Box<dyn ResourceProvider>,
    resolver: Box<dyn UriResolver>,
    folders: OnceMap<PathBuf, Vec<Rc<Package>>>,
}

impl PackageCatalog {
    pub fn new(resources: Box<dyn ResourceProvider>, resolver: Box<dyn UriResolver>) -> Self {
        Self {
            resources,
            resolver,
            folders: OnceMap::new(),
        }
    }

    /// Consistent packages found in `folder`. Scanned on first request only.
    pub fn packages_in_folder(&mut self, folder: &Path) -> &[Rc<Package>] {
        let resources = &*self.resources;
        let resolver = &*self.resolver;
        self.folders
            .get_or_insert_with(folder.to_path_buf(), || {
                scan_folder(folder, resolver, resources)
            })
            .as_slice()
    }

    /// First package in the URI's output folder that contains `uri`
    pub fn package_for_uri(&mut self, uri: &str) -> Option<Rc<Package>> {
        let uri = normalize(uri);
        let uri = uri.as_ref();
        let Some(folder) = self.resolver.output_folder(uri) else {
            debug!("No output folder for {}", uri);
            return None;
        };

        let found = self
            .packages_in_folder(&folder)
            .iter()
            .find(|package| package.contains_uri(uri))
            .cloned();

        if found.is_none() {
            debug!("No bundle in {} contains {}", folder.display(), uri);
        }
        found
    }
}

fn scan_folder(
    folder: &Path,
    resolver: &dyn UriResolver,
    resources: &dyn ResourceProvider,
) -> Vec<Rc<Package>> {
    let children = match resources.list_children(folder) {
        Ok(children) => children,
        Err(e) => {
            warn!("Cannot scan {}: {}", folder.display(), e);
            return Vec::new();
        }
    };

    let mut packages = Vec::new();
    for path in children {
        let is_candidate = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_bundle_file_name);
        if !is_candidate {
            continue;
        }

        let bytes = match resources.read_bytes(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let bundle = match PackageBundle::from_bytes(&path, &bytes) {
            Ok(bundle) => bundle,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if !is_consistent(&bundle, resolver, resources) {
            debug!("Skipping stale bundle {}", path.display());
            continue;
        }

        packages.push(Rc::new(Package::new(path, bundle)));
    }

    debug!(
        "Found {} consistent bundle(s) in {}",
        packages.len(),
        folder.display()
    );
    packages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{PackageBundleAssembler, UnlinkedUnit, MAJOR_VERSION};
    use crate::resolver::PackageMap;
    use crate::resource::MemoryResourceProvider;

    fn bundle_bytes(units: &[(&str, &str)]) -> Vec<u8> {
        let mut assembler = PackageBundleAssembler::new();
        for (uri, text) in units {
            assembler.add_unlinked_unit(*uri, text, UnlinkedUnit::default());
        }
        assembler.assemble().to_bytes().unwrap()
    }

    fn catalog(resources: MemoryResourceProvider) -> PackageCatalog {
        let mut map = PackageMap::new();
        map.insert("a", "/src/a", "/out/a");
        map.insert("ghost", "/src/ghost", "/out/ghost");
        PackageCatalog::new(Box::new(resources), Box::new(map))
    }

    fn base_resources() -> MemoryResourceProvider {
        let mut resources = MemoryResourceProvider::new();
        resources.write_file("/src/a/a.src", "class A {}");
        resources.write_file("/src/a/b.src", "class B {}");
        resources
    }

    #[test]
    fn keeps_consistent_bundles() {
        let mut resources = base_resources();
        resources.write_file("/out/a/a.full.ds", bundle_bytes(&[("package:a/a.src", "class A {}")]));
        resources.write_file("/out/a/B.FULL.DS", bundle_bytes(&[("package:a/b.src", "class B {}")]));

        let mut catalog = catalog(resources);
        let packages = catalog.packages_in_folder(Path::new("/out/a"));
        assert_eq!(packages.len(), 2);
    }

    #[test]
    fn drops_stale_corrupt_and_foreign_files() {
        let mut resources = base_resources();
        resources.write_file("/out/a/stale.full.ds", bundle_bytes(&[("package:a/a.src", "class A { old }")]));
        resources.write_file("/out/a/corrupt.full.ds", "{ nope");
        resources.write_file("/out/a/notes.txt", bundle_bytes(&[("package:a/a.src", "class A {}")]));

        let mut future = PackageBundleAssembler::new().assemble();
        future.major_version = MAJOR_VERSION + 1;
        resources.write_file("/out/a/future.full.ds", future.to_bytes().unwrap());

        let mut catalog = catalog(resources);
        assert!(catalog.packages_in_folder(Path::new("/out/a")).is_empty());
    }

    #[test]
    fn missing_folder_yields_empty() {
        let mut catalog = catalog(base_resources());
        assert!(catalog.packages_in_folder(Path::new("/out/ghost")).is_empty());
        assert!(catalog.package_for_uri("package:ghost/g.src").is_none());
    }

    #[test]
    fn package_for_uri_finds_owner() {
        let mut resources = base_resources();
        resources.write_file(
            "/out/a/a.full.ds",
            bundle_bytes(&[("package:a/a.src", "class A {}"), ("package:a/b.src", "class B {}")]),
        );

        let mut catalog = catalog(resources);
        let package = catalog.package_for_uri("package:a/b.src").unwrap();
        assert_eq!(package.location(), Path::new("/out/a/a.full.ds"));
        let upper = catalog.package_for_uri("PACKAGE:a/b.src").unwrap();
        assert!(Rc::ptr_eq(&package, &upper));
        assert!(catalog.package_for_uri("package:a/c.src").is_none());
        assert!(catalog.package_for_uri("package:unknown/x.src").is_none());
        assert!(catalog.package_for_uri("sdk:core").is_none());
    }

    #[test]
    fn folder_scanned_once() {
        let mut resources = base_resources();
        resources.write_file("/out/a/a.full.ds", bundle_bytes(&[("package:a/a.src", "class A {}")]));

        let mut catalog = catalog(resources);
        let first = catalog.package_for_uri("package:a/a.src").unwrap();
        let second = catalog.package_for_uri("package:a/a.src").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        let listed = catalog.packages_in_folder(Path::new("/out/a"));
        assert!(Rc::ptr_eq(&first, &listed[0]));
    }
}
