//! Mapping library URIs to source files and bundle output folders

use crate::config::Config;
use crate::uri::{classify, UriKind};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Locates sources and bundle folders for library URIs
pub trait UriResolver {
    /// Source file a unit URI was summarized from
    fn source_path(&self, uri: &str) -> Option<PathBuf>;

    /// Folder expected to hold the bundle that contains `uri`
    fn output_folder(&self, uri: &str) -> Option<PathBuf>;
}

/// Where a package's sources and bundles live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Resolver for `package:<name>/<path>` URIs backed by a name -> location table
#[derive(Debug, Clone, Default)]
pub struct PackageMap {
    packages: BTreeMap<String, PackageLocation>,
}

impl PackageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from the `[packages]` section of the configuration
    pub fn from_config(config: &Config) -> Self {
        let mut map = Self::new();
        for (name, package) in &config.packages {
            map.insert(name, package.source.clone(), package.output.clone());
        }
        map
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> &mut Self {
        self.packages.insert(
            name.into(),
            PackageLocation {
                source: source.into(),
                output: output.into(),
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&PackageLocation> {
        self.packages.get(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn lookup<'a>(&self, uri: &'a str) -> Option<(&PackageLocation, &'a str)> {
        match classify(uri) {
            UriKind::Package { name, path } => self.packages.get(name).map(|loc| (loc, path)),
            _ => None,
        }
    }
}

/// Reject paths that would escape the package source root
fn is_contained(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl UriResolver for PackageMap {
    fn source_path(&self, uri: &str) -> Option<PathBuf> {
        let (location, path) = self.lookup(uri)?;
        if !is_contained(path) {
            return None;
        }
        Some(location.source.join(path))
    }

    fn output_folder(&self, uri: &str) -> Option<PathBuf> {
        self.lookup(uri).map(|(location, _)| location.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PackageMap {
        let mut map = PackageMap::new();
        map.insert("http", "/src/http/lib", "/out/http");
        map
    }

    #[test]
    fn source_path_joins_package_root() {
        assert_eq!(
            sample().source_path("package:http/src/client.src"),
            Some(PathBuf::from("/src/http/lib/src/client.src"))
        );
    }

    #[test]
    fn output_folder_for_package() {
        assert_eq!(
            sample().output_folder("package:http/http.src"),
            Some(PathBuf::from("/out/http"))
        );
    }

    #[test]
    fn unknown_package_or_scheme() {
        let map = sample();
        assert!(map.output_folder("package:json/json.src").is_none());
        assert!(map.output_folder("sdk:core").is_none());
        assert!(map.output_folder("file:///tmp/a.src").is_none());
        assert!(map.source_path("relative.src").is_none());
    }

    #[test]
    fn source_path_rejects_traversal() {
        let map = sample();
        assert!(map.source_path("package:http/../secret.src").is_none());
        assert!(map.source_path("package:http//etc/passwd").is_none());
    }
}
