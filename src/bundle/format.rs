//! Package bundle wire format
//!
//! A bundle carries two independent sections:
//! - the unlinked section: per-unit declaration summaries plus the content
//!   hash of the source text each summary was produced from
//! - the linked section: resolved per-library records produced by a linker
//!
//! Bundles found on disk are read for their unlinked section; linked bundles
//! assembled by the provider only fill the linked section.

use crate::error::{LinkError, LinkResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Major format version; bundles with a different major are rejected
pub const MAJOR_VERSION: u32 = 1;

/// Minor format version; differences are tolerated
pub const MINOR_VERSION: u32 = 0;

/// Serialized package bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageBundle {
    pub major_version: u32,
    pub minor_version: u32,

    /// URIs of the units in the unlinked section
    #[serde(default)]
    pub unlinked_unit_uris: Vec<String>,

    /// Content hashes, parallel to `unlinked_unit_uris`
    #[serde(default)]
    pub unlinked_unit_hashes: Vec<String>,

    /// Unit summaries, parallel to `unlinked_unit_uris`
    #[serde(default)]
    pub unlinked_units: Vec<UnlinkedUnit>,

    /// Linked library records keyed by library URI
    #[serde(default)]
    pub linked_libraries: BTreeMap<String, LinkedLibrary>,
}

impl Default for PackageBundle {
    fn default() -> Self {
        Self {
            major_version: MAJOR_VERSION,
            minor_version: MINOR_VERSION,
            unlinked_unit_uris: Vec::new(),
            unlinked_unit_hashes: Vec::new(),
            unlinked_units: Vec::new(),
            linked_libraries: BTreeMap::new(),
        }
    }
}

impl PackageBundle {
    /// Decode a bundle read from `path`
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> LinkResult<Self> {
        let bundle: Self =
            serde_json::from_slice(bytes).map_err(|e| LinkError::BundleDecode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if bundle.major_version != MAJOR_VERSION {
            return Err(LinkError::BundleVersion {
                path: path.to_path_buf(),
                major: bundle.major_version,
                minor: bundle.minor_version,
                expected: MAJOR_VERSION,
            });
        }

        let units = bundle.unlinked_unit_uris.len();
        if bundle.unlinked_units.len() != units || bundle.unlinked_unit_hashes.len() != units {
            return Err(LinkError::BundleDecode {
                path: path.to_path_buf(),
                reason: format!(
                    "unlinked section is inconsistent: {} uris, {} hashes, {} units",
                    units,
                    bundle.unlinked_unit_hashes.len(),
                    bundle.unlinked_units.len()
                ),
            });
        }

        Ok(bundle)
    }

    /// Encode the bundle
    pub fn to_bytes(&self) -> LinkResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Iterate `(uri, unit)` pairs of the unlinked section
    pub fn unlinked_pairs(&self) -> impl Iterator<Item = (&str, &UnlinkedUnit)> {
        self.unlinked_unit_uris
            .iter()
            .map(String::as_str)
            .zip(self.unlinked_units.iter())
    }

    /// Unit summary for `uri`, if this bundle contains it
    pub fn unlinked_unit(&self, uri: &str) -> Option<&UnlinkedUnit> {
        self.unlinked_pairs()
            .find_map(|(unit_uri, unit)| (unit_uri == uri).then_some(unit))
    }

    /// Linked record for `uri`, if this bundle contains it
    pub fn linked_library(&self, uri: &str) -> Option<&LinkedLibrary> {
        self.linked_libraries.get(uri)
    }
}

/// Declaration summary of one compilation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlinkedUnit {
    #[serde(default)]
    pub imports: Vec<UnlinkedImport>,

    #[serde(default)]
    pub exports: Vec<UnlinkedExport>,

    #[serde(default)]
    pub declarations: Vec<UnlinkedDeclaration>,
}

impl UnlinkedUnit {
    /// Every URI this unit may reference across packages: explicit imports,
    /// their conditional alternatives, and exports.
    pub fn referenced_uris(&self) -> impl Iterator<Item = &str> {
        let imports = self
            .imports
            .iter()
            .filter(|import| !import.is_implicit)
            .flat_map(|import| {
                std::iter::once(import.uri.as_str())
                    .chain(import.configurations.iter().map(|c| c.uri.as_str()))
            });
        let exports = self.exports.iter().flat_map(|export| {
            std::iter::once(export.uri.as_str())
                .chain(export.configurations.iter().map(|c| c.uri.as_str()))
        });
        imports.chain(exports)
    }
}

/// `import` directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlinkedImport {
    pub uri: String,

    /// Added by the language rather than written in source (e.g. `sdk:core`)
    #[serde(default)]
    pub is_implicit: bool,

    /// Names are visible as `prefix.Name` when set
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub configurations: Vec<UriConfiguration>,
}

impl UnlinkedImport {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            is_implicit: false,
            prefix: None,
            configurations: Vec::new(),
        }
    }

    pub fn implicit(uri: impl Into<String>) -> Self {
        Self {
            is_implicit: true,
            ..Self::new(uri)
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_configuration(mut self, configuration: UriConfiguration) -> Self {
        self.configurations.push(configuration);
        self
    }
}

/// `export` directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlinkedExport {
    pub uri: String,

    #[serde(default)]
    pub configurations: Vec<UriConfiguration>,
}

impl UnlinkedExport {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            configurations: Vec::new(),
        }
    }
}

/// Conditional URI: used instead of the directive's URI when the declared
/// variable `name` equals `value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriConfiguration {
    pub name: String,

    #[serde(default = "default_configuration_value")]
    pub value: String,

    pub uri: String,
}

fn default_configuration_value() -> String {
    "true".to_string()
}

/// Top-level declaration of a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlinkedDeclaration {
    pub name: String,
    pub kind: DeclarationKind,

    /// Names of the types this declaration mentions, as written in source
    #[serde(default)]
    pub type_refs: Vec<String>,
}

impl UnlinkedDeclaration {
    pub fn new(name: impl Into<String>, kind: DeclarationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_refs: Vec::new(),
        }
    }

    pub fn referencing<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_refs.extend(refs.into_iter().map(Into::into));
        self
    }

    /// Private names start with `_` and are never exported
    pub fn is_public(&self) -> bool {
        !self.name.starts_with('_')
    }
}

/// Kind of a top-level declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Function,
    Variable,
    Typedef,
}

/// Linked record of one library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedLibrary {
    /// Absolute URIs of imported and exported libraries, in directive order
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Export namespace: visible name -> URI of the defining library
    #[serde(default)]
    pub exported_names: BTreeMap<String, String>,

    /// Resolution of every type reference made by the library's declarations
    #[serde(default)]
    pub references: Vec<LinkedReference>,

    /// Whether the record was produced in strong mode
    #[serde(default)]
    pub strong_mode: bool,
}

/// A resolved (or unresolvable) type reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedReference {
    /// Declaration making the reference
    pub declaration: String,
    /// Name as written
    pub name: String,
    /// Defining library, `None` when the name is not in scope
    pub target: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PackageBundle {
        PackageBundle {
            unlinked_unit_uris: vec!["package:a/a.src".to_string()],
            unlinked_unit_hashes: vec!["abc".to_string()],
            unlinked_units: vec![UnlinkedUnit {
                imports: vec![
                    UnlinkedImport::implicit("sdk:core"),
                    UnlinkedImport::new("package:b/b.src").with_configuration(UriConfiguration {
                        name: "platform.web".to_string(),
                        value: "true".to_string(),
                        uri: "package:c/c.src".to_string(),
                    }),
                ],
                exports: vec![UnlinkedExport::new("src/impl.src")],
                declarations: vec![UnlinkedDeclaration::new("A", DeclarationKind::Class)],
            }],
            ..PackageBundle::default()
        }
    }

    #[test]
    fn decode_encoded_bundle() {
        let bundle = sample();
        let bytes = bundle.to_bytes().unwrap();
        let decoded = PackageBundle::from_bytes(Path::new("a.full.ds"), &bytes).unwrap();
        assert_eq!(decoded, bundle);
    }

    #[test]
    fn rejects_garbage() {
        let err = PackageBundle::from_bytes(Path::new("x.full.ds"), b"not json").unwrap_err();
        assert!(matches!(err, LinkError::BundleDecode { .. }));
    }

    #[test]
    fn rejects_other_major_version() {
        let mut bundle = sample();
        bundle.major_version = MAJOR_VERSION + 1;
        let bytes = bundle.to_bytes().unwrap();
        let err = PackageBundle::from_bytes(Path::new("x.full.ds"), &bytes).unwrap_err();
        assert!(matches!(err, LinkError::BundleVersion { .. }));
    }

    #[test]
    fn tolerates_other_minor_version() {
        let mut bundle = sample();
        bundle.minor_version = MINOR_VERSION + 3;
        let bytes = bundle.to_bytes().unwrap();
        assert!(PackageBundle::from_bytes(Path::new("x.full.ds"), &bytes).is_ok());
    }

    #[test]
    fn rejects_mismatched_sections() {
        let mut bundle = sample();
        bundle.unlinked_unit_hashes.clear();
        let bytes = bundle.to_bytes().unwrap();
        let err = PackageBundle::from_bytes(Path::new("x.full.ds"), &bytes).unwrap_err();
        assert!(err.to_string().contains("inconsistent"));
    }

    #[test]
    fn referenced_uris_skip_implicit_imports() {
        let bundle = sample();
        let unit = bundle.unlinked_unit("package:a/a.src").unwrap();
        let uris: Vec<&str> = unit.referenced_uris().collect();
        assert_eq!(uris, vec!["package:b/b.src", "package:c/c.src", "src/impl.src"]);
    }

    #[test]
    fn configuration_value_defaults_to_true() {
        let json = r#"{"name": "platform.web", "uri": "web.src"}"#;
        let config: UriConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(config.value, "true");
    }
}
