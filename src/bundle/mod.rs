//! Package bundle format
//!
//! Bundles are JSON documents named `*.full.ds`. The catalog treats them as
//! opaque except for the accessors defined here.

pub mod assembler;
pub mod format;

pub use assembler::PackageBundleAssembler;
pub use format::{
    DeclarationKind, LinkedLibrary, LinkedReference, PackageBundle, UnlinkedDeclaration,
    UnlinkedExport, UnlinkedImport, UnlinkedUnit, UriConfiguration, MAJOR_VERSION, MINOR_VERSION,
};

/// Filename suffix of bundle files, matched case-insensitively
pub const BUNDLE_SUFFIX: &str = ".full.ds";

/// Whether `file_name` names a bundle candidate
pub fn is_bundle_file_name(file_name: &str) -> bool {
    file_name.len() > BUNDLE_SUFFIX.len()
        && file_name.to_ascii_lowercase().ends_with(BUNDLE_SUFFIX)
}
