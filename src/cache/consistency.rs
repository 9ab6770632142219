//! Bundle consistency checking
//!
//! A bundle is reusable only while every unit it summarizes still has the
//! source text it was built from.

use super::digest::content_hash;
use crate::bundle::PackageBundle;
use crate::resolver::UriResolver;
use crate::resource::ResourceProvider;
use tracing::debug;

/// Whether the current sources of every unit in `bundle` match the hashes
/// recorded in it.
///
/// Hashes are compared as sorted multisets, so unit order does not matter.
/// An unresolvable URI, an unreadable or non-UTF-8 source, or any mismatch
/// makes the bundle inconsistent.
pub fn is_consistent(
    bundle: &PackageBundle,
    resolver: &dyn UriResolver,
    resources: &dyn ResourceProvider,
) -> bool {
    let mut actual = Vec::with_capacity(bundle.unlinked_unit_uris.len());

    for uri in &bundle.unlinked_unit_uris {
        let Some(path) = resolver.source_path(uri) else {
            debug!("No source for {}", uri);
            return false;
        };

        let bytes = match resources.read_bytes(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Cannot read source of {}: {}", uri, e);
                return false;
            }
        };

        let Ok(text) = String::from_utf8(bytes) else {
            debug!("Source of {} is not UTF-8", uri);
            return false;
        };

        actual.push(content_hash(&text));
    }

    let mut expected = bundle.unlinked_unit_hashes.clone();
    actual.sort();
    expected.sort();

    if actual != expected {
        debug!("Stale bundle: source hashes differ");
        return false;
    }
    true
}
