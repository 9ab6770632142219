//! URI classification and relative resolution
//!
//! Library references inside summaries take three shapes:
//!
//! | Shape | Example | Meaning |
//! |-------|---------|---------|
//! | Relative | `src/util.src` | Same package, resolved against the referencing unit |
//! | Platform | `sdk:core` | Provided by the SDK bundle, always available |
//! | Package | `package:http/http.src` | Lives in another package's bundle |
//!
//! Anything else carries a scheme this crate cannot link against.

use std::borrow::Cow;

/// Scheme of libraries provided by the SDK bundle
pub const PLATFORM_SCHEME: &str = "sdk";

/// Scheme of libraries provided by package bundles
pub const PACKAGE_SCHEME: &str = "package";

/// Classified library reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriKind<'a> {
    /// No scheme; resolved against the referencing unit
    Relative,
    /// `sdk:` library
    Platform,
    /// Well-formed `package:<name>/<path>` reference
    Package { name: &'a str, path: &'a str },
    /// Any other scheme, or a malformed `package:` reference
    Other(&'a str),
}

/// Split a URI into its scheme and the remainder, if it has a scheme.
fn split_scheme(uri: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some((scheme, rest))
}

/// Classify a library reference by its scheme. Schemes match
/// case-insensitively.
pub fn classify(uri: &str) -> UriKind<'_> {
    let Some((scheme, rest)) = split_scheme(uri) else {
        return UriKind::Relative;
    };

    if scheme.eq_ignore_ascii_case(PLATFORM_SCHEME) {
        return UriKind::Platform;
    }
    if !scheme.eq_ignore_ascii_case(PACKAGE_SCHEME) {
        return UriKind::Other(scheme);
    }
    match rest.split_once('/') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            UriKind::Package { name, path }
        }
        _ => UriKind::Other(scheme),
    }
}

/// `uri` with its scheme lowercased, borrowed when already canonical
pub fn normalize(uri: &str) -> Cow<'_, str> {
    match split_scheme(uri) {
        Some((scheme, rest)) if scheme.bytes().any(|b| b.is_ascii_uppercase()) => {
            Cow::Owned(format!("{}:{}", scheme.to_ascii_lowercase(), rest))
        }
        _ => Cow::Borrowed(uri),
    }
}

/// Resolve `reference` against `base`.
///
/// Absolute references are returned with a lowercased scheme. Relative
/// references replace the last path segment of `base` and have `.`/`..`
/// segments normalized; in a `package:` base the package name is a fixed
/// root, and a leading `/` is relative to it. Returns `None` when `base` has
/// no scheme or `..` climbs above its root.
pub fn resolve_relative(base: &str, reference: &str) -> Option<String> {
    if split_scheme(reference).is_some() {
        return Some(normalize(reference).into_owned());
    }

    let (scheme, base_path) = split_scheme(base)?;
    let scheme = scheme.to_ascii_lowercase();
    let base_parts: Vec<&str> = base_path.split('/').collect();
    let root = if scheme == PACKAGE_SCHEME { 1 } else { 0 };
    if base_parts.len() <= root {
        return None;
    }

    let mut segments: Vec<&str> = if reference.starts_with('/') {
        base_parts[..root].to_vec()
    } else {
        base_parts[..base_parts.len() - 1].to_vec()
    };

    for segment in reference.trim_start_matches('/').split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.len() <= root {
                    return None;
                }
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.len() <= root {
        return None;
    }

    Some(format!("{}:{}", scheme, segments.join("/")))
}
