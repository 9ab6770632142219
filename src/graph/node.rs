//! Dependency graph nodes

use crate::package::Package;
use crate::uri::{classify, UriKind};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Index of a node in its `DependencyGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Linking state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Not linked yet, and nothing known to prevent it
    Pending,
    /// Holds a linked bundle
    Linked,
    /// Can never be linked in this session
    Failed,
}

impl LinkState {
    pub fn is_ready(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Linked => write!(f, "linked"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Graph node owning exactly one package
///
/// `dependencies` and `transitive` are `None` until computed and memoized
/// forever after. `failed` only ever goes from false to true.
#[derive(Debug)]
pub struct DependencyNode {
    pub(crate) package: Rc<Package>,
    pub(crate) dependencies: Option<Vec<NodeId>>,
    pub(crate) transitive: Option<BTreeSet<NodeId>>,
    pub(crate) failed: bool,
}

impl DependencyNode {
    pub(crate) fn new(package: Rc<Package>) -> Self {
        Self {
            package,
            dependencies: None,
            transitive: None,
            failed: false,
        }
    }

    pub fn package(&self) -> &Rc<Package> {
        &self.package
    }

    /// Direct dependencies, if computed
    pub fn dependencies(&self) -> Option<&[NodeId]> {
        self.dependencies.as_deref()
    }

    /// Transitive dependencies, if computed
    pub fn transitive_dependencies(&self) -> Option<&BTreeSet<NodeId>> {
        self.transitive.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    pub fn state(&self) -> LinkState {
        if self.package.is_linked() {
            LinkState::Linked
        } else if self.failed {
            LinkState::Failed
        } else {
            LinkState::Pending
        }
    }

    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
    }
}

/// What a referenced URI means for the referencing package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reference<'a> {
    /// Same package or SDK; no edge
    Ignored,
    /// Edge to the package containing this URI
    Package(&'a str),
    /// Reference this crate cannot link against
    Unsupported,
}

pub(crate) fn classify_reference(uri: &str) -> Reference<'_> {
    match classify(uri) {
        UriKind::Relative | UriKind::Platform => Reference::Ignored,
        UriKind::Package { .. } => Reference::Package(uri),
        UriKind::Other(_) => Reference::Unsupported,
    }
}

/// Every cross-unit reference made by the package's units, in unit order
pub(crate) fn referenced_uris(package: &Package) -> Vec<String> {
    package
        .unlinked()
        .unlinked_units
        .iter()
        .flat_map(|unit| unit.referenced_uris())
        .map(str::to_string)
        .collect()
}
