//! Package dependency graph
//!
//! Nodes live in an arena and refer to each other by `NodeId`, so import
//! cycles are plain data. Edges are discovered lazily from the unlinked
//! imports and exports of each package, and closures are computed with an
//! explicit stack rather than recursion.
//!
//! A node fails when one of its own references cannot be resolved, and
//! failure propagates to every node whose closure contains a failed node.

pub mod node;

pub use node::{DependencyNode, LinkState, NodeId};

use crate::package::Package;
use node::{classify_reference, referenced_uris, Reference};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, trace};

/// Maps a package-scheme URI to the node of the package containing it
pub trait NodeResolver {
    fn node_for_uri(&mut self, graph: &mut DependencyGraph, uri: &str) -> Option<NodeId>;
}

/// Arena of dependency nodes, one per package
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
    by_location: HashMap<PathBuf, NodeId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &DependencyNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &DependencyNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Node for `package`, created on first reference
    pub fn node_for_package(&mut self, package: Rc<Package>) -> NodeId {
        if let Some(&id) = self.by_location.get(package.location()) {
            return id;
        }

        let id = NodeId(self.nodes.len());
        trace!("New node {} for {}", id, package.location().display());
        self.by_location.insert(package.location().to_path_buf(), id);
        self.nodes.push(DependencyNode::new(package));
        id
    }

    /// Direct dependencies of `id`, discovered on first call.
    ///
    /// Relative and platform references add no edge. A package reference that
    /// cannot be resolved, or a reference with any other scheme, marks the node
    /// failed; scanning continues so every resolvable edge is still recorded.
    pub fn dependencies(&mut self, id: NodeId, resolver: &mut dyn NodeResolver) -> Vec<NodeId> {
        if let Some(dependencies) = &self.nodes[id.0].dependencies {
            return dependencies.clone();
        }

        let package = Rc::clone(&self.nodes[id.0].package);
        let mut dependencies = Vec::new();
        let mut failed = false;

        for uri in referenced_uris(&package) {
            match classify_reference(&uri) {
                Reference::Ignored => {}
                Reference::Package(uri) => match resolver.node_for_uri(self, uri) {
                    Some(dependency) => {
                        if !dependencies.contains(&dependency) {
                            dependencies.push(dependency);
                        }
                    }
                    None => {
                        debug!(
                            "{} references unresolvable {}",
                            package.location().display(),
                            uri
                        );
                        failed = true;
                    }
                },
                Reference::Unsupported => {
                    debug!(
                        "{} references unsupported {}",
                        package.location().display(),
                        uri
                    );
                    failed = true;
                }
            }
        }

        let node = &mut self.nodes[id.0];
        node.dependencies = Some(dependencies.clone());
        if failed {
            node.mark_failed();
        }
        dependencies
    }

    /// Compute and memoize the set of nodes reachable from `id`.
    ///
    /// `id` itself is a member only if it sits on a cycle. If any member is
    /// failed once the closure is known, `id` becomes failed too.
    pub fn compute_transitive_dependencies(
        &mut self,
        id: NodeId,
        resolver: &mut dyn NodeResolver,
    ) {
        if self.nodes[id.0].transitive.is_some() {
            return;
        }

        let mut visited = BTreeSet::new();
        let mut stack = self.dependencies(id, resolver);
        while let Some(next) = stack.pop() {
            if visited.insert(next) {
                stack.extend(self.dependencies(next, resolver));
            }
        }

        let failed = visited.iter().any(|member| self.nodes[member.0].failed);
        trace!(
            "Closure of {} has {} member(s), failed: {}",
            id,
            visited.len(),
            failed
        );

        let node = &mut self.nodes[id.0];
        node.transitive = Some(visited);
        if failed {
            node.mark_failed();
        }
    }

    /// `id` plus its transitive dependencies, in id order
    pub fn closure(&self, id: NodeId) -> Vec<NodeId> {
        let mut members: BTreeSet<NodeId> = self.nodes[id.0]
            .transitive
            .as_ref()
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        members.insert(id);
        members.into_iter().collect()
    }
}
