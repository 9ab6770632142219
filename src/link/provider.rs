//! Linked package provider
//!
//! Entry point of the crate: given a unit URI, find its package, extend the
//! dependency graph over everything that package needs, and return the whole
//! closure linked, or nothing at all.
//!
//! # Request Flow
//!
//! 1. Resolve the URI to a graph node through the catalog
//! 2. Compute the node's transitive dependencies, then force the closure of
//!    every member so failure flags are final
//! 3. Refuse the request if the root is failed
//! 4. Link all pending members in one linker call
//!
//! A provider is scoped to one analysis session. It caches everything it
//! learns and never looks at the disk again for a folder it already scanned.

use super::batch::link_closure;
use super::linker::Linker;
use super::LinkOptions;
use crate::bundle::PackageBundle;
use crate::cache::{OnceMap, PackageCatalog};
use crate::error::LinkResult;
use crate::graph::{DependencyGraph, NodeId, NodeResolver};
use crate::package::Package;
use crate::resolver::UriResolver;
use crate::resource::ResourceProvider;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

/// URI -> node index over the package catalog
struct NodeIndex {
    catalog: PackageCatalog,
    uri_nodes: OnceMap<String, Option<NodeId>>,
}

impl NodeResolver for NodeIndex {
    fn node_for_uri(&mut self, graph: &mut DependencyGraph, uri: &str) -> Option<NodeId> {
        if let Some(&known) = self.uri_nodes.get(uri) {
            return known;
        }

        let node = self
            .catalog
            .package_for_uri(uri)
            .map(|package| graph.node_for_package(package));
        *self.uri_nodes.get_or_insert_with(uri.to_string(), || node)
    }
}

/// Session-scoped provider of linked packages
pub struct LinkedPackageProvider {
    index: NodeIndex,
    graph: DependencyGraph,
    linker: Box<dyn Linker>,
    sdk_bundle: PackageBundle,
    options: LinkOptions,
}

impl LinkedPackageProvider {
    pub fn new(
        resources: Box<dyn ResourceProvider>,
        resolver: Box<dyn UriResolver>,
        linker: Box<dyn Linker>,
        sdk_bundle: PackageBundle,
        options: LinkOptions,
    ) -> Self {
        Self {
            index: NodeIndex {
                catalog: PackageCatalog::new(resources, resolver),
                uri_nodes: OnceMap::new(),
            },
            graph: DependencyGraph::new(),
            linker,
            sdk_bundle,
            options,
        }
    }

    /// Every package needed to resolve `uri`, all linked.
    ///
    /// Returns `Ok(None)` when no package contains `uri` or when any package
    /// in its closure cannot be resolved. Linker faults are returned as errors
    /// and leave every package in the closure unlinked.
    pub fn linked_packages(&mut self, uri: &str) -> LinkResult<Option<Vec<Rc<Package>>>> {
        let Some(root) = self.node_for_uri(uri) else {
            debug!("No node for {}", uri);
            return Ok(None);
        };

        self.graph
            .compute_transitive_dependencies(root, &mut self.index);
        let closure = self.graph.closure(root);
        for &member in &closure {
            self.graph
                .compute_transitive_dependencies(member, &mut self.index);
        }

        if self.graph.node(root).is_failed() {
            let failed: Vec<String> = closure
                .iter()
                .map(|&id| self.graph.node(id))
                .filter(|node| node.is_failed())
                .map(|node| node.package().location().display().to_string())
                .collect();
            debug!("Closure of {} is failed: {}", uri, failed.join(", "));
            return Ok(None);
        }

        let linked = link_closure(
            &self.graph,
            &closure,
            &self.sdk_bundle,
            self.linker.as_ref(),
            &self.options,
        )?;
        if linked > 0 {
            info!("Linked {} package(s) for {}", linked, uri);
        }

        let packages = closure
            .iter()
            .map(|&id| self.graph.node(id).package())
            .filter(|package| package.is_linked())
            .cloned()
            .collect();
        Ok(Some(packages))
    }

    /// The package whose unlinked bundle contains `uri`
    pub fn unlinked_for_uri(&mut self, uri: &str) -> Option<Rc<Package>> {
        self.index.catalog.package_for_uri(uri)
    }

    /// Consistent packages in `folder`
    pub fn packages_in_folder(&mut self, folder: &Path) -> Vec<Rc<Package>> {
        self.index.catalog.packages_in_folder(folder).to_vec()
    }

    /// Graph node of the package containing `uri`, created on first request
    pub fn node_for_uri(&mut self, uri: &str) -> Option<NodeId> {
        self.index.node_for_uri(&mut self.graph, uri)
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }
}
