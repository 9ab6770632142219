//! Batched linking of a dependency closure

use super::linker::Linker;
use super::LinkOptions;
use crate::bundle::{LinkedLibrary, PackageBundle, PackageBundleAssembler, UnlinkedUnit};
use crate::error::{LinkError, LinkResult};
use crate::graph::{DependencyGraph, NodeId};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Read-only union of every summary visible to one link call
#[derive(Debug, Default)]
pub struct LinkStore<'a> {
    unlinked: HashMap<&'a str, &'a UnlinkedUnit>,
    linked: HashMap<&'a str, &'a LinkedLibrary>,
}

impl<'a> LinkStore<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add both sections of `bundle`; earlier bundles win on duplicate URIs
    pub fn add_bundle(&mut self, bundle: &'a PackageBundle) {
        for (uri, unit) in bundle.unlinked_pairs() {
            self.unlinked.entry(uri).or_insert(unit);
        }
        for (uri, library) in &bundle.linked_libraries {
            self.linked.entry(uri.as_str()).or_insert(library);
        }
    }

    pub fn unlinked(&self, uri: &str) -> Option<&'a UnlinkedUnit> {
        self.unlinked.get(uri).copied()
    }

    pub fn linked(&self, uri: &str) -> Option<&'a LinkedLibrary> {
        self.linked.get(uri).copied()
    }
}

/// Link every not-yet-linked node of `closure` with a single linker call.
///
/// Failed nodes must already have been excluded by the caller. Either every
/// pending node receives its linked bundle or, on a linker fault, none does.
/// Returns the number of nodes linked.
pub(crate) fn link_closure(
    graph: &DependencyGraph,
    closure: &[NodeId],
    sdk: &PackageBundle,
    linker: &dyn Linker,
    options: &LinkOptions,
) -> LinkResult<usize> {
    let mut store = LinkStore::new();
    store.add_bundle(sdk);
    for &id in closure {
        let package = graph.node(id).package();
        store.add_bundle(package.unlinked());
        if let Some(linked) = package.linked() {
            store.add_bundle(linked);
        }
    }

    let not_ready: Vec<NodeId> = closure
        .iter()
        .copied()
        .filter(|&id| !graph.node(id).is_ready())
        .collect();
    if not_ready.is_empty() {
        debug!("Closure of {} node(s) already linked", closure.len());
        return Ok(0);
    }

    let uris: BTreeSet<String> = not_ready
        .iter()
        .flat_map(|&id| graph.node(id).package().unit_uris().iter().cloned())
        .collect();

    debug!(
        "Linking {} library(ies) across {} package(s)",
        uris.len(),
        not_ready.len()
    );

    let linked_lookup = |uri: &str| store.linked(uri);
    let unlinked_lookup = |uri: &str| store.unlinked(uri);
    let records = linker.link(
        &uris,
        &linked_lookup,
        &unlinked_lookup,
        &options.declared_variables,
        options.strong_mode,
    )?;

    let missing: Vec<&str> = uris
        .iter()
        .filter(|uri| !records.contains_key(*uri))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(LinkError::LinkerIncomplete(missing.join(", ")));
    }
    if records.len() > uris.len() {
        warn!(
            "Linker returned {} unrequested record(s); ignoring them",
            records.len() - uris.len()
        );
    }

    let mut assembled = Vec::with_capacity(not_ready.len());
    for &id in &not_ready {
        let package = graph.node(id).package();
        let mut assembler = PackageBundleAssembler::new();
        for uri in package.unit_uris() {
            if let Some(record) = records.get(uri) {
                assembler.add_linked_library(uri.clone(), record.clone());
            }
        }
        assembled.push((id, assembler.assemble()));
    }

    for (id, bundle) in assembled {
        graph.node(id).package().set_linked(bundle)?;
    }
    Ok(not_ready.len())
}
