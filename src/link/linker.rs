//! External linker boundary and the summary linker
//!
//! The provider hands a linker a batch of library URIs plus lookups over
//! every summary it knows about. The linker must return a record for each
//! requested URI or fail the whole call.

use super::DeclaredVariables;
use crate::bundle::{LinkedLibrary, LinkedReference, UnlinkedUnit, UriConfiguration};
use crate::error::{LinkError, LinkResult};
use crate::uri::resolve_relative;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::trace;

/// Lookup of an already-linked library record
pub type LinkedLookup<'a, 'b> = &'b dyn Fn(&str) -> Option<&'a LinkedLibrary>;

/// Lookup of an unlinked unit summary
pub type UnlinkedLookup<'a, 'b> = &'b dyn Fn(&str) -> Option<&'a UnlinkedUnit>;

/// Resolves cross-library references for a batch of libraries
pub trait Linker {
    fn link<'a>(
        &self,
        uris: &BTreeSet<String>,
        linked: LinkedLookup<'a, '_>,
        unlinked: UnlinkedLookup<'a, '_>,
        declared_variables: &DeclaredVariables,
        strong_mode: bool,
    ) -> LinkResult<BTreeMap<String, LinkedLibrary>>;
}

/// Linker resolving declaration type references through import and export
/// namespaces.
///
/// A library's export namespace is the union of the public declarations of
/// every library reachable through its export directives (itself first), or
/// the recorded namespace of an already-linked library. Names declared
/// earlier in that walk win.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryLinker;

impl Linker for SummaryLinker {
    fn link<'a>(
        &self,
        uris: &BTreeSet<String>,
        linked: LinkedLookup<'a, '_>,
        unlinked: UnlinkedLookup<'a, '_>,
        declared_variables: &DeclaredVariables,
        strong_mode: bool,
    ) -> LinkResult<BTreeMap<String, LinkedLibrary>> {
        let mut session = LinkSession {
            linked,
            unlinked,
            declared_variables,
            namespaces: HashMap::new(),
        };

        let mut records = BTreeMap::new();
        for uri in uris {
            let unit = (session.unlinked)(uri)
                .ok_or_else(|| LinkError::linker_fault(uri, "no unlinked summary available"))?;
            let record = session.link_library(uri, unit, strong_mode);
            trace!(
                "Linked {}: {} exported name(s), {} reference(s)",
                uri,
                record.exported_names.len(),
                record.references.len()
            );
            records.insert(uri.clone(), record);
        }
        Ok(records)
    }
}

type Namespace = BTreeMap<String, String>;

struct LinkSession<'a, 'b> {
    linked: LinkedLookup<'a, 'b>,
    unlinked: UnlinkedLookup<'a, 'b>,
    declared_variables: &'b DeclaredVariables,
    namespaces: HashMap<String, Namespace>,
}

impl<'a, 'b> LinkSession<'a, 'b> {
    /// Directive URI after applying conditional configurations
    fn select_uri<'u>(&self, uri: &'u str, configurations: &'u [UriConfiguration]) -> &'u str {
        configurations
            .iter()
            .find(|c| self.declared_variables.get(&c.name) == Some(&c.value))
            .map_or(uri, |c| c.uri.as_str())
    }

    fn export_targets(&self, library: &str, unit: &UnlinkedUnit) -> Vec<String> {
        unit.exports
            .iter()
            .filter_map(|export| {
                let selected = self.select_uri(&export.uri, &export.configurations);
                resolve_relative(library, selected)
            })
            .collect()
    }

    fn export_namespace(&mut self, uri: &str) -> Namespace {
        if let Some(namespace) = self.namespaces.get(uri) {
            return namespace.clone();
        }

        let mut namespace = Namespace::new();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([uri.to_string()]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }

            if let Some(record) = (self.linked)(&current) {
                for (name, origin) in &record.exported_names {
                    namespace.entry(name.clone()).or_insert_with(|| origin.clone());
                }
                continue;
            }

            let Some(unit) = (self.unlinked)(&current) else {
                continue;
            };
            for declaration in unit.declarations.iter().filter(|d| d.is_public()) {
                namespace
                    .entry(declaration.name.clone())
                    .or_insert_with(|| current.clone());
            }
            queue.extend(self.export_targets(&current, unit));
        }

        self.namespaces.insert(uri.to_string(), namespace.clone());
        namespace
    }

    fn link_library(&mut self, uri: &str, unit: &UnlinkedUnit, strong_mode: bool) -> LinkedLibrary {
        let mut dependencies: Vec<String> = Vec::new();
        let mut imported = Namespace::new();

        for import in &unit.imports {
            let selected = self.select_uri(&import.uri, &import.configurations);
            let Some(target) = resolve_relative(uri, selected) else {
                trace!("Import {} in {} resolves outside its package", selected, uri);
                continue;
            };
            for (name, origin) in self.export_namespace(&target) {
                let visible = match &import.prefix {
                    Some(prefix) => format!("{prefix}.{name}"),
                    None => name,
                };
                imported.entry(visible).or_insert(origin);
            }
            if !dependencies.contains(&target) {
                dependencies.push(target);
            }
        }

        for target in self.export_targets(uri, unit) {
            if !dependencies.contains(&target) {
                dependencies.push(target);
            }
        }

        let mut references = Vec::new();
        for declaration in &unit.declarations {
            for name in &declaration.type_refs {
                let is_local = unit.declarations.iter().any(|d| &d.name == name);
                let target = if is_local {
                    Some(uri.to_string())
                } else {
                    imported.get(name).cloned()
                };
                references.push(LinkedReference {
                    declaration: declaration.name.clone(),
                    name: name.clone(),
                    target,
                });
            }
        }

        LinkedLibrary {
            dependencies,
            exported_names: self.export_namespace(uri),
            references,
            strong_mode,
        }
    }
}
