//! Linking: the provider entry point, the batched link step and the linker
//! boundary

pub mod batch;
pub mod linker;
pub mod provider;

pub use batch::LinkStore;
pub use linker::{LinkedLookup, Linker, SummaryLinker, UnlinkedLookup};
pub use provider::LinkedPackageProvider;

use crate::config::Config;
use std::collections::BTreeMap;

/// Declared variables consulted by conditional directives
pub type DeclaredVariables = BTreeMap<String, String>;

/// Global resolution settings passed to every linker call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    pub declared_variables: DeclaredVariables,
    pub strong_mode: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            declared_variables: DeclaredVariables::new(),
            strong_mode: true,
        }
    }
}

impl LinkOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            declared_variables: config.link.declared_variables.clone(),
            strong_mode: config.link.strong_mode,
        }
    }
}
