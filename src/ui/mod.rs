//! Terminal output for the CLI
//!
//! Uses `cliclack` framing in interactive terminals and falls back to plain,
//! prefix-tagged lines when piped or running in CI.

mod context;
mod output;

pub use context::UiContext;
pub use output::{intro, key_value, section, step_info, step_ok_detail, step_warn_hint};
