//! Show command - describe the cached package containing a URI

use super::open_provider;
use crate::bundle::UnlinkedUnit;
use crate::cli::args::ShowArgs;
use crate::config::Config;
use crate::error::{LinkError, LinkResult};
use crate::package::Package;
use crate::ui::{self, UiContext};

/// Execute the show command
pub async fn execute(args: ShowArgs, config: &Config) -> LinkResult<()> {
    let mut provider = open_provider(config).await?;
    let package = provider
        .unlinked_for_uri(&args.uri)
        .ok_or_else(|| LinkError::NoPackage(args.uri.clone()))?;

    let ctx = UiContext::detect();
    print_package(&ctx, &package);
    Ok(())
}

fn print_package(ctx: &UiContext, package: &Package) {
    ui::intro(ctx, "Package");
    ui::key_value(ctx, "Bundle", &package.location().display().to_string());

    let bundle = package.unlinked();
    ui::key_value(
        ctx,
        "Format",
        &format!("{}.{}", bundle.major_version, bundle.minor_version),
    );
    ui::key_value(ctx, "Units", &bundle.unlinked_unit_uris.len().to_string());

    for (uri, unit) in bundle.unlinked_pairs() {
        ui::section(ctx, uri);
        describe_unit(ctx, unit);
    }
}

fn describe_unit(ctx: &UiContext, unit: &UnlinkedUnit) {
    let imports: Vec<&str> = unit
        .imports
        .iter()
        .filter(|import| !import.is_implicit)
        .map(|import| import.uri.as_str())
        .collect();
    let exports: Vec<&str> = unit.exports.iter().map(|export| export.uri.as_str()).collect();
    let declarations: Vec<&str> = unit.declarations.iter().map(|d| d.name.as_str()).collect();

    ui::key_value(ctx, "Imports", &list_or_none(&imports));
    ui::key_value(ctx, "Exports", &list_or_none(&exports));
    ui::key_value(ctx, "Declarations", &list_or_none(&declarations));
}

fn list_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
