//! CLI command implementations

pub mod config;
pub mod link;
pub mod scan;
pub mod show;

pub use config::execute as config;
pub use link::execute as link;
pub use scan::execute as scan;
pub use show::execute as show;

use crate::bundle::PackageBundle;
use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::error::{LinkError, LinkResult};
use crate::link::{LinkOptions, LinkedPackageProvider, SummaryLinker};
use crate::package::Package;
use crate::resolver::PackageMap;
use crate::resource::PhysicalResourceProvider;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Provider over the physical filesystem, configured from `config`
pub(crate) async fn open_provider(config: &Config) -> LinkResult<LinkedPackageProvider> {
    let sdk_bundle = load_sdk_bundle(config).await?;
    let packages = PackageMap::from_config(config);
    debug!("Opening provider over {} configured package(s)", packages.len());

    Ok(LinkedPackageProvider::new(
        Box::new(PhysicalResourceProvider),
        Box::new(packages),
        Box::new(SummaryLinker),
        sdk_bundle,
        LinkOptions::from_config(config),
    ))
}

async fn load_sdk_bundle(config: &Config) -> LinkResult<PackageBundle> {
    let Some(path) = &config.sdk.bundle else {
        debug!("No SDK bundle configured; platform references stay unresolved");
        return Ok(PackageBundle::default());
    };

    let bytes = fs::read(path)
        .await
        .map_err(|e| LinkError::io(format!("reading SDK bundle {}", path.display()), e))?;
    PackageBundle::from_bytes(path, &bytes)
}

/// Serializable view of a package for listings
#[derive(Debug, Serialize)]
pub(crate) struct PackageSummary {
    pub location: PathBuf,
    pub units: Vec<String>,
    pub linked: bool,
    pub linked_libraries: usize,
}

impl From<&Package> for PackageSummary {
    fn from(package: &Package) -> Self {
        Self {
            location: package.location().to_path_buf(),
            units: package.unit_uris().iter().cloned().collect(),
            linked: package.is_linked(),
            linked_libraries: package
                .linked()
                .map_or(0, |bundle| bundle.linked_libraries.len()),
        }
    }
}

/// Print `packages` in the requested format
pub(crate) fn print_packages(
    packages: &[PackageSummary],
    format: OutputFormat,
    title: &str,
) -> LinkResult<()> {
    match format {
        OutputFormat::Table => print_table(packages, title),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(packages)?),
        OutputFormat::Plain => {
            for package in packages {
                println!("{}", package.location.display());
            }
        }
    }
    Ok(())
}

fn print_table(packages: &[PackageSummary], title: &str) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, title);

    println!(
        "{:<50} {:<8} {:<10}",
        style("BUNDLE").bold(),
        style("UNITS").bold(),
        style("STATE").bold()
    );
    println!("{}", "-".repeat(70));

    for package in packages {
        let state = if package.linked {
            style(format!("linked ({})", package.linked_libraries)).green()
        } else {
            style("unlinked".to_string()).dim()
        };
        println!(
            "{:<50} {:<8} {:<10}",
            package.location.display().to_string(),
            package.units.len(),
            state
        );
    }

    println!();
    println!("{} package(s)", packages.len());
}
