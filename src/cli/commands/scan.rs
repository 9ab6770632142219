//! Scan command - list consistent bundles in a folder

use super::{open_provider, print_packages, PackageSummary};
use crate::cli::args::{OutputFormat, ScanArgs};
use crate::config::Config;
use crate::error::{LinkError, LinkResult};
use crate::ui::{self, UiContext};

/// Execute the scan command
pub async fn execute(args: ScanArgs, config: &Config) -> LinkResult<()> {
    if !args.folder.is_dir() {
        return Err(LinkError::PathNotFound(args.folder));
    }

    let mut provider = open_provider(config).await?;
    let packages = provider.packages_in_folder(&args.folder);

    if packages.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(
                    &ctx,
                    &format!("No consistent bundles in {}", args.folder.display()),
                );
            }
        }
        return Ok(());
    }

    let summaries: Vec<PackageSummary> = packages
        .iter()
        .map(|p| PackageSummary::from(p.as_ref()))
        .collect();
    print_packages(
        &summaries,
        args.format,
        &format!("Bundles in {}", args.folder.display()),
    )
}
