//! Link command - link the closure of a source URI

use super::{open_provider, print_packages, PackageSummary};
use crate::cli::args::LinkArgs;
use crate::config::Config;
use crate::error::{LinkError, LinkResult};
use tracing::info;

/// Execute the link command
pub async fn execute(args: LinkArgs, config: &Config) -> LinkResult<()> {
    let mut provider = open_provider(config).await?;

    let Some(packages) = provider.linked_packages(&args.uri)? else {
        return Err(match provider.unlinked_for_uri(&args.uri) {
            Some(_) => LinkError::ClosureFailed(args.uri),
            None => LinkError::NoPackage(args.uri),
        });
    };

    info!(
        "{} package(s) in closure of {}",
        packages.len(),
        args.uri
    );

    let summaries: Vec<PackageSummary> = packages
        .iter()
        .map(|p| PackageSummary::from(p.as_ref()))
        .collect();
    print_packages(&summaries, args.format, &format!("Linked {}", args.uri))
}
