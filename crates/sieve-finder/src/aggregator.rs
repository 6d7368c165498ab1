use rustc_hash::FxHashSet;
use tracing::trace;
use url::Url;

use sieve_normalize::PackageName;

use crate::classifier::classify;
use crate::collector::LinkCollector;
use crate::error::{Skipped, log_skipped};
use crate::link::{Link, LinkOrigin};
use crate::options::FinderOptions;
use crate::visibility::check_index_link;

/// A URL waiting to be classified, in scan order.
struct Discovered {
    url: Url,
    origin: LinkOrigin,
    internal: bool,
}

/// Gather every usable link for a project from find-links, the index page and the dependency
/// links, in that order.
///
/// Each link gets its origin and its position in the scan. A URL seen twice keeps its first
/// discovery. Index page links must also pass the visibility policy.
pub(crate) fn aggregate(
    collector: &impl LinkCollector,
    package_name: &PackageName,
    dependency_links: &[Url],
    options: &FinderOptions,
) -> Vec<Link> {
    let find_links = collector
        .find_links(package_name)
        .into_iter()
        .map(|url| Discovered {
            url,
            origin: LinkOrigin::FindLinks,
            internal: true,
        });
    let index_links = collector
        .index_links(package_name)
        .into_iter()
        .map(|link| Discovered {
            url: link.url,
            origin: LinkOrigin::IndexPage,
            internal: link.internal,
        });
    let dependency_links = dependency_links
        .iter()
        .flat_map(|url| collector.dependency_links(url, package_name))
        .map(|url| Discovered {
            url,
            origin: LinkOrigin::DependencyLink,
            internal: true,
        });

    let mut seen = FxHashSet::default();
    let mut links = Vec::new();
    for (position, discovered) in find_links
        .chain(index_links)
        .chain(dependency_links)
        .enumerate()
    {
        if !seen.insert(discovered.url.clone()) {
            log_skipped(&discovered.url, discovered.origin, &Skipped::Duplicate);
            continue;
        }
        match accept(&discovered, position, package_name, options) {
            Ok(link) => {
                trace!("Found {} link {}", link.origin(), link.url());
                links.push(link);
            }
            Err(reason) => log_skipped(&discovered.url, discovered.origin, &reason),
        }
    }
    links
}

fn accept(
    discovered: &Discovered,
    position: usize,
    package_name: &PackageName,
    options: &FinderOptions,
) -> Result<Link, Skipped> {
    let link = classify(
        &discovered.url,
        discovered.origin,
        position,
        package_name,
        options,
    )?;
    if discovered.origin == LinkOrigin::IndexPage {
        check_index_link(&link, discovered.internal, options)?;
    }
    Ok(link)
}
