use std::sync::{Mutex, PoisonError};

use tracing::{debug, instrument, trace};
use url::Url;

use sieve_platform_tags::Tags;

use crate::aggregator::aggregate;
use crate::candidate::{Candidate, select_best, sort_candidates};
use crate::collector::LinkCollector;
use crate::compatibility;
use crate::error::{FindError, log_skipped};
use crate::link::Link;
use crate::options::FinderOptions;
use crate::requirement::Requirement;
use crate::version_gate::VersionGate;

/// Selects the best distribution link for a requirement.
///
/// A finder is built once per install and shared across requirements; the only state it keeps
/// between calls is the list of dependency links, so `find_requirement` may be called from
/// several threads at once.
#[derive(Debug)]
pub struct PackageFinder<C> {
    collector: C,
    tags: Tags,
    options: FinderOptions,
    dependency_links: Mutex<Vec<Url>>,
}

impl<C: LinkCollector> PackageFinder<C> {
    pub fn new(collector: C, tags: Tags, options: FinderOptions) -> Self {
        Self {
            collector,
            tags,
            options,
            dependency_links: Mutex::new(Vec::new()),
        }
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn options(&self) -> &FinderOptions {
        &self.options
    }

    /// Register dependency links, usually declared by packages that were already resolved.
    ///
    /// A link that is already known is ignored.
    pub fn add_dependency_links(&self, links: impl IntoIterator<Item = Url>) {
        let mut dependency_links = self
            .dependency_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for link in links {
            if dependency_links.contains(&link) {
                trace!("Dependency link already known: {link}");
                continue;
            }
            debug!("Adding dependency link: {link}");
            dependency_links.push(link);
        }
    }

    /// A snapshot of the dependency links registered so far.
    pub fn dependency_links(&self) -> Vec<Url> {
        self.dependency_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Find the link to install for `requirement`.
    ///
    /// If the requirement is already satisfied and no upgrade is requested, nothing is collected
    /// and [`FindError::BestVersionAlreadyInstalled`] is returned. With an upgrade, the installed
    /// version is kept unless a strictly newer candidate exists.
    #[instrument(skip_all, fields(requirement = %requirement))]
    pub fn find_requirement(
        &self,
        requirement: &Requirement,
        upgrade: bool,
    ) -> Result<Link, FindError> {
        if let Some(installed) = &requirement.satisfied_by {
            if !upgrade {
                debug!(
                    "Requirement already satisfied by {} {}",
                    requirement.name, installed.version
                );
                return Err(FindError::BestVersionAlreadyInstalled {
                    name: requirement.name.clone(),
                    installed: installed.version.clone(),
                });
            }
        }

        let dependency_links = self.dependency_links();
        let links = aggregate(
            &self.collector,
            &requirement.name,
            &dependency_links,
            &self.options,
        );
        debug!("Collected {} links for {}", links.len(), requirement.name);

        let gate = VersionGate::new(requirement);
        let mut rejected = Vec::new();
        let mut candidates = Vec::new();
        for link in links {
            if let Err(reason) = gate.check(link.version()) {
                log_skipped(link.url(), link.origin(), &reason);
                rejected.push(link.version().clone());
                continue;
            }
            match compatibility::check(&link, &self.tags) {
                Ok(priority) => candidates.push(Candidate::link(link, priority)),
                Err(reason) => log_skipped(link.url(), link.origin(), &reason),
            }
        }
        debug!("{} candidates survived filtering", candidates.len());

        if let Some(installed) = &requirement.satisfied_by {
            if tracing::enabled!(tracing::Level::TRACE) {
                let mut ranked = candidates.clone();
                ranked.push(Candidate::Installed(installed.clone()));
                sort_candidates(&mut ranked);
                for candidate in ranked.iter().rev() {
                    trace!("Candidate: {candidate}");
                }
            }

            let best = select_best(candidates).and_then(Candidate::into_link);
            return match best {
                Some(best) if *best.version() > installed.version => {
                    debug!("Upgrading {} from {} to {best}", requirement.name, installed.version);
                    Ok(best)
                }
                _ => {
                    debug!(
                        "Installed version {} of {} is the best available",
                        installed.version, requirement.name
                    );
                    Err(FindError::BestVersionAlreadyInstalled {
                        name: requirement.name.clone(),
                        installed: installed.version.clone(),
                    })
                }
            };
        }

        match select_best(candidates).and_then(Candidate::into_link) {
            Some(best) => {
                debug!("Selected {} {} from {}", best.name(), best.version(), best.url());
                Ok(best)
            }
            None => {
                rejected.sort();
                rejected.dedup();
                Err(FindError::DistributionNotFound {
                    requirement: requirement.to_string(),
                    versions: rejected,
                })
            }
        }
    }
}
