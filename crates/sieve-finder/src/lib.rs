//! Select the best distribution link for a requirement.
//!
//! Links come from three places, scanned in order: find-links locations, the project's index
//! page and dependency links registered on the [`PackageFinder`]. Each link is recognized from
//! its filename or `#egg=` fragment, filtered by the visibility policy, the requirement's
//! version specifiers and the supported platform tags, and the survivors are compared with a
//! single total order (see [`Candidate::cmp_preference`]).
//!
//! Nothing is fetched here: a [`LinkCollector`] supplies the links.

pub use candidate::{Candidate, CandidateRank, DistPreference, select_best, sort_candidates};
pub use collector::{FindLinksDirectory, FindLinksError, InMemoryLinks, IndexLink, LinkCollector};
pub use error::FindError;
pub use finder::PackageFinder;
pub use link::{DistKind, Hash, HashAlgorithm, Link, LinkOrigin};
pub use options::FinderOptions;
pub use requirement::{InstalledVersion, Requirement, RequirementParseError};

mod aggregator;
mod candidate;
mod classifier;
mod collector;
mod compatibility;
mod error;
mod finder;
mod link;
mod options;
mod requirement;
mod version_gate;
mod visibility;
