use std::cmp::{Ordering, Reverse};
use std::fmt::{Display, Formatter};

use sieve_pep440::Version;
use sieve_platform_tags::TagPriority;

use crate::link::{Link, LinkOrigin};
use crate::requirement::InstalledVersion;

/// The first and most decisive comparison key: where a candidate comes from.
///
/// Variants are declared from least to most preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CandidateRank {
    DependencyLink,
    IndexPage,
    FindLinks,
    /// The version already present in the environment.
    Installed,
}

impl From<LinkOrigin> for CandidateRank {
    fn from(origin: LinkOrigin) -> Self {
        match origin {
            LinkOrigin::DependencyLink => Self::DependencyLink,
            LinkOrigin::IndexPage => Self::IndexPage,
            LinkOrigin::FindLinks => Self::FindLinks,
        }
    }
}

/// Wheels beat source distributions, and among wheels the most specific supported tag wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DistPreference {
    SourceDist,
    Wheel(TagPriority),
}

/// A link that passed every filter, or the installed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Installed(InstalledVersion),
    Link {
        link: Link,
        /// The priority of the best supported tag, for wheels.
        priority: Option<TagPriority>,
    },
}

/// The comparison keys of a [`Candidate`], most decisive first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CandidateKey<'a> {
    rank: CandidateRank,
    filename_derived: bool,
    version: &'a Version,
    dist: DistPreference,
    earlier: Reverse<usize>,
}

impl Candidate {
    pub fn link(link: Link, priority: Option<TagPriority>) -> Self {
        Self::Link { link, priority }
    }

    pub fn version(&self) -> &Version {
        match self {
            Self::Installed(installed) => &installed.version,
            Self::Link { link, .. } => link.version(),
        }
    }

    pub fn rank(&self) -> CandidateRank {
        match self {
            Self::Installed(_) => CandidateRank::Installed,
            Self::Link { link, .. } => CandidateRank::from(link.origin()),
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Self::Installed(_) => None,
            Self::Link { link, .. } => Some(link),
        }
    }

    pub fn into_link(self) -> Option<Link> {
        match self {
            Self::Installed(_) => None,
            Self::Link { link, .. } => Some(link),
        }
    }

    fn key(&self) -> CandidateKey<'_> {
        match self {
            Self::Installed(installed) => CandidateKey {
                rank: CandidateRank::Installed,
                filename_derived: true,
                version: &installed.version,
                dist: DistPreference::SourceDist,
                earlier: Reverse(0),
            },
            Self::Link { link, priority } => CandidateKey {
                rank: CandidateRank::from(link.origin()),
                filename_derived: !link.is_egg_fragment(),
                version: link.version(),
                dist: priority.map_or(DistPreference::SourceDist, DistPreference::Wheel),
                earlier: Reverse(link.position()),
            },
        }
    }

    /// Compare two candidates by preference; the greater candidate is the better one.
    ///
    /// The keys, most decisive first: rank (installed, then find-links, index page, dependency
    /// link), filename over egg fragment, version, wheel over source distribution with the better
    /// tag winning, and finally the earlier discovery.
    pub fn cmp_preference(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Installed(installed) => write!(f, "{} (installed)", installed.version),
            Self::Link { link, .. } => write!(f, "{} ({})", link.version(), link.url()),
        }
    }
}

/// The most preferred candidate, in a single pass.
pub fn select_best(candidates: impl IntoIterator<Item = Candidate>) -> Option<Candidate> {
    candidates.into_iter().max_by(Candidate::cmp_preference)
}

/// Sort candidates from least to most preferred. The last one is [`select_best`]'s choice.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(Candidate::cmp_preference);
}
