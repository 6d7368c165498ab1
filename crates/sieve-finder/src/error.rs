use sieve_distribution_filename::{DistFilenameError, EggFragmentError};
use sieve_normalize::PackageName;
use sieve_pep440::{Version, VersionSpecifiers};
use sieve_platform_tags::IncompatibleTag;

use crate::LinkOrigin;

/// The outcomes of [`crate::PackageFinder::find_requirement`] that are not a link.
#[derive(Debug, thiserror::Error)]
pub enum FindError {
    /// The installed version is at least as good as anything that was found.
    #[error("{name} {installed} is already installed and is the best available version")]
    BestVersionAlreadyInstalled {
        name: PackageName,
        installed: Version,
    },
    /// No link survived the filters.
    #[error("{}", not_found_message(requirement, versions))]
    DistributionNotFound {
        requirement: String,
        /// Versions that were discovered but rejected by the version constraints.
        versions: Vec<Version>,
    },
}

fn not_found_message(requirement: &str, versions: &[Version]) -> String {
    if versions.is_empty() {
        return format!("No distributions at all found for {requirement}");
    }
    let versions = versions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("No distributions matching the version for {requirement} (from versions: {versions})")
}

/// Why a discovered link was dropped before comparison.
///
/// These never reach the caller; they exist to explain the choice in the logs.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Skipped {
    #[error("already discovered")]
    Duplicate,
    #[error("the URL doesn't name a file")]
    NoFilename,
    #[error(transparent)]
    Filename(#[from] DistFilenameError),
    #[error(transparent)]
    EggFragment(#[from] EggFragmentError),
    #[error("Mac OS X installer bundles are not supported")]
    MacInstaller,
    #[error("built for Python {0}")]
    PythonVersion(String),
    #[error("wheels are disabled")]
    WheelsDisabled,
    #[error("hosted outside the index and {0} is not allowed to use external files")]
    External(PackageName),
    #[error("has no hash and {0} is not allowed to use insecure files")]
    Insecure(PackageName),
    #[error("{0} doesn't satisfy `{1}`")]
    Version(Version, VersionSpecifiers),
    #[error("{0} is a pre-release")]
    Prerelease(Version),
    #[error("no supported tag matches the {0}")]
    IncompatibleTag(IncompatibleTagPart),
}

/// [`IncompatibleTag`] with a readable name for messages.
#[derive(Debug)]
pub(crate) struct IncompatibleTagPart(pub(crate) IncompatibleTag);

impl std::fmt::Display for IncompatibleTagPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            IncompatibleTag::Invalid => f.write_str("filename"),
            IncompatibleTag::Python => f.write_str("Python tag"),
            IncompatibleTag::Abi => f.write_str("ABI tag"),
            IncompatibleTag::Platform => f.write_str("platform tag"),
        }
    }
}

/// Unrecognizable files are common in find-links directories, so they are only traced.
pub(crate) fn log_skipped(url: &url::Url, origin: LinkOrigin, reason: &Skipped) {
    match reason {
        Skipped::Duplicate | Skipped::NoFilename | Skipped::Filename(_) | Skipped::EggFragment(_) => {
            tracing::trace!("Skipping {origin} link {url}: {reason}");
        }
        _ => {
            tracing::debug!("Skipping {origin} link {url}: {reason}");
        }
    }
}
