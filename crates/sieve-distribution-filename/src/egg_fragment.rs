use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use sieve_normalize::PackageName;
use sieve_pep440::{Version, VersionParseError};

use crate::source_dist::strip_package_name;

/// The `name-version` from a `#egg=` URL fragment.
///
/// Index pages use these to name links whose filename says nothing useful, like
/// `http://foo/bar.py#egg=bar-1.0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EggFragment {
    pub name: PackageName,
    pub version: Version,
}

impl EggFragment {
    /// Parse the value of an `egg=` fragment parameter for the given project.
    pub fn parse(fragment: &str, package_name: &PackageName) -> Result<Self, EggFragmentError> {
        if package_name.matches(fragment) {
            return Err(EggFragmentError::MissingVersion(fragment.to_string()));
        }
        let Some(version) = strip_package_name(fragment, package_name) else {
            return Err(EggFragmentError::WrongProject {
                fragment: fragment.to_string(),
                expected: package_name.clone(),
            });
        };
        let version = Version::from_str(version)
            .map_err(|err| EggFragmentError::InvalidVersion(fragment.to_string(), err))?;
        Ok(Self {
            name: package_name.clone(),
            version,
        })
    }
}

impl Display for EggFragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

#[derive(Error, Debug, Clone)]
pub enum EggFragmentError {
    #[error("The egg fragment \"{0}\" has no version")]
    MissingVersion(String),
    #[error("The egg fragment \"{fragment}\" doesn't name {expected}")]
    WrongProject {
        fragment: String,
        expected: PackageName,
    },
    #[error("The egg fragment \"{0}\" has an invalid version part: {1}")]
    InvalidVersion(String, #[source] VersionParseError),
}
