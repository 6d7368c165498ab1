use std::fmt::{Display, Formatter};

use sieve_normalize::PackageName;
use sieve_pep440::Version;

pub use egg_fragment::{EggFragment, EggFragmentError};
pub use source_dist::{SourceDistExtension, SourceDistFilename, SourceDistFilenameError};
pub use wheel::{WheelFilename, WheelFilenameError};

mod egg_fragment;
mod source_dist;
mod wheel;

/// A distribution filename, either a wheel or a source distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistFilename {
    SourceDistFilename(SourceDistFilename),
    WheelFilename(WheelFilename),
}

impl DistFilename {
    /// Parse a filename as wheel or source dist name, requiring it to belong to `package_name`.
    pub fn parse(filename: &str, package_name: &PackageName) -> Result<Self, DistFilenameError> {
        if filename.ends_with(".whl") {
            let wheel = filename.parse::<WheelFilename>()?;
            if wheel.name != *package_name {
                return Err(DistFilenameError::WrongProject {
                    filename: filename.to_string(),
                    expected: package_name.clone(),
                });
            }
            return Ok(Self::WheelFilename(wheel));
        }
        Ok(Self::SourceDistFilename(SourceDistFilename::parse(
            filename,
            package_name,
        )?))
    }

    pub fn name(&self) -> &PackageName {
        match self {
            Self::SourceDistFilename(filename) => &filename.name,
            Self::WheelFilename(filename) => &filename.name,
        }
    }

    pub fn version(&self) -> &Version {
        match self {
            Self::SourceDistFilename(filename) => &filename.version,
            Self::WheelFilename(filename) => &filename.version,
        }
    }
}

impl Display for DistFilename {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceDistFilename(filename) => write!(f, "{filename}"),
            Self::WheelFilename(filename) => write!(f, "{filename}"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone)]
pub enum DistFilenameError {
    #[error(transparent)]
    Wheel(#[from] WheelFilenameError),
    #[error(transparent)]
    SourceDist(#[from] SourceDistFilenameError),
    #[error("The wheel filename \"{filename}\" is for a different project than {expected}")]
    WrongProject {
        filename: String,
        expected: PackageName,
    },
}
