use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use unscanny::Scanner;

use sieve_normalize::{InvalidNameError, PackageName};
use sieve_pep440::{Version, VersionSpecifiers, VersionSpecifiersParseError};

/// A version of the project that is already present in the target environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub version: Version,
    pub location: Option<PathBuf>,
}

impl InstalledVersion {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

/// A single project to find a distribution for, e.g. `gmpy==1.15` or `bar>=0.0.dev0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: PackageName,
    pub specifiers: VersionSpecifiers,
    /// Admit pre-releases and dev releases even when no specifier names one.
    pub prereleases: bool,
    pub satisfied_by: Option<InstalledVersion>,
}

impl Requirement {
    pub fn new(name: PackageName, specifiers: VersionSpecifiers) -> Self {
        Self {
            name,
            specifiers,
            prereleases: false,
            satisfied_by: None,
        }
    }

    #[must_use]
    pub fn with_prereleases(mut self, prereleases: bool) -> Self {
        self.prereleases = prereleases;
        self
    }

    #[must_use]
    pub fn with_satisfied_by(mut self, installed: InstalledVersion) -> Self {
        self.satisfied_by = Some(installed);
        self
    }
}

impl FromStr for Requirement {
    type Err = RequirementParseError;

    /// Parse `name [extras] specifiers`. Extras are accepted and dropped.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut s = Scanner::new(input);
        s.eat_whitespace();
        let name = s.eat_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if name.is_empty() {
            return Err(RequirementParseError::MissingName(input.to_string()));
        }
        let name = PackageName::from_str(name).map_err(|source| RequirementParseError::Name {
            input: input.to_string(),
            source,
        })?;

        s.eat_whitespace();
        if s.eat_if('[') {
            s.eat_until(']');
            if !s.eat_if(']') {
                return Err(RequirementParseError::UnterminatedExtras(input.to_string()));
            }
        }

        let specifiers = VersionSpecifiers::from_str(s.after().trim()).map_err(|source| {
            RequirementParseError::Specifiers {
                input: input.to_string(),
                source,
            }
        })?;

        Ok(Self::new(name, specifiers))
    }
}

impl Display for Requirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, self.specifiers)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequirementParseError {
    #[error("Expected a project name at the start of `{0}`")]
    MissingName(String),
    #[error("Invalid project name in `{input}`")]
    Name {
        input: String,
        source: InvalidNameError,
    },
    #[error("Missing closing bracket for the extras in `{0}`")]
    UnterminatedExtras(String),
    #[error("Invalid version specifiers in `{input}`")]
    Specifiers {
        input: String,
        source: VersionSpecifiersParseError,
    },
}
