use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use sieve_normalize::PackageName;
use sieve_pep440::{Version, VersionParseError};

/// A `-pyX.Y` suffix naming the interpreter a source archive was built for.
static PYTHON_VERSION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-py([123]\.?[0-9]?)$").expect("the python version suffix regex is valid")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceDistExtension {
    Zip,
    TarGz,
    Tgz,
    TarBz2,
    Tbz,
    Tar,
}

impl FromStr for SourceDistExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "zip" => Self::Zip,
            "tar.gz" => Self::TarGz,
            "tgz" => Self::Tgz,
            "tar.bz2" => Self::TarBz2,
            "tbz" => Self::Tbz,
            "tar" => Self::Tar,
            other => return Err(other.to_string()),
        })
    }
}

impl Display for SourceDistExtension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zip => f.write_str("zip"),
            Self::TarGz => f.write_str("tar.gz"),
            Self::Tgz => f.write_str("tgz"),
            Self::TarBz2 => f.write_str("tar.bz2"),
            Self::Tbz => f.write_str("tbz"),
            Self::Tar => f.write_str("tar"),
        }
    }
}

impl SourceDistExtension {
    /// Split a filename into its stem and archive extension.
    pub fn from_filename(filename: &str) -> Option<(&str, Self)> {
        [
            (".tar.gz", Self::TarGz),
            (".tgz", Self::Tgz),
            (".tar.bz2", Self::TarBz2),
            (".tbz", Self::Tbz),
            (".tar", Self::Tar),
            (".zip", Self::Zip),
        ]
        .into_iter()
        .find_map(|(suffix, extension)| {
            filename
                .strip_suffix(suffix)
                .map(|stem| (stem, extension))
        })
    }
}

/// Note that this is a normalized and not an exact representation, keep the original string if you
/// need the latter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDistFilename {
    pub name: PackageName,
    pub version: Version,
    pub extension: SourceDistExtension,
    /// The `X.Y` from a `-pyX.Y` suffix, if the archive names the interpreter it was built for.
    pub python_version: Option<String>,
}

impl SourceDistFilename {
    /// No `FromStr` impl since we need to know the package name to be able to reasonable parse
    /// these (consider e.g. `a-1-1.zip`)
    ///
    /// The name is matched at each `-` in turn, so `foo-bar-1.0.zip` is found for `foo-bar` and
    /// `gmpy2-2.0.zip` is never mistaken for `gmpy`.
    pub fn parse(
        filename: &str,
        package_name: &PackageName,
    ) -> Result<Self, SourceDistFilenameError> {
        let Some((stem, extension)) = SourceDistExtension::from_filename(filename) else {
            return Err(SourceDistFilenameError {
                filename: filename.to_string(),
                kind: SourceDistFilenameErrorKind::Extension,
            });
        };

        let Some(version) = strip_package_name(stem, package_name) else {
            return Err(SourceDistFilenameError {
                filename: filename.to_string(),
                kind: SourceDistFilenameErrorKind::Filename(package_name.clone()),
            });
        };

        let (version, python_version) = match PYTHON_VERSION_SUFFIX.captures(version) {
            Some(captures) => {
                let suffix = captures.get(0).map_or(0, |suffix| suffix.start());
                (
                    &version[..suffix],
                    captures.get(1).map(|python| python.as_str().to_string()),
                )
            }
            None => (version, None),
        };

        let version = Version::from_str(version).map_err(|err| SourceDistFilenameError {
            filename: filename.to_string(),
            kind: SourceDistFilenameErrorKind::Version(err),
        })?;

        Ok(Self {
            name: package_name.clone(),
            version,
            extension,
            python_version,
        })
    }
}

/// Find the first `-` at which the text before it is `package_name`, and return the text after.
pub(crate) fn strip_package_name<'a>(stem: &'a str, package_name: &PackageName) -> Option<&'a str> {
    stem.match_indices('-').find_map(|(index, _)| {
        let (name, rest) = (&stem[..index], &stem[index + 1..]);
        (package_name.matches(name) && !rest.is_empty()).then_some(rest)
    })
}

impl Display for SourceDistFilename {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name, self.version)?;
        if let Some(python_version) = &self.python_version {
            write!(f, "-py{python_version}")?;
        }
        write!(f, ".{}", self.extension)
    }
}

#[derive(Error, Debug, Clone)]
pub struct SourceDistFilenameError {
    filename: String,
    kind: SourceDistFilenameErrorKind,
}

impl Display for SourceDistFilenameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to parse source distribution filename {}: {}",
            self.filename, self.kind
        )
    }
}

#[derive(Error, Debug, Clone)]
enum SourceDistFilenameErrorKind {
    #[error("Name doesn't start with package name {0}")]
    Filename(PackageName),
    #[error(
        "Source distributions filenames must end with .tar.gz, .tgz, .tar.bz2, .tbz, .tar or .zip"
    )]
    Extension,
    #[error("Version section is invalid: {0}")]
    Version(#[from] VersionParseError),
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sieve_normalize::PackageName;

    use crate::{SourceDistExtension, SourceDistFilename};

    fn parse(filename: &str, name: &str) -> SourceDistFilename {
        SourceDistFilename::parse(filename, &PackageName::from_str(name).unwrap()).unwrap()
    }

    /// Only test already normalized names since the parsing is lossy
    #[test]
    fn roundtrip() {
        for normalized in [
            "foo-lib-1.2.3.zip",
            "foo-lib-1.2.3a3.zip",
            "foo-lib-1.2.3.tar.gz",
            "foo-lib-1.2.3.tgz",
            "foo-lib-1.2.3.tar.bz2",
            "foo-lib-1.2.3.tbz",
            "foo-lib-1.2.3.tar",
            "foo-lib-1.2.3-py2.7.tar.gz",
        ] {
            assert_eq!(parse(normalized, "foo_lib").to_string(), normalized);
        }
    }

    #[test]
    fn python_version_suffix() {
        let filename = parse("foo-1.0-py2.7.tar.gz", "foo");
        assert_eq!(filename.version.to_string(), "1.0");
        assert_eq!(filename.python_version.as_deref(), Some("2.7"));
        assert_eq!(filename.extension, SourceDistExtension::TarGz);
    }

    #[test]
    fn no_partial_name_match() {
        let gmpy = PackageName::from_str("gmpy").unwrap();
        assert!(SourceDistFilename::parse("gmpy2-2.0.tar.gz", &gmpy).is_err());
        assert_eq!(
            SourceDistFilename::parse("gmpy-1.15.tar.gz", &gmpy)
                .unwrap()
                .version
                .to_string(),
            "1.15"
        );
    }

    #[test]
    fn errors() {
        for invalid in ["b-1.2.3.zip", "a-1.2.3-gamma.3.zip", "a-1.2.3.tar.zstd", "a-.zip"] {
            assert!(
                SourceDistFilename::parse(invalid, &PackageName::from_str("a").unwrap()).is_err()
            );
        }
        let err = SourceDistFilename::parse("a-1.0.rar", &PackageName::from_str("a").unwrap())
            .unwrap_err();
        insta::assert_snapshot!(err, @"Failed to parse source distribution filename a-1.0.rar: Source distributions filenames must end with .tar.gz, .tgz, .tar.bz2, .tbz, .tar or .zip");
    }

    #[test]
    fn name_too_long() {
        assert!(
            SourceDistFilename::parse("foo.zip", &PackageName::from_str("foo-lib").unwrap())
                .is_err()
        );
    }
}
