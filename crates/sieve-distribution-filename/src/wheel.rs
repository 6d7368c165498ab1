use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use sieve_normalize::{InvalidNameError, PackageName};
use sieve_pep440::{Version, VersionParseError};
use sieve_platform_tags::{Tag, TagCompatibility, Tags};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WheelFilename {
    pub name: PackageName,
    pub version: Version,
    pub build_tag: Option<String>,
    pub python_tag: Vec<String>,
    pub abi_tag: Vec<String>,
    pub platform_tag: Vec<String>,
}

impl FromStr for WheelFilename {
    type Err = WheelFilenameError;

    fn from_str(filename: &str) -> Result<Self, Self::Err> {
        let stem = filename.strip_suffix(".whl").ok_or_else(|| {
            WheelFilenameError::InvalidWheelFileName(
                filename.to_string(),
                "Must end with .whl".to_string(),
            )
        })?;
        Self::parse(filename, stem)
    }
}

impl WheelFilename {
    fn parse(filename: &str, stem: &str) -> Result<Self, WheelFilenameError> {
        // The wheel filename should contain either five or six entries. If six, then the third
        // entry is the build tag. If five, then the third entry is the Python tag.
        // https://www.python.org/dev/peps/pep-0427/#file-name-convention
        let mut parts = stem.split('-');

        let name = parts.next().unwrap_or_default();

        let Some(version) = parts.next() else {
            return Err(WheelFilenameError::InvalidWheelFileName(
                filename.to_string(),
                "Must have a version".to_string(),
            ));
        };

        let Some(build_tag_or_python_tag) = parts.next() else {
            return Err(WheelFilenameError::InvalidWheelFileName(
                filename.to_string(),
                "Must have a Python tag".to_string(),
            ));
        };

        let Some(python_tag_or_abi_tag) = parts.next() else {
            return Err(WheelFilenameError::InvalidWheelFileName(
                filename.to_string(),
                "Must have an ABI tag".to_string(),
            ));
        };

        let Some(abi_tag_or_platform_tag) = parts.next() else {
            return Err(WheelFilenameError::InvalidWheelFileName(
                filename.to_string(),
                "Must have a platform tag".to_string(),
            ));
        };

        let (build_tag, python_tag, abi_tag, platform_tag) =
            if let Some(platform_tag) = parts.next() {
                if parts.next().is_some() {
                    return Err(WheelFilenameError::InvalidWheelFileName(
                        filename.to_string(),
                        "Must have 5 or 6 components, but has more".to_string(),
                    ));
                }
                if !build_tag_or_python_tag.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(WheelFilenameError::InvalidWheelFileName(
                        filename.to_string(),
                        "The build tag must start with a digit".to_string(),
                    ));
                }
                (
                    Some(build_tag_or_python_tag.to_string()),
                    python_tag_or_abi_tag,
                    abi_tag_or_platform_tag,
                    platform_tag,
                )
            } else {
                (
                    None,
                    build_tag_or_python_tag,
                    python_tag_or_abi_tag,
                    abi_tag_or_platform_tag,
                )
            };

        let name = PackageName::from_str(name)
            .map_err(|err| WheelFilenameError::InvalidPackageName(filename.to_string(), err))?;
        let version = Version::from_str(version)
            .map_err(|err| WheelFilenameError::InvalidVersion(filename.to_string(), err))?;
        Ok(Self {
            name,
            version,
            build_tag,
            python_tag: python_tag.split('.').map(String::from).collect(),
            abi_tag: abi_tag.split('.').map(String::from).collect(),
            platform_tag: platform_tag.split('.').map(String::from).collect(),
        })
    }

    /// Return the [`TagCompatibility`] of the wheel with the given tags
    pub fn compatibility(&self, compatible_tags: &Tags) -> TagCompatibility {
        compatible_tags.compatibility(&self.python_tag, &self.abi_tag, &self.platform_tag)
    }

    /// Expand the compressed tag set into every `(python, abi, platform)` triple it names, in
    /// filename order.
    ///
    /// `py2.py3-none-any` expands to `py2-none-any` and `py3-none-any`.
    pub fn tags(&self) -> Vec<Tag> {
        let mut tags =
            Vec::with_capacity(self.python_tag.len() * self.abi_tag.len() * self.platform_tag.len());
        for python in &self.python_tag {
            for abi in &self.abi_tag {
                for platform in &self.platform_tag {
                    tags.push(Tag::new(python, abi, platform));
                }
            }
        }
        tags
    }

    /// Get the tag for this wheel.
    pub fn get_tag(&self) -> String {
        format!(
            "{}-{}-{}",
            self.python_tag.join("."),
            self.abi_tag.join("."),
            self.platform_tag.join(".")
        )
    }
}

impl Display for WheelFilename {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}.whl",
            self.name.as_str().replace('-', "_"),
            self.version,
            self.get_tag()
        )
    }
}

#[derive(Error, Debug, Clone)]
pub enum WheelFilenameError {
    #[error("The wheel filename \"{0}\" is invalid: {1}")]
    InvalidWheelFileName(String, String),
    #[error("The wheel filename \"{0}\" has an invalid version part: {1}")]
    InvalidVersion(String, #[source] VersionParseError),
    #[error("The wheel filename \"{0}\" has an invalid package name")]
    InvalidPackageName(String, #[source] InvalidNameError),
}

#[cfg(test)]
mod tests {
    use sieve_platform_tags::IncompatibleTag;

    use super::*;

    #[test]
    fn err_not_whl_extension() {
        let err = WheelFilename::from_str("foo.rs").unwrap_err();
        insta::assert_snapshot!(err, @r#"The wheel filename "foo.rs" is invalid: Must end with .whl"#);
    }

    #[test]
    fn err_1_part_no_version() {
        let err = WheelFilename::from_str("foo.whl").unwrap_err();
        insta::assert_snapshot!(err, @r#"The wheel filename "foo.whl" is invalid: Must have a version"#);
    }

    #[test]
    fn err_4_part_no_platformtag() {
        let err = WheelFilename::from_str("foo-version-python-abi.whl").unwrap_err();
        insta::assert_snapshot!(err, @r#"The wheel filename "foo-version-python-abi.whl" is invalid: Must have a platform tag"#);
    }

    #[test]
    fn err_too_many_parts() {
        let err =
            WheelFilename::from_str("foo-1.2.3-202-python-abi-platform-oops.whl").unwrap_err();
        insta::assert_snapshot!(err, @r#"The wheel filename "foo-1.2.3-202-python-abi-platform-oops.whl" is invalid: Must have 5 or 6 components, but has more"#);
    }

    #[test]
    fn err_build_tag_without_digit() {
        let err = WheelFilename::from_str("foo-1.2.3-build-python-abi-platform.whl").unwrap_err();
        insta::assert_snapshot!(err, @r#"The wheel filename "foo-1.2.3-build-python-abi-platform.whl" is invalid: The build tag must start with a digit"#);
    }

    #[test]
    fn err_invalid_package_name() {
        let err = WheelFilename::from_str("f!oo-1.2.3-python-abi-platform.whl").unwrap_err();
        insta::assert_snapshot!(err, @r#"The wheel filename "f!oo-1.2.3-python-abi-platform.whl" has an invalid package name"#);
    }

    #[test]
    fn err_invalid_version() {
        let err = WheelFilename::from_str("foo-x.y.z-python-abi-platform.whl").unwrap_err();
        insta::assert_snapshot!(err, @r#"The wheel filename "foo-x.y.z-python-abi-platform.whl" has an invalid version part: Version `x.y.z` doesn't match PEP 440 rules"#);
    }

    #[test]
    fn ok_build_tag() {
        let wheel = WheelFilename::from_str("foo-1.2.3-1a-python-abi-platform.whl").unwrap();
        assert_eq!(wheel.build_tag.as_deref(), Some("1a"));
        assert_eq!(wheel.get_tag(), "python-abi-platform");
    }

    #[test]
    fn expands_compressed_tags() {
        let wheel = WheelFilename::from_str("simple.dist-0.1-py2.py3-none-any.whl").unwrap();
        assert_eq!(wheel.name.as_str(), "simple-dist");
        let tags = wheel
            .tags()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(tags, ["py2-none-any", "py3-none-any"]);
        assert_eq!(wheel.to_string(), "simple_dist-0.1-py2.py3-none-any.whl");
    }

    #[test]
    fn compatibility_against_supported_tags() {
        let wheel = WheelFilename::from_str("simple.dist-0.1-py2.py3-none-any.whl").unwrap();
        let py2 = Tags::from_strs(&["py2-none-any"]).unwrap();
        let py1 = Tags::from_strs(&["py1-none-any"]).unwrap();
        assert!(wheel.compatibility(&py2).is_compatible());
        assert_eq!(
            wheel.compatibility(&py1),
            TagCompatibility::Incompatible(IncompatibleTag::Python)
        );
    }
}
