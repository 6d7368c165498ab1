use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use crate::version::{Version, VersionParseError, compare_release};

/// One of `~=` `==` `!=` `<=` `>=` `<` `>` `===`
#[derive(Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum Operator {
    /// `== 1.2.3`
    Equal,
    /// `== 1.2.*`
    EqualStar,
    /// `===` (discouraged)
    ///
    /// <https://peps.python.org/pep-0440/#arbitrary-equality>
    ExactEqual,
    /// `!= 1.2.3`
    NotEqual,
    /// `!= 1.2.*`
    NotEqualStar,
    /// `~=`
    TildeEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
}

impl Operator {
    /// Whether the operator excludes versions rather than selecting them (`!=` and `!=*`).
    pub fn is_exclusion(self) -> bool {
        matches!(self, Self::NotEqual | Self::NotEqualStar)
    }
}

impl FromStr for Operator {
    type Err = VersionSpecifierParseError;

    /// Notably, this does not know about star versions, it just assumes the base operator
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let operator = match s {
            "==" => Self::Equal,
            "===" => {
                #[cfg(feature = "tracing")]
                {
                    tracing::warn!("Using arbitrary equality (`===`) is discouraged");
                }
                Self::ExactEqual
            }
            "!=" => Self::NotEqual,
            "~=" => Self::TildeEqual,
            "<" => Self::LessThan,
            "<=" => Self::LessThanEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanEqual,
            other => return Err(VersionSpecifierParseError::InvalidOperator(other.to_string())),
        };
        Ok(operator)
    }
}

impl Display for Operator {
    /// Note the `EqualStar` is also `==`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Equal | Self::EqualStar => "==",
            Self::ExactEqual => "===",
            Self::NotEqual | Self::NotEqualStar => "!=",
            Self::TildeEqual => "~=",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
        };
        write!(f, "{operator}")
    }
}

/// An error that occurs when parsing a single [`VersionSpecifier`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum VersionSpecifierParseError {
    /// The operator is not one of the PEP 440 comparison operators.
    #[error("No such comparison operator `{0}`, must be one of ~= == != <= >= < > ===")]
    InvalidOperator(String),
    /// The version part failed to parse.
    #[error(transparent)]
    InvalidVersion(#[from] VersionParseError),
    /// The input ended before an operator was found.
    #[error("Unexpected end of version specifier, expected operator")]
    MissingOperator,
    /// The input ended before a version was found.
    #[error("Unexpected end of version specifier, expected version")]
    MissingVersion,
    /// Unparsed text follows the version.
    #[error("Trailing `{0}` is not allowed")]
    InvalidTrailing(String),
    /// A local version segment with an operator that doesn't allow it.
    #[error("Operator {0} is incompatible with versions containing non-empty local segments")]
    OperatorLocalCombo(Operator),
    /// A wildcard version with an operator that doesn't allow it.
    #[error("Operator {0} cannot be used with a wildcard version specifier")]
    OperatorWithStar(Operator),
    /// `~=` with a single release segment.
    #[error("The ~= operator requires at least two segments in the release version")]
    CompatibleRelease,
}

/// A version range such as `>1.2.3`, `<=4!5.6.7-a8.post9.dev0` or `== 4.1.*`.
///
/// ```rust
/// use std::str::FromStr;
/// use sieve_pep440::{Version, VersionSpecifier};
///
/// let version = Version::from_str("1.19").unwrap();
/// let version_specifier = VersionSpecifier::from_str("== 1.*").unwrap();
/// assert!(version_specifier.contains(&version));
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct VersionSpecifier {
    operator: Operator,
    version: Version,
}

impl VersionSpecifier {
    /// Build from parts, validating that the operator is allowed with that version.
    pub fn new(
        operator: Operator,
        version: Version,
        star: bool,
    ) -> Result<Self, VersionSpecifierParseError> {
        let operator = if star {
            match operator {
                Operator::Equal => Operator::EqualStar,
                Operator::NotEqual => Operator::NotEqualStar,
                other => return Err(VersionSpecifierParseError::OperatorWithStar(other)),
            }
        } else {
            operator
        };

        // "Except where specifically noted below, local version identifiers MUST NOT be
        // permitted in version specifiers"
        if version.is_local()
            && !matches!(
                operator,
                Operator::Equal | Operator::NotEqual | Operator::ExactEqual
            )
        {
            return Err(VersionSpecifierParseError::OperatorLocalCombo(operator));
        }

        if operator == Operator::TildeEqual && version.release().len() < 2 {
            return Err(VersionSpecifierParseError::CompatibleRelease);
        }

        Ok(Self { operator, version })
    }

    /// Get the operator, e.g. `>=` in `>= 2.0.0`
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Get the version, e.g. `2.0.0` in `<= 2.0.0`
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Whether the version marker includes a prerelease.
    pub fn any_prerelease(&self) -> bool {
        self.version.any_prerelease()
    }

    /// Whether the given version satisfies the version range.
    ///
    /// e.g. `>=1.19,<2.0` and `1.21` -> true
    /// <https://peps.python.org/pep-0440/#version-specifiers>
    ///
    /// Unlike `pypa/packaging`, this does not allow `<3.0` to match `3.0.dev0`, and
    /// pre-release filtering is left to the caller.
    pub fn contains(&self, version: &Version) -> bool {
        // "Except where specifically noted below, local version identifiers MUST NOT be permitted
        // in version specifiers, and local version labels MUST be ignored entirely when checking
        // if candidate versions match a given version specifier."
        let this = &self.version;
        let other = if this.is_local() {
            version.clone()
        } else {
            version.without_local()
        };

        match self.operator {
            Operator::Equal => other == *this,
            Operator::EqualStar => {
                this.epoch() == other.epoch()
                    && this
                        .release()
                        .iter()
                        .zip(other.release().iter().chain(std::iter::repeat(&0)))
                        .all(|(this, other)| this == other)
            }
            Operator::ExactEqual => this.to_string() == version.to_string(),
            Operator::NotEqual => other != *this,
            Operator::NotEqualStar => {
                this.epoch() != other.epoch()
                    || !this
                        .release()
                        .iter()
                        .zip(other.release().iter().chain(std::iter::repeat(&0)))
                        .all(|(this, other)| this == other)
            }
            Operator::TildeEqual => {
                // "For a given release identifier V.N, the compatible release clause is
                // approximately equivalent to the pair of comparison clauses: `>= V.N, == V.*`"
                if this.epoch() != other.epoch() {
                    return false;
                }
                let prefix = &this.release()[..this.release().len() - 1];
                if !prefix
                    .iter()
                    .zip(other.release().iter().chain(std::iter::repeat(&0)))
                    .all(|(this, other)| this == other)
                {
                    return false;
                }
                other >= *this
            }
            Operator::GreaterThan => Self::greater_than(this, &other),
            Operator::GreaterThanEqual => Self::greater_than(this, &other) || other >= *this,
            Operator::LessThan => {
                Self::less_than(this, &other)
                    && !(compare_release(this.release(), other.release()) == Ordering::Equal
                        && other.any_prerelease())
            }
            Operator::LessThanEqual => Self::less_than(this, &other) || other <= *this,
        }
    }

    fn less_than(this: &Version, other: &Version) -> bool {
        if other.epoch() < this.epoch() {
            return true;
        }

        // `<3.1` must not match `3.1.dev0` unless the specifier itself is a pre-release,
        // but it does match `3.0.dev0`.
        if !this.any_prerelease()
            && other.is_pre()
            && compare_release(this.release(), other.release()) == Ordering::Equal
        {
            return false;
        }

        other < this
    }

    fn greater_than(this: &Version, other: &Version) -> bool {
        if other.epoch() > this.epoch() {
            return true;
        }

        if compare_release(this.release(), other.release()) == Ordering::Equal {
            // `>3.1` must not match `3.1.post0` unless the specifier itself is a post release.
            if !this.is_post() && other.is_post() {
                return false;
            }
            if other.is_local() {
                return false;
            }
        }

        other > this
    }
}

impl FromStr for VersionSpecifier {
    type Err = VersionSpecifierParseError;

    /// Parses a version such as `>= 1.19`, `== 1.1.*`,`~=1.0+abc.5` or `<=1!2012.2`
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut s = unscanny::Scanner::new(spec);
        s.eat_while(char::is_whitespace);
        // operator but we don't know yet if it has a star
        let operator = s.eat_while(['=', '!', '~', '<', '>']);
        if operator.is_empty() {
            return Err(VersionSpecifierParseError::MissingOperator);
        }
        let operator = Operator::from_str(operator)?;
        s.eat_while(char::is_whitespace);
        let version = s.eat_while(|c: char| !c.is_whitespace());
        if version.is_empty() {
            return Err(VersionSpecifierParseError::MissingVersion);
        }
        let (version, star) = Version::from_str_star(version)?;
        let version_specifier = Self::new(operator, version, star)?;
        s.eat_while(char::is_whitespace);
        if !s.done() {
            return Err(VersionSpecifierParseError::InvalidTrailing(
                s.after().to_string(),
            ));
        }
        Ok(version_specifier)
    }
}

impl Display for VersionSpecifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.operator == Operator::EqualStar || self.operator == Operator::NotEqualStar {
            return write!(f, "{}{}.*", self.operator, self.version);
        }
        write!(f, "{}{}", self.operator, self.version)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VersionSpecifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for VersionSpecifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A thin wrapper around `Vec<VersionSpecifier>` with a serde implementation
///
/// ```rust
/// use std::str::FromStr;
/// use sieve_pep440::{VersionSpecifiers, Version, Operator};
///
/// let version = Version::from_str("1.19").unwrap();
/// let version_specifiers = VersionSpecifiers::from_str(">=1.16, <2.0").unwrap();
/// assert!(version_specifiers.contains(&version));
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct VersionSpecifiers(Vec<VersionSpecifier>);

impl Deref for VersionSpecifiers {
    type Target = [VersionSpecifier];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl VersionSpecifiers {
    /// Matches all versions.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Whether all specifiers match the given version.
    pub fn contains(&self, version: &Version) -> bool {
        self.iter().all(|specifier| specifier.contains(version))
    }
}

impl FromIterator<VersionSpecifier> for VersionSpecifiers {
    fn from_iter<T: IntoIterator<Item = VersionSpecifier>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<VersionSpecifier> for VersionSpecifiers {
    fn from(specifier: VersionSpecifier) -> Self {
        Self(vec![specifier])
    }
}

impl FromStr for VersionSpecifiers {
    type Err = VersionSpecifiersParseError;

    /// Parse a list of specifiers such as `>= 1.0, != 1.3.*, < 2.0`.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        if spec.trim().is_empty() {
            return Ok(Self::empty());
        }
        let mut specifiers = Vec::new();
        let mut start: usize = 0;
        for part in spec.split(',') {
            let specifier =
                VersionSpecifier::from_str(part).map_err(|err| VersionSpecifiersParseError {
                    err,
                    line: spec.to_string(),
                    start,
                    end: start + part.len(),
                })?;
            specifiers.push(specifier);
            start += part.len() + ','.len_utf8();
        }
        Ok(Self(specifiers))
    }
}

impl Display for VersionSpecifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, version_specifier) in self.0.iter().enumerate() {
            // Separate version specifiers by comma, but we need one comma less than there are
            // specifiers
            if idx == 0 {
                write!(f, "{version_specifier}")?;
            } else {
                write!(f, ", {version_specifier}")?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VersionSpecifiers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for VersionSpecifiers {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Error with span information (unicode width) inside the parsed line
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct VersionSpecifiersParseError {
    err: VersionSpecifierParseError,
    line: String,
    start: usize,
    end: usize,
}

impl VersionSpecifiersParseError {
    /// The error for the individual specifier that failed.
    pub fn inner(&self) -> &VersionSpecifierParseError {
        &self.err
    }
}

impl Display for VersionSpecifiersParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Failed to parse version: {}:", self.err)?;
        writeln!(f, "{}", self.line)?;
        let indent = self.line[..self.start].chars().count();
        let point = self.line[self.start..self.end].chars().count();
        write!(f, "{}{}", " ".repeat(indent), "^".repeat(point))?;
        Ok(())
    }
}

impl std::error::Error for VersionSpecifiersParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{Operator, Version, VersionSpecifier, VersionSpecifierParseError, VersionSpecifiers};

    fn matches(specifier: &str, version: &str) -> bool {
        VersionSpecifier::from_str(specifier)
            .unwrap()
            .contains(&Version::from_str(version).unwrap())
    }

    #[test]
    fn operators_true() {
        let pairs = [
            ("==2.0", "2.0"),
            ("==2.0", "2.0+deadbeef"),
            ("==2.*", "2.0"),
            ("==2.1.*", "2.1"),
            ("==2.1.*", "2.1.post3"),
            ("!=2.0", "2.1"),
            ("!=2.0.*", "2.1"),
            ("~=2.0", "2.1"),
            ("~=2.0", "2.0.post1"),
            ("~=2.2.0", "2.2.1"),
            (">=2.0", "2.0"),
            (">=2.0", "2.0.post1"),
            (">=2.0", "3.0a1"),
            (">=0.0.dev0", "2.0b1"),
            ("<=2.0", "2.0"),
            ("<=2.0", "1.9"),
            ("<2.0", "1.9"),
            ("<2.0", "1.0.dev0"),
            (">2.0", "2.1"),
            (">2.0.post1", "2.0.post2"),
            ("<2.0.dev1", "1.0"),
            ("===1.0", "1.0"),
        ];
        for (specifier, version) in pairs {
            assert!(matches(specifier, version), "{specifier} {version}");
        }
    }

    #[test]
    fn operators_false() {
        let pairs = [
            ("==2.0", "2.1"),
            ("==2.1.*", "2.0"),
            ("!=2.0", "2.0"),
            ("!=2.0.*", "2.0.1"),
            ("~=2.0", "1.0"),
            ("~=2.0", "3.0"),
            ("~=2.2.0", "2.3.0"),
            (">=2.0", "1.9"),
            ("<=2.0", "2.0.post1"),
            ("<2.0", "2.0"),
            ("<2.0", "2.0.dev1"),
            ("<2.0", "2.0b1"),
            (">2.0", "2.0"),
            (">2.0", "2.0.post1"),
            (">2.0", "2.0+local"),
            ("==1!2.0", "2.0"),
        ];
        for (specifier, version) in pairs {
            assert!(!matches(specifier, version), "{specifier} {version}");
        }
    }

    #[test]
    fn specifiers() {
        let specifiers = VersionSpecifiers::from_str(">= 1.0, != 1.3.*, < 2.0").unwrap();
        assert_eq!(specifiers.len(), 3);
        assert_eq!(*specifiers[1].operator(), Operator::NotEqualStar);
        assert!(specifiers.contains(&Version::from_str("1.2").unwrap()));
        assert!(!specifiers.contains(&Version::from_str("1.3.1").unwrap()));
        assert!(!specifiers.contains(&Version::from_str("2.0").unwrap()));
        assert_eq!(specifiers.to_string(), ">=1.0, !=1.3.*, <2.0");
        assert!(VersionSpecifiers::from_str("").unwrap().is_empty());
    }

    #[test]
    fn any_prerelease() {
        let specifiers = VersionSpecifiers::from_str(">=0.0.dev0").unwrap();
        assert!(specifiers[0].any_prerelease());
        let specifiers = VersionSpecifiers::from_str(">=1.0").unwrap();
        assert!(!specifiers[0].any_prerelease());
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            VersionSpecifier::from_str("1.0").unwrap_err(),
            VersionSpecifierParseError::MissingOperator
        );
        assert_eq!(
            VersionSpecifier::from_str(">=").unwrap_err(),
            VersionSpecifierParseError::MissingVersion
        );
        assert_eq!(
            VersionSpecifier::from_str("~=1").unwrap_err(),
            VersionSpecifierParseError::CompatibleRelease
        );
        assert_eq!(
            VersionSpecifier::from_str(">=1.0.*").unwrap_err(),
            VersionSpecifierParseError::OperatorWithStar(Operator::GreaterThanEqual)
        );
        assert_eq!(
            VersionSpecifier::from_str(">=1.0+local").unwrap_err(),
            VersionSpecifierParseError::OperatorLocalCombo(Operator::GreaterThanEqual)
        );
        assert_eq!(
            VersionSpecifier::from_str("== 1.0 extra").unwrap_err(),
            VersionSpecifierParseError::InvalidTrailing("extra".to_string())
        );
        insta::assert_snapshot!(
            VersionSpecifier::from_str("=> 1.0").unwrap_err(),
            @"No such comparison operator `=>`, must be one of ~= == != <= >= < > ==="
        );
    }

    #[test]
    fn specifiers_error_points_at_failing_part() {
        let err = VersionSpecifiers::from_str(">=1.0, <>2.0").unwrap_err();
        insta::assert_snapshot!(err, @r"
        Failed to parse version: No such comparison operator `<>`, must be one of ~= == != <= >= < > ===:
        >=1.0, <>2.0
              ^^^^^^
        ");
    }
}
