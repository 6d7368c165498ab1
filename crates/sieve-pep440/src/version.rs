use std::cmp::{Ordering, max};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::iter;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// The PEP 440 version regex from
/// <https://peps.python.org/pep-0440/#appendix-b-parsing-version-strings-with-regular-expressions>,
/// extended with a trailing `.*` for use in specifiers.
const VERSION_RE_INNER: &str = r"
(?:
    (?:v?)                                            # <https://peps.python.org/pep-0440/#preceding-v-character>
    (?:(?P<epoch>[0-9]+)!)?                           # epoch
    (?P<release>[0-9]+(?:\.[0-9]+)*)                  # release segment
    (?P<pre_field>                                    # pre-release
        [-_\.]?
        (?P<pre_name>(alpha|beta|preview|pre|rc|a|b|c))
        [-_\.]?
        (?P<pre>[0-9]+)?
    )?
    (?P<post_field>                                   # post release
        (?:-(?P<post_old>[0-9]+))
        |
        (?:
            [-_\.]?
            (?P<post_l>post|rev|r)
            [-_\.]?
            (?P<post_new>[0-9]+)?
        )
    )?
    (?P<dev_field>                                    # dev release
        [-_\.]?
        (?P<dev_l>dev)
        [-_\.]?
        (?P<dev>[0-9]+)?
    )?
)
(?:\+(?P<local>[a-z0-9]+(?:[-_\.][a-z0-9]+)*))?       # local version
(?P<trailing_dot_star>\.\*)?                          # allow for version matching `.*`
";

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?xi)^(?:\s*){VERSION_RE_INNER}(?:\s*)$"))
        .expect("the PEP 440 version regex is valid")
});

/// An error that occurs when parsing a [`Version`] string fails.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum VersionParseError {
    /// The string doesn't match the PEP 440 grammar.
    #[error("Version `{0}` doesn't match PEP 440 rules")]
    Grammar(String),
    /// A numeric component doesn't fit in a `u64`.
    #[error("Couldn't parse `{number}` as a number in the {field} of `{version}`")]
    Number {
        /// The full version string.
        version: String,
        /// The field the number belongs to.
        field: &'static str,
        /// The offending digits.
        number: String,
    },
    /// A trailing `.*` on a version that must be exact.
    #[error("A star (`*`) must not be used in a fixed version: `{0}`")]
    UnexpectedStar(String),
    /// A trailing `.*` combined with a suffix that forbids it.
    #[error("You can't have both a trailing `.*` and a {0} version")]
    StarWithSuffix(&'static str),
}

/// Optional pre-release modifier (alpha, beta or release candidate) appended to a version.
///
/// <https://peps.python.org/pep-0440/#pre-releases>
#[derive(PartialEq, Eq, Debug, Hash, Clone, Copy, Ord, PartialOrd)]
pub enum PrereleaseKind {
    /// alpha pre-release
    Alpha,
    /// beta pre-release
    Beta,
    /// release candidate pre-release
    Rc,
}

impl PrereleaseKind {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Some(Self::Alpha),
            "b" | "beta" => Some(Self::Beta),
            "c" | "rc" | "pre" | "preview" => Some(Self::Rc),
            _ => None,
        }
    }
}

impl Display for PrereleaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alpha => write!(f, "a"),
            Self::Beta => write!(f, "b"),
            Self::Rc => write!(f, "rc"),
        }
    }
}

/// A part of the [local version identifier](<https://peps.python.org/pep-0440/#local-version-identifiers>).
///
/// Numeric segments compare as integers and always sort above alphanumeric segments, which compare
/// case-insensitively. A longer local version sorts above a shorter one it starts with.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum LocalSegment {
    /// Not-parseable as integer segment of local version
    String(String),
    /// Inferred integer segment of local version
    Number(u64),
}

impl Display for LocalSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(string) => write!(f, "{string}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl PartialOrd for LocalSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LocalSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(n1), Self::Number(n2)) => n1.cmp(n2),
            (Self::String(s1), Self::String(s2)) => s1.cmp(s2),
            (Self::Number(_), Self::String(_)) => Ordering::Greater,
            (Self::String(_), Self::Number(_)) => Ordering::Less,
        }
    }
}

/// A version number such as `1.2.3` or `4!5.6.7-a8.post9.dev0`.
///
/// Beware that the sorting implemented with [`Ord`] and [`Eq`] is not consistent with the
/// operators from PEP 440: comparing two versions with `>` gives a different result than a
/// `VersionSpecifier` with `>` as operator.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PrereleaseKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Vec<LocalSegment>,
}

impl Version {
    /// Create a final release such as `3.8` from its release segments.
    pub fn new(release: impl IntoIterator<Item = u64>) -> Self {
        Self {
            epoch: 0,
            release: release.into_iter().collect(),
            pre: None,
            post: None,
            dev: None,
            local: Vec::new(),
        }
    }

    /// Set the epoch.
    #[must_use]
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Set the pre-release component.
    #[must_use]
    pub fn with_pre(mut self, pre: Option<(PrereleaseKind, u64)>) -> Self {
        self.pre = pre;
        self
    }

    /// Set the post-release component.
    #[must_use]
    pub fn with_post(mut self, post: Option<u64>) -> Self {
        self.post = post;
        self
    }

    /// Set the dev-release component.
    #[must_use]
    pub fn with_dev(mut self, dev: Option<u64>) -> Self {
        self.dev = dev;
        self
    }

    /// The [versioning epoch](https://peps.python.org/pep-0440/#version-epochs).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The release segments, such as `1.2.3` in `4!1.2.3-a8.post9.dev1`.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// The [pre-release](https://peps.python.org/pep-0440/#pre-releases) kind and number.
    pub fn pre(&self) -> Option<(PrereleaseKind, u64)> {
        self.pre
    }

    /// The [post-release](https://peps.python.org/pep-0440/#post-releases) number.
    pub fn post(&self) -> Option<u64> {
        self.post
    }

    /// The [developmental release](https://peps.python.org/pep-0440/#developmental-releases) number.
    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    /// The [local version](https://peps.python.org/pep-0440/#local-version-identifiers) segments.
    pub fn local(&self) -> &[LocalSegment] {
        &self.local
    }

    /// Whether this is an alpha/beta/rc or dev version
    pub fn any_prerelease(&self) -> bool {
        self.is_pre() || self.is_dev()
    }

    /// Whether this is an alpha/beta/rc version
    pub fn is_pre(&self) -> bool {
        self.pre.is_some()
    }

    /// Whether this is a dev version
    pub fn is_dev(&self) -> bool {
        self.dev.is_some()
    }

    /// Whether this is a post version
    pub fn is_post(&self) -> bool {
        self.post.is_some()
    }

    /// Whether this is a local version (e.g. `1.2.3+localsuffixesareweird`)
    pub fn is_local(&self) -> bool {
        !self.local.is_empty()
    }

    /// For PEP 440 specifier matching: local version labels MUST be ignored entirely when
    /// checking if candidate versions match a given version specifier.
    #[must_use]
    pub(crate) fn without_local(&self) -> Self {
        Self {
            local: Vec::new(),
            ..self.clone()
        }
    }

    /// Like [`Version::from_str`], but also allows the version to end with a `.*` and returns
    /// whether it did. This variant is for use in specifiers.
    ///  * `1.2.3` -> false
    ///  * `1.2.3.*` -> true
    ///  * `1.2.*.4` -> err
    ///  * `1.0-dev1.*` -> err
    pub fn from_str_star(version: &str) -> Result<(Self, bool), VersionParseError> {
        let captures = VERSION_RE
            .captures(version)
            .ok_or_else(|| VersionParseError::Grammar(version.to_string()))?;
        Self::parse_captures(version, &captures)
    }

    fn parse_captures(
        input: &str,
        captures: &Captures,
    ) -> Result<(Self, bool), VersionParseError> {
        let number_field = |field: &'static str| -> Result<Option<u64>, VersionParseError> {
            let Some(digits) = captures.name(field) else {
                return Ok(None);
            };
            digits
                .as_str()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| VersionParseError::Number {
                    version: input.to_string(),
                    field,
                    number: digits.as_str().to_string(),
                })
        };

        // "If no explicit epoch is given, the implicit epoch is 0"
        let epoch = number_field("epoch")?.unwrap_or_default();
        let pre = match captures.name("pre_name") {
            Some(label) => {
                let kind = PrereleaseKind::from_label(label.as_str())
                    .ok_or_else(|| VersionParseError::Grammar(input.to_string()))?;
                // <https://peps.python.org/pep-0440/#implicit-pre-release-number>
                Some((kind, number_field("pre")?.unwrap_or_default()))
            }
            None => None,
        };
        let post = if captures.name("post_field").is_some() {
            Some(
                number_field("post_new")?
                    .or(number_field("post_old")?)
                    .unwrap_or_default(),
            )
        } else {
            None
        };
        let dev = if captures.name("dev_field").is_some() {
            // <https://peps.python.org/pep-0440/#implicit-development-release-number>
            Some(number_field("dev")?.unwrap_or_default())
        } else {
            None
        };
        let local: Vec<LocalSegment> = captures
            .name("local")
            .map(|local| {
                local
                    .as_str()
                    .split(['-', '_', '.'])
                    .map(|segment| match segment.parse::<u64>() {
                        Ok(number) => LocalSegment::Number(number),
                        Err(_) => LocalSegment::String(segment.to_lowercase()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let release = captures
            .name("release")
            .ok_or_else(|| VersionParseError::Grammar(input.to_string()))?
            .as_str()
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| VersionParseError::Number {
                        version: input.to_string(),
                        field: "release",
                        number: segment.to_string(),
                    })
            })
            .collect::<Result<Vec<u64>, _>>()?;

        let star = captures.name("trailing_dot_star").is_some();
        if star {
            if pre.is_some() {
                return Err(VersionParseError::StarWithSuffix("pre-release"));
            }
            if post.is_some() {
                return Err(VersionParseError::StarWithSuffix("post"));
            }
            if dev.is_some() {
                return Err(VersionParseError::StarWithSuffix("dev"));
            }
            if !local.is_empty() {
                return Err(VersionParseError::StarWithSuffix("local"));
            }
        }

        let version = Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        };
        Ok((version, star))
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    /// Parses a version such as `1.19`, `1.0a1`,`1.0+abc.5` or `1!2012.2`.
    ///
    /// This variant doesn't allow the version to end with a star, see [`Version::from_str_star`]
    /// for specifiers.
    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let (parsed, star) = Self::from_str_star(version)?;
        if star {
            return Err(VersionParseError::UnexpectedStar(version.to_string()));
        }
        Ok(parsed)
    }
}

/// Shows normalized version
impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release = self
            .release
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(".");
        write!(f, "{release}")?;
        if let Some((kind, number)) = self.pre {
            write!(f, "{kind}{number}")?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{post}")?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }
        if !self.local.is_empty() {
            let local = self
                .local
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(".");
            write!(f, "+{local}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Compare the release parts of two versions, e.g. `4.3.1` > `4.2`, `1.1.0` == `1.1` and
/// `1.16` < `1.19`
pub(crate) fn compare_release(this: &[u64], other: &[u64]) -> Ordering {
    // "When comparing release segments with different numbers of components, the shorter segment
    // is padded out with additional zeros as necessary"
    let len = max(this.len(), other.len());
    this.iter()
        .chain(iter::repeat(&0))
        .zip(other.iter().chain(iter::repeat(&0)))
        .take(len)
        .map(|(this, other)| this.cmp(other))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Compare the parts attached after the release, given equal release.
///
/// The order of suffixes is `.devN, aN, bN, rcN, <no suffix (final)>, .postN`, but dev and post
/// releases can also be attached to pre-releases, so the key is:
/// `({dev: 0, a: 1, b: 2, rc: 3, (): 4, post: 5}, <preN>, <postN or None as smallest>,
/// <devN or Max as largest>, <local>)`
fn sortable_tuple(version: &Version) -> (u64, u64, Option<u64>, u64, &[LocalSegment]) {
    let local = version.local.as_slice();
    match (version.pre, version.post, version.dev) {
        // dev release
        (None, None, Some(n)) => (0, 0, None, n, local),
        (Some((kind, n)), post, dev) => {
            let rank = match kind {
                PrereleaseKind::Alpha => 1,
                PrereleaseKind::Beta => 2,
                PrereleaseKind::Rc => 3,
            };
            (rank, n, post, dev.unwrap_or(u64::MAX), local)
        }
        // final release
        (None, None, None) => (4, 0, None, 0, local),
        // post release
        (None, Some(post), dev) => (5, 0, Some(post), dev.unwrap_or(u64::MAX), local),
    }
}

impl PartialEq<Self> for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    /// Trailing zeros are skipped since `PartialEq` zero pads.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        for segment in self.release.iter().rev().skip_while(|segment| **segment == 0) {
            segment.hash(state);
        }
        self.pre.hash(state);
        self.dev.hash(state);
        self.post.hash(state);
        self.local.hash(state);
    }
}

impl PartialOrd<Self> for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    /// 1.0.dev456 < 1.0a1 < 1.0a2.dev456 < 1.0a12.dev456 < 1.0a12 < 1.0b1.dev456 < 1.0b2
    /// < 1.0b2.post345.dev456 < 1.0b2.post345 < 1.0b2-346 < 1.0c1.dev456 < 1.0c1 < 1.0rc2 < 1.0c3
    /// < 1.0 < 1.0.post456.dev34 < 1.0.post456
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_release(&self.release, &other.release))
            .then_with(|| sortable_tuple(self).cmp(&sortable_tuple(other)))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{LocalSegment, Version, VersionParseError};

    /// <https://github.com/pypa/packaging/blob/237ff3aa348486cf835a980592af3a59fccd6101/tests/test_version.py#L24-L81>
    #[test]
    fn packaging_versions_are_sorted() {
        let versions = [
            "1.0.dev456",
            "1.0a1",
            "1.0a2.dev456",
            "1.0a12.dev456",
            "1.0a12",
            "1.0b1.dev456",
            "1.0b2",
            "1.0b2.post345.dev456",
            "1.0b2.post345",
            "1.0b2-346",
            "1.0c1.dev456",
            "1.0c1",
            "1.0rc2",
            "1.0c3",
            "1.0",
            "1.0.post456.dev34",
            "1.0.post456",
            "1.1.dev1",
            "1.2+123abc",
            "1.2+123abc456",
            "1.2+abc",
            "1.2+abc123",
            "1.2+abc123def",
            "1.2+1234.abc",
            "1.2+123456",
            "1.2.r32+123456",
            "1.2.rev33+123456",
            "1!1.0.dev456",
            "1!1.0a1",
            "1!1.0",
            "1!1.0.post456",
        ];
        let parsed = versions
            .iter()
            .map(|version| Version::from_str(version).unwrap())
            .collect::<Vec<_>>();
        for pair in parsed.windows(2) {
            assert!(pair[0] < pair[1], "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn final_beats_pre_and_dev() {
        let final_release = Version::from_str("2.0").unwrap();
        let rc = Version::from_str("2.0rc1").unwrap();
        let beta = Version::from_str("2.0b1").unwrap();
        let alpha = Version::from_str("2.0a1").unwrap();
        let dev = Version::from_str("2.0.dev1").unwrap();
        assert!(final_release > rc && rc > beta && beta > alpha && alpha > dev);
        assert!(beta.any_prerelease());
        assert!(dev.any_prerelease());
        assert!(!final_release.any_prerelease());
    }

    #[test]
    fn normalization() {
        let versions = [
            ("1.0dev", "1.0.dev0"),
            ("1.0-DEV1", "1.0.dev1"),
            ("1.0.a1", "1.0a1"),
            ("1.0ALPHA", "1.0a0"),
            ("1.0-beta1", "1.0b1"),
            ("1.0c", "1.0rc0"),
            ("1.0.preview2", "1.0rc2"),
            ("1.0post", "1.0.post0"),
            ("1.0-5", "1.0.post5"),
            ("1.0.rev1", "1.0.post1"),
            ("1.0+AbC", "1.0+abc"),
            ("1.01", "1.1"),
            ("1.0rc09", "1.0rc9"),
            ("00!1.2", "1.2"),
            ("0100!0.0", "100!0.0"),
            ("v1.0", "1.0"),
            ("   v1.0\t\n", "1.0"),
        ];
        for (version_str, normalized_str) in versions {
            let version = Version::from_str(version_str).unwrap();
            let normalized = Version::from_str(normalized_str).unwrap();
            assert_eq!(version, normalized, "{version_str} {normalized_str}");
            assert_eq!(version.to_string(), normalized_str, "{version_str}");
        }
    }

    #[test]
    fn trailing_zeros_are_equal() {
        assert_eq!(
            Version::from_str("1.0.0").unwrap(),
            Version::from_str("1").unwrap()
        );
        assert_eq!(Version::from_str("1.0.0").unwrap(), Version::new([1]));
    }

    #[test]
    fn failures() {
        for version in ["french toast", "1.0+a+", "1.0++", "1.0+_foobar", "1.0+1+1", ""] {
            assert_eq!(
                Version::from_str(version).unwrap_err(),
                VersionParseError::Grammar(version.to_string())
            );
        }
    }

    #[test]
    fn local_segments() {
        let version = Version::from_str("1.0+Ubuntu-1_2.05").unwrap();
        assert!(version.is_local());
        assert_eq!(
            version.local(),
            [
                LocalSegment::String("ubuntu".to_string()),
                LocalSegment::Number(1),
                LocalSegment::Number(2),
                LocalSegment::Number(5),
            ]
        );
        assert_eq!(version.to_string(), "1.0+ubuntu.1.2.5");
        assert!(Version::from_str("1.0").unwrap().local().is_empty());
        insta::assert_snapshot!(
            Version::from_str_star("1.0+local.*").unwrap_err(),
            @"You can't have both a trailing `.*` and a local version"
        );
    }

    #[test]
    fn star() {
        assert!(!Version::from_str_star("1.2.3").unwrap().1);
        assert!(Version::from_str_star("1.2.3.*").unwrap().1);
        insta::assert_snapshot!(
            Version::from_str("0.9.1.*").unwrap_err(),
            @"A star (`*`) must not be used in a fixed version: `0.9.1.*`"
        );
        insta::assert_snapshot!(
            Version::from_str_star("1.0-dev1.*").unwrap_err(),
            @"You can't have both a trailing `.*` and a dev version"
        );
        insta::assert_snapshot!(
            Version::from_str_star("1.0a1.*").unwrap_err(),
            @"You can't have both a trailing `.*` and a pre-release version"
        );
        insta::assert_snapshot!(
            Version::from_str("blergh").unwrap_err(),
            @"Version `blergh` doesn't match PEP 440 rules"
        );
    }
}
