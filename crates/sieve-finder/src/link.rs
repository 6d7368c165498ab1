use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use url::Url;

use sieve_distribution_filename::WheelFilename;
use sieve_normalize::PackageName;
use sieve_pep440::Version;
use sieve_platform_tags::Tag;

/// Where a link was discovered.
///
/// Variants are declared from least to most preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkOrigin {
    /// Appended through [`crate::PackageFinder::add_dependency_links`].
    DependencyLink,
    /// Listed on the package index page for the project.
    IndexPage,
    /// A find-links location: a local directory or an explicit archive URL.
    FindLinks,
}

impl Display for LinkOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DependencyLink => f.write_str("dependency link"),
            Self::IndexPage => f.write_str("index page"),
            Self::FindLinks => f.write_str("find-links"),
        }
    }
}

/// Whether a link is a built wheel or a source distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistKind {
    SourceDist,
    Wheel(WheelFilename),
}

/// A digest algorithm accepted in a `#<algorithm>=<hex>` URL fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "md5" => Self::Md5,
            "sha1" => Self::Sha1,
            "sha224" => Self::Sha224,
            "sha256" => Self::Sha256,
            "sha384" => Self::Sha384,
            "sha512" => Self::Sha512,
            other => return Err(other.to_string()),
        })
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5 => f.write_str("md5"),
            Self::Sha1 => f.write_str("sha1"),
            Self::Sha224 => f.write_str("sha224"),
            Self::Sha256 => f.write_str("sha256"),
            Self::Sha384 => f.write_str("sha384"),
            Self::Sha512 => f.write_str("sha512"),
        }
    }
}

/// An integrity digest carried in a link's fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    pub algorithm: HashAlgorithm,
    pub digest: String,
}

impl Display for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.algorithm, self.digest)
    }
}

/// The parameters of a URL fragment such as `#md5=0123abcd&egg=bar-1.0`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub(crate) egg: Option<String>,
    pub(crate) hash: Option<Hash>,
}

impl Fragment {
    pub(crate) fn from_url(url: &Url) -> Self {
        let Some(fragment) = url.fragment() else {
            return Self::default();
        };
        let mut parsed = Self::default();
        // Split on the raw separators first so an escaped `&` or `=` stays inside its value.
        for (key, value) in fragment.split('&').filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            Some((
                percent_encoding::percent_decode_str(key).decode_utf8_lossy(),
                percent_encoding::percent_decode_str(value).decode_utf8_lossy(),
            ))
        }) {
            if key == "egg" {
                if parsed.egg.is_none() && !value.is_empty() {
                    parsed.egg = Some(value.to_string());
                }
                continue;
            }
            // Anything that isn't a known algorithm with a hex digest (like `#main`) is ignored.
            let Ok(algorithm) = HashAlgorithm::from_str(&key) else {
                continue;
            };
            if parsed.hash.is_none()
                && !value.is_empty()
                && value.chars().all(|c| c.is_ascii_hexdigit())
            {
                parsed.hash = Some(Hash {
                    algorithm,
                    digest: value.to_ascii_lowercase(),
                });
            }
        }
        parsed
    }
}

/// The unquoted final path segment of a URL, or `None` if the URL names a directory.
pub(crate) fn url_filename(url: &Url) -> Option<Cow<'_, str>> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }
    Some(percent_encoding::percent_decode_str(segment).decode_utf8_lossy())
}

/// One discoverable artifact for a project, classified and ready for comparison.
///
/// Links are only built by the finder, after the project name and version were recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub(crate) url: Url,
    pub(crate) filename: String,
    pub(crate) name: PackageName,
    pub(crate) version: Version,
    pub(crate) kind: DistKind,
    pub(crate) tags: Vec<Tag>,
    pub(crate) hash: Option<Hash>,
    pub(crate) is_egg_fragment: bool,
    pub(crate) origin: LinkOrigin,
    pub(crate) position: usize,
}

impl Link {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The final path segment of the URL, unquoted. Empty for egg fragment links to directories.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn kind(&self) -> &DistKind {
        &self.kind
    }

    pub fn is_wheel(&self) -> bool {
        matches!(self.kind, DistKind::Wheel(_))
    }

    /// The `(python, abi, platform)` triples of a wheel, in filename order. Empty for source
    /// distributions.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn hash(&self) -> Option<&Hash> {
        self.hash.as_ref()
    }

    pub fn has_hash(&self) -> bool {
        self.hash.is_some()
    }

    /// Whether the name and version came from an `#egg=` fragment instead of the filename.
    pub fn is_egg_fragment(&self) -> bool {
        self.is_egg_fragment
    }

    pub fn origin(&self) -> LinkOrigin {
        self.origin
    }

    /// The index of the link in the discovery scan across all origins.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Display for Link {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}
