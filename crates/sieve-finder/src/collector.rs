use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use url::Url;

use sieve_normalize::PackageName;

/// A link listed on a project's index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLink {
    pub url: Url,
    /// Whether the file is hosted by the index itself, as opposed to a link the index scraped
    /// from a project's homepage or download URL.
    pub internal: bool,
}

impl IndexLink {
    pub fn internal(url: Url) -> Self {
        Self {
            url,
            internal: true,
        }
    }

    pub fn external(url: Url) -> Self {
        Self {
            url,
            internal: false,
        }
    }
}

/// Supplies the already fetched links for a project.
///
/// The finder never fetches anything: pages and directories are read by the implementation.
pub trait LinkCollector {
    /// Links from find-links locations. These may include files for other projects.
    fn find_links(&self, package_name: &PackageName) -> Vec<Url>;

    /// Links from the project's index page.
    fn index_links(&self, package_name: &PackageName) -> Vec<IndexLink>;

    /// Expand a dependency link into the artifact links it stands for.
    ///
    /// By default a dependency link is itself the artifact.
    fn dependency_links(&self, url: &Url, package_name: &PackageName) -> Vec<Url> {
        let _ = package_name;
        vec![url.clone()]
    }
}

impl<T: LinkCollector + ?Sized> LinkCollector for &T {
    fn find_links(&self, package_name: &PackageName) -> Vec<Url> {
        (**self).find_links(package_name)
    }

    fn index_links(&self, package_name: &PackageName) -> Vec<IndexLink> {
        (**self).index_links(package_name)
    }

    fn dependency_links(&self, url: &Url, package_name: &PackageName) -> Vec<Url> {
        (**self).dependency_links(url, package_name)
    }
}

/// A [`LinkCollector`] over links that are already in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLinks {
    find_links: Vec<Url>,
    index: FxHashMap<PackageName, Vec<IndexLink>>,
    pages: FxHashMap<Url, Vec<Url>>,
}

impl InMemoryLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add find-links entries, searched for every project.
    #[must_use]
    pub fn with_find_links(mut self, links: impl IntoIterator<Item = Url>) -> Self {
        self.find_links.extend(links);
        self
    }

    /// Add links to a project's index page.
    #[must_use]
    pub fn with_index_links(
        mut self,
        package_name: PackageName,
        links: impl IntoIterator<Item = IndexLink>,
    ) -> Self {
        self.index.entry(package_name).or_default().extend(links);
        self
    }

    /// Register the artifact links found on a page that may be used as a dependency link.
    #[must_use]
    pub fn with_page(mut self, url: Url, links: impl IntoIterator<Item = Url>) -> Self {
        self.pages.entry(url).or_default().extend(links);
        self
    }
}

impl LinkCollector for InMemoryLinks {
    fn find_links(&self, _package_name: &PackageName) -> Vec<Url> {
        self.find_links.clone()
    }

    fn index_links(&self, package_name: &PackageName) -> Vec<IndexLink> {
        self.index.get(package_name).cloned().unwrap_or_default()
    }

    fn dependency_links(&self, url: &Url, _package_name: &PackageName) -> Vec<Url> {
        match self.pages.get(url) {
            Some(links) => links.clone(),
            None => vec![url.clone()],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FindLinksError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to convert find-links path to a URL: `{}`", .0.display())]
    InvalidPath(PathBuf),
}

/// The files of a local find-links directory, as `file://` URLs sorted by filename.
#[derive(Debug, Clone)]
pub struct FindLinksDirectory {
    path: PathBuf,
    urls: Vec<Url>,
}

impl FindLinksDirectory {
    /// Read the directory listing. Subdirectories are not descended into.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, FindLinksError> {
        let path = fs_err::canonicalize(path.as_ref())?;

        let mut files = Vec::new();
        for entry in fs_err::read_dir(&path)? {
            let entry = entry?;
            let metadata = fs_err::metadata(entry.path())?;
            if metadata.is_dir() {
                continue;
            }
            let filename = entry.file_name();
            if filename.to_str().is_none() {
                warn!(
                    "Skipping non-UTF-8 filename in find-links directory: {}",
                    filename.to_string_lossy()
                );
                continue;
            }
            files.push(entry.path());
        }
        files.sort_unstable_by(|a, b| a.file_name().cmp(&b.file_name()));

        let urls = files
            .into_iter()
            .map(|file| Url::from_file_path(&file).map_err(|()| FindLinksError::InvalidPath(file)))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Found {} files in find-links directory: {}",
            urls.len(),
            path.display()
        );
        Ok(Self { path, urls })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }
}

impl LinkCollector for FindLinksDirectory {
    fn find_links(&self, _package_name: &PackageName) -> Vec<Url> {
        self.urls.clone()
    }

    fn index_links(&self, _package_name: &PackageName) -> Vec<IndexLink> {
        Vec::new()
    }
}
