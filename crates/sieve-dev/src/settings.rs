use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use sieve_finder::{FindLinksDirectory, FinderOptions, InMemoryLinks, IndexLink};
use sieve_normalize::PackageName;
use sieve_platform_tags::{Tag, Tags, TagsError};

/// The contents of a `sieve.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) finder: FinderOptions,
    /// The target's tags, most preferred first.
    pub(crate) supported_tags: Vec<Tag>,
    /// Local find-links directories, relative to the settings file.
    pub(crate) find_links: Vec<PathBuf>,
    /// Links listed on project index pages.
    pub(crate) index: Vec<IndexEntry>,
    /// Pages that dependency links may point at, with the artifacts they list.
    pub(crate) pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct IndexEntry {
    pub(crate) project: PackageName,
    pub(crate) url: Url,
    #[serde(default = "hosted_by_index")]
    pub(crate) internal: bool,
}

fn hosted_by_index() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct PageEntry {
    pub(crate) url: Url,
    pub(crate) links: Vec<Url>,
}

impl Settings {
    pub(crate) fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = fs_err::read_to_string(path)?;
        let settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub(crate) fn tags(&self) -> Result<Tags, TagsError> {
        Tags::new(self.supported_tags.clone())
    }

    /// Read the find-links directories and gather every listed link into one collector.
    pub(crate) fn collector(&self, root: &Path) -> anyhow::Result<InMemoryLinks> {
        let mut collector = InMemoryLinks::new();
        for directory in &self.find_links {
            let directory = root.join(directory);
            let find_links = FindLinksDirectory::read(&directory).with_context(|| {
                format!(
                    "Failed to read find-links directory `{}`",
                    directory.display()
                )
            })?;
            collector = collector.with_find_links(find_links.urls().iter().cloned());
        }
        for entry in &self.index {
            let link = IndexLink {
                url: entry.url.clone(),
                internal: entry.internal,
            };
            collector = collector.with_index_links(entry.project.clone(), [link]);
        }
        for page in &self.pages {
            collector = collector.with_page(page.url.clone(), page.links.iter().cloned());
        }
        Ok(collector)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use indoc::indoc;

    use sieve_finder::LinkCollector;
    use sieve_normalize::PackageName;

    use super::Settings;

    #[test]
    fn parse() {
        let settings: Settings = toml::from_str(indoc! {r#"
            supported-tags = ["py3-none-any", "py2-none-any"]

            [finder]
            allow-external = ["bar"]
            allow-all-insecure = true

            [[index]]
            project = "bar"
            url = "https://pypi.example.org/packages/bar-1.0.tar.gz#md5=d41d8cd98f00b204e9800998ecf8427e"

            [[index]]
            project = "bar"
            url = "https://bar.example.org/bar-2.0.tar.gz"
            internal = false
        "#})
        .unwrap();

        assert!(settings.finder.use_wheel);
        assert!(settings.finder.allow_all_insecure);
        assert_eq!(settings.supported_tags.len(), 2);
        let collector = settings.collector(std::path::Path::new(".")).unwrap();
        let links = collector.index_links(&PackageName::from_str("bar").unwrap());
        assert_eq!(
            links.iter().map(|link| link.internal).collect::<Vec<_>>(),
            [true, false]
        );
    }

    #[test]
    fn find_links_relative_to_root() {
        let root = tempfile::tempdir().unwrap();
        fs_err::create_dir(root.path().join("wheels")).unwrap();
        fs_err::write(root.path().join("wheels").join("simple-1.0.tar.gz"), b"").unwrap();

        let settings: Settings = toml::from_str(r#"find-links = ["wheels"]"#).unwrap();
        let collector = settings.collector(root.path()).unwrap();
        let links = collector.find_links(&PackageName::from_str("simple").unwrap());
        assert_eq!(links.len(), 1);
        assert!(links[0].path().ends_with("/wheels/simple-1.0.tar.gz"));
    }

    #[test]
    fn unknown_field() {
        let err = toml::from_str::<Settings>("find_links = []").unwrap_err();
        insta::assert_snapshot!(err.message(), @"unknown field `find_links`, expected one of `finder`, `supported-tags`, `find-links`, `index`, `pages`");
    }
}
