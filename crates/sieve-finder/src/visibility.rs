use crate::error::Skipped;
use crate::link::Link;
use crate::options::FinderOptions;

/// Decide whether an index page link may be considered at all.
///
/// Files hosted by the index itself are always visible. A link hosted elsewhere
/// (`internal == false`) needs the project to be allowed external files, and if it carries no
/// hash, to be allowed insecure files as well. Allowing insecure files never makes an external
/// link visible on its own.
pub(crate) fn check_index_link(
    link: &Link,
    internal: bool,
    options: &FinderOptions,
) -> Result<(), Skipped> {
    if internal {
        return Ok(());
    }
    if !options.allows_external(link.name()) {
        return Err(Skipped::External(link.name().clone()));
    }
    if !link.has_hash() && !options.allows_insecure(link.name()) {
        return Err(Skipped::Insecure(link.name().clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use url::Url;

    use sieve_normalize::PackageName;

    use crate::classifier::classify;
    use crate::error::Skipped;
    use crate::link::{Link, LinkOrigin};
    use crate::options::FinderOptions;

    use super::check_index_link;

    fn link(url: &str) -> Link {
        classify(
            &Url::parse(url).unwrap(),
            LinkOrigin::IndexPage,
            0,
            &PackageName::from_str("bar").unwrap(),
            &FinderOptions::default(),
        )
        .unwrap()
    }

    fn bar() -> Vec<PackageName> {
        vec![PackageName::from_str("bar").unwrap()]
    }

    #[test]
    fn internal_is_always_visible() {
        let hashed = link("https://index/bar/bar-1.0.tar.gz#sha256=abcdef");
        assert!(check_index_link(&hashed, true, &FinderOptions::default()).is_ok());
        let unhashed = link("https://index/bar/bar-2.0b1.tar.gz");
        assert!(check_index_link(&unhashed, true, &FinderOptions::default()).is_ok());
    }

    #[test]
    fn external_needs_allow_external() {
        let hashed = link("https://elsewhere/bar-2.0.tar.gz#md5=abcdef");
        assert!(matches!(
            check_index_link(&hashed, false, &FinderOptions::default()),
            Err(Skipped::External(_))
        ));
        let per_project = FinderOptions {
            allow_external: bar(),
            ..FinderOptions::default()
        };
        assert!(check_index_link(&hashed, false, &per_project).is_ok());
        let all = FinderOptions {
            allow_all_external: true,
            ..FinderOptions::default()
        };
        assert!(check_index_link(&hashed, false, &all).is_ok());
    }

    #[test]
    fn insecure_needs_allow_insecure() {
        let unhashed = link("https://elsewhere/bar-3.0.tar.gz");
        let external_only = FinderOptions {
            allow_all_external: true,
            ..FinderOptions::default()
        };
        assert!(matches!(
            check_index_link(&unhashed, false, &external_only),
            Err(Skipped::Insecure(_))
        ));
        let both = FinderOptions {
            allow_all_external: true,
            allow_insecure: bar(),
            ..FinderOptions::default()
        };
        assert!(check_index_link(&unhashed, false, &both).is_ok());

        // Insecure without external still rejects an external link.
        let insecure_only = FinderOptions {
            allow_all_insecure: true,
            ..FinderOptions::default()
        };
        assert!(matches!(
            check_index_link(&unhashed, false, &insecure_only),
            Err(Skipped::External(_))
        ));
        assert!(check_index_link(&unhashed, true, &insecure_only).is_ok());
    }

    #[test]
    fn allow_lists_are_per_project() {
        let unhashed = link("https://elsewhere/bar-3.0.tar.gz");
        let other = FinderOptions {
            allow_external: vec![PackageName::from_str("baz").unwrap()],
            allow_insecure: vec![PackageName::from_str("baz").unwrap()],
            ..FinderOptions::default()
        };
        assert!(check_index_link(&unhashed, false, &other).is_err());
    }
}
