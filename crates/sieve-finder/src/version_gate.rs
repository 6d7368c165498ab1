use sieve_pep440::{Version, VersionSpecifiers};

use crate::error::Skipped;
use crate::requirement::Requirement;

/// Filters candidate versions by the requirement's specifiers and pre-release policy.
#[derive(Debug, Clone)]
pub(crate) struct VersionGate<'a> {
    specifiers: &'a VersionSpecifiers,
    allow_prereleases: bool,
}

impl<'a> VersionGate<'a> {
    pub(crate) fn new(requirement: &'a Requirement) -> Self {
        Self {
            specifiers: &requirement.specifiers,
            allow_prereleases: allows_prereleases(requirement),
        }
    }

    pub(crate) fn check(&self, version: &Version) -> Result<(), Skipped> {
        if !self.specifiers.contains(version) {
            return Err(Skipped::Version(version.clone(), self.specifiers.clone()));
        }
        if version.any_prerelease() && !self.allow_prereleases {
            return Err(Skipped::Prerelease(version.clone()));
        }
        Ok(())
    }
}

/// Pre-releases are allowed when requested, or when a specifier names one, e.g. `>=0.0.dev0`.
///
/// Exclusions like `!=2.0b1` name a pre-release without asking for one.
fn allows_prereleases(requirement: &Requirement) -> bool {
    requirement.prereleases
        || requirement
            .specifiers
            .iter()
            .any(|specifier| !specifier.operator().is_exclusion() && specifier.any_prerelease())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sieve_pep440::Version;

    use crate::requirement::Requirement;

    use super::VersionGate;

    fn admits(requirement: &Requirement, version: &str) -> bool {
        VersionGate::new(requirement)
            .check(&Version::from_str(version).unwrap())
            .is_ok()
    }

    #[test]
    fn stable_only_by_default() {
        let bar = Requirement::from_str("bar").unwrap();
        assert!(admits(&bar, "1.0"));
        assert!(admits(&bar, "1.0.post1"));
        assert!(!admits(&bar, "2.0b1"));
        assert!(!admits(&bar, "2.0.dev1"));
    }

    #[test]
    fn opt_in() {
        let bar = Requirement::from_str("bar").unwrap().with_prereleases(true);
        assert!(admits(&bar, "2.0b1"));
        assert!(admits(&bar, "2.0.dev1"));
    }

    #[test]
    fn specifier_names_prerelease() {
        let bar = Requirement::from_str("bar>=0.0.dev0").unwrap();
        assert!(admits(&bar, "2.0b1"));

        let bar = Requirement::from_str("bar!=2.0b1").unwrap();
        assert!(!admits(&bar, "2.0b2"));
        assert!(!admits(&bar, "2.0b1"));
        assert!(admits(&bar, "1.0"));
    }

    #[test]
    fn specifiers() {
        let gmpy = Requirement::from_str("gmpy==1.15").unwrap();
        assert!(admits(&gmpy, "1.15"));
        assert!(!admits(&gmpy, "1.14"));
        assert!(!admits(&gmpy, "2.0"));
    }
}
