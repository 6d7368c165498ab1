use serde::{Deserialize, Serialize};

use sieve_normalize::PackageName;

/// Policy knobs for discovering and filtering links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FinderOptions {
    /// Projects whose index pages may point at files hosted elsewhere.
    pub allow_external: Vec<PackageName>,
    /// Allow externally hosted files for every project.
    pub allow_all_external: bool,
    /// Projects whose index pages may list files without an integrity hash.
    pub allow_insecure: Vec<PackageName>,
    /// Allow files without an integrity hash for every project.
    pub allow_all_insecure: bool,
    /// Consider wheels. When disabled, only source distributions are eligible.
    pub use_wheel: bool,
    /// The target interpreter's `X.Y` version, used to drop source archives built for another one.
    pub python_version: Option<String>,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            allow_external: Vec::new(),
            allow_all_external: false,
            allow_insecure: Vec::new(),
            allow_all_insecure: false,
            use_wheel: true,
            python_version: None,
        }
    }
}

impl FinderOptions {
    pub(crate) fn allows_external(&self, package_name: &PackageName) -> bool {
        self.allow_all_external || self.allow_external.contains(package_name)
    }

    pub(crate) fn allows_insecure(&self, package_name: &PackageName) -> bool {
        self.allow_all_insecure || self.allow_insecure.contains(package_name)
    }

    /// Whether a source archive built for `python_version` can be used by the target interpreter.
    pub(crate) fn supports_python(&self, python_version: &str) -> bool {
        let Some(target) = &self.python_version else {
            return true;
        };
        let undotted = |version: &str| version.replace('.', "");
        undotted(target) == undotted(python_version)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use indoc::indoc;

    use sieve_normalize::PackageName;

    use super::FinderOptions;

    #[test]
    fn deserialize_kebab_case() {
        let options: FinderOptions = toml::from_str(indoc! {r#"
            allow-external = ["Bar"]
            allow-all-insecure = true
            use-wheel = false
            python-version = "2.7"
        "#})
        .unwrap();
        assert_eq!(
            options.allow_external,
            vec![PackageName::from_str("bar").unwrap()]
        );
        assert!(options.allow_all_insecure);
        assert!(!options.use_wheel);
        assert!(options.supports_python("27"));
        assert!(!options.supports_python("3.3"));
    }

    #[test]
    fn wheels_are_enabled_by_default() {
        let options: FinderOptions = toml::from_str("").unwrap();
        assert_eq!(options, FinderOptions::default());
        assert!(options.use_wheel);
        assert!(options.supports_python("2.6"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = toml::from_str::<FinderOptions>("allow-everything = true").unwrap_err();
        assert!(err.to_string().contains("unknown field `allow-everything`"));
    }
}
