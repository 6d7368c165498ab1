//! Python version numbers and specifiers, implementing
//! [PEP 440](https://peps.python.org/pep-0440)
//!
//! ```rust
//! use std::str::FromStr;
//! use sieve_pep440::{VersionSpecifiers, Version, VersionSpecifier};
//!
//! let version = Version::from_str("1.19").unwrap();
//! let version_specifier = VersionSpecifier::from_str("== 1.*").unwrap();
//! assert!(version_specifier.contains(&version));
//! let version_specifiers = VersionSpecifiers::from_str(">=1.16, <2.0").unwrap();
//! assert!(version_specifiers.contains(&version));
//! ```
//!
//! The parts of PEP 440 that matter most when picking a distribution:
//!
//! * An epoch prefix such as `1!1.2.3`. A lower epoch always means a lower version.
//! * Pre-releases (`a`, `b`, `rc`) and dev releases sort below the final release they lead up
//!   to, and are excluded from matching unless explicitly allowed by the caller.
//! * Post releases sort above the release they follow.
//! * Local versions (`+local`) sort above the public version but are ignored by most specifiers,
//!   so ordering and matching are not the same relation.
#![warn(missing_docs)]

pub use {
    version::{LocalSegment, PrereleaseKind, Version, VersionParseError},
    version_specifier::{
        Operator, VersionSpecifier, VersionSpecifierParseError, VersionSpecifiers,
        VersionSpecifiersParseError,
    },
};

mod version;
mod version_specifier;
