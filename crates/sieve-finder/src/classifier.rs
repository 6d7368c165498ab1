use url::Url;

use sieve_distribution_filename::{DistFilename, EggFragment};
use sieve_normalize::PackageName;

use crate::error::Skipped;
use crate::link::{DistKind, Fragment, Link, LinkOrigin, url_filename};
use crate::options::FinderOptions;

/// Recognize a discovered URL as a distribution of `package_name`.
///
/// The filename is tried first. A link whose filename isn't a distribution of the project can
/// still be identified by an `#egg=name-version` fragment.
pub(crate) fn classify(
    url: &Url,
    origin: LinkOrigin,
    position: usize,
    package_name: &PackageName,
    options: &FinderOptions,
) -> Result<Link, Skipped> {
    let fragment = Fragment::from_url(url);
    let filename = url_filename(url).map(|filename| filename.into_owned());

    if let Some(filename) = &filename {
        if filename.ends_with(".zip") && url.path().contains("macosx10") {
            return Err(Skipped::MacInstaller);
        }
    }

    let from_filename = match &filename {
        Some(filename) => DistFilename::parse(filename, package_name).map_err(Skipped::from),
        None => Err(Skipped::NoFilename),
    };

    let (version, kind, is_egg_fragment) = match (from_filename, &fragment.egg) {
        (Ok(DistFilename::WheelFilename(wheel)), _) => {
            if !options.use_wheel {
                return Err(Skipped::WheelsDisabled);
            }
            (wheel.version.clone(), DistKind::Wheel(wheel), false)
        }
        (Ok(DistFilename::SourceDistFilename(sdist)), _) => {
            if let Some(python_version) = &sdist.python_version {
                if !options.supports_python(python_version) {
                    return Err(Skipped::PythonVersion(python_version.clone()));
                }
            }
            (sdist.version, DistKind::SourceDist, false)
        }
        (Err(_), Some(egg)) => {
            let egg = EggFragment::parse(egg, package_name)?;
            (egg.version, DistKind::SourceDist, true)
        }
        (Err(err), None) => return Err(err),
    };

    let tags = match &kind {
        DistKind::Wheel(wheel) => wheel.tags(),
        DistKind::SourceDist => Vec::new(),
    };

    Ok(Link {
        url: url.clone(),
        filename: filename.unwrap_or_default(),
        name: package_name.clone(),
        version,
        kind,
        tags,
        hash: fragment.hash,
        is_egg_fragment,
        origin,
        position,
    })
}
