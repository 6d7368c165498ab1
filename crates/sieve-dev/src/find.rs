use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anstream::{eprintln, println};
use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::info;
use url::Url;

use sieve_finder::{FindError, InstalledVersion, PackageFinder, Requirement};
use sieve_pep440::Version;

use crate::settings::Settings;

const DEFAULT_SETTINGS: &str = "sieve.toml";

#[derive(Parser)]
pub(crate) struct FindArgs {
    /// The requirement to find a distribution for, e.g. `gmpy==1.15`.
    requirement: Requirement,
    /// The settings file. Defaults to `sieve.toml` in the working directory, if present.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Look for a newer version even if one is already installed.
    #[arg(long, short = 'U')]
    upgrade: bool,
    /// Allow pre-releases and dev releases.
    #[arg(long)]
    pre: bool,
    /// The version that is already installed.
    #[arg(long)]
    installed: Option<Version>,
    /// A dependency link to consider, may be repeated.
    #[arg(long = "dependency-link")]
    dependency_links: Vec<Url>,
}

pub(crate) fn find(args: FindArgs) -> anyhow::Result<ExitCode> {
    let (settings, root) = load_settings(args.config.as_deref())?;

    let tags = settings.tags().context("Invalid supported tags")?;
    let collector = settings.collector(&root)?;
    let finder = PackageFinder::new(collector, tags, settings.finder);
    finder.add_dependency_links(args.dependency_links);

    let mut requirement = args.requirement.with_prereleases(args.pre);
    if let Some(installed) = args.installed {
        requirement = requirement.with_satisfied_by(InstalledVersion::new(installed));
    }

    match finder.find_requirement(&requirement, args.upgrade) {
        Ok(link) => {
            info!(
                "Selected {} {} from {}",
                link.name(),
                link.version(),
                link.origin()
            );
            println!("{}", link.url());
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ FindError::BestVersionAlreadyInstalled { .. }) => {
            println!("{}", err.dimmed());
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ FindError::DistributionNotFound { .. }) => {
            eprintln!("{}: {err}", "error".red().bold());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Read the settings file, returning it with the directory that relative paths resolve against.
fn load_settings(config: Option<&Path>) -> anyhow::Result<(Settings, PathBuf)> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_SETTINGS);
            if !path.is_file() {
                return Ok((Settings::default(), PathBuf::from(".")));
            }
            path
        }
    };
    let settings = Settings::read(&path)
        .with_context(|| format!("Failed to load settings from `{}`", path.display()))?;
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((settings, root))
}
