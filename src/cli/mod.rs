//! Command-line interface for m73-post.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::layers;
use crate::post::{self, FailurePolicy, LayerScript, PostError, PrusaM73};
use crate::settings::{Settings, SettingsError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Post(#[from] PostError),
}

/// Insert M73 build-progress directives into sliced G-code
#[derive(Parser, Debug)]
#[command(name = "m73-post")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate a G-code file with M73 progress lines
    Annotate {
        /// Sliced G-code file
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Settings JSON, e.g. {"enable": true}
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Leave the G-code untouched
        #[arg(long)]
        disable: bool,

        /// What to do when the file has no ;TIME: line
        #[arg(long, value_enum, default_value_t = MissingPolicy::Abort)]
        on_missing: MissingPolicy,
    },

    /// Print the script's settings definition as JSON
    Definition,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    Abort,
    Passthrough,
}

impl From<MissingPolicy> for FailurePolicy {
    fn from(policy: MissingPolicy) -> Self {
        match policy {
            MissingPolicy::Abort => FailurePolicy::Abort,
            MissingPolicy::Passthrough => FailurePolicy::Passthrough,
        }
    }
}

/// Resolve settings from an optional JSON file and the `--disable` flag
pub fn resolve_settings(path: Option<&Path>, disable: bool) -> Result<Settings, CliError> {
    let mut settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if disable {
        settings.enable = false;
    }
    Ok(settings)
}

/// Annotate G-code text as a whole file
pub fn annotate_text(
    gcode: &str,
    settings: Settings,
    policy: FailurePolicy,
) -> Result<String, PostError> {
    let script = PrusaM73::new(settings);
    let blocks = layers::split(gcode);
    let out = post::run(&script, &blocks, policy)?;
    Ok(layers::join(&out))
}

pub fn annotate_file(
    input: &Path,
    output: Option<&Path>,
    settings: Settings,
    policy: FailurePolicy,
) -> Result<(), CliError> {
    let gcode = fs::read_to_string(input).map_err(|source| CliError::Io {
        path: input.to_path_buf(),
        source,
    })?;

    let annotated = annotate_text(&gcode, settings, policy)?;

    match output {
        Some(path) => {
            fs::write(path, annotated).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            info!(output = %path.display(), "wrote annotated G-code");
        }
        None => print!("{}", annotated),
    }

    Ok(())
}

pub fn definition_json() -> Result<String, CliError> {
    Ok(PrusaM73::default().definition().to_json()?)
}
