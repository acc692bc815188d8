//! Error types emitted by the SafeRoads CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use saferoads_core::{AssemblyConfigError, EdgeSourceError, SubsetPolicyError};
use saferoads_data::DocumentError;
use thiserror::Error;

/// Errors emitted by the SafeRoads CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The assembly policies were inconsistent.
    #[error("invalid assembly configuration: {0}")]
    InvalidAssemblyConfig(#[from] AssemblyConfigError),
    /// The subset buffer policy was inconsistent.
    #[error("invalid subset policy: {0}")]
    InvalidSubsetPolicy(#[from] SubsetPolicyError),
    /// Opening the route request file failed.
    #[error("failed to open route request at {path:?}: {source}")]
    OpenRouteRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Route request JSON could not be decoded.
    #[error("failed to parse route request JSON at {path:?}: {source}")]
    ParseRouteRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The route request failed validation.
    #[error("route request in {path:?} failed validation: {source}")]
    InvalidRouteRequest {
        path: Utf8PathBuf,
        #[source]
        source: DocumentError,
    },
    /// The edge source failed.
    #[error("failed to fetch route edges: {0}")]
    FetchEdges(#[source] EdgeSourceError),
    /// Every variant was omitted.
    #[error("no route found for {path:?} ({})", .warnings.join("; "))]
    NoRouteFound {
        path: Utf8PathBuf,
        warnings: Vec<String>,
    },
    /// Serialising the command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
