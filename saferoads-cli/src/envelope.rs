//! Envelope command: report the spatial subset a route request would use.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use saferoads_core::{SpatialSubset, SubsetPolicy, SubsetStrategy};
use saferoads_data::RouteRequestDocument;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::fs::{load_json, require_existing, write_json};
use crate::{
    ARG_BASE_BUFFER_DEGREES, ARG_BUFFER_DEGREES_PER_KM, ARG_MAX_BUFFER_DEGREES,
    ARG_PRECOMPUTED_THRESHOLD_DEGREES, ARG_REQUEST, CliError, ENV_ENVELOPE_REQUEST,
};

/// CLI arguments for the `envelope` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compute the buffered bounding box and subset strategy for \
                 the start and end of a route request without assembling it.",
    about = "Print the spatial subset for a route request"
)]
#[ortho_config(prefix = "SAFEROADS")]
pub(crate) struct EnvelopeArgs {
    /// Path to a JSON route request document.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Buffer at zero start/end distance.
    #[arg(long = ARG_BASE_BUFFER_DEGREES, value_name = "degrees")]
    #[serde(default)]
    pub(crate) base_buffer_degrees: Option<f64>,
    /// Buffer growth per kilometre.
    #[arg(long = ARG_BUFFER_DEGREES_PER_KM, value_name = "degrees")]
    #[serde(default)]
    pub(crate) buffer_degrees_per_km: Option<f64>,
    /// Cap on the buffer.
    #[arg(long = ARG_MAX_BUFFER_DEGREES, value_name = "degrees")]
    #[serde(default)]
    pub(crate) max_buffer_degrees: Option<f64>,
    /// Buffers at or above this use the precomputed view.
    #[arg(long = ARG_PRECOMPUTED_THRESHOLD_DEGREES, value_name = "degrees")]
    #[serde(default)]
    pub(crate) precomputed_threshold_degrees: Option<f64>,
}

impl EnvelopeArgs {
    pub(crate) fn into_config(self) -> Result<EnvelopeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        EnvelopeConfig::try_from(merged)
    }
}

/// Resolved `envelope` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EnvelopeConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) policy: SubsetPolicy,
}

impl TryFrom<EnvelopeArgs> for EnvelopeConfig {
    type Error = CliError;

    fn try_from(args: EnvelopeArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_ENVELOPE_REQUEST,
        })?;

        let defaults = SubsetPolicy::default();
        let policy = defaults
            .with_base_buffer_degrees(
                args.base_buffer_degrees
                    .unwrap_or(defaults.base_buffer_degrees),
            )
            .with_buffer_degrees_per_km(
                args.buffer_degrees_per_km
                    .unwrap_or(defaults.buffer_degrees_per_km),
            )
            .with_max_buffer_degrees(
                args.max_buffer_degrees
                    .unwrap_or(defaults.max_buffer_degrees),
            )
            .with_precomputed_threshold_degrees(
                args.precomputed_threshold_degrees
                    .unwrap_or(defaults.precomputed_threshold_degrees),
            );
        policy.validate()?;

        Ok(Self {
            request_path,
            policy,
        })
    }
}

/// JSON rendering of a [`SpatialSubset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnvelopeDocument {
    pub(crate) min_lon: f64,
    pub(crate) min_lat: f64,
    pub(crate) max_lon: f64,
    pub(crate) max_lat: f64,
    pub(crate) buffer_degrees: f64,
    pub(crate) distance_km: f64,
    pub(crate) strategy: SubsetStrategy,
}

impl From<SpatialSubset> for EnvelopeDocument {
    fn from(subset: SpatialSubset) -> Self {
        let [min_lon, min_lat, max_lon, max_lat] = subset.bounds();
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
            buffer_degrees: subset.buffer_degrees,
            distance_km: subset.distance_km,
            strategy: subset.strategy,
        }
    }
}

pub(crate) fn run_envelope(args: EnvelopeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_envelope_with(args, &mut stdout)
}

pub(crate) fn run_envelope_with(
    args: EnvelopeArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let request: RouteRequestDocument = load_json(&config.request_path)?;
    let query = request
        .query()
        .map_err(|source| CliError::InvalidRouteRequest {
            path: config.request_path.clone(),
            source,
        })?;
    let subset = config.policy.select(query.start(), query.end());
    write_json(writer, &EnvelopeDocument::from(subset))
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<EnvelopeConfig, CliError> {
    let merged = EnvelopeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    EnvelopeConfig::try_from(merged)
}
