//! Assemble command implementation for the SafeRoads CLI.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use saferoads_core::{
    AssemblyConfig, InvalidSpeedPolicy, OutputMode, PlanError, RouteAssembler, RoutePlanner,
    SubsetPolicy,
};
use saferoads_data::{JsonEdgeSource, RouteRequestDocument, RoutesDocument};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::fs::{load_json, require_existing, write_json};
use crate::{
    ARG_ALARM_THRESHOLD, ARG_FALLBACK_SPEED_KMH, ARG_GAP_TOLERANCE_M, ARG_INVALID_SPEED,
    ARG_OUTPUT_MODE, ARG_REQUEST, ARG_SPECIES_TAG_THRESHOLD, CliError, ENV_ASSEMBLE_REQUEST,
    ENV_FALLBACK_SPEED_KMH,
};

/// Output granularity accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum OutputModeArg {
    /// De-duplicated points with merged risk.
    #[default]
    Points,
    /// One entry per coordinate pair.
    Segments,
}

impl From<OutputModeArg> for OutputMode {
    fn from(mode: OutputModeArg) -> Self {
        match mode {
            OutputModeArg::Points => Self::Points,
            OutputModeArg::Segments => Self::Segments,
        }
    }
}

/// Treatment of edges without a usable speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum InvalidSpeedArg {
    /// Drop the edge and keep the variant.
    Skip,
    /// Omit the whole variant.
    #[default]
    FailVariant,
    /// Time the edge at `--fallback-speed-kmh`.
    Fallback,
}

/// CLI arguments for the `assemble` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Assemble every variant of a recorded route request. The \
                 request is a JSON document holding the start, end and the \
                 routing service's edge rows per variant. Policy thresholds \
                 can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Assemble routes from a recorded route request"
)]
#[ortho_config(prefix = "SAFEROADS")]
pub(crate) struct AssembleArgs {
    /// Path to a JSON route request document.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Emit merged points or per-pair micro-segments.
    #[arg(long = ARG_OUTPUT_MODE, value_enum, value_name = "mode")]
    #[serde(default)]
    pub(crate) output_mode: Option<OutputModeArg>,
    /// Species are carried only above this risk.
    #[arg(long = ARG_SPECIES_TAG_THRESHOLD, value_name = "risk")]
    #[serde(default)]
    pub(crate) species_tag_threshold: Option<f64>,
    /// Edges above this risk mark the route as elevated.
    #[arg(long = ARG_ALARM_THRESHOLD, value_name = "risk")]
    #[serde(default)]
    pub(crate) alarm_threshold: Option<f64>,
    /// What to do with edges lacking a usable speed.
    #[arg(long = ARG_INVALID_SPEED, value_enum, value_name = "policy")]
    #[serde(default)]
    pub(crate) invalid_speed: Option<InvalidSpeedArg>,
    /// Substitute speed used by `--invalid-speed fallback`.
    #[arg(long = ARG_FALLBACK_SPEED_KMH, value_name = "km/h")]
    #[serde(default)]
    pub(crate) fallback_speed_kmh: Option<f64>,
    /// Joins wider than this many metres are reported.
    #[arg(long = ARG_GAP_TOLERANCE_M, value_name = "metres")]
    #[serde(default)]
    pub(crate) gap_tolerance_m: Option<f64>,
}

impl AssembleArgs {
    pub(crate) fn into_config(self) -> Result<AssembleConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AssembleConfig::try_from(merged)
    }
}

/// Resolved `assemble` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AssembleConfig {
    /// Path to the JSON request document.
    pub(crate) request_path: Utf8PathBuf,
    /// Validated assembly policies.
    pub(crate) assembly: AssemblyConfig,
}

impl TryFrom<AssembleArgs> for AssembleConfig {
    type Error = CliError;

    fn try_from(args: AssembleArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_ASSEMBLE_REQUEST,
        })?;

        let defaults = AssemblyConfig::default();
        let mut risk = defaults.risk;
        if let Some(threshold) = args.species_tag_threshold {
            risk = risk.with_species_tag_threshold(threshold);
        }
        if let Some(threshold) = args.alarm_threshold {
            risk = risk.with_alarm_threshold(threshold);
        }

        let invalid_speed = match args.invalid_speed.unwrap_or_default() {
            InvalidSpeedArg::Skip => InvalidSpeedPolicy::Skip,
            InvalidSpeedArg::FailVariant => InvalidSpeedPolicy::FailVariant,
            InvalidSpeedArg::Fallback => {
                let speed_kmh = args.fallback_speed_kmh.ok_or(CliError::MissingArgument {
                    field: ARG_FALLBACK_SPEED_KMH,
                    env: ENV_FALLBACK_SPEED_KMH,
                })?;
                InvalidSpeedPolicy::Fallback { speed_kmh }
            }
        };

        let assembly = defaults
            .with_output_mode(args.output_mode.unwrap_or_default().into())
            .with_risk_policy(risk)
            .with_invalid_speed(invalid_speed)
            .with_gap_tolerance_meters(
                args.gap_tolerance_m
                    .unwrap_or(defaults.gap_tolerance_meters),
            );
        assembly.validate()?;

        Ok(Self {
            request_path,
            assembly,
        })
    }
}

pub(crate) fn run_assemble(args: AssembleArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_assemble_with(args, &mut stdout)
}

pub(crate) fn run_assemble_with(
    args: AssembleArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let document = execute_assemble(&config)?;
    write_json(writer, &document)
}

/// Decode the request, plan through its recorded rows and render the result.
pub(crate) fn execute_assemble(config: &AssembleConfig) -> Result<RoutesDocument, CliError> {
    let request: RouteRequestDocument = load_json(&config.request_path)?;
    let query = request
        .query()
        .map_err(|source| CliError::InvalidRouteRequest {
            path: config.request_path.clone(),
            source,
        })?;

    let source = JsonEdgeSource::from_document(&request);
    let rejected: Vec<String> = source
        .rejections()
        .iter()
        .map(|rejection| format!("{rejection}: {}", rejection.reason))
        .collect();
    let planner = RoutePlanner::new(
        &source,
        SubsetPolicy::default(),
        RouteAssembler::new(config.assembly)?,
    );

    match planner.plan(&query) {
        Ok(routes) => Ok(RoutesDocument::from_assembled(&routes).with_leading_warnings(rejected)),
        Err(PlanError::NoRouteFound { diagnostics }) => Err(CliError::NoRouteFound {
            path: config.request_path.clone(),
            warnings: rejected
                .into_iter()
                .chain(diagnostics.warnings().iter().map(ToString::to_string))
                .collect(),
        }),
        Err(PlanError::Source(source)) => Err(CliError::FetchEdges(source)),
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AssembleConfig, CliError> {
    let merged = AssembleArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AssembleConfig::try_from(merged)
}
