//! Command-line interface for assembling SafeRoads routes from recorded
//! routing service output.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod assemble;
mod envelope;
mod error;
mod fs;

pub use error::CliError;

use assemble::{AssembleArgs, run_assemble};
use envelope::{EnvelopeArgs, run_envelope};

const ARG_REQUEST: &str = "request";
const ARG_OUTPUT_MODE: &str = "output-mode";
const ARG_SPECIES_TAG_THRESHOLD: &str = "species-tag-threshold";
const ARG_ALARM_THRESHOLD: &str = "alarm-threshold";
const ARG_INVALID_SPEED: &str = "invalid-speed";
const ARG_FALLBACK_SPEED_KMH: &str = "fallback-speed-kmh";
const ARG_GAP_TOLERANCE_M: &str = "gap-tolerance-m";
const ARG_BASE_BUFFER_DEGREES: &str = "base-buffer-degrees";
const ARG_BUFFER_DEGREES_PER_KM: &str = "buffer-degrees-per-km";
const ARG_MAX_BUFFER_DEGREES: &str = "max-buffer-degrees";
const ARG_PRECOMPUTED_THRESHOLD_DEGREES: &str = "precomputed-threshold-degrees";
const ENV_ASSEMBLE_REQUEST: &str = "SAFEROADS_CMDS_ASSEMBLE_REQUEST_PATH";
const ENV_ENVELOPE_REQUEST: &str = "SAFEROADS_CMDS_ENVELOPE_REQUEST_PATH";
const ENV_FALLBACK_SPEED_KMH: &str = "SAFEROADS_CMDS_ASSEMBLE_FALLBACK_SPEED_KMH";

/// Run the SafeRoads CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Assemble(args) => run_assemble(args),
        Command::Envelope(args) => run_envelope(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "saferoads",
    about = "Assemble wildlife-risk annotated routes from routing service output",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Stitch, time and annotate every variant of a route request.
    Assemble(AssembleArgs),
    /// Print the spatial subset the routing service would be asked for.
    Envelope(EnvelopeArgs),
}

#[cfg(test)]
mod tests;
