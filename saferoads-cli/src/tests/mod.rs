//! Shared test harness modules for the SafeRoads CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod assemble_steps;
mod envelope_unit;
mod helpers;
