//! Unit tests for the envelope command.

use super::helpers::{RequestFile, two_variant_request};
use super::*;
use crate::envelope::{EnvelopeConfig, config_from_layers_for_test, run_envelope_with};
use ortho_config::MergeComposer;
use rstest::rstest;
use saferoads_core::{SubsetPolicy, SubsetPolicyError};
use serde_json::{Value, json};

fn args_for(request: &RequestFile) -> EnvelopeArgs {
    EnvelopeArgs {
        request_path: Some(request.path().to_path_buf()),
        ..EnvelopeArgs::default()
    }
}

#[rstest]
fn converting_envelope_without_request_errors() {
    let err = EnvelopeConfig::try_from(EnvelopeArgs::default())
        .expect_err("missing request should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REQUEST);
            assert_eq!(env, ENV_ENVELOPE_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn unset_buffers_use_policy_defaults() {
    let request = RequestFile::new();
    let config = EnvelopeConfig::try_from(args_for(&request)).expect("config should build");
    assert_eq!(config.policy, SubsetPolicy::default());
}

#[rstest]
fn cap_below_base_is_rejected() {
    let mut composer = MergeComposer::new();
    composer.push_file(json!({ "max_buffer_degrees": 0.01 }), None);
    composer.push_cli(json!({ "request_path": "request.json" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("cap below base should fail validation");
    match err {
        CliError::InvalidSubsetPolicy(SubsetPolicyError::CapBelowBase { base, max }) => {
            assert_eq!(base, 0.02);
            assert_eq!(max, 0.01);
        }
        other => panic!("expected InvalidSubsetPolicy, found {other:?}"),
    }
}

#[rstest]
#[case::defaults(None, "fresh-join")]
#[case::zero_threshold(Some(0.0), "precomputed-view")]
fn envelope_reports_bounds_and_strategy(
    #[case] threshold: Option<f64>,
    #[case] expected_strategy: &str,
) {
    let request = RequestFile::new();
    request.write_json(&two_variant_request());
    let args = EnvelopeArgs {
        precomputed_threshold_degrees: threshold,
        ..args_for(&request)
    };

    let mut buffer = Vec::new();
    run_envelope_with(args, &mut buffer).expect("envelope should succeed");
    let output: Value = serde_json::from_slice(&buffer).expect("output should be JSON");

    assert_eq!(output["strategy"], expected_strategy);
    let buffer_degrees = output["bufferDegrees"].as_f64().expect("buffer degrees");
    assert!(buffer_degrees > 0.02 && buffer_degrees < 0.03);
    let min_lon = output["minLon"].as_f64().expect("min lon");
    let max_lon = output["maxLon"].as_f64().expect("max lon");
    assert!((min_lon + buffer_degrees).abs() < 1e-12);
    assert!((max_lon - 0.002 - buffer_degrees).abs() < 1e-12);
}
