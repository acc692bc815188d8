//! Behaviour-driven step definitions driving the assemble CLI scenarios.

use super::helpers::{RequestFile, two_variant_request, write_utf8};
use super::*;
use crate::assemble::run_assemble_with;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;

#[derive(Debug)]
struct AssembleWorld {
    request: RequestFile,
    include_request: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl AssembleWorld {
    fn new() -> Self {
        Self {
            request: RequestFile::new(),
            include_request: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["saferoads".to_string(), "assemble".to_string()];
        if *self.include_request.borrow() {
            argv.push(self.request.path().as_str().to_string());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn output(&self) -> Value {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        result.as_ref().expect("expected success");
        serde_json::from_slice(&self.stdout.borrow()).expect("stdout should be JSON")
    }

    fn error_kind(&self) -> String {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        format!("{error:?}")
    }
}

#[fixture]
fn world() -> AssembleWorld {
    AssembleWorld::new()
}

#[given("a recorded request with a timed and an untimed variant")]
fn recorded_request(#[from(world)] world: &AssembleWorld) {
    world.request.write_json(&two_variant_request());
}

#[given("the route request contains invalid JSON")]
fn invalid_json_request(#[from(world)] world: &AssembleWorld) {
    write_utf8(world.request.path(), b"{ not valid json");
}

#[given("I omit the route request path")]
fn omit_request_path(#[from(world)] world: &AssembleWorld) {
    *world.include_request.borrow_mut() = false;
}

#[given("I pass --{flag} {value}")]
fn pass_flag(#[from(world)] world: &AssembleWorld, flag: String, value: String) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{flag}"), value]);
}

#[when("I run the assemble command")]
fn run_assemble_command(#[from(world)] world: &AssembleWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Assemble(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_assemble_with(args, &mut *buffer)
        }
        Command::Envelope(_) => panic!("expected assemble command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command prints the adjusted route")]
fn prints_adjusted_route(#[from(world)] world: &AssembleWorld) {
    let output = world.output();
    let adjusted = &output["routes"]["adjusted"];
    assert_eq!(adjusted["totalDistanceMeters"], 222.0);
    assert_eq!(adjusted["riskCategory"], "medium");
}

#[then("the untimed variant is reported as a warning")]
fn untimed_variant_warned(#[from(world)] world: &AssembleWorld) {
    let output = world.output();
    assert!(output["routes"].get("fast").is_none());
    let warnings = output["warnings"].as_array().expect("warnings array");
    assert!(
        warnings
            .iter()
            .filter_map(Value::as_str)
            .any(|warning| warning.contains("variant fast omitted")),
        "expected an omission warning, found {warnings:?}",
    );
}

#[then("the command prints {count} routes")]
fn prints_route_count(#[from(world)] world: &AssembleWorld, count: usize) {
    let output = world.output();
    let routes = output["routes"].as_object().expect("routes object");
    assert_eq!(routes.len(), count);
}

#[then("the adjusted route is rendered as segments")]
fn rendered_as_segments(#[from(world)] world: &AssembleWorld) {
    let output = world.output();
    let adjusted = &output["routes"]["adjusted"];
    assert_eq!(adjusted["mode"], "segments");
    let segments = adjusted["route"].as_array().expect("segment array");
    assert_eq!(segments.len(), 2);
}

#[then("the command fails because the request JSON is invalid")]
fn fails_invalid_json(#[from(world)] world: &AssembleWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::ParseRouteRequest { .. }) => {}
        _ => panic!("expected ParseRouteRequest, found {}", world.error_kind()),
    }
}

#[then("the command fails because the request path is missing")]
fn fails_missing_request_path(#[from(world)] world: &AssembleWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::MissingArgument { field, .. }) => assert_eq!(*field, ARG_REQUEST),
        _ => panic!("expected MissingArgument, found {}", world.error_kind()),
    }
}

macro_rules! register_assemble_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/assemble_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: AssembleWorld) {
            let _ = world;
        }
    };
}

register_assemble_scenario!(assemble_happy_path, "assembling a recorded route request");
register_assemble_scenario!(assemble_skip_policy, "skipping untimed edges keeps every variant");
register_assemble_scenario!(assemble_segments, "emitting micro-segments");
register_assemble_scenario!(assemble_invalid_json, "rejecting invalid JSON input");
register_assemble_scenario!(assemble_missing_request, "rejecting missing request paths");
