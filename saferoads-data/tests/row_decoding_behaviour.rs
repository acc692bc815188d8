//! Behaviour scenarios for decoding routing service rows.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use saferoads_data::{DecodedVariant, EdgeRow, decode_variant};
use std::cell::RefCell;

fn row(seq: i64, geojson: &str, length_m: f64) -> EdgeRow {
    EdgeRow {
        seq,
        geojson: geojson.to_owned(),
        length_m,
        maxspeed_forward: Some(50.0),
        maxspeed_backward: Some(50.0),
        direction: -1,
        risk: Some(0.2),
        species: None,
    }
}

const FIRST: &str = r#"{"type":"LineString","coordinates":[[0,0],[0.001,0]]}"#;
const SECOND: &str = r#"{"type":"LineString","coordinates":[[0.001,0],[0.002,0]]}"#;
const THIRD: &str = r#"{"type":"LineString","coordinates":[[0.002,0],[0.003,0]]}"#;

#[derive(Debug, Default)]
struct DecodingWorld {
    rows: RefCell<Vec<EdgeRow>>,
    decoded: RefCell<Option<DecodedVariant>>,
}

#[fixture]
fn world() -> DecodingWorld {
    DecodingWorld::default()
}

#[given("a variant with two line rows and one point row")]
fn given_mixed_rows(world: &DecodingWorld) {
    world.rows.replace(vec![
        row(1, FIRST, 111.0),
        row(2, r#"{"type":"Point","coordinates":[0.001,0]}"#, 0.0),
        row(3, SECOND, 111.0),
    ]);
}

#[given("a variant whose rows arrive in reverse order")]
fn given_reversed_rows(world: &DecodingWorld) {
    world.rows.replace(vec![
        row(3, THIRD, 3.0),
        row(2, SECOND, 2.0),
        row(1, FIRST, 1.0),
    ]);
}

#[when("the variant is decoded")]
fn when_decoded(world: &DecodingWorld) {
    let rows = world.rows.take();
    world.decoded.replace(Some(decode_variant("adjusted", rows)));
}

#[then("{count} edges are kept")]
fn then_kept(world: &DecodingWorld, count: usize) {
    let decoded = world.decoded.borrow();
    let decoded = decoded.as_ref().expect("variant should be decoded");
    assert_eq!(decoded.edges.edges.len(), count);
}

#[then("the row with sequence {seq} is rejected")]
fn then_rejected(world: &DecodingWorld, seq: i64) {
    let decoded = world.decoded.borrow();
    let decoded = decoded.as_ref().expect("variant should be decoded");
    let rejected: Vec<i64> = decoded.rejections.iter().map(|r| r.seq).collect();
    assert_eq!(rejected, vec![seq]);
}

#[then("the edges follow sequence order")]
fn then_ordered(world: &DecodingWorld) {
    let decoded = world.decoded.borrow();
    let decoded = decoded.as_ref().expect("variant should be decoded");
    let lengths: Vec<f64> = decoded.edges.edges.iter().map(|e| e.length_meters).collect();
    assert_eq!(lengths, vec![1.0, 2.0, 3.0]);
}

#[scenario(path = "tests/features/row_decoding.feature", index = 0)]
fn point_rows_are_rejected(world: DecodingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/row_decoding.feature", index = 1)]
fn rows_are_reordered(world: DecodingWorld) {
    let _ = world;
}
