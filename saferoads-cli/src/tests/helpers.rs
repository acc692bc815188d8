//! Test helpers for writing route request documents to a scratch directory.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Value, json};
use tempfile::TempDir;

pub(super) const FIRST_LEG: &str = r#"{"type":"LineString","coordinates":[[0.0,0.0],[0.001,0.0]]}"#;
pub(super) const SECOND_LEG: &str =
    r#"{"type":"LineString","coordinates":[[0.001,0.0],[0.002,0.0]]}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

/// A temporary directory holding a `request.json`.
#[derive(Debug)]
pub(super) struct RequestFile {
    _dir: TempDir,
    root: Utf8PathBuf,
    path: Utf8PathBuf,
}

impl RequestFile {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let path = root.join("request.json");
        Self {
            _dir: dir,
            root,
            path,
        }
    }

    pub(super) fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn write_json(&self, document: &Value) {
        let payload = serde_json::to_vec_pretty(document).expect("serialise request");
        write_utf8(&self.path, &payload);
    }
}

pub(super) fn edge_row(seq: i64, geojson: &str, speed_kmh: Option<f64>, risk: f64) -> Value {
    json!({
        "seq": seq,
        "geojson": geojson,
        "length_m": 111.0,
        "maxspeed_forward": speed_kmh,
        "maxspeed_backward": speed_kmh,
        "direction": -1,
        "risk": risk,
        "species": ["bufo_bufo"],
    })
}

/// Request from `(0, 0)` to `(0.002, 0)` with the given variants.
pub(super) fn request_document(variants: Value) -> Value {
    json!({
        "start": { "lat": 0.0, "lon": 0.0 },
        "end": { "lat": 0.0, "lon": 0.002 },
        "lowRiskOnly": false,
        "selectedSpecies": ["bufo_bufo"],
        "variants": variants,
    })
}

/// Two timed legs under `adjusted` and an untimed copy under `fast`.
pub(super) fn two_variant_request() -> Value {
    request_document(json!([
        {
            "name": "adjusted",
            "rows": [
                edge_row(1, FIRST_LEG, Some(36.0), 0.4),
                edge_row(2, SECOND_LEG, Some(36.0), 0.1),
            ],
        },
        {
            "name": "fast",
            "rows": [
                edge_row(1, FIRST_LEG, None, 0.4),
                edge_row(2, SECOND_LEG, Some(36.0), 0.1),
            ],
        },
    ]))
}
