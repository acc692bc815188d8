//! Edge rows as returned by the graph-routing service.
//!
//! Each row carries its geometry as a GeoJSON string alongside nullable
//! speed, risk and species columns. Rows that cannot become a valid
//! [`EdgeRecord`] are dropped with a warning and reported as an
//! [`EdgeRejection`]; they never fail the whole variant.

use geo::Coord;
use saferoads_core::{EdgeRecord, EdgeRecordError, FORWARD_DIRECTION_FLAG, VariantEdges};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of a shortest-path result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRow {
    /// Position of the edge along the path.
    pub seq: i64,
    /// GeoJSON geometry of the edge, as a string.
    pub geojson: String,
    /// Edge length in metres.
    pub length_m: f64,
    /// Forward speed limit in km/h.
    #[serde(default)]
    pub maxspeed_forward: Option<f64>,
    /// Backward speed limit in km/h.
    #[serde(default)]
    pub maxspeed_backward: Option<f64>,
    /// Direction sentinel; `-1` reads the edge forward.
    #[serde(default = "forward_direction")]
    pub direction: i64,
    /// Risk score; missing means no known risk.
    #[serde(default)]
    pub risk: Option<f64>,
    /// Species contributing to the risk.
    #[serde(default)]
    pub species: Option<Vec<String>>,
}

const fn forward_direction() -> i64 {
    FORWARD_DIRECTION_FLAG
}

/// GeoJSON geometry before its type is checked.
#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// Why a row was dropped.
#[derive(Debug, Error)]
pub enum RejectionReason {
    /// The geometry column was not valid GeoJSON.
    #[error("geometry is not valid GeoJSON")]
    MalformedGeoJson(#[source] serde_json::Error),
    /// The geometry was not a `LineString`.
    #[error("geometry type {kind} is not LineString")]
    NotLineString {
        /// Type found in the document.
        kind: String,
    },
    /// A position had fewer than two ordinates.
    #[error("position {index} has fewer than two ordinates")]
    ShortPosition {
        /// Index of the position.
        index: usize,
    },
    /// The decoded edge failed validation.
    #[error("edge failed validation")]
    InvalidEdge(#[from] EdgeRecordError),
}

/// A dropped row and the reason it was dropped.
#[derive(Debug, Error)]
#[error("variant {variant}: row {seq} rejected")]
pub struct EdgeRejection {
    /// Variant the row belonged to.
    pub variant: String,
    /// Sequence number of the row.
    pub seq: i64,
    /// Why the row was dropped.
    #[source]
    pub reason: RejectionReason,
}

/// Rows of one variant after decoding.
#[derive(Debug)]
pub struct DecodedVariant {
    /// Valid edges in sequence order.
    pub edges: VariantEdges,
    /// Rows that were dropped.
    pub rejections: Vec<EdgeRejection>,
}

impl EdgeRow {
    /// Decode into a validated [`EdgeRecord`].
    ///
    /// # Examples
    /// ```
    /// use saferoads_data::EdgeRow;
    ///
    /// let row = EdgeRow {
    ///     seq: 1,
    ///     geojson: r#"{"type":"LineString","coordinates":[[-9.16,38.90],[-9.17,38.90]]}"#.into(),
    ///     length_m: 870.0,
    ///     maxspeed_forward: Some(50.0),
    ///     maxspeed_backward: None,
    ///     direction: -1,
    ///     risk: None,
    ///     species: None,
    /// };
    /// let edge = row.decode().expect("valid row");
    /// assert_eq!(edge.geometry.len(), 2);
    /// assert_eq!(edge.risk_value, 0.0);
    /// ```
    pub fn decode(&self) -> Result<EdgeRecord, RejectionReason> {
        let geometry = parse_line_string(&self.geojson)?;
        let edge = EdgeRecord::new(geometry, self.length_m)?
            .with_speeds(self.maxspeed_forward, self.maxspeed_backward)
            .with_direction_flag(self.direction)
            .with_risk(
                self.risk.unwrap_or(0.0),
                self.species.iter().flatten().cloned(),
            )?;
        Ok(edge)
    }
}

/// Parse a GeoJSON `LineString` into `x = longitude`, `y = latitude`
/// coordinates. Extra ordinates such as altitude are ignored.
pub fn parse_line_string(geojson: &str) -> Result<Vec<Coord<f64>>, RejectionReason> {
    let raw: RawGeometry =
        serde_json::from_str(geojson).map_err(RejectionReason::MalformedGeoJson)?;
    if raw.kind != "LineString" {
        return Err(RejectionReason::NotLineString { kind: raw.kind });
    }
    let positions: Vec<Vec<f64>> =
        serde_json::from_value(raw.coordinates).map_err(RejectionReason::MalformedGeoJson)?;
    positions
        .iter()
        .enumerate()
        .map(|(index, position)| match position.as_slice() {
            [lon, lat, ..] => Ok(Coord { x: *lon, y: *lat }),
            _ => Err(RejectionReason::ShortPosition { index }),
        })
        .collect()
}

/// Order `rows` by `seq` and decode each, dropping the ones that fail.
pub fn decode_variant(name: impl Into<String>, mut rows: Vec<EdgeRow>) -> DecodedVariant {
    let name = name.into();
    rows.sort_by_key(|row| row.seq);
    let mut edges = Vec::with_capacity(rows.len());
    let mut rejections = Vec::new();
    for row in &rows {
        match row.decode() {
            Ok(edge) => edges.push(edge),
            Err(reason) => {
                let rejection = EdgeRejection {
                    variant: name.clone(),
                    seq: row.seq,
                    reason,
                };
                log::warn!("{rejection}: {}", rejection.reason);
                rejections.push(rejection);
            }
        }
    }
    DecodedVariant {
        edges: VariantEdges::new(name, edges),
        rejections,
    }
}
