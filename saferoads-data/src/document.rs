//! JSON route-request documents and an `EdgeSource` serving them.
//!
//! A request document pairs the query with the rows the routing service
//! returned for it, one row list per named variant:
//!
//! ```json
//! {
//!   "start": { "lat": 38.902464, "lon": -9.163266 },
//!   "end": { "lat": 38.902290, "lon": -9.177862 },
//!   "lowRiskOnly": false,
//!   "selectedSpecies": ["bufo_bufo"],
//!   "variants": [{ "name": "adjusted", "rows": [] }]
//! }
//! ```

use geo::Coord;
use saferoads_core::{
    EdgeSource, EdgeSourceError, RouteQuery, RouteQueryError, SpatialSubset, VariantEdges,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rows::{EdgeRejection, EdgeRow, decode_variant};

/// A position as `{lat, lon}` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Self {
            x: point.lon,
            y: point.lat,
        }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lon: coord.x,
        }
    }
}

/// Rows of one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRows {
    /// Variant name.
    pub name: String,
    /// Rows in any order; decoding sorts them by `seq`.
    #[serde(default)]
    pub rows: Vec<EdgeRow>,
}

/// A route request plus the routing service's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequestDocument {
    /// Requested start.
    pub start: GeoPoint,
    /// Requested end.
    pub end: GeoPoint,
    /// Prefer low-risk edges.
    #[serde(default)]
    pub low_risk_only: bool,
    /// Species the risk join is restricted to.
    #[serde(default)]
    pub selected_species: Vec<String>,
    /// Variant rows in ranking order.
    #[serde(default)]
    pub variants: Vec<VariantRows>,
}

/// Errors raised while reading a request document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document was not valid JSON for the expected shape.
    #[error("route request is not valid JSON")]
    Json(#[from] serde_json::Error),
    /// The start, end or species were invalid.
    #[error("route request is invalid")]
    Query(#[from] RouteQueryError),
}

impl RouteRequestDocument {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validated query described by the document.
    pub fn query(&self) -> Result<RouteQuery, DocumentError> {
        let query = RouteQuery::new(self.start.into(), self.end.into())?
            .with_low_risk_only(self.low_risk_only)
            .with_selected_species(self.selected_species.iter().cloned())?;
        Ok(query)
    }
}

/// `EdgeSource` answering every query with a document's decoded variants.
///
/// Rows are decoded once at construction; rejected rows are kept for the
/// caller to report.
#[derive(Debug)]
pub struct JsonEdgeSource {
    variants: Vec<VariantEdges>,
    rejections: Vec<EdgeRejection>,
}

impl JsonEdgeSource {
    /// Decode every variant of `document`.
    #[must_use]
    pub fn from_document(document: &RouteRequestDocument) -> Self {
        let (variants, rejections) = document.variants.iter().fold(
            (Vec::new(), Vec::new()),
            |(mut variants, mut rejections), rows| {
                let decoded = decode_variant(rows.name.clone(), rows.rows.clone());
                variants.push(decoded.edges);
                rejections.extend(decoded.rejections);
                (variants, rejections)
            },
        );
        Self {
            variants,
            rejections,
        }
    }

    /// Decoded variants in document order.
    #[must_use]
    pub fn variants(&self) -> &[VariantEdges] {
        &self.variants
    }

    /// Rows dropped while decoding.
    #[must_use]
    pub fn rejections(&self) -> &[EdgeRejection] {
        &self.rejections
    }
}

impl EdgeSource for JsonEdgeSource {
    fn fetch_variants(
        &self,
        query: &RouteQuery,
        subset: &SpatialSubset,
    ) -> Result<Vec<VariantEdges>, EdgeSourceError> {
        log::debug!(
            "serving {} recorded variants for {:?} via {:?}",
            self.variants.len(),
            query.start(),
            subset.strategy
        );
        Ok(self.variants.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use saferoads_core::SubsetPolicy;

    #[fixture]
    fn document_json() -> &'static str {
        r#"{
            "start": { "lat": 0.0, "lon": 0.0 },
            "end": { "lat": 0.0, "lon": 0.002 },
            "selectedSpecies": ["bufo_bufo"],
            "variants": [
                { "name": "adjusted", "rows": [
                    { "seq": 2, "geojson": "{\"type\":\"LineString\",\"coordinates\":[[0.002,0],[0.001,0]]}",
                      "length_m": 111.0, "maxspeed_forward": 36.0, "risk": 0.4, "species": ["bufo_bufo"] },
                    { "seq": 1, "geojson": "{\"type\":\"LineString\",\"coordinates\":[[0,0],[0.001,0]]}",
                      "length_m": 111.0, "maxspeed_forward": 36.0 }
                ] },
                { "name": "default", "rows": [
                    { "seq": 1, "geojson": "{\"type\":\"Point\",\"coordinates\":[0,0]}", "length_m": 1.0 }
                ] }
            ]
        }"#
    }

    #[rstest]
    fn parses_query_fields(document_json: &str) {
        let document = RouteRequestDocument::from_json(document_json).expect("valid document");
        let query = document.query().expect("valid query");
        assert_eq!(query.end(), Coord { x: 0.002, y: 0.0 });
        assert!(!query.low_risk_only());
        assert!(query.selected_species().contains("bufo_bufo"));
    }

    #[rstest]
    fn source_serves_decoded_variants(document_json: &str) {
        let document = RouteRequestDocument::from_json(document_json).expect("valid document");
        let source = JsonEdgeSource::from_document(&document);
        let query = document.query().expect("valid query");
        let subset = SubsetPolicy::default().select(query.start(), query.end());

        let variants = source.fetch_variants(&query, &subset).expect("served");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].edges.len(), 2);
        assert_eq!(variants[0].edges[0].risk_value, 0.0);
        assert!(variants[1].edges.is_empty());
        assert_eq!(source.rejections().len(), 1);
    }

    #[rstest]
    fn invalid_positions_are_query_errors() {
        let document = RouteRequestDocument {
            start: GeoPoint { lat: 95.0, lon: 0.0 },
            end: GeoPoint { lat: 0.0, lon: 0.0 },
            low_risk_only: false,
            selected_species: Vec::new(),
            variants: Vec::new(),
        };
        assert!(matches!(
            document.query(),
            Err(DocumentError::Query(RouteQueryError::InvalidStart { .. }))
        ));
    }
}
