//! Client-facing JSON for assembled routes.

use saferoads_core::{
    AssembledRoutes, MicroSegment, OutputMode, RiskCategory, RouteGeometry, RoutePoint,
    RouteVariant, SpeciesTags,
};
use serde::{Serialize, Serializer};

use crate::document::GeoPoint;

/// One point of a point-mode route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDocument {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Highest risk observed at the point.
    pub risk_value: f64,
    /// Species carried at the point.
    pub species_tags: SpeciesTags,
}

impl From<&RoutePoint> for PointDocument {
    fn from(point: &RoutePoint) -> Self {
        Self {
            lat: point.lat(),
            lon: point.lon(),
            risk_value: point.risk_value,
            species_tags: point.species_tags.clone(),
        }
    }
}

/// One micro-segment of a segment-mode route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDocument {
    /// Segment start.
    pub start: GeoPoint,
    /// Segment end.
    pub end: GeoPoint,
    /// Segment length, metres.
    pub distance_meters: f64,
    /// Time to reach the end, seconds.
    pub time_to_next_seconds: f64,
    /// Risk inherited from the edge.
    pub risk_value: f64,
    /// Species inherited from the edge.
    pub species_tags: SpeciesTags,
}

impl From<&MicroSegment> for SegmentDocument {
    fn from(segment: &MicroSegment) -> Self {
        Self {
            start: segment.start.into(),
            end: segment.end.into(),
            distance_meters: segment.distance_meters,
            time_to_next_seconds: segment.time_to_next_seconds,
            risk_value: segment.risk_value,
            species_tags: segment.species_tags.clone(),
        }
    }
}

/// Route geometry in either granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeometryDocument {
    /// Point-mode geometry.
    Points(Vec<PointDocument>),
    /// Segment-mode geometry.
    Segments(Vec<SegmentDocument>),
}

/// One assembled variant with formatted summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDocument {
    /// Granularity of [`Self::route`].
    pub mode: OutputMode,
    /// Points or micro-segments from start to end.
    pub route: GeometryDocument,
    /// Formatted total distance.
    pub total_distance: String,
    /// Formatted total time.
    pub total_time: String,
    /// Total distance, metres.
    pub total_distance_meters: f64,
    /// Total time, seconds.
    pub total_time_seconds: f64,
    /// Whether any edge tripped the alarm threshold.
    pub has_elevated_risk: bool,
    /// Highest risk on the route.
    pub max_risk_value: f64,
    /// Category of the highest risk.
    pub risk_category: RiskCategory,
    /// Distance within the dominant category, metres.
    pub distance_in_dominant_risk_category: f64,
}

impl From<&RouteVariant> for VariantDocument {
    fn from(variant: &RouteVariant) -> Self {
        let route = match &variant.geometry {
            RouteGeometry::Points(points) => {
                GeometryDocument::Points(points.iter().map(PointDocument::from).collect())
            }
            RouteGeometry::Segments(segments) => {
                GeometryDocument::Segments(segments.iter().map(SegmentDocument::from).collect())
            }
        };
        Self {
            mode: variant.geometry.mode(),
            route,
            total_distance: variant.formatted_distance(),
            total_time: variant.formatted_duration(),
            total_distance_meters: variant.total_distance_meters(),
            total_time_seconds: variant.total_time_seconds(),
            has_elevated_risk: variant.has_elevated_risk,
            max_risk_value: variant.max_risk_value(),
            risk_category: variant.risk_category(),
            distance_in_dominant_risk_category: variant.distance_in_dominant_risk_category(),
        }
    }
}

/// Named variants serialised as a JSON object in assembly order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedVariants(pub Vec<(String, VariantDocument)>);

impl Serialize for NamedVariants {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, variant)| (name, variant)))
    }
}

/// The full response: routes keyed by variant name plus warnings.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RoutesDocument {
    /// Assembled variants.
    pub routes: NamedVariants,
    /// Human-readable warnings raised while decoding and assembling.
    pub warnings: Vec<String>,
}

impl RoutesDocument {
    /// Render `assembled` and its diagnostics.
    #[must_use]
    pub fn from_assembled(assembled: &AssembledRoutes) -> Self {
        let routes = assembled
            .routes()
            .iter()
            .map(|named| (named.name.clone(), VariantDocument::from(&named.variant)))
            .collect();
        let warnings = assembled
            .diagnostics()
            .warnings()
            .iter()
            .map(ToString::to_string)
            .collect();
        Self {
            routes: NamedVariants(routes),
            warnings,
        }
    }

    /// Prepend warnings raised before assembly, e.g. rejected rows.
    #[must_use]
    pub fn with_leading_warnings<I>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut leading: Vec<String> = warnings.into_iter().collect();
        leading.append(&mut self.warnings);
        self.warnings = leading;
        self
    }
}
