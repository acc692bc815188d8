//! Assembled route variants.
//!
//! A variant is one complete path returned for a start/end pair, carrying its
//! geometry at one of two granularities plus distance, time and risk totals.

use geo::Coord;

use crate::edge::SpeciesTags;
use crate::metrics::RouteTotals;
use crate::risk::{RiskCategory, RiskSummary};

/// A stitched coordinate annotated with the risk observed there.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePoint {
    /// Position, `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
    /// Highest risk of any edge touching this coordinate.
    pub risk_value: f64,
    /// Union of species carried by the edges touching this coordinate.
    pub species_tags: SpeciesTags,
}

impl RoutePoint {
    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.location.x
    }
}

/// One consecutive coordinate pair inside an oriented edge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MicroSegment {
    /// Segment start.
    pub start: Coord<f64>,
    /// Segment end.
    pub end: Coord<f64>,
    /// Share of the parent edge length, metres.
    pub distance_meters: f64,
    /// Share of the parent edge time, seconds.
    pub time_to_next_seconds: f64,
    /// Risk inherited from the parent edge.
    pub risk_value: f64,
    /// Species inherited from the parent edge when risk is high enough.
    pub species_tags: SpeciesTags,
}

/// Requested output granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OutputMode {
    /// De-duplicated points with merged risk.
    #[default]
    Points,
    /// One micro-segment per coordinate pair, no merging.
    Segments,
}

/// Geometry of a variant at its chosen granularity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", content = "items", rename_all = "lowercase"))]
pub enum RouteGeometry {
    /// Point-merged output.
    Points(Vec<RoutePoint>),
    /// Micro-segment output.
    Segments(Vec<MicroSegment>),
}

impl RouteGeometry {
    /// Number of points or segments.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Points(points) => points.len(),
            Self::Segments(segments) => segments.len(),
        }
    }

    /// Whether the geometry holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Which granularity this geometry uses.
    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        match self {
            Self::Points(_) => OutputMode::Points,
            Self::Segments(_) => OutputMode::Segments,
        }
    }
}

/// One computed route with its annotations.
///
/// # Examples
/// ```
/// use saferoads_core::{RiskSummary, RouteGeometry, RouteTotals, RouteVariant};
///
/// let variant = RouteVariant {
///     geometry: RouteGeometry::Points(Vec::new()),
///     totals: RouteTotals { distance_meters: 950.0, time_seconds: 480.0 },
///     risk: RiskSummary::default(),
///     has_elevated_risk: false,
/// };
/// assert_eq!(variant.formatted_distance(), "950 meters");
/// assert_eq!(variant.formatted_duration(), "8 min");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteVariant {
    /// Points or micro-segments from start to end.
    pub geometry: RouteGeometry,
    /// Distance and time totals.
    pub totals: RouteTotals,
    /// Risk statistics.
    pub risk: RiskSummary,
    /// Whether any included edge exceeded the alarm threshold.
    pub has_elevated_risk: bool,
}

impl RouteVariant {
    /// Total included distance, metres.
    #[must_use]
    pub const fn total_distance_meters(&self) -> f64 {
        self.totals.distance_meters
    }

    /// Total included time, seconds.
    #[must_use]
    pub const fn total_time_seconds(&self) -> f64 {
        self.totals.time_seconds
    }

    /// Highest risk seen on the route.
    #[must_use]
    pub const fn max_risk_value(&self) -> f64 {
        self.risk.max_risk_value
    }

    /// Category of the highest risk.
    #[must_use]
    pub const fn risk_category(&self) -> RiskCategory {
        self.risk.risk_category
    }

    /// Distance travelled within the dominant risk category, metres.
    #[must_use]
    pub const fn distance_in_dominant_risk_category(&self) -> f64 {
        self.risk.distance_in_dominant_risk_category
    }

    /// Human-readable distance.
    #[must_use]
    pub fn formatted_distance(&self) -> String {
        self.totals.formatted_distance()
    }

    /// Human-readable time.
    #[must_use]
    pub fn formatted_duration(&self) -> String {
        self.totals.formatted_duration()
    }
}

/// A variant paired with its name, e.g. `"adjusted"` or `"default"`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedVariant {
    /// Variant name.
    pub name: String,
    /// Variant data.
    pub variant: RouteVariant,
}
