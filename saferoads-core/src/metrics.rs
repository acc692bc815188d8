//! Direction-aware speed selection and distance/time accumulation.
//!
//! Speeds are km/h, lengths metres, times seconds. Totals are an explicit
//! fold over measured edges and never depend on how the stitched geometry
//! later merges coincident points.

use crate::edge::{EdgeRecord, TraversalDirection};
use crate::format::{format_distance, format_duration};

/// How to treat an edge whose selected speed is missing, non-positive or
/// non-finite.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum InvalidSpeedPolicy {
    /// Drop the edge from totals and geometry. The path may show a gap.
    Skip,
    /// Omit the whole variant.
    #[default]
    FailVariant,
    /// Substitute a fixed speed.
    Fallback {
        /// Substitute speed in km/h.
        speed_kmh: f64,
    },
}

/// An edge paired with the speed and time used for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredEdge<'a> {
    /// The underlying record.
    pub edge: &'a EdgeRecord,
    /// Speed applied, km/h.
    pub speed_kmh: f64,
    /// Traversal time, seconds.
    pub time_seconds: f64,
}

impl<'a> MeasuredEdge<'a> {
    /// Measure `edge` at `speed_kmh`.
    #[must_use]
    pub fn new(edge: &'a EdgeRecord, speed_kmh: f64) -> Self {
        Self {
            edge,
            speed_kmh,
            time_seconds: edge_time_seconds(edge.length_meters, speed_kmh),
        }
    }

    /// Length of the underlying edge in metres.
    #[must_use]
    pub const fn length_meters(&self) -> f64 {
        self.edge.length_meters
    }
}

/// Result of applying an [`InvalidSpeedPolicy`] to one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedOutcome<'a> {
    /// The edge's own speed was usable.
    Measured(MeasuredEdge<'a>),
    /// The fallback speed replaced a missing one.
    Substituted(MeasuredEdge<'a>),
    /// The edge is excluded from the variant.
    Skipped,
    /// The variant must be omitted.
    VariantFailed,
}

/// Speed for the edge's traversal direction, as reported.
#[must_use]
pub const fn select_speed(edge: &EdgeRecord) -> Option<f64> {
    match edge.direction() {
        TraversalDirection::Forward => edge.forward_speed_kmh,
        TraversalDirection::Backward => edge.backward_speed_kmh,
    }
}

/// Selected speed when it is finite and strictly positive.
#[must_use]
pub fn usable_speed(edge: &EdgeRecord) -> Option<f64> {
    select_speed(edge).filter(|speed| speed.is_finite() && *speed > 0.0)
}

/// Seconds needed to cover `length_meters` at `speed_kmh`.
///
/// # Examples
/// ```
/// use saferoads_core::edge_time_seconds;
///
/// assert_eq!(edge_time_seconds(1000.0, 36.0), 100.0);
/// ```
#[must_use]
pub fn edge_time_seconds(length_meters: f64, speed_kmh: f64) -> f64 {
    length_meters / (speed_kmh * 1000.0 / 3600.0)
}

/// Apply `policy` to `edge`.
#[must_use]
pub fn measure(edge: &EdgeRecord, policy: InvalidSpeedPolicy) -> SpeedOutcome<'_> {
    if let Some(speed) = usable_speed(edge) {
        return SpeedOutcome::Measured(MeasuredEdge::new(edge, speed));
    }
    match policy {
        InvalidSpeedPolicy::Skip => SpeedOutcome::Skipped,
        InvalidSpeedPolicy::FailVariant => SpeedOutcome::VariantFailed,
        InvalidSpeedPolicy::Fallback { speed_kmh } => {
            SpeedOutcome::Substituted(MeasuredEdge::new(edge, speed_kmh))
        }
    }
}

/// Running distance and time totals for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteTotals {
    /// Sum of included edge lengths, metres.
    pub distance_meters: f64,
    /// Sum of included edge times, seconds.
    pub time_seconds: f64,
}

impl RouteTotals {
    /// Totals with `edge` added.
    #[must_use]
    pub fn add(self, edge: &MeasuredEdge<'_>) -> Self {
        Self {
            distance_meters: self.distance_meters + edge.length_meters(),
            time_seconds: self.time_seconds + edge.time_seconds,
        }
    }

    /// Fold totals over a sequence of measured edges.
    #[must_use]
    pub fn from_edges<'e, 'a: 'e, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = &'e MeasuredEdge<'a>>,
    {
        edges.into_iter().fold(Self::default(), Self::add)
    }

    /// Distance rendered by [`format_distance`].
    #[must_use]
    pub fn formatted_distance(&self) -> String {
        format_distance(self.distance_meters)
    }

    /// Time rendered by [`format_duration`].
    #[must_use]
    pub fn formatted_duration(&self) -> String {
        format_duration(self.time_seconds)
    }
}
