//! Core route-assembly pipeline for the SafeRoads engine.
//!
//! An external graph-routing service answers a start/end query with one
//! ordered edge list per named variant. This crate stitches those edges into
//! a continuous path, totals distance and time with direction-dependent
//! speeds, aggregates wildlife-risk exposure and collapses duplicate
//! variants. Each assembly is a pure transformation of one query's edges.
//!
//! Constructors validate their input and return `Result`; the assembler
//! never fails, recording dropped or repaired input in [`Diagnostics`]
//! instead.

pub mod assemble;
pub mod compare;
pub mod distance;
pub mod edge;
pub mod format;
pub mod metrics;
pub mod planner;
pub mod risk;
pub mod route;
pub mod source;
pub mod stitch;
pub mod subset;

#[doc(hidden)]
pub mod test_support;

pub use assemble::{
    AssembledRoutes, AssemblyConfig, AssemblyConfigError, AssemblyWarning, Diagnostics,
    RouteAssembler, assemble_routes,
};
pub use compare::{DEFAULT_VARIANT, collapse_duplicates};
pub use distance::{EARTH_RADIUS_METRES, haversine_distance, haversine_km};
pub use edge::{
    EdgeRecord, EdgeRecordError, FORWARD_DIRECTION_FLAG, SpeciesTags, TraversalDirection,
    is_valid_position,
};
pub use format::{format_distance, format_duration};
pub use metrics::{
    InvalidSpeedPolicy, MeasuredEdge, RouteTotals, SpeedOutcome, edge_time_seconds, measure,
    select_speed, usable_speed,
};
pub use planner::{PlanError, RoutePlanner};
pub use risk::{RiskCategory, RiskPolicy, RiskPolicyError, RiskSummary, RiskThresholds};
pub use route::{MicroSegment, NamedVariant, OutputMode, RouteGeometry, RoutePoint, RouteVariant};
pub use source::{EdgeSource, EdgeSourceError, RouteQuery, RouteQueryError, VariantEdges};
pub use stitch::{
    ContinuityGap, Oriented, OrientedEdge, Polyline, continuity_gaps, merge_points,
    micro_segments, stitch,
};
pub use subset::{SpatialSubset, SubsetPolicy, SubsetPolicyError, SubsetStrategy};
