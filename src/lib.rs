//! Facade crate for the SafeRoads route assembly engine.
//!
//! This crate re-exports the core domain types and, behind the `data`
//! feature, the routing service wire formats.

#![forbid(unsafe_code)]

pub use saferoads_core::{
    AssembledRoutes, AssemblyConfig, AssemblyConfigError, AssemblyWarning, Diagnostics,
    EdgeRecord, EdgeRecordError, EdgeSource, EdgeSourceError, InvalidSpeedPolicy, OutputMode,
    PlanError, RiskCategory, RiskPolicy, RiskThresholds, RouteAssembler, RoutePlanner,
    RouteQuery, RouteVariant, SpatialSubset, SubsetPolicy, SubsetStrategy, VariantEdges,
    assemble_routes,
};

#[cfg(feature = "data")]
pub use saferoads_data::{
    DocumentError, EdgeRow, JsonEdgeSource, RouteRequestDocument, RoutesDocument,
};
