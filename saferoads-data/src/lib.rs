//! Wire formats around the SafeRoads core.
//!
//! Responsibilities:
//! - Decode the graph-routing service's edge rows into validated
//!   [`saferoads_core::EdgeRecord`]s.
//! - Read JSON route-request documents and serve them through the
//!   [`saferoads_core::EdgeSource`] seam.
//! - Render assembled routes as client-facing JSON.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `saferoads-core`).
//! - Malformed rows are dropped with a warning, never fatal.

pub mod document;
pub mod response;
pub mod rows;

pub use document::{DocumentError, GeoPoint, JsonEdgeSource, RouteRequestDocument, VariantRows};
pub use response::{
    GeometryDocument, NamedVariants, PointDocument, RoutesDocument, SegmentDocument,
    VariantDocument,
};
pub use rows::{
    DecodedVariant, EdgeRejection, EdgeRow, RejectionReason, decode_variant, parse_line_string,
};
