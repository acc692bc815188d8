//! Edge builders and an in-memory `EdgeSource` used by unit, behaviour and
//! property tests.

use std::sync::Mutex;

use geo::Coord;

use crate::{
    EdgeRecord, EdgeSource, EdgeSourceError, FORWARD_DIRECTION_FLAG, RouteQuery, SpatialSubset,
    SpeciesTags, VariantEdges,
};

/// Length given to every edge built here, metres.
pub const TEST_EDGE_LENGTH_METERS: f64 = 100.0;

/// Speed given to every edge built here, km/h. 100 m take 10 s.
pub const TEST_EDGE_SPEED_KMH: f64 = 36.0;

/// A riskless two-point edge stored `from` → `to`.
#[must_use]
pub fn edge_between(from: Coord<f64>, to: Coord<f64>) -> EdgeRecord {
    risky_edge_between(from, to, 0.0, &[])
}

/// A two-point edge carrying `risk` and `species`.
///
/// Fields are set directly; callers may build deliberately invalid edges by
/// passing out-of-range values.
#[must_use]
pub fn risky_edge_between(
    from: Coord<f64>,
    to: Coord<f64>,
    risk: f64,
    species: &[&str],
) -> EdgeRecord {
    EdgeRecord {
        geometry: vec![from, to],
        length_meters: TEST_EDGE_LENGTH_METERS,
        forward_speed_kmh: Some(TEST_EDGE_SPEED_KMH),
        backward_speed_kmh: Some(TEST_EDGE_SPEED_KMH),
        direction_flag: FORWARD_DIRECTION_FLAG,
        risk_value: risk,
        species_tags: species.iter().map(|s| (*s).to_owned()).collect::<SpeciesTags>(),
    }
}

/// Edges joining consecutive `points`, each stored in traversal order.
#[must_use]
pub fn chain_through(points: &[Coord<f64>]) -> Vec<EdgeRecord> {
    points
        .windows(2)
        .filter_map(|pair| match pair {
            [from, to] => Some(edge_between(*from, *to)),
            _ => None,
        })
        .collect()
}

/// `EdgeSource` returning canned variants and remembering each request.
#[derive(Debug, Default)]
pub struct FixedEdgeSource {
    variants: Vec<VariantEdges>,
    failure: Option<String>,
    requests: Mutex<Vec<(RouteQuery, SpatialSubset)>>,
}

impl FixedEdgeSource {
    /// Serve `variants` for every query.
    #[must_use]
    pub fn new(variants: Vec<VariantEdges>) -> Self {
        Self {
            variants,
            ..Self::default()
        }
    }

    /// Fail every query as if the routing service were down.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Every `(query, subset)` pair received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<(RouteQuery, SpatialSubset)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Subset of the most recent request.
    #[must_use]
    pub fn last_subset(&self) -> Option<SpatialSubset> {
        self.requests().last().map(|(_, subset)| *subset)
    }
}

impl EdgeSource for FixedEdgeSource {
    fn fetch_variants(
        &self,
        query: &RouteQuery,
        subset: &SpatialSubset,
    ) -> Result<Vec<VariantEdges>, EdgeSourceError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((query.clone(), *subset));
        }
        match &self.failure {
            Some(message) => Err(EdgeSourceError::Unavailable {
                message: message.clone(),
            }),
            None => Ok(self.variants.clone()),
        }
    }
}
