use thiserror::Error;

use crate::assemble::{AssembledRoutes, Diagnostics, RouteAssembler};
use crate::source::{EdgeSource, EdgeSourceError, RouteQuery};
use crate::subset::SubsetPolicy;

/// Errors returned by [`RoutePlanner::plan`].
#[derive(Debug, Error)]
pub enum PlanError {
    /// The edge source failed.
    #[error("failed to fetch route edges")]
    Source(#[from] EdgeSourceError),
    /// No variant survived assembly.
    #[error("no route found")]
    NoRouteFound {
        /// Diagnostics explaining why each variant was omitted.
        diagnostics: Diagnostics,
    },
}

/// Select a subset, fetch variants from an [`EdgeSource`] and assemble them.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use saferoads_core::test_support::{FixedEdgeSource, chain_through};
/// use saferoads_core::{RouteAssembler, RoutePlanner, RouteQuery, SubsetPolicy, VariantEdges};
///
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 0.001, y: 0.0 };
/// let source = FixedEdgeSource::new(vec![VariantEdges::new("adjusted", chain_through(&[a, b]))]);
/// let planner = RoutePlanner::new(&source, SubsetPolicy::default(), RouteAssembler::default());
///
/// let query = RouteQuery::new(a, b).expect("valid query");
/// let routes = planner.plan(&query).expect("route found");
/// assert!(routes.get("adjusted").is_some());
/// assert!(source.last_subset().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RoutePlanner<S> {
    source: S,
    subset: SubsetPolicy,
    assembler: RouteAssembler,
}

impl<S: EdgeSource> RoutePlanner<S> {
    /// Combine a source with subset and assembly policies.
    pub fn new(source: S, subset: SubsetPolicy, assembler: RouteAssembler) -> Self {
        Self {
            source,
            subset,
            assembler,
        }
    }

    /// Plan routes for `query`.
    pub fn plan(&self, query: &RouteQuery) -> Result<AssembledRoutes, PlanError> {
        let subset = self.subset.select(query.start(), query.end());
        let variants = self.source.fetch_variants(query, &subset)?;
        log::debug!("fetched {} variants for {:?}", variants.len(), subset.strategy);
        let routes = self
            .assembler
            .assemble_routes(query.start(), query.end(), &variants);
        if routes.is_empty() {
            let (_, diagnostics) = routes.into_parts();
            return Err(PlanError::NoRouteFound { diagnostics });
        }
        Ok(routes)
    }
}
