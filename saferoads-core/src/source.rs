//! The seam to the external graph-routing service.
//!
//! The service executes the risk-weighted shortest-path search and the
//! spatial joins. This crate only fixes what it is asked for, a
//! [`RouteQuery`] bounded by a [`SpatialSubset`], and what comes back, one
//! ordered edge list per named variant.

use geo::Coord;
use thiserror::Error;

use crate::edge::{EdgeRecord, SpeciesTags, is_valid_position};
use crate::subset::SpatialSubset;

/// The ordered edges of one named variant, in path sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariantEdges {
    /// Variant name, e.g. `"adjusted"`.
    pub name: String,
    /// Edges ordered by path sequence.
    pub edges: Vec<EdgeRecord>,
}

impl VariantEdges {
    /// Pair a name with its edges.
    pub fn new(name: impl Into<String>, edges: Vec<EdgeRecord>) -> Self {
        Self {
            name: name.into(),
            edges,
        }
    }
}

/// A start/end pair plus the caller's risk preferences.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use saferoads_core::RouteQuery;
///
/// let query = RouteQuery::new(Coord { x: -9.16, y: 38.90 }, Coord { x: -9.18, y: 38.90 })
///     .expect("valid positions")
///     .with_low_risk_only(true)
///     .with_selected_species(["bufo_bufo"])
///     .expect("non-empty species");
/// assert!(query.low_risk_only());
/// assert!(query.selected_species().contains("bufo_bufo"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteQuery {
    start: Coord<f64>,
    end: Coord<f64>,
    low_risk_only: bool,
    selected_species: SpeciesTags,
}

/// Errors raised while building a [`RouteQuery`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteQueryError {
    /// The start position was non-finite or outside WGS84 bounds.
    #[error("start position ({lon}, {lat}) is not a valid WGS84 coordinate")]
    InvalidStart {
        /// Longitude supplied.
        lon: f64,
        /// Latitude supplied.
        lat: f64,
    },
    /// The end position was non-finite or outside WGS84 bounds.
    #[error("end position ({lon}, {lat}) is not a valid WGS84 coordinate")]
    InvalidEnd {
        /// Longitude supplied.
        lon: f64,
        /// Latitude supplied.
        lat: f64,
    },
    /// A selected species name was blank.
    #[error("selected species names must not be blank")]
    BlankSpecies,
}

impl RouteQuery {
    /// Validate both positions.
    pub fn new(start: Coord<f64>, end: Coord<f64>) -> Result<Self, RouteQueryError> {
        if !is_valid_position(start) {
            return Err(RouteQueryError::InvalidStart {
                lon: start.x,
                lat: start.y,
            });
        }
        if !is_valid_position(end) {
            return Err(RouteQueryError::InvalidEnd {
                lon: end.x,
                lat: end.y,
            });
        }
        Ok(Self {
            start,
            end,
            low_risk_only: false,
            selected_species: SpeciesTags::new(),
        })
    }

    /// Ask the service to prefer low-risk edges.
    #[must_use]
    pub fn with_low_risk_only(mut self, low_risk_only: bool) -> Self {
        self.low_risk_only = low_risk_only;
        self
    }

    /// Restrict risk to the named species. An empty set means every species.
    pub fn with_selected_species<I, S>(mut self, species: I) -> Result<Self, RouteQueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let species: SpeciesTags = species
            .into_iter()
            .map(|name| name.into().trim().to_owned())
            .collect();
        if species.iter().any(String::is_empty) {
            return Err(RouteQueryError::BlankSpecies);
        }
        self.selected_species = species;
        Ok(self)
    }

    /// Requested start.
    #[must_use]
    pub const fn start(&self) -> Coord<f64> {
        self.start
    }

    /// Requested end.
    #[must_use]
    pub const fn end(&self) -> Coord<f64> {
        self.end
    }

    /// Whether only low-risk routing was requested.
    #[must_use]
    pub const fn low_risk_only(&self) -> bool {
        self.low_risk_only
    }

    /// Species the risk join is restricted to.
    #[must_use]
    pub const fn selected_species(&self) -> &SpeciesTags {
        &self.selected_species
    }
}

/// Errors returned by an [`EdgeSource`].
#[derive(Debug, Error)]
pub enum EdgeSourceError {
    /// The routing service could not be reached or failed.
    #[error("routing service unavailable: {message}")]
    Unavailable {
        /// Description from the service.
        message: String,
    },
    /// The service answered with data that could not be understood.
    #[error("routing service returned malformed data")]
    Malformed {
        /// Underlying decoding error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Produce variant edge lists for a query within a subset.
///
/// Implementations must be `Send + Sync`; the boundary layer may plan many
/// requests concurrently. Variants are returned in the order the service
/// ranks them. An empty variant is allowed and is skipped at assembly.
pub trait EdgeSource: Send + Sync {
    /// Fetch every variant for `query` restricted to `subset`.
    fn fetch_variants(
        &self,
        query: &RouteQuery,
        subset: &SpatialSubset,
    ) -> Result<Vec<VariantEdges>, EdgeSourceError>;
}

impl<T: EdgeSource + ?Sized> EdgeSource for &T {
    fn fetch_variants(
        &self,
        query: &RouteQuery,
        subset: &SpatialSubset,
    ) -> Result<Vec<VariantEdges>, EdgeSourceError> {
        (**self).fetch_variants(query, subset)
    }
}
