//! Edge records returned by the external routing service.
//!
//! One [`EdgeRecord`] describes one traversed graph edge. Records arrive in
//! path order, but the stored geometry may run against the direction of
//! travel; the [stitcher](crate::stitch) resolves that.

use std::collections::BTreeSet;

use geo::Coord;
use thiserror::Error;

/// Species identifiers contributing to an edge's risk.
///
/// A sorted set keeps serialised output and equality checks deterministic.
pub type SpeciesTags = BTreeSet<String>;

/// Sentinel used by the routing service to mark a forward traversal.
pub const FORWARD_DIRECTION_FLAG: i64 = -1;

/// The sense in which an edge is read relative to its stored geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TraversalDirection {
    /// Travel uses the edge's forward speed.
    Forward,
    /// Travel uses the edge's backward speed.
    Backward,
}

impl TraversalDirection {
    /// Interpret the routing service's direction flag.
    ///
    /// Only [`FORWARD_DIRECTION_FLAG`] means forward; every other value is
    /// read as backward.
    ///
    /// # Examples
    /// ```
    /// use saferoads_core::TraversalDirection;
    ///
    /// assert_eq!(TraversalDirection::from_flag(-1), TraversalDirection::Forward);
    /// assert_eq!(TraversalDirection::from_flag(1), TraversalDirection::Backward);
    /// assert_eq!(TraversalDirection::from_flag(0), TraversalDirection::Backward);
    /// ```
    #[must_use]
    pub const fn from_flag(flag: i64) -> Self {
        if flag == FORWARD_DIRECTION_FLAG {
            Self::Forward
        } else {
            Self::Backward
        }
    }
}

/// One traversed graph edge with speed and risk metadata.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use saferoads_core::{EdgeRecord, TraversalDirection};
///
/// # fn main() -> Result<(), saferoads_core::EdgeRecordError> {
/// let edge = EdgeRecord::new(
///     vec![Coord { x: -9.16, y: 38.90 }, Coord { x: -9.17, y: 38.90 }],
///     870.0,
/// )?
/// .with_speeds(Some(50.0), Some(30.0))
/// .with_risk(0.4, ["bufo_bufo"])?;
///
/// assert_eq!(edge.direction(), TraversalDirection::Forward);
/// assert!(edge.species_tags.contains("bufo_bufo"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    /// Stored geometry, `x = longitude`, `y = latitude`.
    pub geometry: Vec<Coord<f64>>,
    /// Edge length in metres as reported by the routing service.
    pub length_meters: f64,
    /// Speed in km/h when travelling forward.
    pub forward_speed_kmh: Option<f64>,
    /// Speed in km/h when travelling backward.
    pub backward_speed_kmh: Option<f64>,
    /// Raw direction sentinel, see [`TraversalDirection::from_flag`].
    pub direction_flag: i64,
    /// Non-negative risk score; `0.0` means no known risk.
    pub risk_value: f64,
    /// Species contributing to the risk.
    pub species_tags: SpeciesTags,
}

/// Reasons an [`EdgeRecord`] is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EdgeRecordError {
    /// The geometry holds fewer than two coordinates.
    #[error("edge geometry must contain at least two coordinates, found {count}")]
    TooFewCoordinates {
        /// Number of coordinates supplied.
        count: usize,
    },
    /// A coordinate was non-finite or outside WGS84 bounds.
    #[error("coordinate {index} ({lon}, {lat}) is not a valid WGS84 position")]
    InvalidCoordinate {
        /// Position of the coordinate within the geometry.
        index: usize,
        /// Longitude as supplied.
        lon: f64,
        /// Latitude as supplied.
        lat: f64,
    },
    /// The reported length was negative or non-finite.
    #[error("edge length must be a finite, non-negative number of metres, found {length}")]
    InvalidLength {
        /// Length as supplied.
        length: f64,
    },
    /// The risk value was negative or non-finite.
    #[error("risk value must be finite and non-negative, found {risk}")]
    InvalidRisk {
        /// Risk as supplied.
        risk: f64,
    },
}

/// Whether `coord` is a finite WGS84 position.
#[must_use]
pub fn is_valid_position(coord: Coord<f64>) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}

impl EdgeRecord {
    /// Validate the geometry and length and construct a record without
    /// speeds or risk, read in the forward sense.
    pub fn new(geometry: Vec<Coord<f64>>, length_meters: f64) -> Result<Self, EdgeRecordError> {
        let edge = Self {
            geometry,
            length_meters,
            forward_speed_kmh: None,
            backward_speed_kmh: None,
            direction_flag: FORWARD_DIRECTION_FLAG,
            risk_value: 0.0,
            species_tags: SpeciesTags::new(),
        };
        edge.validate()?;
        Ok(edge)
    }

    /// Set the forward and backward speeds in km/h.
    #[must_use]
    pub fn with_speeds(mut self, forward_kmh: Option<f64>, backward_kmh: Option<f64>) -> Self {
        self.forward_speed_kmh = forward_kmh;
        self.backward_speed_kmh = backward_kmh;
        self
    }

    /// Set the raw direction sentinel.
    #[must_use]
    pub fn with_direction_flag(mut self, flag: i64) -> Self {
        self.direction_flag = flag;
        self
    }

    /// Attach a risk value and the species contributing to it.
    pub fn with_risk<I, S>(mut self, risk_value: f64, species: I) -> Result<Self, EdgeRecordError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !risk_value.is_finite() || risk_value < 0.0 {
            return Err(EdgeRecordError::InvalidRisk { risk: risk_value });
        }
        self.risk_value = risk_value;
        self.species_tags = species.into_iter().map(Into::into).collect();
        Ok(self)
    }

    /// Re-check every invariant.
    ///
    /// Fields are public, so the assembler calls this again before use.
    pub fn validate(&self) -> Result<(), EdgeRecordError> {
        if self.geometry.len() < 2 {
            return Err(EdgeRecordError::TooFewCoordinates {
                count: self.geometry.len(),
            });
        }
        if let Some((index, coord)) = self
            .geometry
            .iter()
            .enumerate()
            .find(|(_, coord)| !is_valid_position(**coord))
        {
            return Err(EdgeRecordError::InvalidCoordinate {
                index,
                lon: coord.x,
                lat: coord.y,
            });
        }
        if !self.length_meters.is_finite() || self.length_meters < 0.0 {
            return Err(EdgeRecordError::InvalidLength {
                length: self.length_meters,
            });
        }
        if !self.risk_value.is_finite() || self.risk_value < 0.0 {
            return Err(EdgeRecordError::InvalidRisk {
                risk: self.risk_value,
            });
        }
        Ok(())
    }

    /// Direction derived from the raw flag.
    #[must_use]
    pub const fn direction(&self) -> TraversalDirection {
        TraversalDirection::from_flag(self.direction_flag)
    }

    /// First stored coordinate, if any.
    #[must_use]
    pub fn first_coord(&self) -> Option<Coord<f64>> {
        self.geometry.first().copied()
    }

    /// Last stored coordinate, if any.
    #[must_use]
    pub fn last_coord(&self) -> Option<Coord<f64>> {
        self.geometry.last().copied()
    }
}
