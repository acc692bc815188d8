//! Bound the road-network subset handed to the routing service.
//!
//! The buffer grows linearly with the start/end distance and is capped. Small
//! buffers ask the service to build the risk-joined subset freshly; large
//! ones use its precomputed risk-joined view. All four constants are
//! configuration on [`SubsetPolicy`].

use geo::{Coord, Rect};
use thiserror::Error;

use crate::distance::haversine_km;

/// How the routing service should obtain the risk-joined edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SubsetStrategy {
    /// Join per-edge risk afresh inside the envelope.
    FreshJoin,
    /// Filter the precomputed risk-joined view to the envelope.
    PrecomputedView,
}

/// The envelope and strategy chosen for one start/end pair.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialSubset {
    /// Axis-aligned envelope, `x = longitude`, `y = latitude`.
    pub envelope: Rect<f64>,
    /// Margin added on every side, degrees.
    pub buffer_degrees: f64,
    /// Great-circle distance between start and end, kilometres.
    pub distance_km: f64,
    /// Chosen subset strategy.
    pub strategy: SubsetStrategy,
}

impl SpatialSubset {
    /// Envelope as `[min_lon, min_lat, max_lon, max_lat]`.
    #[must_use]
    pub fn bounds(&self) -> [f64; 4] {
        let min = self.envelope.min();
        let max = self.envelope.max();
        [min.x, min.y, max.x, max.y]
    }
}

/// Policy constants for [`SubsetPolicy::select`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubsetPolicy {
    /// Buffer applied at zero distance, degrees.
    pub base_buffer_degrees: f64,
    /// Buffer growth per kilometre of start/end distance, degrees.
    pub buffer_degrees_per_km: f64,
    /// Upper bound on the buffer, degrees.
    pub max_buffer_degrees: f64,
    /// Buffers at or above this use [`SubsetStrategy::PrecomputedView`].
    pub precomputed_threshold_degrees: f64,
}

impl Default for SubsetPolicy {
    fn default() -> Self {
        Self {
            base_buffer_degrees: 0.02,
            buffer_degrees_per_km: 0.01,
            max_buffer_degrees: 1.0,
            precomputed_threshold_degrees: 0.5,
        }
    }
}

/// Errors returned by [`SubsetPolicy::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubsetPolicyError {
    /// A constant was negative, NaN or infinite.
    #[error("{field} must be a finite, non-negative number of degrees, found {value}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: f64,
    },
    /// The cap is smaller than the base buffer.
    #[error("max buffer {max} is smaller than base buffer {base}")]
    CapBelowBase {
        /// Base buffer supplied.
        base: f64,
        /// Cap supplied.
        max: f64,
    },
}

impl SubsetPolicy {
    /// Override the base buffer.
    #[must_use]
    pub fn with_base_buffer_degrees(mut self, degrees: f64) -> Self {
        self.base_buffer_degrees = degrees;
        self
    }

    /// Override the per-kilometre growth.
    #[must_use]
    pub fn with_buffer_degrees_per_km(mut self, degrees: f64) -> Self {
        self.buffer_degrees_per_km = degrees;
        self
    }

    /// Override the buffer cap.
    #[must_use]
    pub fn with_max_buffer_degrees(mut self, degrees: f64) -> Self {
        self.max_buffer_degrees = degrees;
        self
    }

    /// Override the strategy threshold.
    #[must_use]
    pub fn with_precomputed_threshold_degrees(mut self, degrees: f64) -> Self {
        self.precomputed_threshold_degrees = degrees;
        self
    }

    /// Check every constant is finite and non-negative and the cap is not
    /// below the base.
    pub fn validate(&self) -> Result<(), SubsetPolicyError> {
        let fields = [
            ("base_buffer_degrees", self.base_buffer_degrees),
            ("buffer_degrees_per_km", self.buffer_degrees_per_km),
            ("max_buffer_degrees", self.max_buffer_degrees),
            (
                "precomputed_threshold_degrees",
                self.precomputed_threshold_degrees,
            ),
        ];
        if let Some((field, value)) = fields
            .into_iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(SubsetPolicyError::InvalidValue { field, value });
        }
        if self.max_buffer_degrees < self.base_buffer_degrees {
            return Err(SubsetPolicyError::CapBelowBase {
                base: self.base_buffer_degrees,
                max: self.max_buffer_degrees,
            });
        }
        Ok(())
    }

    /// Buffer in degrees for a start/end distance in kilometres.
    #[must_use]
    pub fn buffer_degrees(&self, distance_km: f64) -> f64 {
        (self.base_buffer_degrees + distance_km * self.buffer_degrees_per_km)
            .min(self.max_buffer_degrees)
    }

    /// Strategy for a given buffer.
    #[must_use]
    pub fn strategy_for(&self, buffer_degrees: f64) -> SubsetStrategy {
        if buffer_degrees < self.precomputed_threshold_degrees {
            SubsetStrategy::FreshJoin
        } else {
            SubsetStrategy::PrecomputedView
        }
    }

    /// Derive the envelope and strategy for a start/end pair.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use saferoads_core::{SubsetPolicy, SubsetStrategy};
    ///
    /// let start = Coord { x: -9.163_266, y: 38.902_464 };
    /// let end = Coord { x: -9.177_862, y: 38.902_290 };
    /// let subset = SubsetPolicy::default().select(start, end);
    ///
    /// assert_eq!(subset.strategy, SubsetStrategy::FreshJoin);
    /// assert!(subset.envelope.min().x < end.x);
    /// assert!(subset.envelope.max().y > start.y);
    /// ```
    #[must_use]
    pub fn select(&self, start: Coord<f64>, end: Coord<f64>) -> SpatialSubset {
        let distance_km = haversine_km(start, end);
        let buffer_degrees = self.buffer_degrees(distance_km);
        let min = Coord {
            x: start.x.min(end.x) - buffer_degrees,
            y: start.y.min(end.y) - buffer_degrees,
        };
        let max = Coord {
            x: start.x.max(end.x) + buffer_degrees,
            y: start.y.max(end.y) + buffer_degrees,
        };
        let strategy = self.strategy_for(buffer_degrees);
        log::debug!(
            "subset for {distance_km:.3} km: buffer {buffer_degrees:.4} deg, strategy {strategy:?}"
        );
        SpatialSubset {
            envelope: Rect::new(min, max),
            buffer_degrees,
            distance_km,
            strategy,
        }
    }
}
