//! Wildlife-risk categorisation and route-level risk summaries.
//!
//! Two independent scales are in play. Category thresholds bucket a `0..1`
//! risk score; the alarm threshold flags elevated risk on the routing
//! service's coarser scale. Neither is derived from the other.

use std::fmt;

use thiserror::Error;

use crate::edge::SpeciesTags;

/// Five-level bucketing of a risk score, ordered from safest to riskiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum RiskCategory {
    /// Below the medium-low threshold.
    #[default]
    Low,
    /// At least the medium-low threshold.
    MediumLow,
    /// At least the medium threshold.
    Medium,
    /// At least the medium-high threshold.
    MediumHigh,
    /// At least the high threshold.
    High,
}

impl RiskCategory {
    /// Categorise `risk_value` with the default thresholds.
    ///
    /// # Examples
    /// ```
    /// use saferoads_core::RiskCategory;
    ///
    /// assert_eq!(RiskCategory::from_value(0.65), RiskCategory::High);
    /// assert_eq!(RiskCategory::from_value(0.25), RiskCategory::MediumLow);
    /// ```
    #[must_use]
    pub fn from_value(risk_value: f64) -> Self {
        RiskThresholds::default().categorise(risk_value)
    }

    /// Stable camel-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::MediumLow => "mediumLow",
            Self::Medium => "medium",
            Self::MediumHigh => "mediumHigh",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive lower bounds for each category above [`RiskCategory::Low`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskThresholds {
    /// Lower bound of [`RiskCategory::MediumLow`].
    pub medium_low: f64,
    /// Lower bound of [`RiskCategory::Medium`].
    pub medium: f64,
    /// Lower bound of [`RiskCategory::MediumHigh`].
    pub medium_high: f64,
    /// Lower bound of [`RiskCategory::High`].
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium_low: 0.2,
            medium: 0.3,
            medium_high: 0.5,
            high: 0.6,
        }
    }
}

impl RiskThresholds {
    /// Bucket `risk_value`, testing from the highest bound down.
    #[must_use]
    pub fn categorise(&self, risk_value: f64) -> RiskCategory {
        if risk_value >= self.high {
            RiskCategory::High
        } else if risk_value >= self.medium_high {
            RiskCategory::MediumHigh
        } else if risk_value >= self.medium {
            RiskCategory::Medium
        } else if risk_value >= self.medium_low {
            RiskCategory::MediumLow
        } else {
            RiskCategory::Low
        }
    }

    fn is_ascending(&self) -> bool {
        [self.medium_low, self.medium, self.medium_high, self.high]
            .windows(2)
            .all(|pair| matches!(pair, [lower, upper] if lower <= upper))
    }
}

/// Risk configuration applied during assembly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskPolicy {
    /// Category bounds on the `0..1` scale.
    pub thresholds: RiskThresholds,
    /// Species tags are carried only when risk is strictly above this.
    pub species_tag_threshold: f64,
    /// An edge with risk strictly above this marks the route as elevated.
    pub alarm_threshold: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            species_tag_threshold: 0.3,
            alarm_threshold: 2.0,
        }
    }
}

/// Errors returned by [`RiskPolicy::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskPolicyError {
    /// A threshold was NaN or infinite.
    #[error("{field} must be a finite number, found {value}")]
    NonFinite {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: f64,
    },
    /// Category bounds were not in ascending order.
    #[error("risk category thresholds must ascend from medium-low to high")]
    UnorderedThresholds,
}

impl RiskPolicy {
    /// Override the species-tag threshold.
    #[must_use]
    pub fn with_species_tag_threshold(mut self, threshold: f64) -> Self {
        self.species_tag_threshold = threshold;
        self
    }

    /// Override the alarm threshold.
    #[must_use]
    pub fn with_alarm_threshold(mut self, threshold: f64) -> Self {
        self.alarm_threshold = threshold;
        self
    }

    /// Check every value is finite and the category bounds ascend.
    pub fn validate(&self) -> Result<(), RiskPolicyError> {
        let fields = [
            ("medium_low", self.thresholds.medium_low),
            ("medium", self.thresholds.medium),
            ("medium_high", self.thresholds.medium_high),
            ("high", self.thresholds.high),
            ("species_tag_threshold", self.species_tag_threshold),
            ("alarm_threshold", self.alarm_threshold),
        ];
        if let Some((field, value)) = fields.into_iter().find(|(_, value)| !value.is_finite()) {
            return Err(RiskPolicyError::NonFinite { field, value });
        }
        if !self.thresholds.is_ascending() {
            return Err(RiskPolicyError::UnorderedThresholds);
        }
        Ok(())
    }

    /// Species tags to carry for an exposure at `risk_value`.
    #[must_use]
    pub fn carried_species(&self, risk_value: f64, tags: &SpeciesTags) -> SpeciesTags {
        if risk_value > self.species_tag_threshold {
            tags.clone()
        } else {
            SpeciesTags::new()
        }
    }

    /// Whether `risk_value` trips the alarm.
    #[must_use]
    pub fn is_elevated(&self, risk_value: f64) -> bool {
        risk_value > self.alarm_threshold
    }
}

/// Route-level risk statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskSummary {
    /// Highest risk across all exposures.
    pub max_risk_value: f64,
    /// Category of [`Self::max_risk_value`].
    pub risk_category: RiskCategory,
    /// Total distance of every exposure sharing [`Self::risk_category`].
    pub distance_in_dominant_risk_category: f64,
}

impl RiskSummary {
    /// Summarise `(risk_value, distance_meters)` exposures.
    ///
    /// Every exposure whose own category matches the dominant category
    /// contributes its distance, not only the single riskiest one.
    ///
    /// # Examples
    /// ```
    /// use saferoads_core::{RiskCategory, RiskSummary, RiskThresholds};
    ///
    /// let summary = RiskSummary::from_exposures(
    ///     &RiskThresholds::default(),
    ///     [(0.65, 100.0), (0.62, 50.0), (0.1, 500.0)],
    /// );
    /// assert_eq!(summary.max_risk_value, 0.65);
    /// assert_eq!(summary.risk_category, RiskCategory::High);
    /// assert_eq!(summary.distance_in_dominant_risk_category, 150.0);
    /// ```
    #[must_use]
    pub fn from_exposures<I>(thresholds: &RiskThresholds, exposures: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let exposures: Vec<(f64, f64)> = exposures.into_iter().collect();
        let max_risk_value = exposures
            .iter()
            .map(|(risk, _)| *risk)
            .fold(0.0_f64, f64::max);
        let risk_category = thresholds.categorise(max_risk_value);
        let distance_in_dominant_risk_category = exposures
            .iter()
            .filter(|(risk, _)| thresholds.categorise(*risk) == risk_category)
            .map(|(_, distance)| *distance)
            .sum();
        Self {
            max_risk_value,
            risk_category,
            distance_in_dominant_risk_category,
        }
    }
}
