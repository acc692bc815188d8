//! Turn per-variant edge lists into annotated route variants.
//!
//! Each variant is processed independently and in input order: validate the
//! edges, apply the invalid-speed policy, stitch, fold the totals, build the
//! requested geometry and summarise risk. The comparator then collapses
//! identical leading variants. Everything the pipeline drops or repairs is
//! recorded in [`Diagnostics`] and logged with `log::warn!`.

use geo::Coord;
use thiserror::Error;

use crate::compare::collapse_duplicates;
use crate::distance::haversine_distance;
use crate::edge::EdgeRecordError;
use crate::metrics::{InvalidSpeedPolicy, MeasuredEdge, RouteTotals, SpeedOutcome, measure};
use crate::risk::{RiskPolicy, RiskPolicyError, RiskSummary};
use crate::route::{NamedVariant, OutputMode, RouteGeometry, RouteVariant};
use crate::source::VariantEdges;
use crate::stitch::{OrientedEdge, continuity_gaps, merge_points, micro_segments, stitch};

/// Tunables for [`RouteAssembler`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssemblyConfig {
    /// Point-merged or micro-segment output.
    pub output_mode: OutputMode,
    /// Category, species and alarm thresholds.
    pub risk: RiskPolicy,
    /// Treatment of edges without a usable speed.
    pub invalid_speed: InvalidSpeedPolicy,
    /// Joins wider than this many metres are reported as gaps.
    pub gap_tolerance_meters: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::default(),
            risk: RiskPolicy::default(),
            invalid_speed: InvalidSpeedPolicy::default(),
            gap_tolerance_meters: 1.0,
        }
    }
}

impl AssemblyConfig {
    /// Select the output granularity.
    #[must_use]
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Replace the risk policy.
    #[must_use]
    pub fn with_risk_policy(mut self, risk: RiskPolicy) -> Self {
        self.risk = risk;
        self
    }

    /// Replace the invalid-speed policy.
    #[must_use]
    pub fn with_invalid_speed(mut self, policy: InvalidSpeedPolicy) -> Self {
        self.invalid_speed = policy;
        self
    }

    /// Replace the continuity-gap tolerance.
    #[must_use]
    pub fn with_gap_tolerance_meters(mut self, tolerance: f64) -> Self {
        self.gap_tolerance_meters = tolerance;
        self
    }

    /// Check the nested risk policy, the fallback speed and the tolerance.
    pub fn validate(&self) -> Result<(), AssemblyConfigError> {
        self.risk.validate()?;
        if let InvalidSpeedPolicy::Fallback { speed_kmh } = self.invalid_speed
            && !(speed_kmh.is_finite() && speed_kmh > 0.0)
        {
            return Err(AssemblyConfigError::InvalidFallbackSpeed { speed_kmh });
        }
        if !self.gap_tolerance_meters.is_finite() || self.gap_tolerance_meters < 0.0 {
            return Err(AssemblyConfigError::InvalidGapTolerance {
                tolerance: self.gap_tolerance_meters,
            });
        }
        Ok(())
    }
}

/// Errors returned by [`AssemblyConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyConfigError {
    /// The risk policy was rejected.
    #[error("invalid risk policy")]
    Risk(#[from] RiskPolicyError),
    /// The fallback speed was not a positive finite number.
    #[error("fallback speed must be a positive number of km/h, found {speed_kmh}")]
    InvalidFallbackSpeed {
        /// Speed supplied.
        speed_kmh: f64,
    },
    /// The gap tolerance was negative or non-finite.
    #[error("gap tolerance must be a finite, non-negative number of metres, found {tolerance}")]
    InvalidGapTolerance {
        /// Tolerance supplied.
        tolerance: f64,
    },
}

/// Something the pipeline dropped, repaired or noticed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyWarning {
    /// The variant arrived without edges and was omitted.
    #[error("variant {variant} has no edges and was omitted")]
    EmptyVariant {
        /// Variant name.
        variant: String,
    },
    /// Every edge of the variant was rejected or skipped.
    #[error("variant {variant} has no usable edges and was omitted")]
    NoUsableEdges {
        /// Variant name.
        variant: String,
    },
    /// An edge failed validation and was dropped.
    #[error("variant {variant}: edge {index} rejected")]
    RejectedEdge {
        /// Variant name.
        variant: String,
        /// Position of the edge in the input sequence.
        index: usize,
        /// Why the edge was rejected.
        #[source]
        reason: EdgeRecordError,
    },
    /// An edge without a usable speed was dropped.
    #[error("variant {variant}: edge {index} has no usable speed and was skipped")]
    SkippedEdge {
        /// Variant name.
        variant: String,
        /// Position of the edge in the input sequence.
        index: usize,
    },
    /// The fallback speed replaced a missing one.
    #[error("variant {variant}: edge {index} timed at fallback speed {speed_kmh} km/h")]
    SubstitutedSpeed {
        /// Variant name.
        variant: String,
        /// Position of the edge in the input sequence.
        index: usize,
        /// Speed applied, km/h.
        speed_kmh: f64,
    },
    /// An edge without a usable speed caused the variant to be omitted.
    #[error("variant {variant} omitted: edge {index} has no usable speed")]
    VariantFailed {
        /// Variant name.
        variant: String,
        /// Position of the offending edge.
        index: usize,
    },
    /// Consecutive stitched edges do not touch.
    #[error("variant {variant}: {gap_meters:.1} m gap after edge {after_index}")]
    ContinuityGap {
        /// Variant name.
        variant: String,
        /// Index of the stitched edge preceding the gap.
        after_index: usize,
        /// Width of the gap, metres.
        gap_meters: f64,
    },
}

impl AssemblyWarning {
    /// Name of the variant the warning concerns.
    #[must_use]
    pub fn variant(&self) -> &str {
        match self {
            Self::EmptyVariant { variant }
            | Self::NoUsableEdges { variant }
            | Self::RejectedEdge { variant, .. }
            | Self::SkippedEdge { variant, .. }
            | Self::SubstitutedSpeed { variant, .. }
            | Self::VariantFailed { variant, .. }
            | Self::ContinuityGap { variant, .. } => variant,
        }
    }

    /// Whether the warning means the variant was omitted.
    #[must_use]
    pub const fn omits_variant(&self) -> bool {
        matches!(
            self,
            Self::EmptyVariant { .. } | Self::NoUsableEdges { .. } | Self::VariantFailed { .. }
        )
    }
}

/// Warnings collected during one assembly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagnostics {
    warnings: Vec<AssemblyWarning>,
}

impl Diagnostics {
    fn push(&mut self, warning: AssemblyWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Every warning in the order raised.
    #[must_use]
    pub fn warnings(&self) -> &[AssemblyWarning] {
        &self.warnings
    }

    /// Warnings concerning `variant`.
    pub fn for_variant<'a>(&'a self, variant: &'a str) -> impl Iterator<Item = &'a AssemblyWarning> {
        self.warnings.iter().filter(move |w| w.variant() == variant)
    }

    /// Whether nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }
}

/// Ordered assembly output plus diagnostics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssembledRoutes {
    routes: Vec<NamedVariant>,
    diagnostics: Diagnostics,
}

impl AssembledRoutes {
    /// Variant called `name`, if assembled.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RouteVariant> {
        self.routes
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.variant)
    }

    /// Variant names in output order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|named| named.name.as_str())
    }

    /// Assembled variants in output order.
    #[must_use]
    pub fn routes(&self) -> &[NamedVariant] {
        &self.routes
    }

    /// Diagnostics raised while assembling.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Whether no variant survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Split into routes and diagnostics.
    #[must_use]
    pub fn into_parts(self) -> (Vec<NamedVariant>, Diagnostics) {
        (self.routes, self.diagnostics)
    }
}

/// Assembles variants under a validated [`AssemblyConfig`].
///
/// # Examples
/// ```
/// use geo::Coord;
/// use saferoads_core::{AssemblyConfig, EdgeRecord, OutputMode, RouteAssembler, VariantEdges};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 0.001, y: 0.0 };
/// let edge = EdgeRecord::new(vec![b, a], 111.0)?.with_speeds(Some(36.0), None);
/// let assembler =
///     RouteAssembler::new(AssemblyConfig::default().with_output_mode(OutputMode::Segments))?;
///
/// let routes = assembler.assemble_routes(a, b, &[VariantEdges::new("adjusted", vec![edge])]);
/// let route = routes.get("adjusted").expect("assembled");
/// assert_eq!(route.total_distance_meters(), 111.0);
/// assert_eq!(route.geometry.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteAssembler {
    config: AssemblyConfig,
}

impl RouteAssembler {
    /// Validate `config` and build an assembler.
    pub fn new(config: AssemblyConfig) -> Result<Self, AssemblyConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Assemble every variant in input order, then collapse duplicates.
    #[must_use]
    pub fn assemble_routes(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        variants: &[VariantEdges],
    ) -> AssembledRoutes {
        let mut diagnostics = Diagnostics::default();
        let routes = variants
            .iter()
            .filter_map(|variant| {
                self.assemble_variant(start, end, variant, &mut diagnostics)
                    .map(|assembled| NamedVariant {
                        name: variant.name.clone(),
                        variant: assembled,
                    })
            })
            .collect();
        AssembledRoutes {
            routes: collapse_duplicates(routes),
            diagnostics,
        }
    }

    fn assemble_variant(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        variant: &VariantEdges,
        diagnostics: &mut Diagnostics,
    ) -> Option<RouteVariant> {
        let name = variant.name.as_str();
        if variant.edges.is_empty() {
            diagnostics.push(AssemblyWarning::EmptyVariant {
                variant: name.to_owned(),
            });
            return None;
        }

        let measured = self.measure_edges(variant, diagnostics)?;
        if measured.is_empty() {
            diagnostics.push(AssemblyWarning::NoUsableEdges {
                variant: name.to_owned(),
            });
            return None;
        }

        let oriented = stitch(start, measured);
        for gap in continuity_gaps(&oriented, self.config.gap_tolerance_meters) {
            diagnostics.push(AssemblyWarning::ContinuityGap {
                variant: name.to_owned(),
                after_index: gap.after_index,
                gap_meters: gap.gap_meters,
            });
        }
        if let Some(last) = oriented.last().and_then(|edge| edge.last()) {
            log::debug!(
                "variant {name} ends {:.1} m from the requested end",
                haversine_distance(last, end)
            );
        }

        let totals = RouteTotals::from_edges(oriented.iter().map(|edge| &edge.item));
        let (geometry, risk) = self.geometry_and_risk(&oriented);
        let has_elevated_risk = oriented
            .iter()
            .any(|edge| self.config.risk.is_elevated(edge.item.edge.risk_value));

        Some(RouteVariant {
            geometry,
            totals,
            risk,
            has_elevated_risk,
        })
    }

    /// Validate and time every edge. `None` means the variant is omitted.
    fn measure_edges<'v>(
        &self,
        variant: &'v VariantEdges,
        diagnostics: &mut Diagnostics,
    ) -> Option<Vec<MeasuredEdge<'v>>> {
        let name = variant.name.as_str();
        let mut measured = Vec::with_capacity(variant.edges.len());
        for (index, edge) in variant.edges.iter().enumerate() {
            if let Err(reason) = edge.validate() {
                diagnostics.push(AssemblyWarning::RejectedEdge {
                    variant: name.to_owned(),
                    index,
                    reason,
                });
                continue;
            }
            match measure(edge, self.config.invalid_speed) {
                SpeedOutcome::Measured(edge) => measured.push(edge),
                SpeedOutcome::Substituted(edge) => {
                    diagnostics.push(AssemblyWarning::SubstitutedSpeed {
                        variant: name.to_owned(),
                        index,
                        speed_kmh: edge.speed_kmh,
                    });
                    measured.push(edge);
                }
                SpeedOutcome::Skipped => diagnostics.push(AssemblyWarning::SkippedEdge {
                    variant: name.to_owned(),
                    index,
                }),
                SpeedOutcome::VariantFailed => {
                    diagnostics.push(AssemblyWarning::VariantFailed {
                        variant: name.to_owned(),
                        index,
                    });
                    return None;
                }
            }
        }
        Some(measured)
    }

    fn geometry_and_risk(&self, oriented: &[OrientedEdge<'_>]) -> (RouteGeometry, RiskSummary) {
        let policy = &self.config.risk;
        match self.config.output_mode {
            OutputMode::Points => {
                let exposures = oriented
                    .iter()
                    .map(|edge| (edge.item.edge.risk_value, edge.item.length_meters()));
                let risk = RiskSummary::from_exposures(&policy.thresholds, exposures);
                (RouteGeometry::Points(merge_points(oriented, policy)), risk)
            }
            OutputMode::Segments => {
                let segments = micro_segments(oriented, policy);
                let risk = RiskSummary::from_exposures(
                    &policy.thresholds,
                    segments.iter().map(|s| (s.risk_value, s.distance_meters)),
                );
                (RouteGeometry::Segments(segments), risk)
            }
        }
    }
}

/// Assemble `variants` with the default configuration.
#[must_use]
pub fn assemble_routes(
    start: Coord<f64>,
    end: Coord<f64>,
    variants: &[VariantEdges],
) -> AssembledRoutes {
    RouteAssembler::default().assemble_routes(start, end, variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeRecord;
    use crate::risk::RiskCategory;
    use crate::test_support::{edge_between, risky_edge_between};
    use rstest::{fixture, rstest};

    const A: Coord<f64> = Coord { x: 0.0, y: 0.0 };
    const B: Coord<f64> = Coord { x: 0.001, y: 0.0 };
    const C: Coord<f64> = Coord { x: 0.002, y: 0.0 };

    #[fixture]
    fn chain() -> Vec<EdgeRecord> {
        vec![
            risky_edge_between(B, A, 0.65, &["bufo"]),
            risky_edge_between(C, B, 0.1, &[]),
        ]
    }

    #[rstest]
    fn totals_and_risk_follow_edges(chain: Vec<EdgeRecord>) {
        let routes = assemble_routes(A, C, &[VariantEdges::new("adjusted", chain)]);
        let route = routes.get("adjusted").expect("assembled");
        assert_eq!(route.total_distance_meters(), 200.0);
        assert_eq!(route.total_time_seconds(), 20.0);
        assert_eq!(route.risk_category(), RiskCategory::High);
        assert_eq!(route.distance_in_dominant_risk_category(), 100.0);
        assert!(!route.has_elevated_risk);
        assert!(routes.diagnostics().is_empty());
    }

    #[rstest]
    fn points_are_continuous_from_start(chain: Vec<EdgeRecord>) {
        let routes = assemble_routes(A, C, &[VariantEdges::new("adjusted", chain)]);
        let RouteGeometry::Points(points) = &routes.get("adjusted").expect("assembled").geometry
        else {
            panic!("expected points");
        };
        let locations: Vec<Coord<f64>> = points.iter().map(|p| p.location).collect();
        assert_eq!(locations, vec![A, B, C]);
    }

    #[rstest]
    fn segment_mode_sums_to_edge_lengths(chain: Vec<EdgeRecord>) {
        let assembler =
            RouteAssembler::new(AssemblyConfig::default().with_output_mode(OutputMode::Segments))
                .expect("valid config");
        let routes = assembler.assemble_routes(A, C, &[VariantEdges::new("adjusted", chain)]);
        let route = routes.get("adjusted").expect("assembled");
        let RouteGeometry::Segments(segments) = &route.geometry else {
            panic!("expected segments");
        };
        let total: f64 = segments.iter().map(|s| s.distance_meters).sum();
        assert!((total - route.total_distance_meters()).abs() < 1e-9);
        assert_eq!(route.distance_in_dominant_risk_category(), 100.0);
    }

    #[rstest]
    fn empty_variant_is_omitted_with_warning(chain: Vec<EdgeRecord>) {
        let routes = assemble_routes(
            A,
            C,
            &[
                VariantEdges::new("adjusted", Vec::new()),
                VariantEdges::new("default", chain),
            ],
        );
        assert_eq!(routes.names().collect::<Vec<_>>(), vec!["default"]);
        assert!(matches!(
            routes.diagnostics().warnings(),
            [AssemblyWarning::EmptyVariant { variant }] if variant == "adjusted"
        ));
    }

    #[rstest]
    fn identical_variants_collapse(chain: Vec<EdgeRecord>) {
        let routes = assemble_routes(
            A,
            C,
            &[
                VariantEdges::new("adjusted", chain.clone()),
                VariantEdges::new("shortest", chain),
            ],
        );
        assert_eq!(routes.names().collect::<Vec<_>>(), vec!["default"]);
    }

    #[rstest]
    fn missing_speed_fails_variant_by_default(mut chain: Vec<EdgeRecord>) {
        chain[1].forward_speed_kmh = None;
        let routes = assemble_routes(A, C, &[VariantEdges::new("adjusted", chain)]);
        assert!(routes.is_empty());
        assert!(routes.diagnostics().warnings()[0].omits_variant());
    }

    #[rstest]
    fn skip_policy_drops_edge_and_reports_it(mut chain: Vec<EdgeRecord>) {
        chain[1].forward_speed_kmh = None;
        let assembler =
            RouteAssembler::new(AssemblyConfig::default().with_invalid_speed(InvalidSpeedPolicy::Skip))
                .expect("valid config");
        let routes = assembler.assemble_routes(A, C, &[VariantEdges::new("adjusted", chain)]);
        let route = routes.get("adjusted").expect("assembled");
        assert_eq!(route.total_distance_meters(), 100.0);
        assert!(matches!(
            routes.diagnostics().warnings(),
            [AssemblyWarning::SkippedEdge { index: 1, .. }]
        ));
    }

    #[rstest]
    fn fallback_policy_substitutes_speed(mut chain: Vec<EdgeRecord>) {
        chain[0].forward_speed_kmh = Some(0.0);
        let config = AssemblyConfig::default()
            .with_invalid_speed(InvalidSpeedPolicy::Fallback { speed_kmh: 18.0 });
        let routes = RouteAssembler::new(config).expect("valid config").assemble_routes(
            A,
            C,
            &[VariantEdges::new("adjusted", chain)],
        );
        let route = routes.get("adjusted").expect("assembled");
        assert_eq!(route.total_time_seconds(), 30.0);
        assert_eq!(routes.diagnostics().for_variant("adjusted").count(), 1);
    }

    #[rstest]
    fn invalid_edges_are_rejected_not_fatal(mut chain: Vec<EdgeRecord>) {
        chain[1].length_meters = f64::NAN;
        let routes = assemble_routes(A, C, &[VariantEdges::new("adjusted", chain)]);
        let route = routes.get("adjusted").expect("assembled");
        assert_eq!(route.total_distance_meters(), 100.0);
        assert!(matches!(
            routes.diagnostics().warnings(),
            [AssemblyWarning::RejectedEdge {
                reason: EdgeRecordError::InvalidLength { .. },
                ..
            }]
        ));
    }

    #[rstest]
    fn alarm_threshold_flags_elevated_routes(mut chain: Vec<EdgeRecord>) {
        chain[0].risk_value = 2.5;
        let routes = assemble_routes(A, C, &[VariantEdges::new("adjusted", chain)]);
        assert!(routes.get("adjusted").expect("assembled").has_elevated_risk);
    }

    #[rstest]
    fn disconnected_edges_raise_gap_warning() {
        let far = Coord { x: 0.01, y: 0.0 };
        let farther = Coord { x: 0.011, y: 0.0 };
        let edges = vec![edge_between(A, B), edge_between(far, farther)];
        let routes = assemble_routes(A, farther, &[VariantEdges::new("adjusted", edges)]);
        assert!(matches!(
            routes.diagnostics().warnings(),
            [AssemblyWarning::ContinuityGap { after_index: 0, .. }]
        ));
        assert!(!routes.is_empty());
    }

    #[rstest]
    #[case(AssemblyConfig::default().with_gap_tolerance_meters(-1.0))]
    #[case(AssemblyConfig::default().with_invalid_speed(InvalidSpeedPolicy::Fallback { speed_kmh: 0.0 }))]
    #[case(AssemblyConfig::default().with_risk_policy(RiskPolicy::default().with_species_tag_threshold(f64::INFINITY)))]
    fn invalid_configs_are_rejected(#[case] config: AssemblyConfig) {
        assert!(RouteAssembler::new(config).is_err());
    }
}
