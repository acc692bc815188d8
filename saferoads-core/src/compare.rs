//! Collapse structurally identical route variants.

use crate::route::NamedVariant;

/// Name given to a collapsed variant.
pub const DEFAULT_VARIANT: &str = "default";

/// Collapse the response when the first two variants are identical.
///
/// With two or more variants whose first two entries match exactly
/// (geometry, totals and risk), the result is a single [`DEFAULT_VARIANT`]
/// carrying the first entry's data and every other variant is dropped.
/// Otherwise the input is returned unchanged. The comparison is exact; no
/// tolerance is applied.
#[must_use]
pub fn collapse_duplicates(variants: Vec<NamedVariant>) -> Vec<NamedVariant> {
    let identical = matches!(
        variants.as_slice(),
        [first, second, ..] if first.variant == second.variant
    );
    if !identical {
        return variants;
    }
    let dropped: Vec<&str> = variants.iter().map(|v| v.name.as_str()).collect();
    log::debug!("collapsing identical variants {dropped:?} into {DEFAULT_VARIANT}");
    variants
        .into_iter()
        .next()
        .map(|first| NamedVariant {
            name: DEFAULT_VARIANT.to_owned(),
            variant: first.variant,
        })
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::SpeciesTags;
    use crate::metrics::RouteTotals;
    use crate::risk::RiskSummary;
    use crate::route::{RouteGeometry, RoutePoint, RouteVariant};
    use geo::Coord;
    use rstest::{fixture, rstest};

    fn named(name: &str, coords: &[(f64, f64)]) -> NamedVariant {
        let points = coords
            .iter()
            .map(|&(x, y)| RoutePoint {
                location: Coord { x, y },
                risk_value: 0.0,
                species_tags: SpeciesTags::new(),
            })
            .collect();
        NamedVariant {
            name: name.to_owned(),
            variant: RouteVariant {
                geometry: RouteGeometry::Points(points),
                totals: RouteTotals {
                    distance_meters: 120.0,
                    time_seconds: 12.0,
                },
                risk: RiskSummary::default(),
                has_elevated_risk: false,
            },
        }
    }

    #[fixture]
    fn path() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (0.001, 0.0)]
    }

    #[rstest]
    fn identical_variants_collapse_to_default(path: Vec<(f64, f64)>) {
        let collapsed = collapse_duplicates(vec![named("adjusted", &path), named("default", &path)]);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].name, DEFAULT_VARIANT);
    }

    #[rstest]
    fn collapse_keeps_first_variant_data(path: Vec<(f64, f64)>) {
        let first = named("adjusted", &path);
        let expected = first.variant.clone();
        let collapsed = collapse_duplicates(vec![first, named("shortest", &path)]);
        assert_eq!(collapsed[0].variant, expected);
    }

    #[rstest]
    fn one_coordinate_difference_prevents_collapse(path: Vec<(f64, f64)>) {
        let shifted = vec![(0.0, 0.0), (0.001, 0.000_001)];
        let variants = vec![named("adjusted", &path), named("default", &shifted)];
        let result = collapse_duplicates(variants.clone());
        assert_eq!(result, variants);
    }

    #[rstest]
    fn single_variant_is_untouched(path: Vec<(f64, f64)>) {
        let variants = vec![named("adjusted", &path)];
        assert_eq!(collapse_duplicates(variants.clone()), variants);
    }

    #[rstest]
    fn trailing_variants_are_dropped_on_collapse(path: Vec<(f64, f64)>) {
        let other = vec![(1.0, 1.0), (1.001, 1.0)];
        let collapsed = collapse_duplicates(vec![
            named("adjusted", &path),
            named("default", &path),
            named("scenic", &other),
        ]);
        assert_eq!(collapsed.len(), 1);
    }
}
