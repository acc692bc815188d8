//! Great-circle distance between WGS84 coordinates.
//!
//! Coordinates follow the `geo` convention used throughout the crate:
//! `x = longitude`, `y = latitude`, both in degrees.

use geo::Coord;

/// Mean Earth radius used by every distance computation, in metres.
pub const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

/// Haversine distance between `a` and `b` in metres.
///
/// Callers must reject NaN and out-of-range coordinates before calling; the
/// result is meaningless for such input.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use saferoads_core::haversine_distance;
///
/// let lisbon = Coord { x: -9.1393, y: 38.7223 };
/// let same = haversine_distance(lisbon, lisbon);
/// assert_eq!(same, 0.0);
/// ```
#[must_use]
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let phi_a = a.y.to_radians();
    let phi_b = b.y.to_radians();
    let delta_phi = (b.y - a.y).to_radians();
    let delta_lambda = (b.x - a.x).to_radians();

    let half_chord = (delta_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (delta_lambda / 2.0).sin().powi(2);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());

    EARTH_RADIUS_METRES * angle
}

/// Haversine distance between `a` and `b` in kilometres.
#[must_use]
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    haversine_distance(a, b) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= tolerance,
            "expected {expected}, got {actual} (|Δ| = {delta})"
        );
    }

    #[rstest]
    fn identical_points_are_zero_apart() {
        let point = Coord { x: -9.16, y: 38.9 };
        assert_eq!(haversine_distance(point, point), 0.0);
    }

    #[rstest]
    fn one_degree_of_latitude_matches_arc_length() {
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 0.0, y: 1.0 };
        let expected = EARTH_RADIUS_METRES * 1.0_f64.to_radians();
        assert_close(haversine_distance(a, b), expected, 1e-6);
    }

    #[rstest]
    fn distance_is_symmetric() {
        let a = Coord {
            x: -9.163_266,
            y: 38.902_464,
        };
        let b = Coord {
            x: -9.177_862,
            y: 38.902_290,
        };
        assert_close(haversine_distance(a, b), haversine_distance(b, a), 1e-9);
    }

    #[rstest]
    fn kilometres_wrap_metres() {
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 0.5, y: 0.5 };
        assert_close(haversine_km(a, b) * 1000.0, haversine_distance(a, b), 1e-9);
    }

    #[rstest]
    fn known_city_pair_is_within_tolerance() {
        // Lisbon to Porto is roughly 274 km as the crow flies.
        let lisbon = Coord {
            x: -9.1393,
            y: 38.7223,
        };
        let porto = Coord {
            x: -8.6291,
            y: 41.1579,
        };
        assert_close(haversine_km(lisbon, porto), 274.0, 2.0);
    }
}
