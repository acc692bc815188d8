//! Human-readable distance and duration strings for route summaries.

/// Render a distance in metres.
///
/// Distances below one kilometre render as whole metres, longer ones as
/// kilometres with two decimals.
///
/// # Examples
/// ```
/// use saferoads_core::format_distance;
///
/// assert_eq!(format_distance(950.0), "950 meters");
/// assert_eq!(format_distance(1500.0), "1.50 km");
/// ```
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} meters", meters.round())
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Render a duration in seconds as hours and minutes.
///
/// Minutes are rounded from the remainder after whole hours, so values just
/// below an hour boundary can read `"60 min"`.
///
/// # Examples
/// ```
/// use saferoads_core::format_duration;
///
/// assert_eq!(format_duration(5400.0), "1h 30min");
/// assert_eq!(format_duration(480.0), "8 min");
/// ```
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds % 3600.0) / 60.0).round();
    if hours > 0.0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{minutes} min")
    }
}
