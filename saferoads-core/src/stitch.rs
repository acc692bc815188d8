//! Orient ambiguously-stored edge geometries into one continuous path.
//!
//! Each edge is oriented greedily: its stored geometry is reversed when its
//! last coordinate is strictly closer to the running anchor than its first.
//! The anchor starts at the requested start point and then follows the last
//! coordinate already placed. This is correct whenever consecutive edges
//! share an endpoint; disconnected input is a precondition violation that
//! [`continuity_gaps`] reports but does not repair.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use geo::Coord;

use crate::distance::haversine_distance;
use crate::edge::EdgeRecord;
use crate::metrics::MeasuredEdge;
use crate::risk::RiskPolicy;
use crate::route::{MicroSegment, RoutePoint};

/// Anything carrying a stored coordinate sequence.
pub trait Polyline {
    /// Coordinates in stored order.
    fn geometry(&self) -> &[Coord<f64>];
}

impl Polyline for EdgeRecord {
    fn geometry(&self) -> &[Coord<f64>] {
        &self.geometry
    }
}

impl Polyline for MeasuredEdge<'_> {
    fn geometry(&self) -> &[Coord<f64>] {
        &self.edge.geometry
    }
}

impl<T: Polyline + ?Sized> Polyline for &T {
    fn geometry(&self) -> &[Coord<f64>] {
        (**self).geometry()
    }
}

/// An item together with its geometry in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct Oriented<T> {
    /// The oriented item.
    pub item: T,
    /// Coordinates in traversal order.
    pub coords: Vec<Coord<f64>>,
    /// Whether the stored geometry was reversed.
    pub reversed: bool,
}

/// A measured edge in traversal order, as used by assembly.
pub type OrientedEdge<'a> = Oriented<MeasuredEdge<'a>>;

impl<T> Oriented<T> {
    /// First coordinate in traversal order.
    #[must_use]
    pub fn first(&self) -> Option<Coord<f64>> {
        self.coords.first().copied()
    }

    /// Last coordinate in traversal order.
    #[must_use]
    pub fn last(&self) -> Option<Coord<f64>> {
        self.coords.last().copied()
    }
}

/// Orient `items` into a path beginning at `start`.
///
/// Items with empty geometry are skipped; validated edges never have one.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use saferoads_core::{EdgeRecord, stitch};
///
/// # fn main() -> Result<(), saferoads_core::EdgeRecordError> {
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 0.001, y: 0.0 };
/// let c = Coord { x: 0.002, y: 0.0 };
/// // The second edge is stored end-to-start.
/// let edges = [EdgeRecord::new(vec![a, b], 111.0)?, EdgeRecord::new(vec![c, b], 111.0)?];
///
/// let path = stitch(a, &edges);
/// assert!(!path[0].reversed);
/// assert!(path[1].reversed);
/// assert_eq!(path[1].coords, vec![b, c]);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn stitch<T, I>(start: Coord<f64>, items: I) -> Vec<Oriented<T>>
where
    T: Polyline,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .fold(Vec::new(), |mut placed: Vec<Oriented<T>>, item| {
            let anchor = placed.last().and_then(Oriented::last).unwrap_or(start);
            if let Some(oriented) = orient(anchor, item) {
                placed.push(oriented);
            } else {
                log::debug!("skipping edge without geometry while stitching");
            }
            placed
        })
}

fn orient<T: Polyline>(anchor: Coord<f64>, item: T) -> Option<Oriented<T>> {
    let (coords, reversed) = {
        let geometry = item.geometry();
        let first = *geometry.first()?;
        let last = *geometry.last()?;
        let reversed = haversine_distance(anchor, last) < haversine_distance(anchor, first);
        let mut coords = geometry.to_vec();
        if reversed {
            coords.reverse();
        }
        (coords, reversed)
    };
    Some(Oriented {
        item,
        coords,
        reversed,
    })
}

/// A join between consecutive oriented items wider than the tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuityGap {
    /// Index of the item preceding the gap.
    pub after_index: usize,
    /// Distance between the two items' touching ends, metres.
    pub gap_meters: f64,
}

/// Report every join wider than `tolerance_meters`.
#[must_use]
pub fn continuity_gaps<T>(oriented: &[Oriented<T>], tolerance_meters: f64) -> Vec<ContinuityGap> {
    oriented
        .windows(2)
        .enumerate()
        .filter_map(|(after_index, pair)| {
            let [previous, next] = pair else {
                return None;
            };
            let gap_meters = haversine_distance(previous.last()?, next.first()?);
            (gap_meters > tolerance_meters).then_some(ContinuityGap {
                after_index,
                gap_meters,
            })
        })
        .collect()
}

/// Bit pattern of a coordinate, with `-0.0` folded into `0.0`.
type CoordKey = (u64, u64);

fn coord_key(coord: Coord<f64>) -> CoordKey {
    ((coord.x + 0.0).to_bits(), (coord.y + 0.0).to_bits())
}

/// Flatten oriented edges into de-duplicated points.
///
/// A coordinate equal to one already emitted is merged into it: the point
/// keeps the maximum risk and the union of carried species.
#[must_use]
pub fn merge_points(edges: &[OrientedEdge<'_>], policy: &RiskPolicy) -> Vec<RoutePoint> {
    let mut points: Vec<RoutePoint> = Vec::new();
    let mut seen: HashMap<CoordKey, usize> = HashMap::new();

    for oriented in edges {
        let edge = oriented.item.edge;
        let species = policy.carried_species(edge.risk_value, &edge.species_tags);
        for coord in &oriented.coords {
            match seen.entry(coord_key(*coord)) {
                Entry::Occupied(slot) => {
                    if let Some(point) = points.get_mut(*slot.get()) {
                        point.risk_value = point.risk_value.max(edge.risk_value);
                        point.species_tags.extend(species.iter().cloned());
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(points.len());
                    points.push(RoutePoint {
                        location: *coord,
                        risk_value: edge.risk_value,
                        species_tags: species.clone(),
                    });
                }
            }
        }
    }
    points
}

/// Split oriented edges into micro-segments without merging.
///
/// Each segment receives the share of its edge's length and time matching its
/// share of the edge's geodesic length; an edge with zero geodesic length is
/// split evenly.
#[must_use]
pub fn micro_segments(edges: &[OrientedEdge<'_>], policy: &RiskPolicy) -> Vec<MicroSegment> {
    edges
        .iter()
        .flat_map(|oriented| segments_of(oriented, policy))
        .collect()
}

fn segments_of(oriented: &OrientedEdge<'_>, policy: &RiskPolicy) -> Vec<MicroSegment> {
    let measured = &oriented.item;
    let edge = measured.edge;
    let lengths: Vec<f64> = oriented
        .coords
        .windows(2)
        .map(|pair| match pair {
            [a, b] => haversine_distance(*a, *b),
            _ => 0.0,
        })
        .collect();
    let geodesic: f64 = lengths.iter().sum();
    let even_share = 1.0 / lengths.len().max(1) as f64;
    let species = policy.carried_species(edge.risk_value, &edge.species_tags);

    oriented
        .coords
        .windows(2)
        .zip(lengths)
        .filter_map(|(pair, length)| {
            let [start, end] = pair else {
                return None;
            };
            let share = if geodesic > 0.0 {
                length / geodesic
            } else {
                even_share
            };
            Some(MicroSegment {
                start: *start,
                end: *end,
                distance_meters: share * edge.length_meters,
                time_to_next_seconds: share * measured.time_seconds,
                risk_value: edge.risk_value,
                species_tags: species.clone(),
            })
        })
        .collect()
}
