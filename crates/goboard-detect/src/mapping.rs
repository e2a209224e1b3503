//! Pixel ↔ board coordinate mapping and per-intersection conflict resolution.

use std::collections::BTreeMap;

use goboard_core::{BoardCoord, Geometry, Marker, OutOfBounds};
use nalgebra::Point2;

/// Snap a pixel position to the nearest intersection of `geometry`.
///
/// Fails when either rounded index falls outside `[0, board_size)`. A
/// degenerate spacing reports `-1` on the affected axis.
pub fn to_board_coordinate(position: Point2<f32>, geometry: &Geometry) -> Result<BoardCoord, OutOfBounds> {
    let index = |p: f32, origin: f32, step: f32| -> i64 {
        if step > 0.0 && step.is_finite() {
            ((p - origin) / step).round() as i64
        } else {
            -1
        }
    };
    let col = index(position.x, geometry.top_left.x, geometry.spacing.x);
    let row = index(position.y, geometry.top_left.y, geometry.spacing.y);

    let size = i64::from(geometry.board_size);
    if (0..size).contains(&col) && (0..size).contains(&row) {
        Ok(BoardCoord::new(col as u32, row as u32))
    } else {
        Err(OutOfBounds {
            col,
            row,
            board_size: geometry.board_size,
        })
    }
}

/// Marker whose footprint contains `(x, y)`, closest center first.
///
/// Ties keep the earlier marker in slice order.
pub fn nearest_marker(x: f32, y: f32, markers: &[Marker]) -> Option<&Marker> {
    let mut best: Option<(&Marker, f32)> = None;
    for m in markers {
        if !m.covers(x, y) {
            continue;
        }
        let d = m.distance_sq(x, y);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((m, d));
        }
    }
    best.map(|(m, _)| m)
}

/// Keep a single marker per board coordinate.
///
/// The winner has the higher score, then the larger radius, then comes first
/// in the input. Survivors keep their input order.
pub fn resolve_conflicts(markers: Vec<Marker>) -> Vec<Marker> {
    let mut winners: BTreeMap<BoardCoord, usize> = BTreeMap::new();
    for (i, m) in markers.iter().enumerate() {
        match winners.get(&m.coord) {
            Some(&w) if !m.outranks(&markers[w]) => {}
            _ => {
                winners.insert(m.coord, i);
            }
        }
    }
    let keep: Vec<usize> = {
        let mut v: Vec<usize> = winners.into_values().collect();
        v.sort_unstable();
        v
    };
    let dropped = markers.len() - keep.len();
    if dropped > 0 {
        log::debug!("mapping: {dropped} colliding markers dropped");
    }
    keep.into_iter().map(|i| markers[i]).collect()
}
