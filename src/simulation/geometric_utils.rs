//! Geometric utility functions for distance, bearing and contact calculations.

use geo::algorithm::Distance;
use geo::{Euclidean, Line, Point};
use ndarray::Array1;

/// Euclidean distance between two positions.
pub fn distance(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Distance of a position from the world origin.
pub fn distance_from_origin(v: &Array1<f32>) -> f32 {
    v[0].hypot(v[1])
}

/// Direction from `from` towards `to` in degrees, normalised to `[0, 360)`.
///
/// Coincident points have bearing 0.
pub fn bearing_degrees(from: &Array1<f32>, to: &Array1<f32>) -> f32 {
    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let angle = dy.atan2(dx).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative angles
    if angle >= 360.0 { 0.0 } else { angle }
}

/// Calculates the minimum distance between a line segment and a circle center.
///
/// # Arguments
///
/// * `line_start` - Starting point of the line segment
/// * `line_end` - Ending point of the line segment
/// * `circle_center` - Center point of the circle
///
/// # Returns
///
/// The minimum Euclidean distance from the circle center to the line segment.
pub fn line_circle_distance(
    line_start: &Array1<f32>,
    line_end: &Array1<f32>,
    circle_center: &Array1<f32>,
) -> f32 {
    let p = Point::new(circle_center[0], circle_center[1]);
    let line = Line::new(
        Point::new(line_start[0], line_start[1]),
        Point::new(line_end[0], line_end[1]),
    );
    Euclidean.distance(&p, &line)
}
