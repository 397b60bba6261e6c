//! Polyline helpers: simplification, midpoints and obstacle tests.

use arbor_core::geometry::{Bounds, EPSILON, Point};

/// Drops repeated points and the middle point of collinear triples.
pub(super) fn collapse(points: Vec<Point>) -> Vec<Point> {
    let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if deduped.last().is_none_or(|last| !last.approx_eq(point)) {
            deduped.push(point);
        }
    }

    let mut result: Vec<Point> = Vec::with_capacity(deduped.len());
    for point in deduped {
        while result.len() >= 2 {
            let a = result[result.len() - 2];
            let b = result[result.len() - 1];
            if !collinear(a, b, point) {
                break;
            }
            result.pop();
        }
        result.push(point);
    }
    result
}

fn collinear(a: Point, b: Point, c: Point) -> bool {
    let ab = b.sub_point(a);
    let bc = c.sub_point(b);
    let cross = ab.x() * bc.y() - ab.y() * bc.x();
    // Only straight continuations, never a reversal.
    let dot = ab.x() * bc.x() + ab.y() * bc.y();
    cross.abs() <= EPSILON && dot >= 0.0
}

/// Point halfway along the polyline, by arc length.
pub(super) fn arc_midpoint(points: &[Point]) -> Point {
    let Some(&first) = points.first() else {
        return Point::default();
    };

    let total: f32 = points.windows(2).map(|pair| pair[0].distance(pair[1])).sum();
    let mut remaining = total / 2.0;

    for pair in points.windows(2) {
        let length = pair[0].distance(pair[1]);
        if length > 0.0 && remaining <= length {
            return pair[0].lerp(pair[1], remaining / length);
        }
        remaining -= length;
    }

    points.last().copied().unwrap_or(first)
}

/// Point at t = 0.5 of the cubic Bézier with the given control points.
pub(super) fn bezier_midpoint(start: Point, c1: Point, c2: Point, end: Point) -> Point {
    start
        .add_point(c1.scale(3.0))
        .add_point(c2.scale(3.0))
        .add_point(end)
        .scale(1.0 / 8.0)
}

/// Whether any segment of `points` enters the interior of `bounds`.
pub(super) fn crosses(points: &[Point], bounds: &Bounds) -> bool {
    points
        .windows(2)
        .any(|pair| bounds.intersects_segment(pair[0], pair[1]))
}

#[cfg(test)]
mod tests {
    use arbor_core::geometry::Size;

    use super::*;

    #[test]
    fn test_collapse_removes_zero_length_segments() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 30.0),
            Point::new(0.0, 30.0),
            Point::new(0.0, 60.0),
        ];
        assert_eq!(collapse(points), vec![Point::new(0.0, 0.0), Point::new(0.0, 60.0)]);
    }

    #[test]
    fn test_collapse_keeps_corners() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 30.0),
            Point::new(50.0, 30.0),
            Point::new(50.0, 60.0),
        ];
        assert_eq!(collapse(points.clone()), points);
    }

    #[test]
    fn test_arc_midpoint() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(30.0, 10.0),
        ];
        // Total length 40, halfway is 10 units into the horizontal leg.
        assert!(arc_midpoint(&points).approx_eq(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_bezier_midpoint_of_symmetric_curve() {
        let mid = bezier_midpoint(
            Point::new(0.0, 0.0),
            Point::new(0.0, 50.0),
            Point::new(100.0, 50.0),
            Point::new(100.0, 100.0),
        );
        assert!(mid.approx_eq(Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_crosses() {
        let obstacle = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(10.0, 10.0));
        let through = [Point::new(0.0, 15.0), Point::new(30.0, 15.0)];
        let along_border = [Point::new(0.0, 10.0), Point::new(30.0, 10.0)];
        assert!(crosses(&through, &obstacle));
        assert!(!crosses(&along_border, &obstacle));
    }
}
