// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::cmp::Ordering;

use crate::im::Point;

/// Orientation of `(a, b, c)` with y negated so rows grow upward
///
/// Positive values are strict counter-clockwise (left) turns as seen on
/// screen, zero means the points are collinear.
pub fn cross_product(a: &Point, b: &Point, c: &Point) -> i64 {
    let (ax, ay) = (a.x as i64, a.y as i64);
    let (bx, by) = (b.x as i64, b.y as i64);
    let (cx, cy) = (c.x as i64, c.y as i64);

    (bx - ax) * (ay - cy) - (ay - by) * (cx - ax)
}

/// Squared euclidean distance between two points
pub fn squared_distance(a: &Point, b: &Point) -> i64 {
    let dx = (b.x - a.x) as i64;
    let dy = (b.y - a.y) as i64;
    dx * dx + dy * dy
}

/// Select the visually lowest point, leftmost among ties
fn anchor_index(points: &[Point]) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| b.y.cmp(&a.y).then(a.x.cmp(&b.x)))
        .map(|(idx, _)| idx)
}

/// Order two points by polar angle around `anchor`, nearest first on ties
///
/// Every point lies at an angle in `[0, pi)` from the anchor, so the sign
/// of the orientation test gives the same order as comparing angles.
fn polar_order(anchor: &Point, a: &Point, b: &Point) -> Ordering {
    match cross_product(anchor, a, b).cmp(&0) {
        Ordering::Greater => Ordering::Less,
        Ordering::Less => Ordering::Greater,
        Ordering::Equal => squared_distance(anchor, a).cmp(&squared_distance(anchor, b)),
    }
}

/// Compute the convex hull of a set of integer points with a Graham scan
///
/// The hull is returned counter-clockwise starting from the visually lowest
/// point. Collinear boundary points are dropped and every returned vertex
/// is one of the input points.
///
/// # Examples
///
/// ```
/// use cohull_core::cv::points::graham_scan;
/// use cohull_core::im::Point;
///
/// let points: Vec<Point> = [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1), (0, 2), (1, 2), (2, 2)]
///     .iter()
///     .map(|&(x, y)| Point::new(x, y, 1))
///     .collect();
///
/// let hull: Vec<(i32, i32)> = graham_scan(&points).iter().map(|p| (p.x, p.y)).collect();
/// assert_eq!(hull, [(0, 2), (2, 2), (2, 0), (0, 0)]);
/// ```
pub fn graham_scan(points: &[Point]) -> Vec<Point> {
    let Some(anchor_idx) = anchor_index(points) else {
        return Vec::new();
    };

    let anchor = points[anchor_idx];

    let mut sorted: Vec<Point> = points
        .iter()
        .enumerate()
        .filter(|&(idx, _)| idx != anchor_idx)
        .map(|(_, p)| *p)
        .collect();

    sorted.sort_by(|a, b| polar_order(&anchor, a, b));

    let mut hull = Vec::with_capacity(sorted.len() + 1);
    hull.push(anchor);

    for point in sorted {
        while hull.len() >= 2
            && cross_product(&hull[hull.len() - 2], &hull[hull.len() - 1], &point) <= 0
        {
            hull.pop();
        }
        hull.push(point);
    }

    hull
}

/// Flatten points into an interleaved `[x0, y0, x1, y1, ...]` sequence
///
/// # Examples
///
/// ```
/// use cohull_core::cv::points::linearize;
/// use cohull_core::im::Point;
///
/// let points = [Point::new(1, 2, 1), Point::new(3, 4, 1)];
/// assert_eq!(linearize(&points), [1, 2, 3, 4]);
/// ```
pub fn linearize(points: &[Point]) -> Vec<i32> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}
