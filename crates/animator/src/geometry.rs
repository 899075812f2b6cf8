//! Planar polygon helpers over `geo`

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon, Simplify};

/// A closed ring as `[x, y]` points; closing the ring is optional
pub type Ring = Vec<[f64; 2]>;

/// Why an input ring was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degenerate {
    TooFewPoints,
    NonFinite,
    ZeroArea,
}

/// Empty polygon set
pub fn empty() -> MultiPolygon<f64> {
    MultiPolygon::new(Vec::new())
}

/// Build a polygon from a ring, rejecting input the boolean ops cannot use
///
/// Self-intersecting rings are accepted as-is.
pub fn polygon(ring: &[[f64; 2]]) -> Result<Polygon<f64>, Degenerate> {
    if ring.iter().flatten().any(|v| !v.is_finite()) {
        return Err(Degenerate::NonFinite);
    }

    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.len() + 1);
    for &[x, y] in ring {
        let coord = Coord { x, y };
        if coords.last() != Some(&coord) {
            coords.push(coord);
        }
    }
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return Err(Degenerate::TooFewPoints);
    }

    let polygon = Polygon::new(LineString::new(coords), Vec::new());
    if polygon.unsigned_area() <= f64::EPSILON {
        return Err(Degenerate::ZeroArea);
    }
    Ok(polygon)
}

pub fn union(existing: &MultiPolygon<f64>, polygon: Polygon<f64>) -> MultiPolygon<f64> {
    existing.union(&MultiPolygon::new(vec![polygon]))
}

pub fn difference(existing: &MultiPolygon<f64>, polygon: Polygon<f64>) -> MultiPolygon<f64> {
    if existing.0.is_empty() {
        return empty();
    }
    existing.difference(&MultiPolygon::new(vec![polygon]))
}

/// Lossy low-resolution copy for previews
pub fn thumbnail(merged: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    let simplified = merged.simplify(&tolerance);
    // Drop rings simplification collapsed
    MultiPolygon::new(
        simplified
            .0
            .into_iter()
            .filter(|polygon| polygon.exterior().0.len() >= 4)
            .collect(),
    )
}

pub fn area(polygons: &MultiPolygon<f64>) -> f64 {
    polygons.unsigned_area()
}
