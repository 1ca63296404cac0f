use crate::types::Coordinate;

/// Arithmetic mean of `positions`. `None` when there is nothing to average.
pub fn centroid(positions: &[Coordinate]) -> Option<Coordinate> {
    if positions.is_empty() {
        return None;
    }
    let n = positions.len() as f64;
    let (lat, lng) = positions
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(Coordinate::new(lat / n, lng / n))
}

/// Candidate meeting points around `center`: the center itself, then one
/// point per position, `fraction` of the way from the center toward it.
///
/// Always `1 + positions.len()` points, in that order. This is a heuristic
/// neighbourhood, not an exhaustive search.
pub fn generate_candidates(
    center: Coordinate,
    positions: &[Coordinate],
    fraction: f64,
) -> Vec<Coordinate> {
    std::iter::once(center)
        .chain(positions.iter().map(|p| center.lerp(p, fraction)))
        .collect()
}
