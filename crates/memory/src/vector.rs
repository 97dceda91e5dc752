//! Vector distance utilities.
//!
//! Pure-Rust implementations of:
//! - Squared Euclidean distance (the index's ranking metric)
//! - Nearest-neighbour ranking over stored embeddings

/// Squared L2 distance. Lower = more similar; 0.0 for identical vectors.
///
/// Mismatched lengths return `f32::INFINITY` so they sort last.
pub fn squared_euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = (*x as f64) - (*y as f64);
            d * d
        })
        .sum::<f64>() as f32
}

/// Indices and distances of the `k` embeddings nearest to `query`, closest
/// first. Ties keep insertion order.
pub fn nearest(embeddings: &[&[f32]], query: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = embeddings
        .iter()
        .enumerate()
        .map(|(i, e)| (i, squared_euclidean_distance(e, query)))
        .collect();

    scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}
