use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::min_max_scaler::FEATURE_DIMENSION;

/// A nearest-neighbor match: the caller-supplied row id and its Euclidean
/// distance to the query (lower is closer).
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub distance: f32,
}

#[derive(PartialEq)]
struct ScoredRow {
    distance: f32,
    order: usize,
}

impl Eq for ScoredRow {}

impl PartialOrd for ScoredRow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredRow {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on distance: the worst candidate sits on top and is
        // evicted once the heap exceeds k. NaN distances compare as worst
        // so they never displace a real candidate. Ties fall back to
        // insertion order, which keeps results deterministic and lets the
        // first-seen row win.
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or_else(|| {
                if self.distance.is_nan() && !other.distance.is_nan() {
                    Ordering::Greater
                } else if !self.distance.is_nan() && other.distance.is_nan() {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Flat-matrix nearest-neighbor index over scaled macro vectors.
///
/// Rows are appended once at build time; queries scan the matrix and keep
/// the k closest rows in a bounded heap. At four dimensions a linear scan
/// is exact and fast enough that no index structure is warranted.
#[derive(Debug, Default)]
pub struct KnnIndex {
    matrix: Vec<f32>,
    row_ids: Vec<usize>,
}

impl KnnIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row. `id` is the caller's identifier for the row,
    /// returned from [`query`](Self::query); it does not need to be dense
    /// or ordered.
    pub fn add(&mut self, id: usize, vector: [f32; FEATURE_DIMENSION]) {
        self.matrix.extend_from_slice(&vector);
        self.row_ids.push(id);
    }

    /// Returns up to `k` rows closest to `query` by Euclidean distance,
    /// ascending, ties in insertion order.
    pub fn query(&self, query: [f32; FEATURE_DIMENSION], k: usize) -> Vec<Neighbor> {
        if k == 0 || self.row_ids.is_empty() {
            return Vec::new();
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        for (order, chunk) in self.matrix.chunks_exact(FEATURE_DIMENSION).enumerate() {
            let distance = euclidean_distance(chunk, &query);
            heap.push(ScoredRow { distance, order });
            if heap.len() > k {
                heap.pop();
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|row| Neighbor {
                id: self.row_ids[row.order],
                distance: row.distance,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.row_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }
}

#[inline]
fn euclidean_distance(row: &[f32], query: &[f32; FEATURE_DIMENSION]) -> f32 {
    row.iter()
        .zip(query.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt()
}
