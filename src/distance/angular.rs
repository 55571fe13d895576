//! Angular (cosine) distance: `d = 2 - 2*cos(a, b)`.

use rand::Rng;

use super::{dot, norm, normalize, normalize_in_place, pick_distinct_pair};
use crate::ItemId;

pub fn distance(a: &[f32], b: &[f32]) -> f32 {
    let na = norm(a);
    let nb = norm(b);
    if na == 0.0 || nb == 0.0 {
        return 2.0;
    }
    let cos = (dot(a, b) / (na * nb)).clamp(-1.0, 1.0);
    2.0 - 2.0 * cos
}

/// Angular distance is reported to callers as its square root, giving a
/// metric on the same scale as chord distance between normalized vectors.
pub fn normalized_distance(d: f32) -> f32 {
    d.max(0.0).sqrt()
}

/// Margin of `y` against the hyperplane through the origin with normal `v`.
/// Angular splits never carry an offset, so `t` is unused.
pub fn margin(v: &[f32], y: &[f32]) -> f32 {
    dot(v, y)
}

/// Builds the hyperplane normal as the (normalized) difference of two
/// normalized, randomly chosen distinct member vectors: the bisector of
/// the angle between them.
pub fn split<R: Rng>(members: &[(ItemId, Vec<f32>)], rng: &mut R) -> (Vec<f32>, f32) {
    let (i, j) = pick_distinct_pair(members.len(), rng);
    let p = normalize(&members[i].1);
    let q = normalize(&members[j].1);
    let mut v: Vec<f32> = p.iter().zip(q.iter()).map(|(x, y)| x - y).collect();
    normalize_in_place(&mut v);
    (v, 0.0)
}
