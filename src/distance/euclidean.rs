//! Euclidean distance: `d = sum((a_i - b_i)^2)`.

use rand::Rng;

use super::{dot, norm, pick_distinct_pair};
use crate::ItemId;

pub fn distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub fn normalized_distance(d: f32) -> f32 {
    d.max(0.0).sqrt()
}

/// Margin of `y` against the hyperplane `v . x - t = 0`.
pub fn margin(v: &[f32], t: f32, y: &[f32]) -> f32 {
    dot(v, y) - t
}

/// Builds the midpoint hyperplane between two randomly chosen distinct
/// member vectors: normal is their difference, offset places the plane
/// through their midpoint.
pub fn split<R: Rng>(members: &[(ItemId, Vec<f32>)], rng: &mut R) -> (Vec<f32>, f32) {
    let (i, j) = pick_distinct_pair(members.len(), rng);
    let p = &members[i].1;
    let q = &members[j].1;
    let v: Vec<f32> = p.iter().zip(q.iter()).map(|(x, y)| x - y).collect();
    let midpoint: Vec<f32> = p.iter().zip(q.iter()).map(|(x, y)| (x + y) / 2.0).collect();
    let t = dot(&v, &midpoint);
    let scale = norm(&v);
    if scale > 0.0 {
        (v.iter().map(|x| x / scale).collect(), t / scale)
    } else {
        (v, t)
    }
}
