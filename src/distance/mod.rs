//! Distance metrics, pure functions over raw `&[f32]` vectors.
//!
//! The metric is picked from a runtime tag at index-open time and fixed for
//! the index's lifetime, so it is modeled as a tagged [`Metric`] enum
//! dispatching to free functions over slices, rather than a compile-time
//! generic trait (the metric isn't known until `Index::open` runs).

mod angular;
mod euclidean;

use rand::Rng;

use crate::{Error, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn random<R: Rng>(rng: &mut R) -> Side {
        if rng.gen() {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// The distance metric an index is built with, fixed at `create` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Angular,
    Euclidean,
}

impl Metric {
    pub fn from_tag(tag: char) -> Result<Metric, Error> {
        match tag {
            'a' | 'A' => Ok(Metric::Angular),
            'e' | 'E' => Ok(Metric::Euclidean),
            other => Err(Error::UnknownMetric(other)),
        }
    }

    pub fn tag(self) -> char {
        match self {
            Metric::Angular => 'a',
            Metric::Euclidean => 'e',
        }
    }

    /// Exact distance between two raw vectors.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Angular => angular::distance(a, b),
            Metric::Euclidean => euclidean::distance(a, b),
        }
    }

    /// Maps the internal distance used for ranking onto the metric's public
    /// scale (the source returns the unnormalized distance for
    /// `get_distance`; this is only applied to query results).
    pub fn normalized_distance(self, d: f32) -> f32 {
        match self {
            Metric::Angular => angular::normalized_distance(d),
            Metric::Euclidean => euclidean::normalized_distance(d),
        }
    }

    /// Signed distance of `y` from an internal node's hyperplane `(v, t)`.
    pub fn margin(self, v: &[f32], t: f32, y: &[f32]) -> f32 {
        match self {
            Metric::Angular => angular::margin(v, y),
            Metric::Euclidean => euclidean::margin(v, t, y),
        }
    }

    /// Which child `y` routes to under hyperplane `(v, t)`. Ties at exactly
    /// zero margin are broken with a fair coin.
    pub fn side<R: Rng>(self, v: &[f32], t: f32, y: &[f32], rng: &mut R) -> Side {
        let margin = self.margin(v, t, y);
        if margin > 0.0 {
            Side::Left
        } else if margin < 0.0 {
            Side::Right
        } else {
            Side::random(rng)
        }
    }

    /// Builds a split hyperplane `(v, t)` from a leaf's current members.
    ///
    /// `members` holds the raw vectors of the items *currently* in the
    /// overflowing leaf; the item being inserted is routed afterwards and
    /// must not be among them.
    ///
    /// When fewer than two members are available to pick a distinct pair
    /// from (a degenerate case only reachable with a leaf capacity of 1),
    /// falls back to a dummy all-zero hyperplane: its margin is always
    /// exactly zero, so every routing decision through it resolves by coin
    /// flip.
    pub fn split<R: Rng>(self, members: &[(ItemId, Vec<f32>)], rng: &mut R) -> (Vec<f32>, f32) {
        let dimensions = members.first().map_or(0, |(_, v)| v.len());
        if members.len() < 2 {
            return (vec![0.0; dimensions], 0.0);
        }
        match self {
            Metric::Angular => angular::split(members, rng),
            Metric::Euclidean => euclidean::split(members, rng),
        }
    }
}

/// Picks two distinct indices in `0..n` uniformly at random. `n` must be
/// at least 2.
fn pick_distinct_pair<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    debug_assert!(n >= 2);
    let i = rng.gen_range(0..n);
    let mut j = rng.gen_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    (i, j)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f32]) -> f32 {
    dot(a, a).sqrt()
}

fn normalize(v: &[f32]) -> Vec<f32> {
    let n = norm(v);
    if n > 0.0 {
        v.iter().map(|x| x / n).collect()
    } else {
        v.to_vec()
    }
}

fn normalize_in_place(v: &mut [f32]) {
    let n = norm(v);
    if n > 0.0 {
        v.iter_mut().for_each(|x| *x /= n);
    }
}
