use crate::{RarityKey, RngState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Relative rarity weights of one slot, walked in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable(IndexMap<RarityKey, f64>);

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<RarityKey>, weight: f64) -> Self {
        self.insert(key, weight);
        self
    }

    pub fn insert(&mut self, key: impl Into<RarityKey>, weight: f64) {
        self.0.insert(key.into(), weight);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RarityKey, f64)> + '_ {
        self.0.iter().map(|(key, weight)| (key, *weight))
    }

    pub fn keys(&self) -> impl Iterator<Item = &RarityKey> + '_ {
        self.0.keys()
    }

    pub fn weight(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Sum of the weights that can actually be drawn.
    pub fn total(&self) -> f64 {
        self.0.values().copied().filter(|w| usable(*w)).sum()
    }

    pub fn has_positive_weight(&self) -> bool {
        self.0.values().any(|w| usable(*w))
    }
}

impl<K: Into<RarityKey>> FromIterator<(K, f64)> for WeightTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, w)| (key.into(), w)).collect())
    }
}

fn usable(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

/// Draws one key with probability `weight / total`.
///
/// Returns `None` only for an empty table. A table without any positive
/// weight yields its last key.
pub fn sample<'a>(weights: &'a WeightTable, rng: &mut RngState) -> Option<&'a RarityKey> {
    pick_at(weights, rng.next_unit())
}

/// Deterministic core of [`sample`]: `unit` is the uniform roll in `[0, 1)`.
///
/// Each positive entry owns the half-open interval `[start, start + weight)`
/// of the scaled roll; zero, negative and non-finite weights own nothing.
/// Weights are divided by the largest one first so huge weights cannot
/// overflow the running total.
pub fn pick_at(weights: &WeightTable, unit: f64) -> Option<&RarityKey> {
    let last = weights.keys().last()?;
    let scale = weights
        .iter()
        .map(|(_, weight)| weight)
        .filter(|weight| usable(*weight))
        .fold(0.0_f64, f64::max);
    if scale <= 0.0 {
        return Some(last);
    }
    let total: f64 = weights
        .iter()
        .filter(|(_, weight)| usable(*weight))
        .map(|(_, weight)| weight / scale)
        .sum();
    let unit = if unit.is_finite() {
        unit.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut roll = unit * total;
    let mut last_drawable = last;
    for (key, weight) in weights.iter() {
        if !usable(weight) {
            continue;
        }
        let share = weight / scale;
        if roll < share {
            return Some(key);
        }
        roll -= share;
        last_drawable = key;
    }
    // rounding pushed the roll past the final interval
    Some(last_drawable)
}
