use crate::{RarityKey, RarityTable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Cumulative per-rarity collection counts. Counts only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binder(IndexMap<RarityKey, u64>);

impl Binder {
    /// Empty binder with every known rarity present at zero.
    pub fn new(rarities: &RarityTable) -> Self {
        let mut binder = Self::default();
        binder.ensure_rarities(rarities);
        binder
    }

    /// Known rarities come first in rank order; unknown keys follow as given.
    pub fn from_counts<I>(counts: I, rarities: &RarityTable) -> Self
    where
        I: IntoIterator<Item = (RarityKey, u64)>,
    {
        let mut binder = Self::new(rarities);
        for (key, count) in counts {
            binder.0.insert(key, count);
        }
        binder
    }

    /// Adds a zero entry for every rarity missing from the ledger.
    pub fn ensure_rarities(&mut self, rarities: &RarityTable) {
        for key in rarities.keys() {
            self.0.entry(key.clone()).or_insert(0);
        }
    }

    /// Counts one more card of `key` and returns the new total for it.
    pub fn record(&mut self, key: &RarityKey) -> u64 {
        let count = self.0.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn count(&self, key: &str) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RarityKey, u64)> + '_ {
        self.0.iter().map(|(key, count)| (key, *count))
    }

    pub fn total(&self) -> u64 {
        self.0.values().fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NameTier, Rarity};

    fn table() -> RarityTable {
        RarityTable::new(
            ["1d", "2d", "cr"]
                .iter()
                .map(|key| Rarity {
                    key: (*key).into(),
                    label: key.to_string(),
                    icon: "◆".to_string(),
                    repeat: 1,
                    tier: NameTier::Common,
                })
                .collect(),
        )
    }

    #[test]
    fn new_binder_has_every_rarity() {
        let binder = Binder::new(&table());
        let keys: Vec<&str> = binder.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["1d", "2d", "cr"]);
        assert_eq!(binder.total(), 0);
    }

    #[test]
    fn record_counts_each_key() {
        let mut binder = Binder::new(&table());
        let sequence = ["1d", "cr", "1d", "2d", "1d"];
        let mut previous = binder.clone();
        for key in sequence {
            binder.record(&RarityKey::from(key));
            for (k, count) in previous.iter() {
                assert!(binder.count(k.as_str()) >= count);
            }
            previous = binder.clone();
        }
        assert_eq!(binder.count("1d"), 3);
        assert_eq!(binder.count("2d"), 1);
        assert_eq!(binder.count("cr"), 1);
        assert_eq!(binder.total(), 5);
    }

    #[test]
    fn record_initializes_unknown_keys() {
        let mut binder = Binder::new(&table());
        assert_eq!(binder.record(&RarityKey::from("promo")), 1);
        assert_eq!(binder.count("promo"), 1);
    }

    #[test]
    fn from_counts_fills_missing() {
        let binder = Binder::from_counts(vec![(RarityKey::from("2d"), 4)], &table());
        assert_eq!(binder.count("2d"), 4);
        assert_eq!(binder.count("1d"), 0);
        assert_eq!(binder.len(), 3);
    }
}
