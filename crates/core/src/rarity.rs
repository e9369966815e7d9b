use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RarityKey(String);

impl RarityKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RarityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RarityKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RarityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which adjective pool card names of a rarity draw from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NameTier {
    #[default]
    Common,
    Rare,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rarity {
    pub key: RarityKey,
    pub label: String,
    pub icon: String,
    #[serde(default = "default_repeat")]
    pub repeat: u8,
    #[serde(default)]
    pub tier: NameTier,
}

fn default_repeat() -> u8 {
    1
}

impl Rarity {
    /// Icon glyph repeated `repeat` times, e.g. `◆◆◆` for a three-diamond rarity.
    pub fn symbol(&self) -> String {
        self.icon.repeat(self.repeat.max(1) as usize)
    }
}

/// The fixed rarity ordering. Position in the table is the rank; later
/// entries outrank earlier ones.
#[derive(Debug, Clone, Default)]
pub struct RarityTable {
    rarities: Vec<Rarity>,
    ranks: HashMap<RarityKey, usize>,
}

impl RarityTable {
    pub fn new(rarities: Vec<Rarity>) -> Self {
        let mut ranks = HashMap::with_capacity(rarities.len());
        for (rank, rarity) in rarities.iter().enumerate() {
            ranks.entry(rarity.key.clone()).or_insert(rank);
        }
        Self { rarities, ranks }
    }

    pub fn rarities(&self) -> &[Rarity] {
        &self.rarities
    }

    pub fn len(&self) -> usize {
        self.rarities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rarities.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RarityKey> + '_ {
        self.rarities.iter().map(|rarity| &rarity.key)
    }

    pub fn get(&self, key: &str) -> Option<&Rarity> {
        self.ranks.get(key).map(|&rank| &self.rarities[rank])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ranks.contains_key(key)
    }

    pub fn rank(&self, key: &str) -> Option<usize> {
        self.ranks.get(key).copied()
    }

    /// Rank used for comparisons. Unknown keys sort below every known rarity.
    pub fn sort_rank(&self, key: &str) -> i64 {
        self.rank(key).map(|rank| rank as i64).unwrap_or(-1)
    }

    pub fn tier(&self, key: &str) -> NameTier {
        self.get(key).map(|rarity| rarity.tier).unwrap_or_default()
    }

    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map(|rarity| rarity.label.as_str()).unwrap_or(key)
    }
}
