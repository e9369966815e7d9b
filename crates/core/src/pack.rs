use crate::{generate_name, sample, BoxDef, Catalog, RarityKey, RarityTable, RngState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedCard {
    pub rarity: RarityKey,
    pub name: String,
}

impl ResolvedCard {
    pub fn new(rarity: impl Into<RarityKey>, name: impl Into<String>) -> Self {
        Self {
            rarity: rarity.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
    #[error("box {box_key} slot {slot} has no weights")]
    EmptySlot { box_key: String, slot: usize },
}

/// Resolves every slot of `item` once, in slot order.
pub fn resolve_pack(
    item: &BoxDef,
    catalog: &Catalog,
    rng: &mut RngState,
) -> Result<Vec<ResolvedCard>, PackError> {
    let mut cards = Vec::with_capacity(item.slots.len());
    for (index, slot) in item.slots.iter().enumerate() {
        let rarity = sample(&slot.weights, rng)
            .cloned()
            .ok_or_else(|| PackError::EmptySlot {
                box_key: item.key.clone(),
                slot: index,
            })?;
        let tier = catalog.rarities().tier(rarity.as_str());
        let name = generate_name(catalog.names(), tier, rng);
        cards.push(ResolvedCard { rarity, name });
    }
    log::debug!(
        "resolved {} pack: [{}]",
        item.key,
        cards
            .iter()
            .map(|card| card.rarity.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(cards)
}

/// Highest-ranked rarity the last slot of `item` can produce.
pub fn top_tier<'a>(item: &'a BoxDef, rarities: &RarityTable) -> Option<&'a RarityKey> {
    let last = item.last_slot()?;
    let mut best: Option<&RarityKey> = None;
    for key in last.weights.keys() {
        let replace = match best {
            Some(current) => rarities.sort_rank(key.as_str()) > rarities.sort_rank(current.as_str()),
            None => true,
        };
        if replace {
            best = Some(key);
        }
    }
    best
}

/// Highest-ranked card of a pull; the leftmost card wins ties.
pub fn featured_card<'a>(
    cards: &'a [ResolvedCard],
    rarities: &RarityTable,
) -> Option<&'a ResolvedCard> {
    let mut best: Option<&ResolvedCard> = None;
    for card in cards {
        let replace = match best {
            Some(current) => {
                rarities.sort_rank(card.rarity.as_str()) > rarities.sort_rank(current.rarity.as_str())
            }
            None => true,
        };
        if replace {
            best = Some(card);
        }
    }
    best
}

/// A broken box. Cards lie stacked in slot order, so the last slot is on
/// top and is revealed first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackOpen {
    pub box_key: String,
    pub cards: Vec<ResolvedCard>,
    pub revealed: usize,
}

impl PackOpen {
    pub fn new(box_key: impl Into<String>, cards: Vec<ResolvedCard>) -> Self {
        Self {
            box_key: box_key.into(),
            cards,
            revealed: 0,
        }
    }

    /// Slot index of the face-down card on top of the stack.
    pub fn top_index(&self) -> Option<usize> {
        self.cards.len().checked_sub(self.revealed + 1)
    }

    pub fn peek(&self) -> Option<&ResolvedCard> {
        self.top_index().and_then(|index| self.cards.get(index))
    }

    pub fn reveal(&mut self) -> Option<ResolvedCard> {
        let card = self.peek()?.clone();
        self.revealed += 1;
        Some(card)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.revealed)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NameTier, Rarity, Slot, WeightTable};

    fn table() -> RarityTable {
        RarityTable::new(
            ["1d", "2d", "3d", "4d", "1s", "2s", "3s", "cr"]
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
    fn featured_prefers_highest_rank() {
        let cards = vec![
            ResolvedCard::new("1d", "A"),
            ResolvedCard::new("cr", "B"),
            ResolvedCard::new("2d", "C"),
        ];
        assert_eq!(
            featured_card(&cards, &table()),
            Some(&ResolvedCard::new("cr", "B"))
        );
    }

    #[test]
    fn featured_ties_go_to_leftmost() {
        let cards = vec![
            ResolvedCard::new("1d", "A"),
            ResolvedCard::new("3d", "First"),
            ResolvedCard::new("3d", "Second"),
        ];
        assert_eq!(
            featured_card(&cards, &table()).map(|c| c.name.as_str()),
            Some("First")
        );
        assert_eq!(featured_card(&[], &table()), None);
    }

    #[test]
    fn top_tier_reads_last_slot() {
        let item = BoxDef {
            key: "standard".to_string(),
            title: "Standard Box".to_string(),
            description: String::new(),
            icon: String::new(),
            slots: vec![
                Slot::new(WeightTable::new().with("1d", 1.0)),
                Slot::new(
                    WeightTable::new()
                        .with("2d", 70.0)
                        .with("3d", 20.0)
                        .with("4d", 7.0)
                        .with("1s", 2.5)
                        .with("2s", 0.9)
                        .with("3s", 0.09)
                        .with("cr", 0.01),
                ),
            ],
        };
        assert_eq!(top_tier(&item, &table()).map(|k| k.as_str()), Some("cr"));
    }

    #[test]
    fn top_tier_ignores_insertion_order() {
        let item = BoxDef {
            key: "odd".to_string(),
            title: "Odd".to_string(),
            description: String::new(),
            icon: String::new(),
            slots: vec![Slot::new(
                WeightTable::new()
                    .with("2s", 1.0)
                    .with("unknown", 5.0)
                    .with("1d", 3.0),
            )],
        };
        assert_eq!(top_tier(&item, &table()).map(|k| k.as_str()), Some("2s"));
    }

    #[test]
    fn pack_open_reveals_top_of_stack_first() {
        let mut open = PackOpen::new(
            "mini",
            vec![ResolvedCard::new("1d", "A"), ResolvedCard::new("2d", "B")],
        );
        assert_eq!(open.remaining(), 2);
        assert_eq!(open.top_index(), Some(1));
        assert_eq!(open.reveal().map(|c| c.name), Some("B".to_string()));
        assert_eq!(open.top_index(), Some(0));
        assert_eq!(open.peek().map(|c| c.name.as_str()), Some("A"));
        assert_eq!(open.reveal().map(|c| c.name), Some("A".to_string()));
        assert!(open.is_finished());
        assert_eq!(open.top_index(), None);
        assert_eq!(open.reveal(), None);
    }
}
