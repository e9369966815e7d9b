use crate::{NameTier, Rarity, RarityTable, WeightTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub weights: WeightTable,
}

impl Slot {
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxDef {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub slots: Vec<Slot>,
}

impl BoxDef {
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn last_slot(&self) -> Option<&Slot> {
        self.slots.last()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePools {
    pub common_adjectives: Vec<String>,
    pub rare_adjectives: Vec<String>,
    pub nouns: Vec<String>,
}

impl NamePools {
    pub fn adjectives(&self, tier: NameTier) -> &[String] {
        match tier {
            NameTier::Common => &self.common_adjectives,
            NameTier::Rare => &self.rare_adjectives,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog defines no rarities")]
    NoRarities,
    #[error("catalog defines no boxes")]
    NoBoxes,
    #[error("duplicate rarity key {0}")]
    DuplicateRarity(String),
    #[error("duplicate box key {0}")]
    DuplicateBox(String),
    #[error("box {box_key} slot {slot}: unknown rarity {rarity}")]
    UnknownRarity {
        box_key: String,
        slot: usize,
        rarity: String,
    },
    #[error("box {box_key} slot {slot}: invalid weight {weight} for {rarity}")]
    InvalidWeight {
        box_key: String,
        slot: usize,
        rarity: String,
        weight: f64,
    },
    #[error("box {box_key} slot {slot}: no positive weight")]
    EmptySlot { box_key: String, slot: usize },
    #[error("box {box_key} slot {slot}: weights overflow")]
    WeightOverflow { box_key: String, slot: usize },
    #[error("name pool {0} is empty")]
    EmptyNamePool(&'static str),
    #[error("default box {0} is not in the catalog")]
    MissingDefaultBox(String),
}

/// Rarities, boxes and name pools the engine resolves packs against.
#[derive(Debug, Clone)]
pub struct Catalog {
    rarities: RarityTable,
    boxes: Vec<BoxDef>,
    names: NamePools,
    default_box: usize,
}

impl Catalog {
    pub fn new(
        rarities: Vec<Rarity>,
        boxes: Vec<BoxDef>,
        names: NamePools,
        default_box: &str,
    ) -> Result<Self, CatalogError> {
        validate_rarities(&rarities)?;
        let rarities = RarityTable::new(rarities);
        validate_boxes(&boxes, &rarities)?;
        validate_names(&names)?;
        let default_box = boxes
            .iter()
            .position(|item| item.key == default_box)
            .ok_or_else(|| CatalogError::MissingDefaultBox(default_box.to_string()))?;
        Ok(Self {
            rarities,
            boxes,
            names,
            default_box,
        })
    }

    pub fn rarities(&self) -> &RarityTable {
        &self.rarities
    }

    pub fn boxes(&self) -> &[BoxDef] {
        &self.boxes
    }

    pub fn names(&self) -> &NamePools {
        &self.names
    }

    pub fn box_by_key(&self, key: &str) -> Option<&BoxDef> {
        self.boxes.iter().find(|item| item.key == key)
    }

    pub fn default_box(&self) -> &BoxDef {
        &self.boxes[self.default_box]
    }
}

fn validate_rarities(rarities: &[Rarity]) -> Result<(), CatalogError> {
    if rarities.is_empty() {
        return Err(CatalogError::NoRarities);
    }
    let mut seen = HashSet::new();
    for rarity in rarities {
        if !seen.insert(rarity.key.as_str()) {
            return Err(CatalogError::DuplicateRarity(rarity.key.to_string()));
        }
    }
    Ok(())
}

fn validate_boxes(boxes: &[BoxDef], rarities: &RarityTable) -> Result<(), CatalogError> {
    if boxes.is_empty() {
        return Err(CatalogError::NoBoxes);
    }
    let mut seen = HashSet::new();
    for item in boxes {
        if !seen.insert(item.key.as_str()) {
            return Err(CatalogError::DuplicateBox(item.key.clone()));
        }
        for (index, slot) in item.slots.iter().enumerate() {
            for (key, weight) in slot.weights.iter() {
                if !rarities.contains(key.as_str()) {
                    return Err(CatalogError::UnknownRarity {
                        box_key: item.key.clone(),
                        slot: index,
                        rarity: key.to_string(),
                    });
                }
                if !weight.is_finite() || weight < 0.0 {
                    return Err(CatalogError::InvalidWeight {
                        box_key: item.key.clone(),
                        slot: index,
                        rarity: key.to_string(),
                        weight,
                    });
                }
            }
            if !slot.weights.has_positive_weight() {
                return Err(CatalogError::EmptySlot {
                    box_key: item.key.clone(),
                    slot: index,
                });
            }
            if !slot.weights.total().is_finite() {
                return Err(CatalogError::WeightOverflow {
                    box_key: item.key.clone(),
                    slot: index,
                });
            }
        }
    }
    Ok(())
}

fn validate_names(names: &NamePools) -> Result<(), CatalogError> {
    if names.common_adjectives.is_empty() {
        return Err(CatalogError::EmptyNamePool("common_adjectives"));
    }
    if names.rare_adjectives.is_empty() {
        return Err(CatalogError::EmptyNamePool("rare_adjectives"));
    }
    if names.nouns.is_empty() {
        return Err(CatalogError::EmptyNamePool("nouns"));
    }
    Ok(())
}
