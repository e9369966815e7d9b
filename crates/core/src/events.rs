use crate::{RarityKey, ResolvedCard};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    BoxSelected {
        key: String,
    },
    BoxSpawned {
        key: String,
        slots: usize,
    },
    BoxBroken {
        key: String,
        cards: usize,
    },
    CardRevealed {
        index: usize,
        rarity: RarityKey,
        name: String,
        count: u64,
    },
    PackFinished {
        key: String,
        opened: u64,
        featured: Option<ResolvedCard>,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
