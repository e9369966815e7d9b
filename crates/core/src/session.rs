use crate::{
    featured_card, resolve_pack, Binder, BoxDef, Catalog, Event, EventBus, PackError, PackOpen,
    ResolvedCard, RngState,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the session is in the spawn, break, reveal, summary cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Stage {
    Idle,
    BoxSpawned,
    Revealing,
    SummaryShown,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown box {0}")]
    UnknownBox(String),
    #[error("invalid stage: {0:?}")]
    InvalidStage(Stage),
    #[error("pack error: {0}")]
    Pack(#[from] PackError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub index: usize,
    pub card: ResolvedCard,
    pub count: u64,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub box_key: String,
    pub cards: Vec<ResolvedCard>,
    pub featured: Option<ResolvedCard>,
}

/// Application state of one simulator instance: catalog, selection,
/// in-progress pack and the collection ledger.
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    current_box: String,
    stage: Stage,
    pack: Option<PackOpen>,
    pulled: Vec<ResolvedCard>,
    summary: Option<Summary>,
    binder: Binder,
    opened: u64,
    rng: RngState,
}

impl Session {
    pub fn new(catalog: Catalog, seed: u64) -> Self {
        Self::with_rng(catalog, RngState::from_seed(seed))
    }

    pub fn with_rng(catalog: Catalog, rng: RngState) -> Self {
        let binder = Binder::new(catalog.rarities());
        let current_box = catalog.default_box().key.clone();
        Self {
            catalog,
            current_box,
            stage: Stage::Idle,
            pack: None,
            pulled: Vec::new(),
            summary: None,
            binder,
            opened: 0,
            rng,
        }
    }

    /// Seeds the ledger from persisted state.
    pub fn restore(&mut self, mut binder: Binder, opened: u64) {
        binder.ensure_rarities(self.catalog.rarities());
        self.binder = binder;
        self.opened = opened;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn current_box(&self) -> &BoxDef {
        self.catalog
            .box_by_key(&self.current_box)
            .unwrap_or_else(|| self.catalog.default_box())
    }

    pub fn pack(&self) -> Option<&PackOpen> {
        self.pack.as_ref()
    }

    pub fn pulled(&self) -> &[ResolvedCard] {
        &self.pulled
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    pub fn opened(&self) -> u64 {
        self.opened
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn select_box(&mut self, key: &str, events: &mut EventBus) -> Result<(), SessionError> {
        let item = self
            .catalog
            .box_by_key(key)
            .ok_or_else(|| SessionError::UnknownBox(key.to_string()))?;
        self.current_box = item.key.clone();
        events.push(Event::BoxSelected {
            key: self.current_box.clone(),
        });
        Ok(())
    }

    /// Places a fresh, unbroken box. Not allowed while cards are still face down.
    pub fn spawn_box(&mut self, events: &mut EventBus) -> Result<(), SessionError> {
        if self.stage == Stage::Revealing {
            return Err(SessionError::InvalidStage(self.stage));
        }
        self.pack = None;
        self.pulled.clear();
        self.summary = None;
        self.stage = Stage::BoxSpawned;
        let item = self.current_box();
        events.push(Event::BoxSpawned {
            key: item.key.clone(),
            slots: item.slot_count(),
        });
        Ok(())
    }

    /// Resolves the current box into a pack and returns how many cards it holds.
    pub fn break_box(&mut self, events: &mut EventBus) -> Result<usize, SessionError> {
        if self.stage != Stage::BoxSpawned {
            return Err(SessionError::InvalidStage(self.stage));
        }
        let item = self
            .catalog
            .box_by_key(&self.current_box)
            .unwrap_or_else(|| self.catalog.default_box());
        let cards = resolve_pack(item, &self.catalog, &mut self.rng)?;
        let key = item.key.clone();
        let count = cards.len();
        events.push(Event::BoxBroken {
            key: key.clone(),
            cards: count,
        });
        self.pack = Some(PackOpen::new(key, cards));
        self.stage = Stage::Revealing;
        if count == 0 {
            // a box without slots has nothing to reveal
            self.finish_pack(events);
        }
        Ok(count)
    }

    /// Reveals the top face-down card and records it in the binder.
    pub fn reveal_next(&mut self, events: &mut EventBus) -> Result<Reveal, SessionError> {
        if self.stage != Stage::Revealing {
            return Err(SessionError::InvalidStage(self.stage));
        }
        let pack = self
            .pack
            .as_mut()
            .ok_or(SessionError::InvalidStage(self.stage))?;
        let index = pack
            .top_index()
            .ok_or(SessionError::InvalidStage(self.stage))?;
        let card = pack
            .reveal()
            .ok_or(SessionError::InvalidStage(self.stage))?;
        let finished = pack.is_finished();
        let count = self.binder.record(&card.rarity);
        self.pulled.push(card.clone());
        events.push(Event::CardRevealed {
            index,
            rarity: card.rarity.clone(),
            name: card.name.clone(),
            count,
        });
        if finished {
            self.finish_pack(events);
        }
        Ok(Reveal {
            index,
            card,
            count,
            finished,
        })
    }

    /// Spawns if needed, breaks and reveals every card of one box.
    pub fn open_all(&mut self, events: &mut EventBus) -> Result<Summary, SessionError> {
        if self.stage != Stage::BoxSpawned && self.stage != Stage::Revealing {
            self.spawn_box(events)?;
        }
        if self.stage == Stage::BoxSpawned {
            self.break_box(events)?;
        }
        while self.stage == Stage::Revealing {
            self.reveal_next(events)?;
        }
        self.summary
            .clone()
            .ok_or(SessionError::InvalidStage(self.stage))
    }

    fn finish_pack(&mut self, events: &mut EventBus) {
        let box_key = self
            .pack
            .take()
            .map(|pack| pack.box_key)
            .unwrap_or_else(|| self.current_box.clone());
        self.opened = self.opened.saturating_add(1);
        let featured = featured_card(&self.pulled, self.catalog.rarities()).cloned();
        events.push(Event::PackFinished {
            key: box_key.clone(),
            opened: self.opened,
            featured: featured.clone(),
        });
        self.summary = Some(Summary {
            box_key,
            cards: self.pulled.clone(),
            featured,
        });
        self.stage = Stage::SummaryShown;
    }
}
