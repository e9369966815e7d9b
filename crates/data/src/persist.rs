use crate::store::{KeyValueStore, StoreError};
use cerealbox_core::{Binder, RarityKey, RarityTable, Session};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATE_KEY: &str = "state_v2";
pub const LEGACY_BINDER_KEY: &str = "binder_v1";
pub const LEGACY_OPENED_KEY: &str = "opened_v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub binder: Binder,
    pub opened: u64,
}

impl PersistedState {
    pub fn empty(rarities: &RarityTable) -> Self {
        Self {
            binder: Binder::new(rarities),
            opened: 0,
        }
    }

    pub fn capture(session: &Session) -> Self {
        Self {
            binder: session.binder().clone(),
            opened: session.opened(),
        }
    }

    pub fn restore_into(self, session: &mut Session) {
        session.restore(self.binder, self.opened);
    }
}

/// Reads the saved collection. Never fails: unreadable or malformed data
/// falls back to the legacy keys and then to an all-zero ledger.
pub fn load_persisted_state<S>(store: &S, rarities: &RarityTable) -> PersistedState
where
    S: KeyValueStore + ?Sized,
{
    if let Some(state) = load_primary(store, rarities) {
        return state;
    }
    PersistedState {
        binder: normalize_binder(load_legacy_binder(store).as_ref(), rarities),
        opened: load_legacy_opened(store),
    }
}

pub fn try_save_persisted_state<S>(store: &mut S, state: &PersistedState) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let body = serde_json::to_string(state)?;
    store.set(STATE_KEY, &body)
}

/// Writes the collection, logging instead of returning storage failures.
pub fn save_persisted_state<S>(store: &mut S, state: &PersistedState) -> bool
where
    S: KeyValueStore + ?Sized,
{
    match try_save_persisted_state(store, state) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("failed to persist state: {err}");
            false
        }
    }
}

/// Keeps finite, non-negative numeric counts (floored) and zero-fills every
/// known rarity. Anything that is not a JSON object yields an all-zero binder.
pub fn normalize_binder(value: Option<&Value>, rarities: &RarityTable) -> Binder {
    let mut counts = Vec::new();
    if let Some(Value::Object(map)) = value {
        for (key, count) in map {
            match normalize_count(count) {
                Some(count) => counts.push((RarityKey::new(key.as_str()), count)),
                None => log::debug!("dropping stored count for {key}: {count}"),
            }
        }
    }
    Binder::from_counts(counts, rarities)
}

pub fn normalize_opened(value: Option<&Value>) -> u64 {
    value.and_then(normalize_count).unwrap_or(0)
}

fn normalize_count(value: &Value) -> Option<u64> {
    if let Some(count) = value.as_u64() {
        return Some(count);
    }
    let number = value.as_f64()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }
    Some(number.floor() as u64)
}

fn load_primary<S>(store: &S, rarities: &RarityTable) -> Option<PersistedState>
where
    S: KeyValueStore + ?Sized,
{
    let raw = read_key(store, STATE_KEY)?;
    let parsed: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("failed to parse saved state: {err}");
            return None;
        }
    };
    let Value::Object(map) = parsed else {
        log::warn!("saved state is not an object");
        return None;
    };
    Some(PersistedState {
        binder: normalize_binder(map.get("binder"), rarities),
        opened: normalize_opened(map.get("opened")),
    })
}

fn load_legacy_binder<S>(store: &S) -> Option<Value>
where
    S: KeyValueStore + ?Sized,
{
    let raw = read_key(store, LEGACY_BINDER_KEY)?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => None,
        Err(err) => {
            log::warn!("failed to parse legacy binder data: {err}");
            None
        }
    }
}

fn load_legacy_opened<S>(store: &S) -> u64
where
    S: KeyValueStore + ?Sized,
{
    read_key(store, LEGACY_OPENED_KEY)
        .map(|raw| parse_leading_count(&raw))
        .unwrap_or(0)
}

/// Leading decimal digits of `raw`, so `"12 packs"` reads as 12. Signs and
/// empty prefixes give 0.
fn parse_leading_count(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    let digits: String = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse::<u64>().unwrap_or(0)
}

fn read_key<S>(store: &S, key: &str) -> Option<String>
where
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        Ok(Some(raw)) if !raw.trim().is_empty() => Some(raw),
        Ok(_) => None,
        Err(err) => {
            log::warn!("failed to read {key}: {err}");
            None
        }
    }
}
