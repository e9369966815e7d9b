use crate::{NamePools, NameTier, RngState};

/// Builds an `"<Adjective> <Noun>"` card name from the pools of `tier`.
pub fn generate_name(pools: &NamePools, tier: NameTier, rng: &mut RngState) -> String {
    let adjective = rng.pick(pools.adjectives(tier));
    let noun = rng.pick(&pools.nouns);
    match (adjective, noun) {
        (Some(adjective), Some(noun)) => format!("{adjective} {noun}"),
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (None, None) => "Card".to_string(),
    }
}
