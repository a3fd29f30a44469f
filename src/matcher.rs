//! Matching typed text against the entities currently in view.

use std::time::Instant;

use crate::entity::WordEntity;

/// Re-evaluates the highlighted prefix of every in-view entity without
/// removing anything.
pub fn refresh_highlights(entities: &mut [WordEntity], typed: &str, now: Instant) {
    for entity in entities.iter_mut().filter(|e| e.in_view(now)) {
        entity.match_typed(typed, false, now);
    }
}

/// Tries an exact match against the in-view entities in level order and
/// stops at the first success. Returns the index of the matched entity.
pub fn commit(entities: &mut [WordEntity], typed: &str, now: Instant) -> Option<usize> {
    entities
        .iter_mut()
        .enumerate()
        .filter(|(_, e)| e.in_view(now))
        .find_map(|(index, e)| e.match_typed(typed, true, now).then_some(index))
}

/// Words the player could still type: live words on screen plus those not
/// admitted yet.
pub fn remaining_words(entities: &[WordEntity], now: Instant) -> usize {
    entities
        .iter()
        .filter(|e| (e.in_view(now) && e.has_word()) || !e.is_used(now))
        .count()
}

/// The "last word" rule: enter commits only when exactly one word is left.
pub fn is_last_word(entities: &[WordEntity], now: Instant) -> bool {
    remaining_words(entities, now) == 1
}
