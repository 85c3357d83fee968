//! Access cards and the per-device card store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uhppote_core::{Date, constants::DOOR_COUNT};

const DOORS: usize = DOOR_COUNT as usize;

/// One access card.
///
/// `doors` maps door number (1-based) to permission. Doors missing from the
/// map are not permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub number: u32,
    pub from: Date,
    pub to: Date,
    pub doors: BTreeMap<u8, bool>,
}

impl Card {
    pub fn new(number: u32, from: Date, to: Date, doors: [bool; DOORS]) -> Self {
        Card {
            number,
            from,
            to,
            doors: (1u8..).zip(doors).collect(),
        }
    }

    /// Whether the card opens `door`.
    pub fn permits(&self, door: u8) -> bool {
        self.doors.get(&door).copied().unwrap_or(false)
    }

    /// Permissions for doors 1 to 4, in order.
    pub fn door_flags(&self) -> [bool; DOORS] {
        let mut flags = [false; DOORS];
        for (door, flag) in (1u8..).zip(flags.iter_mut()) {
            *flag = self.permits(door);
        }
        flags
    }

    /// Whether `today` falls inside the validity window, both ends inclusive.
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        self.from.inner() <= today && today <= self.to.inner()
    }
}

/// Ordered card list keyed by card number.
///
/// Enumeration order is insertion order; replacing a card keeps its
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardStore {
    cards: Vec<Card>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a card, replacing any card with the same number in place.
    pub fn put(&mut self, card: Card) {
        match self.cards.iter_mut().find(|c| c.number == card.number) {
            Some(existing) => *existing = card,
            None => self.cards.push(card),
        }
    }

    /// Remove a card. Returns `false` if it was not stored.
    pub fn delete(&mut self, number: u32) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.number != number);
        self.cards.len() != before
    }

    /// Remove every card. Always succeeds.
    pub fn delete_all(&mut self) -> bool {
        self.cards.clear();
        true
    }

    pub fn count(&self) -> usize {
        self.cards.len()
    }

    pub fn get(&self, number: u32) -> Option<&Card> {
        self.cards.iter().find(|c| c.number == number)
    }

    /// Card at a 1-based position. Index 0 is never a card.
    pub fn get_by_index(&self, index: u32) -> Option<&Card> {
        let position = usize::try_from(index).ok()?.checked_sub(1)?;
        self.cards.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}
