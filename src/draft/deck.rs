use rand::seq::{index, SliceRandom};
use rand::Rng;

use crate::deck_list::{self, DeckEntry};
use crate::error::DraftError;

/// The shuffled draw pile. Cards are drawn from the end of the vector.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<String>,
}

impl Deck {
    /// Parses a card list, shuffles it once and keeps at most `card_limit`
    /// cards.
    pub fn load<I, S, R>(lines: I, card_limit: usize, rng: &mut R) -> Result<Self, DraftError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let entries = deck_list::parse_lines(lines)?;
        Ok(Self::from_entries(&entries, card_limit, rng))
    }

    /// Draws a uniform random selection of at most `card_limit` copies
    /// without writing every quantity out, then shuffles it.
    pub fn from_entries<R: Rng + ?Sized>(
        entries: &[DeckEntry],
        card_limit: usize,
        rng: &mut R,
    ) -> Self {
        let total = deck_list::card_count(entries);
        let amount = total.min(card_limit);

        // Positions into the list as if every quantity were written out.
        let ends = entries
            .iter()
            .scan(0usize, |end, entry| {
                *end += entry.quantity as usize;
                Some(*end)
            })
            .collect::<Vec<_>>();

        let mut cards = index::sample(rng, total, amount)
            .into_iter()
            .map(|pos| entries[ends.partition_point(|&end| end <= pos)].name.clone())
            .collect::<Vec<_>>();
        cards.shuffle(rng);

        Deck { cards }
    }

    /// A deck in exactly the given order; the last card is drawn first.
    #[cfg(test)]
    pub fn from_ordered(cards: Vec<String>) -> Self {
        Deck { cards }
    }

    pub fn draw(&mut self) -> Option<String> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The next `n` cards in the order they will be drawn.
    pub fn peek(&self, n: usize) -> Vec<&str> {
        self.cards.iter().rev().take(n).map(|s| s.as_str()).collect()
    }

    #[cfg(test)]
    pub fn cards(&self) -> &[String] {
        &self.cards
    }
}
