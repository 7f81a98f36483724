use crate::draft::deck::Deck;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum PileId {
    #[strum(serialize = "Pile 1")]
    One,
    #[strum(serialize = "Pile 2")]
    Two,
    #[strum(serialize = "Pile 3")]
    Three,
}

impl PileId {
    pub const ALL: [PileId; 3] = [PileId::One, PileId::Two, PileId::Three];

    pub fn index(self) -> usize {
        match self {
            PileId::One => 0,
            PileId::Two => 1,
            PileId::Three => 2,
        }
    }

    /// The following pile, wrapping from the third back to the first.
    pub fn next(self) -> PileId {
        match self {
            PileId::One => PileId::Two,
            PileId::Two => PileId::Three,
            PileId::Three => PileId::One,
        }
    }
}

/// The three offer piles and the cursor naming the one on offer.
#[derive(Debug, Clone)]
pub struct PileSet {
    piles: [Vec<String>; 3],
    current: PileId,
}

impl PileSet {
    /// Seeds each pile with one card from the deck, in pile order. A deck
    /// with fewer than three cards leaves the remaining piles empty.
    /// `on_draw` sees every card taken from the deck.
    pub fn deal<F>(deck: &mut Deck, mut on_draw: F) -> Self
    where
        F: FnMut(&str),
    {
        let mut piles: [Vec<String>; 3] = Default::default();
        for pile in piles.iter_mut() {
            if let Some(card) = deck.draw() {
                on_draw(&card);
                pile.push(card);
            }
        }

        PileSet {
            piles,
            current: PileId::One,
        }
    }

    pub fn current_id(&self) -> PileId {
        self.current
    }

    pub fn current(&self) -> &[String] {
        &self.piles[self.current.index()]
    }

    pub fn pile(&self, id: PileId) -> &[String] {
        &self.piles[id.index()]
    }

    pub fn piles(&self) -> impl Iterator<Item = (PileId, &[String])> + '_ {
        PileId::ALL.into_iter().map(move |id| (id, self.pile(id)))
    }

    pub fn advance(&mut self) {
        self.current = self.current.next();
    }

    pub fn reset_to_first(&mut self) {
        self.current = PileId::One;
    }

    pub fn append_to_current(&mut self, card: Option<String>) {
        if let Some(card) = card {
            self.piles[self.current.index()].push(card);
        }
    }

    /// Empties the current pile and hands back what it held.
    pub fn clear_current(&mut self) -> Vec<String> {
        std::mem::take(&mut self.piles[self.current.index()])
    }

    pub fn is_last_pile(&self) -> bool {
        self.current == PileId::Three
    }

    pub fn all_empty(&self) -> bool {
        self.piles.iter().all(|pile| pile.is_empty())
    }

    pub fn total_cards(&self) -> usize {
        self.piles.iter().map(|pile| pile.len()).sum()
    }
}
