pub mod deck;
pub mod engine;
pub mod pile_set;

pub use deck::Deck;
pub use engine::{DraftState, DraftStatus, PassOutcome, TakeOutcome};
pub use pile_set::{PileId, PileSet};
