use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::card_cache::CardCache;
use crate::draft::deck::Deck;
use crate::draft::pile_set::{PileId, PileSet};
use crate::error::DraftError;
use crate::models::player::Player;
use crate::opt::{log_if, DbgFlg};

const DRAFT_ID_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum DraftStatus {
    #[strum(serialize = "awaiting action")]
    AwaitingAction,
    #[strum(serialize = "draft complete")]
    DraftComplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeOutcome {
    pub player: Player,
    /// The pile taken, or `None` when every pile from the cursor onward was
    /// empty and the turn passed without a take.
    pub pile: Option<PileId>,
    pub cards: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    pub player: Player,
    pub pile: PileId,
    /// Whether a card from the deck was added to the passed pile.
    pub grew: bool,
    /// Card drawn straight into the player's pulls after passing the last pile.
    pub forced_card: Option<String>,
    pub turn_ended: bool,
}

/// One Winston draft between two players.
///
/// Every card leaving the deck is handed to the card cache (when one is
/// attached) so its metadata is fetched before anyone asks to see it.
pub struct DraftState {
    id: String,
    deck: Deck,
    piles: PileSet,
    starting_player: Player,
    current_player: Player,
    pulls: [Vec<String>; 2],
    card_cache: Option<Arc<CardCache>>,
    started_at: DateTime<Utc>,
}

impl DraftState {
    /// Shuffles the card list into a capped deck, deals the piles and picks
    /// the starting player at random.
    pub fn new_game<I, S, R>(
        lines: I,
        card_limit: usize,
        rng: &mut R,
        card_cache: Option<Arc<CardCache>>,
    ) -> Result<Self, DraftError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let deck = Deck::load(lines, card_limit, rng)?;
        let starting_player = Player::random(rng);
        Ok(Self::new(deck, starting_player, card_cache))
    }

    pub fn new(mut deck: Deck, starting_player: Player, card_cache: Option<Arc<CardCache>>) -> Self {
        let piles = PileSet::deal(&mut deck, |card| {
            if let Some(cache) = &card_cache {
                cache.prefetch(card);
            }
        });

        let id = nanoid::nanoid!(DRAFT_ID_LENGTH);
        log_if(
            &format!(
                "[{}] New draft: {} cards in deck, {} starts",
                id,
                deck.remaining(),
                starting_player
            ),
            DbgFlg::Draft,
        );

        DraftState {
            id,
            deck,
            piles,
            starting_player,
            current_player: starting_player,
            pulls: [Vec::new(), Vec::new()],
            card_cache,
            started_at: Utc::now(),
        }
    }

    pub fn status(&self) -> DraftStatus {
        if self.deck.is_empty() && self.piles.all_empty() {
            DraftStatus::DraftComplete
        } else {
            DraftStatus::AwaitingAction
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status() == DraftStatus::AwaitingAction
    }

    /// The current player accepts the current pile. Empty piles are skipped;
    /// if the cursor runs off the last pile without finding cards, the turn
    /// passes with nothing taken.
    pub fn take(&mut self) -> Result<TakeOutcome, DraftError> {
        self.ensure_in_progress("take")?;

        let player = self.current_player;
        while self.piles.current().is_empty() {
            if self.piles.is_last_pile() {
                self.log(&format!("{} finds no pile left to take", player));
                self.switch_player();
                return Ok(TakeOutcome {
                    player,
                    pile: None,
                    cards: Vec::new(),
                });
            }
            self.piles.advance();
        }

        let pile = self.piles.current_id();
        let cards = self.piles.clear_current();
        let replacement = self.draw();
        self.piles.append_to_current(replacement);

        self.pulls[player.index()].extend(cards.iter().cloned());
        self.log(&format!("{} takes {} ({} cards)", player, pile, cards.len()));
        self.switch_player();

        Ok(TakeOutcome {
            player,
            pile: Some(pile),
            cards,
        })
    }

    /// The current player declines the current pile, which grows by one card.
    /// Declining the last pile ends the turn and, while the deck lasts, puts
    /// the deck's top card straight into the player's pulls.
    pub fn pass(&mut self) -> Result<PassOutcome, DraftError> {
        self.ensure_in_progress("pass")?;

        let player = self.current_player;
        let pile = self.piles.current_id();
        let card = self.draw();
        let grew = card.is_some();
        self.piles.append_to_current(card);

        if !self.piles.is_last_pile() {
            self.piles.advance();
            self.log(&format!("{} passes {}", player, pile));
            return Ok(PassOutcome {
                player,
                pile,
                grew,
                forced_card: None,
                turn_ended: false,
            });
        }

        let forced_card = self.draw();
        if let Some(card) = &forced_card {
            self.pulls[player.index()].push(card.clone());
        }
        self.log(&format!(
            "{} passes {} and draws {}",
            player,
            pile,
            if forced_card.is_some() { "from the deck" } else { "nothing" }
        ));
        self.switch_player();

        Ok(PassOutcome {
            player,
            pile,
            grew,
            forced_card,
            turn_ended: true,
        })
    }

    fn ensure_in_progress(&self, action: &str) -> Result<(), DraftError> {
        match self.status() {
            DraftStatus::AwaitingAction => Ok(()),
            DraftStatus::DraftComplete => Err(DraftError::InvalidState(format!(
                "cannot {} a pile, the draft is complete",
                action
            ))),
        }
    }

    fn switch_player(&mut self) {
        self.current_player = self.current_player.other();
        self.piles.reset_to_first();
    }

    fn draw(&mut self) -> Option<String> {
        let card = self.deck.draw()?;
        if let Some(cache) = &self.card_cache {
            cache.prefetch(&card);
        }
        Some(card)
    }

    fn log(&self, s: &str) {
        log_if(&format!("[{}] {}", self.id, s), DbgFlg::Draft);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn starting_player(&self) -> Player {
        self.starting_player
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn current_pile_id(&self) -> PileId {
        self.piles.current_id()
    }

    pub fn piles(&self) -> &PileSet {
        &self.piles
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn pulls(&self, player: Player) -> &[String] {
        &self.pulls[player.index()]
    }

    pub fn card_cache(&self) -> Option<&Arc<CardCache>> {
        self.card_cache.as_ref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card_cache::test_support::MockProvider;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Deck whose draw order is the order given.
    fn deck_in_draw_order(cards: &[&str]) -> Deck {
        Deck::from_ordered(cards.iter().rev().map(|s| s.to_string()).collect())
    }

    fn draft(cards: &[&str]) -> DraftState {
        DraftState::new(deck_in_draw_order(cards), Player::One, None)
    }

    fn total_cards(draft: &DraftState) -> usize {
        draft.deck().remaining()
            + draft.piles().total_cards()
            + draft.pulls(Player::One).len()
            + draft.pulls(Player::Two).len()
    }

    #[test]
    fn test_new_deals_piles() {
        let draft = draft(&["A", "B", "C", "D", "E"]);

        assert_eq!(draft.piles().pile(PileId::One), ["A"]);
        assert_eq!(draft.piles().pile(PileId::Two), ["B"]);
        assert_eq!(draft.piles().pile(PileId::Three), ["C"]);
        assert_eq!(draft.deck().remaining(), 2);
        assert_eq!(draft.current_pile_id(), PileId::One);
        assert_eq!(draft.current_player(), Player::One);
        assert_eq!(draft.status(), DraftStatus::AwaitingAction);
    }

    #[test]
    fn test_new_game_is_capped_and_seeded() {
        let mut rng = StdRng::seed_from_u64(3);
        let draft = DraftState::new_game(["50 Island", "50 Forest"], 60, &mut rng, None).unwrap();

        assert_eq!(draft.deck().remaining() + draft.piles().total_cards(), 60);
        assert_eq!(draft.current_player(), draft.starting_player());
        assert_eq!(draft.id().len(), DRAFT_ID_LENGTH);

        assert!(matches!(
            DraftState::new_game(["Forest", "0 Island"], 60, &mut rng, None),
            Err(DraftError::InvalidInput { line: 2, .. })
        ));
    }

    #[test]
    fn test_take_moves_pile_and_switches() {
        let mut draft = draft(&["A", "B", "C", "D", "E"]);

        let outcome = draft.take().unwrap();
        assert_eq!(outcome.player, Player::One);
        assert_eq!(outcome.pile, Some(PileId::One));
        assert_eq!(outcome.cards, vec!["A"]);

        assert_eq!(draft.pulls(Player::One), ["A"]);
        assert_eq!(draft.piles().pile(PileId::One), ["D"]);
        assert_eq!(draft.current_player(), Player::Two);
        assert_eq!(draft.current_pile_id(), PileId::One);
    }

    #[test]
    fn test_take_after_passes_restarts_at_first_pile() {
        let mut draft = draft(&["A", "B", "C", "D", "E", "F"]);

        draft.pass().unwrap();
        let outcome = draft.take().unwrap();
        assert_eq!(outcome.pile, Some(PileId::Two));
        assert_eq!(outcome.cards, vec!["B"]);
        assert_eq!(draft.piles().pile(PileId::One), ["A", "D"]);
        assert_eq!(draft.piles().pile(PileId::Two), ["E"]);
        assert_eq!(draft.pulls(Player::One), ["B"]);
        assert_eq!(draft.current_player(), Player::Two);
        assert_eq!(draft.current_pile_id(), PileId::One);
    }

    #[test]
    fn test_pass_on_first_piles_advances() {
        let mut draft = draft(&["A", "B", "C", "D", "E"]);

        let outcome = draft.pass().unwrap();
        assert!(outcome.grew);
        assert!(!outcome.turn_ended);
        assert_eq!(draft.piles().pile(PileId::One), ["A", "D"]);
        assert_eq!(draft.current_pile_id(), PileId::Two);
        assert_eq!(draft.current_player(), Player::One);

        draft.pass().unwrap();
        assert_eq!(draft.piles().pile(PileId::Two), ["B", "E"]);
        assert_eq!(draft.current_pile_id(), PileId::Three);
        assert_eq!(draft.current_player(), Player::One);
        assert!(draft.pulls(Player::One).is_empty());
    }

    #[test]
    fn test_pass_last_pile_forces_draw() {
        let mut draft = draft(&["A", "B", "C", "D", "E", "F", "G"]);

        draft.pass().unwrap();
        draft.pass().unwrap();
        let outcome = draft.pass().unwrap();

        assert_eq!(outcome.pile, PileId::Three);
        assert_eq!(outcome.forced_card.as_deref(), Some("G"));
        assert!(outcome.turn_ended);
        assert_eq!(draft.piles().pile(PileId::Three), ["C", "F"]);
        assert_eq!(draft.pulls(Player::One), ["G"]);
        assert_eq!(draft.current_player(), Player::Two);
        assert_eq!(draft.current_pile_id(), PileId::One);
        assert!(draft.deck().is_empty());
    }

    #[test]
    fn test_pass_last_pile_with_empty_deck() {
        let mut draft = draft(&["A", "B", "C", "D", "E"]);

        draft.pass().unwrap();
        draft.pass().unwrap();
        let outcome = draft.pass().unwrap();

        assert!(!outcome.grew);
        assert_eq!(outcome.forced_card, None);
        assert!(outcome.turn_ended);
        assert_eq!(draft.piles().pile(PileId::Three), ["C"]);
        assert!(draft.pulls(Player::One).is_empty());
        assert_eq!(draft.current_player(), Player::Two);
        assert_eq!(draft.current_pile_id(), PileId::One);
    }

    #[test]
    fn test_take_skips_empty_piles() {
        let mut draft = draft(&["A", "B", "C"]);

        draft.take().unwrap();
        assert!(draft.piles().pile(PileId::One).is_empty());

        let outcome = draft.take().unwrap();
        assert_eq!(outcome.player, Player::Two);
        assert_eq!(outcome.pile, Some(PileId::Two));
        assert_eq!(outcome.cards, vec!["B"]);
        assert_eq!(draft.current_player(), Player::One);
    }

    #[test]
    fn test_take_with_nothing_left_from_cursor() {
        let mut draft = draft(&["A", "B", "C"]);

        // Player One takes pile 2, leaving the cursor to walk past it later.
        draft.pass().unwrap();
        draft.take().unwrap();
        // Player Two takes pile 3 after passing piles 1 and 2.
        draft.pass().unwrap();
        draft.pass().unwrap();
        assert_eq!(draft.current_player(), Player::Two);
        draft.take().unwrap();
        assert_eq!(draft.pulls(Player::Two), ["C"]);

        // Only pile 1 is left; from pile 2 onward nothing can be taken.
        draft.pass().unwrap();
        assert_eq!(draft.current_pile_id(), PileId::Two);
        let outcome = draft.take().unwrap();
        assert_eq!(outcome.pile, None);
        assert!(outcome.cards.is_empty());
        assert_eq!(draft.current_player(), Player::Two);
        assert_eq!(draft.piles().pile(PileId::One), ["A"]);
        assert!(draft.is_in_progress());
    }

    #[test]
    fn test_three_card_draft_completes() {
        let mut draft = draft(&["Forest", "Forest", "Island"]);
        assert!(draft.deck().is_empty());
        assert!(!draft.piles().all_empty());

        let outcome = draft.take().unwrap();
        assert_eq!(outcome.cards, vec!["Forest"]);
        assert!(draft.piles().pile(PileId::One).is_empty());

        draft.take().unwrap();
        draft.take().unwrap();
        assert_eq!(draft.status(), DraftStatus::DraftComplete);
        assert_eq!(draft.pulls(Player::One), ["Forest", "Island"]);
        assert_eq!(draft.pulls(Player::Two), ["Forest"]);
    }

    #[test]
    fn test_actions_rejected_after_completion() {
        let mut draft = draft(&["A"]);
        draft.take().unwrap();
        assert_eq!(draft.status(), DraftStatus::DraftComplete);

        let player = draft.current_player();
        assert!(matches!(draft.take(), Err(DraftError::InvalidState(_))));
        assert!(matches!(draft.pass(), Err(DraftError::InvalidState(_))));
        assert_eq!(draft.current_player(), player);
        assert_eq!(draft.pulls(Player::One), ["A"]);
    }

    #[test]
    fn test_empty_deck_is_complete_from_start() {
        let mut draft = draft(&[]);
        assert_eq!(draft.status(), DraftStatus::DraftComplete);
        assert!(draft.take().is_err());
    }

    #[test]
    fn test_random_play_conserves_cards() {
        let mut rng = StdRng::seed_from_u64(2024);
        let lines = ["20 Island", "20 Swamp", "5 Black Lotus"];
        let mut draft = DraftState::new_game(lines, 40, &mut rng, None).unwrap();
        assert_eq!(total_cards(&draft), 40);

        let mut steps = 0;
        while draft.is_in_progress() {
            let before_player = draft.current_player();
            let before_pile = draft.piles().current().len();
            let before_pulls = draft.pulls(before_player).len();

            if rng.gen_bool(0.5) {
                let outcome = draft.take().unwrap();
                assert_eq!(draft.current_player(), before_player.other());
                assert_eq!(
                    draft.pulls(before_player).len(),
                    before_pulls + outcome.cards.len()
                );
                if let Some(pile) = outcome.pile {
                    assert!(draft.piles().pile(pile).len() <= 1);
                }
            } else {
                let pile = draft.current_pile_id();
                let outcome = draft.pass().unwrap();
                let grown = draft.piles().pile(pile).len();
                assert_eq!(grown, before_pile + outcome.grew as usize);
                if pile != PileId::Three {
                    assert_eq!(draft.current_player(), before_player);
                    assert_eq!(draft.current_pile_id(), pile.next());
                } else {
                    assert_eq!(draft.current_player(), before_player.other());
                }
            }

            assert_eq!(total_cards(&draft), 40);
            steps += 1;
            assert!(steps < 10_000, "draft did not finish");
        }

        assert!(draft.deck().is_empty());
        assert!(draft.piles().all_empty());
        assert_eq!(
            draft.pulls(Player::One).len() + draft.pulls(Player::Two).len(),
            40
        );
    }

    #[tokio::test]
    async fn test_draws_prefetch_card_info() {
        let provider = Arc::new(MockProvider::new(&["A", "B", "C", "D"]));
        let cache = Arc::new(CardCache::new(provider.clone(), 2).unwrap());
        let mut draft = DraftState::new(
            deck_in_draw_order(&["A", "B", "C", "D", "E"]),
            Player::One,
            Some(cache.clone()),
        );

        assert!(cache.contains("A") && cache.contains("B") && cache.contains("C"));
        assert!(!cache.contains("D"));

        draft.take().unwrap();
        assert!(cache.contains("D"));
        draft.pass().unwrap();
        assert!(cache.contains("E"));

        for name in ["A", "B", "C", "D"] {
            assert!(cache.get(name).await.is_some());
        }
        assert!(cache.get("E").await.is_none());
        assert_eq!(provider.calls(), 5);
    }
}
