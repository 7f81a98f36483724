//! Text renderings of draft state for the front end.

use itertools::Itertools;

use crate::deck_list;
use crate::draft::{DraftState, PileId};
use crate::models::player::Player;

/// Upper bound on a single message, matching the chat platform's limit.
pub const MESSAGE_LIMIT: usize = 2000;

async fn card_line(draft: &DraftState, name: &str) -> String {
    match draft.card_cache() {
        Some(cache) => cache.display(name).await,
        None => format!("[{}]", name),
    }
}

pub async fn pile_info(draft: &DraftState, cards: &[String]) -> String {
    let mut results = String::new();
    for card in cards {
        results.push_str("\n- ");
        results.push_str(&card_line(draft, card).await);
    }
    results
}

/// The current pile, or all three piles, with each card rendered.
pub async fn pick_piles(draft: &DraftState, incl_all_piles: bool) -> String {
    let mut results = String::from("\n");
    for (id, cards) in draft.piles().piles() {
        if incl_all_piles || id == draft.current_pile_id() {
            results.push_str(&format!("\n# {}: {}", id, pile_info(draft, cards).await));
        }
    }
    results
}

pub async fn player_pulls(draft: &DraftState, player: Player) -> String {
    format!(
        "\n# Current Pulls ({}):{}",
        player,
        pile_info(draft, draft.pulls(player)).await
    )
}

/// Both players' pulls as plain name lists.
pub fn both_pulls(draft: &DraftState) -> String {
    let mut results = String::from("\n# Current Pulls:");
    for player in Player::ALL {
        let pulls = draft.pulls(player);
        results.push_str(&format!(
            "\n## {} (x{}): \n\t{}\n",
            player,
            pulls.len(),
            pulls.iter().join(", ")
        ));
    }
    results
}

/// A player's pulls as `<count> <name>` lines, readable as a card list.
pub fn pulls_list(draft: &DraftState, player: Player) -> String {
    deck_list::format_entries(&deck_list::tally(draft.pulls(player)))
}

pub fn draft_pile(draft: &DraftState, sample_size: usize) -> String {
    let deck = draft.deck();
    let mut results = format!("Cube size: {}\n", deck.remaining());

    if sample_size > 0 {
        results.push_str(&format!(
            "Top {} cards of draft pile: \n\t{}\n",
            sample_size,
            deck.peek(sample_size).iter().join(", ")
        ));
    } else {
        results.push_str(&format!("\t{}\n", deck.peek(deck.remaining()).iter().join(", ")));
    }

    results
}

pub fn status(draft: &DraftState, last_action: &str) -> String {
    let elapsed = chrono::Utc::now() - draft.started_at();
    let pile_field = |id: PileId| {
        let marker = if id == draft.current_pile_id() { ">" } else { " " };
        format!("{}{}: {}", marker, id, draft.piles().pile(id).len())
    };

    let mut lines = vec![
        format!("{:-^50}", " Winston Draft "),
        last_action.to_string(),
        format!("Draft: {} ({})", draft.id(), draft.status()),
        format!(
            "Current player: {} (started: {})",
            draft.current_player(),
            draft.starting_player()
        ),
        format!("Draft pile: {}", draft.deck().remaining()),
        format!(
            "{}   ({} cards in piles)",
            PileId::ALL.iter().map(|id| pile_field(*id)).join("   "),
            draft.piles().total_cards()
        ),
    ];
    for player in Player::ALL {
        lines.push(format!("{} pulls: {}", player, draft.pulls(player).len()));
    }
    lines.push(format!(
        "Elapsed: {}m {:02}s",
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60
    ));

    lines.join("\n")
}

/// Splits `message` on line boundaries into chunks of at most `limit` bytes.
/// Every line keeps its trailing newline. A line that does not fit in one
/// chunk is cut at character boundaries.
pub fn split_message(message: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in message.lines() {
        let line_len = line.len() + 1;
        if !current.is_empty() && current.len() + line_len > limit {
            chunks.push(std::mem::take(&mut current));
        }

        if line_len > limit {
            for ch in line.chars().chain(std::iter::once('\n')) {
                if !current.is_empty() && current.len() + ch.len_utf8() > limit {
                    chunks.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }
            continue;
        }

        current.push_str(line);
        current.push('\n');
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
