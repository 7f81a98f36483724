use std::collections::HashMap;

use lazy_static::lazy_static;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Start,
    CardListLoaded,
    CardListInvalid,
    NonParticipantAction,
    PlayerPullsFile,
    TakePile,
    PassPile,
    DraftComplete,
}

lazy_static! {
    static ref GAME_QUOTES: HashMap<Quote, Vec<&'static str>> = HashMap::from([
        (
            Quote::Start,
            vec!["The clash of minds begins! May the most brilliant strategist prevail!"],
        ),
        (
            Quote::CardListLoaded,
            vec!["Splendid! Our unconventional weaponry is in place. Let us surprise the enemy!"],
        ),
        (
            Quote::CardListInvalid,
            vec!["A perplexing mystery! These cards have vanished like troops in the desert."],
        ),
        (
            Quote::NonParticipantAction,
            vec!["Ah, a curious observer! But even a wartime leader must respect the secrets of his opponents."],
        ),
        (
            Quote::PlayerPullsFile,
            vec!["A survey of your forces - may they serve you well!"],
        ),
        (
            Quote::TakePile,
            vec![
                "The spoils of strategy are claimed!",
                "A bold move! Let us see what fortune it brings.",
                "A decisive hand plucks its reward!",
            ],
        ),
        (
            Quote::PassPile,
            vec!["A shrewd assessment. Perhaps a greater prize lies ahead."],
        ),
        (
            Quote::DraftComplete,
            vec!["The campaign is concluded. Count your spoils!"],
        ),
    ]);
}

pub fn get_quote(quote: Quote) -> &'static str {
    GAME_QUOTES
        .get(&quote)
        .and_then(|quotes| quotes.choose(&mut rand::thread_rng()))
        .copied()
        .unwrap_or_default()
}
