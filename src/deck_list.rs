use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DraftError;

lazy_static! {
    static ref QUANTITY_LINE: Regex = Regex::new(r"^(\d+)(?:\s+(.*))?$").unwrap();
}

/// One line of a card list: a card name and how many copies of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub quantity: u32,
    pub name: String,
}

impl DeckEntry {
    pub fn new(quantity: u32, name: &str) -> Self {
        DeckEntry {
            quantity,
            name: name.to_string(),
        }
    }
}

impl Display for DeckEntry {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.name)
    }
}

/// Parses a card list. Each line is either `<name>` or `<n> <name>`; the
/// first blank line ends the list.
pub fn parse(text: &str) -> Result<Vec<DeckEntry>, DraftError> {
    parse_lines(text.lines())
}

pub fn parse_lines<I, S>(lines: I) -> Result<Vec<DeckEntry>, DraftError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries = Vec::new();

    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref().trim();
        if line.is_empty() {
            break;
        }

        entries.push(parse_line(idx + 1, line)?);
    }

    Ok(entries)
}

fn parse_line(line_number: usize, line: &str) -> Result<DeckEntry, DraftError> {
    let Some(caps) = QUANTITY_LINE.captures(line) else {
        return Ok(DeckEntry::new(1, line));
    };

    let quantity = caps[1]
        .parse::<u32>()
        .map_err(|err| DraftError::invalid_input(line_number, format!("bad quantity: {}", err)))?;
    if quantity == 0 {
        return Err(DraftError::invalid_input(line_number, "quantity must be positive"));
    }

    let name = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    if name.is_empty() {
        return Err(DraftError::invalid_input(
            line_number,
            format!("missing card name after quantity {}", quantity),
        ));
    }

    Ok(DeckEntry::new(quantity, name))
}

/// Number of cards the entries describe once quantities are counted.
pub fn card_count(entries: &[DeckEntry]) -> usize {
    entries.iter().map(|entry| entry.quantity as usize).sum()
}

/// Counts copies of each name, in order of first appearance.
pub fn tally<S: AsRef<str>>(cards: &[S]) -> Vec<DeckEntry> {
    let counts = cards.iter().map(|card| card.as_ref()).counts();

    cards
        .iter()
        .map(|card| card.as_ref())
        .unique()
        .map(|name| DeckEntry::new(counts[name] as u32, name))
        .collect()
}

pub fn format_entries(entries: &[DeckEntry]) -> String {
    entries.iter().map(|entry| entry.to_string()).join("\n")
}

/// Writes a pasted card list to `path` once it is known to parse.
pub fn save_custom_list(path: impl AsRef<Path>, text: &str) -> Result<Vec<DeckEntry>, DraftError> {
    let entries = parse(text)?;
    if entries.is_empty() {
        return Err(DraftError::invalid_input(1, "card list is empty"));
    }

    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format_entries(&entries))?;

    Ok(entries)
}
