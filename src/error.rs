use thiserror::Error;

/// Failures of the draft engine and the deck-list source.
#[derive(Debug, Error)]
pub enum DraftError {
    /// A deck-list line that cannot be read as `<name>` or `<n> <name>`.
    #[error("Invalid card list line {line}: {reason}")]
    InvalidInput { line: usize, reason: String },

    /// An action that the draft cannot accept in its current state.
    #[error("Invalid draft state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DraftError {
    pub fn invalid_input(line: usize, reason: impl Into<String>) -> Self {
        DraftError::InvalidInput {
            line,
            reason: reason.into(),
        }
    }
}

/// Failures of a card-metadata lookup. The cache records any of these as a
/// permanent miss for the card.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Card not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unable to decode card data: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}
