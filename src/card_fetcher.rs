use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::DraftConfig;
use crate::error::LookupError;
use crate::models::card_info::CardInfo;
use crate::opt::{log_if, DbgFlg};

/// Source of card metadata, looked up by exact card name.
#[async_trait]
pub trait CardInfoProvider: Send + Sync {
    async fn fetch_card(&self, name: &str) -> Result<CardInfo, LookupError>;
}

/// Looks cards up through the Scryfall `cards/named` endpoint, spacing calls
/// at least `min_interval` apart.
pub struct ScryfallFetcher {
    client: Client,
    base_url: String,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl ScryfallFetcher {
    pub fn new(config: &DraftConfig) -> Self {
        ScryfallFetcher {
            client: Client::builder()
                .timeout(config.lookup_timeout)
                .user_agent(concat!("winston-draft/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.scryfall_url.clone(),
            min_interval: config.lookup_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Waits until the next call is allowed, then books the slot.
    async fn throttle(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

#[async_trait]
impl CardInfoProvider for ScryfallFetcher {
    async fn fetch_card(&self, name: &str) -> Result<CardInfo, LookupError> {
        self.throttle().await;

        log_if(&format!("Call to scryfall for card: {}", name), DbgFlg::Fetch);
        let url = format!("{}/cards/named", self.base_url);
        let body: Value = self
            .client
            .get(&url)
            .query(&[("exact", name), ("format", "json")])
            .send()
            .await?
            .json()
            .await?;

        parse_card_response(name, body)
    }
}

/// Scryfall answers misses with a JSON body whose `object` is `"error"`.
pub fn parse_card_response(name: &str, body: Value) -> Result<CardInfo, LookupError> {
    if body.get("object").and_then(Value::as_str) != Some("card") {
        return Err(LookupError::NotFound(name.to_string()));
    }

    Ok(serde_json::from_value(body)?)
}
