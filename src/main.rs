use std::sync::Arc;

use dotenv::dotenv;

mod card_cache;
mod card_fetcher;
mod cli;
mod config;
mod context;
mod deck_list;
mod display;
mod draft;
mod error;
mod models;
mod opt;
mod quotes;

use crate::card_fetcher::ScryfallFetcher;
use crate::cli::Session;
use crate::config::DraftConfig;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let config = match DraftConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    let runtime_data = match context::create_runtime_data() {
        Ok(data) => Some(data),
        Err(err) => {
            log::warn!("Runtime data unavailable, custom lists will not persist: {}", err);
            None
        }
    };

    let provider = Arc::new(ScryfallFetcher::new(&config));
    let mut session = Session::new(config, provider, runtime_data);

    if let Err(err) = cli::main(&mut session).await {
        log::error!("{}", err);
    }
}
