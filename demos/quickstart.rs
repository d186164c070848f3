use std::sync::Arc;

use huddle_gateway::api::EventsApi;
use huddle_gateway::token::{SessionTokenStore, TokenData};
use huddle_gateway::{Config, Gateway};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().try_init();

    // Load configuration from a JSON file placed next to the binary
    let cfg = Config::from_file("config.json")?;
    let access = std::env::var("HUDDLE_ACCESS_TOKEN")?;
    let refresh = std::env::var("HUDDLE_REFRESH_TOKEN").ok();

    let store = Arc::new(SessionTokenStore::new(
        &cfg,
        Some(TokenData::new(access, refresh)),
    )?);
    let gateway = Gateway::builder(cfg).token_store(store).build()?;

    for event in EventsApi::new(gateway.clone()).list().await? {
        println!("{} {}", event.id, event.title);
    }
    for entry in gateway.ledger().snapshot() {
        println!("{} {} {:?}", entry.method, entry.url, entry.status);
    }
    Ok(())
}
