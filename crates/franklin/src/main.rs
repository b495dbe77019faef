use std::sync::Arc;

use franklin_archive::ArchiveTodayClient;
use franklin_core::{
    config::Config,
    ports::{ArchiveLookup, DomainStore},
    store::JsonFileDomainStore,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), franklin_core::Error> {
    franklin_core::logging::init("franklin")?;

    let cfg = Arc::new(Config::load()?);

    let store = JsonFileDomainStore::from_config(&cfg);
    info!(path = %store.path().display(), "Using paywall domain list");
    let store: Arc<dyn DomainStore> = Arc::new(store);
    let lookup: Arc<dyn ArchiveLookup> = Arc::new(ArchiveTodayClient::from_config(&cfg)?);

    franklin_discord::router::run_gateway(cfg, store, lookup)
        .await
        .map_err(|e| franklin_core::Error::External(format!("discord bot failed: {e}")))?;

    Ok(())
}
