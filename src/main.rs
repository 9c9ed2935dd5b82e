use paydesk::PaydeskError;
use paydesk::config::fetch_config;
use paydesk::credentials::populate_env_from_keychain;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), PaydeskError> {
    // Load .env first so RUST_LOG from it applies.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Secrets must be in the environment before any runtime thread exists.
    let from_keychain = populate_env_from_keychain();
    if !from_keychain.is_empty() {
        info!(count = from_keychain.len(), "using credentials from keychain");
    }

    let app_config = fetch_config()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(paydesk::server::serve(app_config))
}
