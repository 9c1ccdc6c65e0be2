//! Articles demo service.
//!
//! ```bash
//! SWITCHYARD__SERVER__HTTP_ADDR=127.0.0.1:3333 cargo run -p switchyard-articles
//! ```
//!
//! Configuration is read from `articles.toml` when present, then from
//! `SWITCHYARD__SECTION__KEY` environment variables (and `.env`).

use std::sync::Arc;

use switchyard::config::{ConfigLoader, DEFAULT_ENV_PREFIX};
use switchyard::server::{Server, ServerConfig};
use switchyard::telemetry::{init_logging, LogConfig};
use switchyard_articles::{build_router, AppState, MemoryStore};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_dotenv()
        .with_optional_file("articles.toml")?
        .with_env_prefix(DEFAULT_ENV_PREFIX)
        .load()?;

    init_logging(&LogConfig::from(&config.logging))?;

    let state = AppState::new(Arc::new(MemoryStore::seeded()));
    let router = build_router(state)?;
    for (method, pattern) in router.routes() {
        info!(method = %method, pattern = %pattern, "route registered");
    }

    let server = Server::new(ServerConfig::from(&config), router);
    info!(addr = %server.config().http_addr(), "starting articles service");
    server.run().await?;

    info!("articles service stopped");
    Ok(())
}
