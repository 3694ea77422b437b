// src/main.rs

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use hirematch::config::ConfigManager;
use hirematch::web::start_web_server;

#[tokio::main]
async fn main() -> Result<()> {
    Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or(EnvFilter::new("hirematch=info,rocket::server=OFF")),
        )
        .init();

    let config = ConfigManager::load()?;
    start_web_server(&config).await
}
