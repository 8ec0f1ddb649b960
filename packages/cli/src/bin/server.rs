// ABOUTME: Entry point for the ManagMe domain API server
// ABOUTME: Serves projects, stories, tasks and users over REST on port 3001

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use managme_api::create_api_router;
use managme_auth::Roster;
use managme_cli::{cors_layer, init_tracing, Config};
use managme_storage::DataStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;

    let store = DataStore::open(config.data_dir.join("store.json")).await?;
    if store.seed_users(Roster::seeded()?.users()).await? {
        info!("Seeded the user roster");
    }

    let app = create_api_router(Arc::new(store)).layer(cors_layer(&config.cors_origin)?);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!(%addr, data_dir = %config.data_dir.display(), "Domain API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
