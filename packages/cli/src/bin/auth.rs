// ABOUTME: Entry point for the ManagMe token service
// ABOUTME: Issues and refreshes HS256 tokens for the seeded roster on port 3000

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use managme_api::create_auth_router;
use managme_auth::AuthService;
use managme_cli::{cors_layer, init_tracing, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    if config.using_dev_secret() {
        warn!("MANAGME_TOKEN_SECRET is not set; signing with the development secret");
    }

    let auth = Arc::new(AuthService::new(&config.token_secret)?);
    let app = create_auth_router(auth).layer(cors_layer(&config.cors_origin)?);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.auth_port));
    info!(%addr, "Token service listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
