use std::{error::Error, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rust_storefront::{app, config::AppConfig, connect, init};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().inspect_err(|e| error!("Invalid configuration: {e}"))?;

    let db = connect(&config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    init(&db, &config)
        .await
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    let app = app(Arc::new(db), Arc::new(config));
    axum::serve(listener, app).await?;

    Ok(())
}
