use std::{net::SocketAddr, sync::Arc};

use lead_builder::{
    ai,
    config,
    db,
    leads::{DynLeadStore, MemoryLeadStore, PgLeadStore},
    routes, AppState,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> config::Result<()> {
    // 1. Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load configuration
    let cfg = config::load()?;
    info!("Starting lead builder in {:?} mode", cfg.env);

    // 3. Lead store: Postgres when configured, in-memory otherwise (development only)
    let store: DynLeadStore = match cfg.database_url.as_deref() {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            info!("Connected to Postgres");
            db::run_migrations(&pool).await?;
            Arc::new(PgLeadStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory lead store (data is lost on restart)");
            Arc::new(MemoryLeadStore::new())
        }
    };

    // 4. Message generator
    let generator = ai::build_message_generator(&cfg);

    // 5. Build application state
    let state = AppState {
        store,
        generator,
        config: cfg.clone(),
    };

    // 6. Build router
    let app = routes::router(state);

    // 7. Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    info!("Listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
