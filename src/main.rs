use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use showtime_server::config::{Config, StoreBackend};
use showtime_server::routes::create_routes;
use showtime_server::state::AppState;
use showtime_server::store::{
    postgres::run_migrations, InMemoryShowStore, InMemoryTicketStore, PgShowStore, PgTicketStore,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let state = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Successfully connected to database");

            run_migrations(&pool)
                .await
                .expect("Failed to run migrations");

            tracing::info!("Migrations run successfully");

            AppState::new(
                Arc::new(PgShowStore::new(pool.clone())),
                Arc::new(PgTicketStore::new(pool)),
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            AppState::new(
                Arc::new(InMemoryShowStore::new()),
                Arc::new(InMemoryTicketStore::new()),
            )
        }
    };

    let app = create_routes(state);

    let addr = config.bind_addr();
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
