use storefront_api::state::AppState;
use storefront_api::store::PgStore;
use storefront_api::{app, config};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("starting storefront API in {:?} mode", config.environment);

    let state = match &config.database.url {
        Some(url) => {
            let store = PgStore::connect(url)
                .await
                .unwrap_or_else(|e| panic!("failed to initialize database: {}", e));
            AppState::postgres(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, serving from the in-memory store");
            AppState::memory()
        }
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.expect("server");
}
