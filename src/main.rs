use sodev_messaging::{
    config, db,
    directory::PgUserDirectory,
    error, logging, migrations, routes,
    services::ConversationService,
    state::AppState,
    store::PgStore,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    let pool = db::init_pool(&cfg.database_url, cfg.db_max_connections)
        .await
        .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;

    // Embedded migrations are idempotent; schema drift is fatal at startup
    migrations::run_all(&pool)
        .await
        .map_err(|e| error::AppError::StartServer(format!("migrations: {e}")))?;

    let store = Arc::new(PgStore::new(pool.clone()));
    let users = Arc::new(PgUserDirectory::new(pool));
    let service = Arc::new(ConversationService::new(store, users));

    let state = AppState {
        service,
        config: cfg.clone(),
    };

    let router = routes::build_router(state);

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting sodev-messaging");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| error::AppError::StartServer(format!("bind {bind_addr}: {e}")))?;
    axum::serve(listener, router)
        .await
        .map_err(|e| error::AppError::StartServer(format!("serve: {e}")))?;

    Ok(())
}
