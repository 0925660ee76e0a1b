use tokio::signal;
use todo_api::{
    config::Config,
    db::{self, Store},
    logging, rest,
    token::TokenService,
    validation::Validator,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init(&config);
    tracing::info!("Starting app");

    let pool = db::connect(&config.db_source).await?;
    db::migrate(&pool).await?;

    let app_state = AppState::new(
        Store::new(pool),
        TokenService::new(&config.symmetric_key)?,
        Validator::new()?,
        chrono::Duration::from_std(config.access_token_duration)?,
    );

    let app = rest::router(app_state);
    let addr = config.server_address();
    tracing::info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A signal that cannot be installed is logged
/// and never fires, leaving the other one in charge.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::info!("interrupt received, draining connections"),
        _ = terminate => tracing::info!("SIGTERM received, draining connections"),
    }
}
