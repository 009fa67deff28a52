//! Turf Live binary entrypoint wiring REST routes, the match store, and tracing.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turf_live_back::{
    config::AppConfig,
    dao::match_store::{MatchStore, memory::InMemoryMatchStore},
    routes,
    state::{AppState, SharedState},
};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Local offset lookup is only reliable while the process is single-threaded.
    let config = AppConfig::load();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?
        .block_on(serve(config))
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let app_state = AppState::new(config);
    install_match_store(&app_state).await;

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Supervise MongoDB when `MONGO_URI` is set; otherwise keep matches in memory.
async fn install_match_store(state: &SharedState) {
    #[cfg(feature = "mongo-store")]
    if env::var("MONGO_URI").is_ok() {
        use turf_live_back::{
            dao::{
                match_store::mongodb::{MongoConfig, MongoMatchStore},
                storage::StorageError,
            },
            services::storage_supervisor,
        };

        tokio::spawn(storage_supervisor::run(state.clone(), || async {
            let config = MongoConfig::from_env().await?;
            let store = MongoMatchStore::connect(config).await?;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn MatchStore>)
        }));
        return;
    }

    warn!("MONGO_URI not set; matches are kept in memory and lost on restart");
    let store: Arc<dyn MatchStore> = Arc::new(InMemoryMatchStore::new());
    state.set_match_store(store).await;
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
