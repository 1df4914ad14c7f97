//! pmoradiod : le démon de la station radio
//!
//! Assemble le contexte [`Station`], la boucle de diffusion supervisée et
//! la couche HTTP (flux public, statut, console d'administration), puis
//! sert le tout jusqu'à Ctrl+C.

use anyhow::Result;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use pmoradio::{api, RadioConfig, Station};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod admin;

/// Page publique du lecteur
const INDEX_HTML: &str = include_str!("../assets/index.html");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ========== PHASE 1 : Station ==========
    let config = RadioConfig::load(None)?;
    info!("📻 Starting PMORadio...");
    info!(dir = %config.audio_dir.display(), "📁 Audio library");

    let station = Station::new(config.clone()).await?;
    station.start();

    // ========== PHASE 2 : HTTP ==========
    let admin = admin::AdminState::new(station.clone(), config.admin_password.clone());

    let app = Router::new()
        .route("/", get(homepage))
        .merge(api::radio_router(station.clone()))
        .merge(admin::admin_router(admin));

    let addr = format!("{}:{}", config.bind_host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🔊 PMORadio listening at http://{addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    station.shutdown().await;
    Ok(())
}

async fn homepage() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl_c");
    info!("Ctrl+C reçu, arrêt gracieux");
}
