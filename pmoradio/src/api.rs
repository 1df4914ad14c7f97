//! API HTTP de la station : flux audio, statut, mutations de playlist.
//!
//! Les handlers consomment le contexte [`Station`] injecté en state axum.
//! Le routeur des mutations est séparé pour que la couche d'administration
//! puisse le monter derrière son contrôle d'accès.

use crate::station::{Station, StationStatus};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Routeur public : flux audio + statut
pub fn radio_router(station: Station) -> Router {
    Router::new()
        .route("/stream", get(stream_audio))
        .route("/api/status", get(get_status))
        .with_state(station)
}

/// Routeur des mutations de playlist (à monter derrière l'auth admin)
pub fn playlist_router(station: Station) -> Router {
    Router::new()
        .route("/api/playlist/next", post(next_track))
        .route("/api/playlist/reload", post(reload_playlist))
        .with_state(station)
}

/// Réponse d'un rechargement de playlist
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReloadResponse {
    /// Nombre de pistes en rotation après re-scan
    pub tracks: usize,
}

/// Flux audio continu de la station
///
/// Chaque connexion enregistre un auditeur ; la désinscription est garantie
/// par le drop du handle quand le client coupe (ou que la réponse échoue).
#[utoipa::path(
    get,
    path = "/stream",
    tag = "radio",
    responses(
        (status = 200, description = "Flux audio continu (chunked)", content_type = "audio/mpeg")
    )
)]
pub async fn stream_audio(State(station): State<Station>) -> Response {
    let mut listener = station.register_listener();

    let stream = async_stream::stream! {
        while let Some(chunk) = listener.recv().await {
            yield Ok::<_, std::convert::Infallible>(chunk);
        }
        // listener droppé ici : désinscription sur tous les chemins
    };

    (
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Statut de la station
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "radio",
    responses(
        (status = 200, description = "Piste courante, position, durée, audience", body = StationStatus)
    )
)]
pub async fn get_status(State(station): State<Station>) -> Json<StationStatus> {
    Json(station.status().await)
}

/// Rotation manuelle vers la piste suivante
#[utoipa::path(
    post,
    path = "/api/playlist/next",
    tag = "playlist",
    responses(
        (status = 204, description = "Rotation demandée")
    )
)]
pub async fn next_track(State(station): State<Station>) -> StatusCode {
    station.skip().await;
    StatusCode::NO_CONTENT
}

/// Re-scan de la bibliothèque et rechargement de la rotation
#[utoipa::path(
    post,
    path = "/api/playlist/reload",
    tag = "playlist",
    responses(
        (status = 200, description = "Playlist rechargée", body = ReloadResponse),
        (status = 500, description = "Scan de la bibliothèque impossible")
    )
)]
pub async fn reload_playlist(State(station): State<Station>) -> Response {
    match station.reload().await {
        Ok(tracks) => Json(ReloadResponse { tracks }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Playlist reload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
