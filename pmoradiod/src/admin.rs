//! Console d'administration de la station
//!
//! Authentification volontairement minimale, fidèle au besoin : un mot de
//! passe unique, un jeton de session en cookie HttpOnly, un set de sessions
//! en mémoire (rien ne survit au redémarrage). Les routes protégées
//! (panneau, upload, suppression, mutations de playlist) passent par le
//! middleware `require_admin`.

use axum::{
    extract::{Multipart, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use pmoradio::{api, Station};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

const LOGIN_HTML: &str = include_str!("../assets/login.html");
const ADMIN_HTML: &str = include_str!("../assets/admin.html");

const COOKIE_NAME: &str = "admin_token";

/// État partagé de la console d'administration
#[derive(Clone)]
pub struct AdminState {
    station: Station,
    password: String,
    sessions: Arc<RwLock<HashSet<String>>>,
}

impl AdminState {
    pub fn new(station: Station, password: String) -> Self {
        Self {
            station,
            password,
            sessions: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Ouvre une session et retourne son jeton
    fn open_session(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().unwrap().insert(token.clone());
        token
    }

    /// Ferme une session (jeton inconnu = no-op)
    fn close_session(&self, token: &str) {
        self.sessions.write().unwrap().remove(token);
    }

    fn is_valid(&self, token: &str) -> bool {
        self.sessions.read().unwrap().contains(token)
    }
}

/// Routeur de la console : login public, reste derrière `require_admin`
pub fn admin_router(state: AdminState) -> Router {
    let protected = Router::new()
        .route("/admin", get(admin_panel))
        .route("/upload", post(upload))
        .route("/delete/{file}", post(delete_file))
        .route("/logout", post(logout))
        .with_state(state.clone())
        .merge(api::playlist_router(state.station.clone()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    Router::new()
        .route("/admin-login", get(login_page).post(login))
        .with_state(state)
        .merge(protected)
}

/// Extrait le jeton de session des cookies de la requête
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| {
            cookie
                .strip_prefix(COOKIE_NAME)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .map(str::to_string)
}

/// Middleware : redirige vers le login sans session valide
async fn require_admin(State(state): State<AdminState>, req: Request, next: Next) -> Response {
    let authed = session_token(req.headers())
        .map(|token| state.is_valid(&token))
        .unwrap_or(false);

    if authed {
        next.run(req).await
    } else {
        Redirect::to("/admin-login").into_response()
    }
}

async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    password: String,
}

async fn login(State(state): State<AdminState>, Form(form): Form<LoginForm>) -> Response {
    if form.password != state.password {
        return (
            StatusCode::UNAUTHORIZED,
            Html("<p>Mot de passe incorrect</p>"),
        )
            .into_response();
    }

    let token = state.open_session();
    tracing::info!("Admin session opened");
    (
        [(
            header::SET_COOKIE,
            format!("{COOKIE_NAME}={token}; HttpOnly; Path=/"),
        )],
        Redirect::to("/admin"),
    )
        .into_response()
}

async fn logout(State(state): State<AdminState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.close_session(&token);
        tracing::info!("Admin session closed");
    }
    (
        [(
            header::SET_COOKIE,
            format!("{COOKIE_NAME}=; Max-Age=0; HttpOnly; Path=/"),
        )],
        Redirect::to("/admin-login"),
    )
        .into_response()
}

/// Panneau d'administration : statut + rotation + actions
async fn admin_panel(State(state): State<AdminState>) -> Html<String> {
    let status = state.station.status().await;
    let rows: String = state
        .station
        .playlist_snapshot()
        .await
        .iter()
        .map(|id| {
            format!(
                "<li>{id} <form method='post' action='/delete/{id}' class='inline'>\
                 <button>Supprimer</button></form></li>\n"
            )
        })
        .collect();

    let page = ADMIN_HTML
        .replace(
            "{{current_track}}",
            status.current_track.as_deref().unwrap_or("Aucune piste"),
        )
        .replace("{{listener_count}}", &status.listener_count.to_string())
        .replace("{{rows}}", &rows);
    Html(page)
}

/// Upload d'un fichier audio dans la bibliothèque
async fn upload(State(state): State<AdminState>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };

        match field.bytes().await {
            Ok(bytes) => {
                if let Err(e) = state.station.upload_track(&name, &bytes).await {
                    tracing::warn!(file = %name, error = %e, "Upload rejected");
                    return (StatusCode::BAD_REQUEST, Html("<p>Fichier invalide</p>"))
                        .into_response();
                }
            }
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "Upload failed");
                return (StatusCode::BAD_REQUEST, Html("<p>Upload interrompu</p>"))
                    .into_response();
            }
        }
    }
    Redirect::to("/admin").into_response()
}

/// Suppression d'un fichier (l'échec est loggé, jamais bloquant)
async fn delete_file(State(state): State<AdminState>, Path(file): Path<String>) -> Redirect {
    if let Err(e) = state.station.delete_track(&file).await {
        tracing::warn!(file = %file, error = %e, "Delete failed");
    }
    Redirect::to("/admin")
}
