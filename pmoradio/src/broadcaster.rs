//! Broadcaster : la boucle de diffusion de la station
//!
//! Machine à états `Idle` → `Resolving` → `Streaming` → `Advancing` qui lit
//! la piste courante par chunks fixes, cadence la transmission sur le temps
//! réel et diffuse chaque chunk vers tous les auditeurs enregistrés.
//!
//! Aucun échec ne termine la boucle : métadonnées illisibles → défauts,
//! erreur de lecture → piste suivante, playlist vide → idle + re-scan.
//!
//! # Pacing
//!
//! Après chaque fan-out : `expected = bytes_sent / byte_rate` comparé au
//! temps réellement écoulé depuis le début de la piste, et sommeil du
//! delta. Le calcul part du temps absolu écoulé, pas de deltas par chunk,
//! donc la gigue d'ordonnancement ne s'accumule jamais.

use crate::clock::PlaybackClock;
use crate::error::Result;
use crate::library::AudioLibrary;
use crate::listeners::ListenerRegistry;
use crate::metadata;
use crate::playlist::Playlist;
use crate::track::{Track, TrackInfo};
use bytes::Bytes;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Taille fixe des chunks audio lus et diffusés (8 Kio)
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Intervalle de re-scan de la bibliothèque quand la playlist est vide
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Délai avant redémarrage par le superviseur
const RESTART_BACKOFF: Duration = Duration::from_secs(1);

/// Options de la boucle de diffusion
#[derive(Debug, Clone)]
pub struct BroadcastOptions {
    /// Taille des chunks lus depuis le fichier
    pub chunk_size: usize,
    /// Intervalle de polling en état `Idle`
    pub idle_poll: Duration,
}

impl Default for BroadcastOptions {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            idle_poll: IDLE_POLL_INTERVAL,
        }
    }
}

/// États de la boucle de diffusion
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Aucune piste diffusable : poll périodique de la bibliothèque
    Idle,
    /// Résolution des métadonnées de la prochaine piste courante
    Resolving,
    /// Lecture + pacing + fan-out de la piste
    Streaming(Track),
    /// Rotation de la playlist
    Advancing,
}

/// Boucle de diffusion de la station
///
/// Clonable : toutes les ressources partagées le sont via `Arc`. Une seule
/// instance tourne à la fois, supervisée par [`Broadcaster::spawn_supervised`].
#[derive(Debug, Clone)]
pub struct Broadcaster {
    library: AudioLibrary,
    playlist: Arc<RwLock<Playlist>>,
    clock: PlaybackClock,
    listeners: ListenerRegistry,
    options: BroadcastOptions,
}

impl Broadcaster {
    /// Assemble une boucle de diffusion sur les ressources partagées de la
    /// station
    pub fn new(
        library: AudioLibrary,
        playlist: Arc<RwLock<Playlist>>,
        clock: PlaybackClock,
        listeners: ListenerRegistry,
        options: BroadcastOptions,
    ) -> Self {
        Self {
            library,
            playlist,
            clock,
            listeners,
            options,
        }
    }

    /// Exécute la boucle jusqu'à annulation du token
    ///
    /// La boucle elle-même ne se termine jamais d'elle-même ; l'annulation
    /// est le seul chemin de sortie propre.
    pub async fn run(self, stop: CancellationToken) {
        tokio::select! {
            _ = stop.cancelled() => {
                tracing::info!("Broadcast loop stopped");
            }
            _ = self.run_loop() => {}
        }
    }

    /// Lance la boucle sous supervision
    ///
    /// Si la task de diffusion se termine (elle ne le devrait pas), le
    /// superviseur logge et la relance après un court délai, jusqu'à
    /// annulation du token.
    pub fn spawn_supervised(self, stop: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let worker: JoinHandle<()> = tokio::spawn(self.clone().run(stop.clone()));
                if let Err(e) = worker.await {
                    tracing::error!(error = %e, "Broadcast loop crashed");
                }
                if stop.is_cancelled() {
                    break;
                }
                tracing::warn!(
                    backoff = ?RESTART_BACKOFF,
                    "Broadcast loop terminated unexpectedly, restarting"
                );
                tokio::time::sleep(RESTART_BACKOFF).await;
            }
        })
    }

    async fn run_loop(&self) {
        let mut state = if self.playlist.read().await.is_empty() {
            State::Idle
        } else {
            State::Resolving
        };

        loop {
            state = match state {
                State::Idle => self.idle().await,
                State::Resolving => self.resolve().await,
                State::Streaming(track) => self.stream(track).await,
                State::Advancing => self.advance().await,
            };
        }
    }

    /// `Idle` : pas de piste ; attend puis re-scanne la bibliothèque
    async fn idle(&self) -> State {
        self.clock.clear().await;
        tracing::warn!("Playlist empty, polling library...");
        tokio::time::sleep(self.options.idle_poll).await;

        match self.library.scan().await {
            Ok(ids) => {
                let mut playlist = self.playlist.write().await;
                playlist.reload(ids);
                if playlist.is_empty() {
                    State::Idle
                } else {
                    State::Resolving
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Library scan failed");
                State::Idle
            }
        }
    }

    /// `Resolving` : résout durée + débit de la piste courante
    async fn resolve(&self) -> State {
        let current = self.playlist.read().await.current().map(str::to_string);
        let Some(id) = current else {
            return State::Idle;
        };

        let info = match self.library.path_for(&id) {
            Ok(path) => metadata::resolve(&path),
            Err(e) => {
                tracing::warn!(track = %id, error = %e, "Unresolvable track path, using defaults");
                TrackInfo::fallback()
            }
        };

        tracing::info!(
            track = %id,
            duration_secs = info.duration_secs,
            kbps = info.byte_rate * 8 / 1000,
            "Now playing"
        );
        State::Streaming(Track { id, info })
    }

    /// `Streaming` : lit, cadence et diffuse la piste jusqu'à EOF ou erreur
    async fn stream(&self, track: Track) -> State {
        self.clock.start(&track).await;
        if let Err(e) = self.stream_chunks(&track).await {
            tracing::error!(track = %track.id, error = %e, "Track aborted");
        }
        State::Advancing
    }

    async fn stream_chunks(&self, track: &Track) -> Result<()> {
        let mut file = self.library.open(&track.id).await?;
        let mut buf = vec![0u8; self.options.chunk_size];
        let mut bytes_sent: u64 = 0;
        let started = Instant::now();

        loop {
            let read = file
                .read(&mut buf)
                .await
                .map_err(|source| crate::Error::TrackReadFailure {
                    id: track.id.clone(),
                    source,
                })?;
            if read == 0 {
                return Ok(());
            }

            let report = self
                .listeners
                .deliver(Bytes::copy_from_slice(&buf[..read]))
                .await;
            if report.dropped > 0 {
                tracing::debug!(
                    track = %track.id,
                    delivered = report.delivered,
                    dropped = report.dropped,
                    "Chunk dropped for backpressured listeners"
                );
            }

            bytes_sent += read as u64;
            let expected = Duration::from_secs_f64(bytes_sent as f64 / track.info.byte_rate as f64);
            let actual = started.elapsed();
            if expected > actual {
                tokio::time::sleep(expected - actual).await;
            }
        }
    }

    /// `Advancing` : rotation, puis retour en résolution (ou idle si vide)
    async fn advance(&self) -> State {
        let mut playlist = self.playlist.write().await;
        playlist.advance();
        if playlist.is_empty() {
            State::Idle
        } else {
            State::Resolving
        }
    }
}
