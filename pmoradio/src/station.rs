//! Station : contexte explicite du moteur de diffusion
//!
//! Construit au démarrage puis injecté dans les handlers HTTP/admin, à la
//! place d'un état global ambiant. Possède la bibliothèque, la playlist,
//! l'horloge, le registre d'auditeurs et la task de diffusion supervisée ;
//! expose les opérations consommées par la couche de transport.

use crate::broadcaster::{BroadcastOptions, Broadcaster};
use crate::clock::PlaybackClock;
use crate::config::RadioConfig;
use crate::error::Result;
use crate::library::AudioLibrary;
use crate::listeners::ListenerRegistry;
use crate::playlist::Playlist;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Statut observable de la station
///
/// Les noms de champs et leurs unités sont un contrat de compatibilité pour
/// toute couche HTTP/JSON posée au-dessus du moteur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct StationStatus {
    /// Piste en cours de diffusion (None si aucune)
    pub current_track: Option<String>,
    /// Position écoulée dans la piste, en secondes
    pub current_position: u64,
    /// Durée annoncée de la piste, en secondes
    pub duration: u64,
    /// Nombre d'auditeurs connectés
    pub listener_count: usize,
}

/// État interne partagé de la station
struct StationInner {
    config: RadioConfig,
    library: AudioLibrary,
    playlist: Arc<RwLock<Playlist>>,
    clock: PlaybackClock,
    listeners: ListenerRegistry,
    stop: CancellationToken,
    broadcaster: StdMutex<Option<JoinHandle<()>>>,
}

/// Contexte de la station radio
#[derive(Clone)]
pub struct Station {
    inner: Arc<StationInner>,
}

impl Station {
    /// Construit la station : ouvre la bibliothèque et charge la rotation
    /// initiale (scan trié). La diffusion ne démarre qu'à [`Station::start`].
    pub async fn new(config: RadioConfig) -> Result<Self> {
        let library = AudioLibrary::new(&config.audio_dir)?;

        let mut playlist = Playlist::new();
        playlist.reload(library.scan().await?);
        tracing::info!(
            dir = %library.dir().display(),
            tracks = playlist.len(),
            "Station library loaded"
        );

        Ok(Self {
            inner: Arc::new(StationInner {
                config,
                library,
                playlist: Arc::new(RwLock::new(playlist)),
                clock: PlaybackClock::new(),
                listeners: ListenerRegistry::new(),
                stop: CancellationToken::new(),
                broadcaster: StdMutex::new(None),
            }),
        })
    }

    /// Démarre la boucle de diffusion supervisée (une seule fois)
    pub fn start(&self) {
        let mut slot = self.inner.broadcaster.lock().unwrap();
        if slot.is_some() {
            tracing::warn!("Broadcaster already running");
            return;
        }

        let broadcaster = Broadcaster::new(
            self.inner.library.clone(),
            self.inner.playlist.clone(),
            self.inner.clock.clone(),
            self.inner.listeners.clone(),
            BroadcastOptions::default(),
        );
        *slot = Some(broadcaster.spawn_supervised(self.inner.stop.clone()));
        tracing::info!("Broadcaster started");
    }

    /// Arrête proprement la diffusion
    pub async fn shutdown(&self) {
        self.inner.stop.cancel();
        let handle = self.inner.broadcaster.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        tracing::info!("Station stopped");
    }

    /// Configuration de la station
    pub fn config(&self) -> &RadioConfig {
        &self.inner.config
    }

    /// Enregistre un auditeur ; le handle se désinscrit tout seul au drop
    pub fn register_listener(&self) -> ListenerHandle {
        let (id, rx) = self.inner.listeners.register();
        ListenerHandle {
            id,
            registry: self.inner.listeners.clone(),
            rx,
        }
    }

    /// Désinscrit un auditeur par identifiant (idempotent)
    pub fn unregister_listener(&self, id: Uuid) {
        self.inner.listeners.unregister(id);
    }

    /// Statut courant : piste, position, durée, audience
    pub async fn status(&self) -> StationStatus {
        match self.inner.clock.snapshot().await {
            Some(playback) => StationStatus {
                current_track: Some(playback.track_id),
                current_position: playback.position_secs,
                duration: playback.duration_secs,
                listener_count: self.inner.listeners.count(),
            },
            None => StationStatus {
                current_track: None,
                current_position: 0,
                duration: 0,
                listener_count: self.inner.listeners.count(),
            },
        }
    }

    /// Rotation manuelle : prend effet à la prochaine évaluation de la
    /// boucle, jamais en préemptant une lecture en cours
    pub async fn skip(&self) {
        self.inner.playlist.write().await.advance();
        tracing::info!("Playlist rotated by request");
    }

    /// Re-scanne la bibliothèque et recharge la rotation
    ///
    /// Retourne le nombre de pistes après rechargement.
    pub async fn reload(&self) -> Result<usize> {
        let ids = self.inner.library.scan().await?;
        let mut playlist = self.inner.playlist.write().await;
        playlist.reload(ids);
        tracing::info!(tracks = playlist.len(), "Playlist reloaded");
        Ok(playlist.len())
    }

    /// Dépose un fichier dans la bibliothèque et l'ajoute à la rotation
    pub async fn upload_track(&self, id: &str, contents: &[u8]) -> Result<()> {
        self.inner.library.store(id, contents).await?;
        if crate::track::is_playable(id) {
            self.inner.playlist.write().await.add(id);
        }
        Ok(())
    }

    /// Supprime un fichier de la bibliothèque et de la rotation
    pub async fn delete_track(&self, id: &str) -> Result<()> {
        self.inner.library.remove(id).await?;
        self.inner.playlist.write().await.remove(id);
        Ok(())
    }

    /// Snapshot de la rotation, courante en tête
    pub async fn playlist_snapshot(&self) -> Vec<String> {
        self.inner.playlist.read().await.snapshot()
    }
}

/// Handle d'un auditeur enregistré
///
/// Détient le côté réception du canal borné. La désinscription est
/// garantie sur tous les chemins de sortie : elle s'exécute au drop du
/// handle (fin normale, erreur ou annulation de la connexion).
pub struct ListenerHandle {
    id: Uuid,
    registry: ListenerRegistry,
    rx: mpsc::Receiver<Bytes>,
}

impl ListenerHandle {
    /// Identifiant unique de l'auditeur
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Attend le prochain chunk audio
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}
