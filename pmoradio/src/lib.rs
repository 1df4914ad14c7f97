//! # pmoradio - Moteur de diffusion radio en continu
//!
//! Cette crate fournit le moteur d'une station radio mono-flux : lecture
//! des fichiers d'une bibliothèque, rotation de playlist, cadencement de
//! la transmission sur le temps réel et fan-out vers un nombre arbitraire
//! d'auditeurs, tous synchronisés sur le même point de la même piste.
//!
//! # Architecture
//!
//! - **Station** : contexte explicite construit au démarrage (bibliothèque,
//!   playlist, horloge, auditeurs, boucle supervisée)
//! - **Broadcaster** : machine à états Idle/Resolving/Streaming/Advancing,
//!   une seule boucle pour toute la vie du process
//! - **ListenerRegistry** : canaux bornés par auditeur, diffusion avec
//!   pertes (un auditeur lent n'arrête jamais la station)
//! - **Playlist** / **PlaybackClock** : rotation déterministe et position
//!   de lecture bornée à la durée
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use pmoradio::{RadioConfig, Station};
//!
//! # #[tokio::main]
//! # async fn main() -> pmoradio::Result<()> {
//! let config = RadioConfig::load(None)?;
//! let station = Station::new(config).await?;
//! station.start();
//!
//! // Brancher un auditeur
//! let mut listener = station.register_listener();
//! while let Some(chunk) = listener.recv().await {
//!     println!("chunk de {} octets", chunk.len());
//! }
//! # Ok(())
//! # }
//! ```

mod broadcaster;
mod clock;
mod config;
mod error;
mod library;
mod listeners;
pub mod metadata;
mod playlist;
mod station;
mod track;

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "api")]
mod openapi;

// Réexports publics
pub use broadcaster::{BroadcastOptions, Broadcaster, CHUNK_SIZE, IDLE_POLL_INTERVAL};
pub use clock::{PlaybackClock, PlaybackPosition};
pub use config::RadioConfig;
pub use error::{Error, Result};
pub use library::AudioLibrary;
pub use listeners::{
    Delivery, DeliveryReport, ListenerRegistry, DELIVERY_TIMEOUT, LISTENER_CHANNEL_CAPACITY,
};
pub use playlist::Playlist;
pub use station::{ListenerHandle, Station, StationStatus};
pub use track::{is_playable, Track, TrackInfo, PLAYABLE_EXTENSIONS};

#[cfg(feature = "api")]
pub use openapi::ApiDoc;
