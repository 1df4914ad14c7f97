//! PlaybackClock : position de lecture dans la piste en cours
//!
//! Handle clonable lisible depuis n'importe quelle task (statut HTTP,
//! tests) sans bloquer la boucle de diffusion. Aucune persistance : un
//! nouveau départ est enregistré à chaque début de transmission.

use crate::track::Track;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Transmission en cours
#[derive(Debug, Clone)]
struct CurrentPlayback {
    id: String,
    duration_secs: u64,
    started: Instant,
}

/// Position de lecture observée, pour le statut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackPosition {
    pub track_id: String,
    pub position_secs: u64,
    pub duration_secs: u64,
}

/// Horloge de lecture partagée
///
/// # Exemples
///
/// ```rust
/// use pmoradio::{PlaybackClock, Track, TrackInfo};
///
/// # tokio_test::block_on(async {
/// let clock = PlaybackClock::new();
/// assert_eq!(clock.position_secs().await, 0);
///
/// let track = Track {
///     id: "morning.mp3".to_string(),
///     info: TrackInfo::fallback(),
/// };
/// clock.start(&track).await;
/// assert!(clock.position_secs().await <= track.info.duration_secs);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    inner: Arc<RwLock<Option<CurrentPlayback>>>,
}

impl PlaybackClock {
    /// Crée une horloge sans piste en cours
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre maintenant comme début de transmission de `track`
    pub async fn start(&self, track: &Track) {
        let mut inner = self.inner.write().await;
        *inner = Some(CurrentPlayback {
            id: track.id.clone(),
            duration_secs: track.info.duration_secs,
            started: Instant::now(),
        });
    }

    /// Efface la piste en cours (playlist vide)
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    /// Position écoulée en secondes, bornée à `[0, duration]`
    ///
    /// Retourne 0 si aucune piste n'a démarré.
    pub async fn position_secs(&self) -> u64 {
        match self.inner.read().await.as_ref() {
            Some(current) => current.started.elapsed().as_secs().min(current.duration_secs),
            None => 0,
        }
    }

    /// Snapshot complet de la transmission en cours
    pub async fn snapshot(&self) -> Option<PlaybackPosition> {
        self.inner.read().await.as_ref().map(|current| PlaybackPosition {
            track_id: current.id.clone(),
            position_secs: current.started.elapsed().as_secs().min(current.duration_secs),
            duration_secs: current.duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackInfo;

    fn track(id: &str, duration_secs: u64) -> Track {
        Track {
            id: id.to_string(),
            info: TrackInfo {
                duration_secs,
                byte_rate: TrackInfo::DEFAULT_BYTE_RATE,
            },
        }
    }

    #[tokio::test]
    async fn test_position_zero_before_start() {
        let clock = PlaybackClock::new();
        assert_eq!(clock.position_secs().await, 0);
        assert_eq!(clock.snapshot().await, None);
    }

    #[tokio::test]
    async fn test_position_within_duration() {
        let clock = PlaybackClock::new();
        clock.start(&track("a.mp3", 1)).await;

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let pos = clock.position_secs().await;
        assert!(pos <= 1);
    }

    #[tokio::test]
    async fn test_position_clamped_after_duration_elapsed() {
        let clock = PlaybackClock::new();
        // Durée nulle : toute attente dépasse la durée
        clock.start(&track("a.mp3", 0)).await;

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(clock.position_secs().await, 0);
    }

    #[tokio::test]
    async fn test_restart_resets_position() {
        let clock = PlaybackClock::new();
        clock.start(&track("a.mp3", 10)).await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        clock.start(&track("b.mp3", 5)).await;
        let snapshot = clock.snapshot().await.unwrap();
        assert_eq!(snapshot.track_id, "b.mp3");
        assert_eq!(snapshot.position_secs, 0);
        assert_eq!(snapshot.duration_secs, 5);
    }

    #[tokio::test]
    async fn test_clear() {
        let clock = PlaybackClock::new();
        clock.start(&track("a.mp3", 10)).await;
        clock.clear().await;
        assert_eq!(clock.snapshot().await, None);
    }
}
