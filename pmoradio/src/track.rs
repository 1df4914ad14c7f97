//! Track : identifiant d'un fichier diffusable + caractéristiques résolues

use serde::{Deserialize, Serialize};

/// Extensions de fichiers diffusables par la station
pub const PLAYABLE_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

/// Vérifie qu'un nom de fichier porte une extension diffusable
pub fn is_playable(id: &str) -> bool {
    let lower = id.to_ascii_lowercase();
    PLAYABLE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Caractéristiques d'une piste nécessaires à la diffusion temps réel
///
/// Résolues à chaque fois que la piste devient courante (jamais mises en
/// cache entre deux passages) ; immuables pendant un passage de diffusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Durée annoncée en secondes entières
    pub duration_secs: u64,
    /// Débit en octets par seconde, utilisé pour le pacing
    pub byte_rate: u64,
}

impl TrackInfo {
    /// Durée substituée quand les métadonnées sont illisibles (3 minutes)
    pub const DEFAULT_DURATION_SECS: u64 = 180;

    /// Débit substitué quand les métadonnées sont illisibles (~128 kbps)
    pub const DEFAULT_BYTE_RATE: u64 = 16_000;

    /// Valeurs de repli de la politique de métadonnées
    pub fn fallback() -> Self {
        Self {
            duration_secs: Self::DEFAULT_DURATION_SECS,
            byte_rate: Self::DEFAULT_BYTE_RATE,
        }
    }
}

/// Une piste prête à être diffusée
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Nom de fichier dans la bibliothèque
    pub id: String,
    /// Caractéristiques résolues pour ce passage
    pub info: TrackInfo,
}
