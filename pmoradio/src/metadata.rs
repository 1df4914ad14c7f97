//! Résolution des métadonnées de diffusion (durée + débit)
//!
//! Point unique de résolution : toute la politique de repli vit ici.
//! Une piste illisible n'est jamais fatale, elle est diffusée avec les
//! valeurs par défaut de [`TrackInfo::fallback`].

use crate::error::{Error, Result};
use crate::track::TrackInfo;
use lofty::config::ParseOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::Path;

/// Sonde un fichier audio et en extrait durée + débit
///
/// Échoue si le fichier ne peut pas être lu ou si son format n'est pas
/// reconnu par lofty.
fn probe(path: &Path) -> Result<TrackInfo> {
    let tagged_file = Probe::open(path)
        .and_then(|probe| probe.options(ParseOptions::new()).read())
        .map_err(|e| Error::MetadataUnavailable(format!("{}: {e}", path.display())))?;
    let properties = tagged_file.properties();

    let duration_secs = properties.duration().as_secs();
    // audio_bitrate() est en kbps ; le pacing travaille en octets/seconde
    let byte_rate = properties
        .audio_bitrate()
        .map(|kbps| u64::from(kbps) * 1000 / 8)
        .unwrap_or(0);

    Ok(TrackInfo {
        duration_secs,
        byte_rate,
    })
}

/// Résout les caractéristiques d'une piste, avec repli sur les défauts
///
/// Politique : chaque champ absent ou nul est remplacé individuellement par
/// sa valeur par défaut (180 s, 16 000 o/s). Un échec de sonde complet est
/// loggé puis remplacé intégralement.
pub fn resolve(path: &Path) -> TrackInfo {
    match probe(path) {
        Ok(mut info) => {
            if info.duration_secs == 0 {
                info.duration_secs = TrackInfo::DEFAULT_DURATION_SECS;
            }
            if info.byte_rate == 0 {
                info.byte_rate = TrackInfo::DEFAULT_BYTE_RATE;
            }
            info
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable track metadata, using defaults");
            TrackInfo::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unreadable_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"this is not audio").unwrap();

        let info = resolve(&path);
        assert_eq!(info, TrackInfo::fallback());
    }

    #[test]
    fn test_resolve_missing_file_falls_back() {
        let info = resolve(Path::new("/nonexistent/track.mp3"));
        assert_eq!(info, TrackInfo::fallback());
    }
}
