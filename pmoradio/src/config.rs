//! Configuration de la station
//!
//! Chargement YAML avec défauts intégrés et surcharges par variables
//! d'environnement. Configuration minimale (pas de sur-configuration) :
//! les constantes temps réel du moteur (taille de chunk, capacité des
//! canaux, timeout de livraison) sont fixées dans leurs modules.
//!
//! Contrairement au reste de la configuration PMO, la config est ici une
//! valeur explicite construite au démarrage et injectée dans [`Station`],
//! pas un singleton process-wide.
//!
//! [`Station`]: crate::Station

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmoradio.yaml");

/// Chemin d'un fichier de configuration alternatif
const ENV_CONFIG_PATH: &str = "PMORADIO_CONFIG";

// Surcharges individuelles
const ENV_AUDIO_DIR: &str = "PMORADIO_AUDIO_DIR";
const ENV_HOST: &str = "PMORADIO_HOST";
const ENV_PORT: &str = "PMORADIO_PORT";
const ENV_ADMIN_PASSWORD: &str = "PMORADIO_ADMIN_PASSWORD";

/// Configuration de la station radio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// Répertoire contenant les fichiers audio de la bibliothèque
    pub audio_dir: PathBuf,
    /// Adresse d'écoute HTTP
    pub bind_host: String,
    /// Port d'écoute HTTP
    pub http_port: u16,
    /// Mot de passe de la console d'administration
    pub admin_password: String,
}

impl Default for RadioConfig {
    fn default() -> Self {
        serde_yaml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }
}

impl RadioConfig {
    /// Charge la configuration
    ///
    /// Ordre de résolution :
    /// 1. `path` fourni explicitement
    /// 2. fichier pointé par `PMORADIO_CONFIG`
    /// 3. défauts intégrés
    ///
    /// Les variables `PMORADIO_AUDIO_DIR`, `PMORADIO_HOST`, `PMORADIO_PORT`
    /// et `PMORADIO_ADMIN_PASSWORD` surchargent ensuite le résultat.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path
            .map(PathBuf::from)
            .or_else(|| env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from))
        {
            Some(file) => {
                let raw = std::fs::read_to_string(&file).map_err(|e| {
                    Error::ConfigError(format!("cannot read {}: {e}", file.display()))
                })?;
                serde_yaml::from_str(&raw)
                    .map_err(|e| Error::ConfigError(format!("invalid {}: {e}", file.display())))?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applique les surcharges d'environnement
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var(ENV_AUDIO_DIR) {
            self.audio_dir = PathBuf::from(dir);
        }
        if let Ok(host) = env::var(ENV_HOST) {
            self.bind_host = host;
        }
        if let Ok(port) = env::var(ENV_PORT) {
            match port.parse() {
                Ok(p) => self.http_port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid {}", ENV_PORT),
            }
        }
        if let Ok(password) = env::var(ENV_ADMIN_PASSWORD) {
            self.admin_password = password;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults() {
        let config = RadioConfig::default();
        assert_eq!(config.audio_dir, PathBuf::from("audio_files"));
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.http_port, 6014);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.yaml");
        std::fs::write(&path, "audio_dir: /srv/radio\nhttp_port: 9000\n").unwrap();

        let config = RadioConfig::load(Some(&path)).unwrap();
        assert_eq!(config.audio_dir, PathBuf::from("/srv/radio"));
        assert_eq!(config.http_port, 9000);
        // Les champs absents gardent leur défaut
        assert_eq!(config.bind_host, "0.0.0.0");
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = RadioConfig::load(Some(Path::new("/nonexistent/station.yaml")));
        assert!(result.is_err());
    }
}
