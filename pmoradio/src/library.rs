//! AudioLibrary : bibliothèque de fichiers audio sur disque
//!
//! Collaborateur de stockage du broadcaster : scan trié du répertoire
//! (filtré sur les extensions diffusables), ouverture en lecture, et
//! primitives upload/suppression pour la console d'administration.

use crate::error::{Error, Result};
use crate::track::is_playable;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Bibliothèque de fichiers audio
#[derive(Debug, Clone)]
pub struct AudioLibrary {
    dir: PathBuf,
}

impl AudioLibrary {
    /// Ouvre la bibliothèque, en créant le répertoire si nécessaire
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Répertoire racine de la bibliothèque
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Liste triée (lexicographique) des identifiants diffusables
    ///
    /// L'ordre déterministe garantit des diffusions reproductibles d'un
    /// démarrage à l'autre.
    pub async fn scan(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_playable(name) {
                    ids.push(name.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Chemin absolu d'un identifiant, après validation
    ///
    /// Refuse tout identifiant qui n'est pas un simple nom de fichier
    /// (séparateurs, `..`, chaîne vide).
    pub fn path_for(&self, id: &str) -> Result<PathBuf> {
        let candidate = Path::new(id);
        match candidate.file_name() {
            Some(name) if name == candidate.as_os_str() => Ok(self.dir.join(name)),
            _ => Err(Error::InvalidTrackId(id.to_string())),
        }
    }

    /// Ouvre un fichier de la bibliothèque en lecture
    pub async fn open(&self, id: &str) -> Result<File> {
        let path = self.path_for(id)?;
        File::open(&path).await.map_err(|source| Error::TrackReadFailure {
            id: id.to_string(),
            source,
        })
    }

    /// Écrit un fichier dans la bibliothèque (upload admin)
    pub async fn store(&self, id: &str, contents: &[u8]) -> Result<()> {
        let path = self.path_for(id)?;
        if path.is_dir() {
            return Err(Error::InvalidTrackId(id.to_string()));
        }
        tokio::fs::write(&path, contents).await?;
        tracing::info!(id, bytes = contents.len(), "Stored file in library");
        Ok(())
    }

    /// Supprime un fichier de la bibliothèque
    pub async fn remove(&self, id: &str) -> Result<()> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Err(Error::TrackNotFound(id.to_string()));
        }
        tokio::fs::remove_file(&path).await?;
        tracing::info!(id, "Removed file from library");
        Ok(())
    }
}
