//! Types d'erreurs pour pmoradio

/// Erreurs du moteur de diffusion
///
/// Aucune de ces erreurs n'est fatale pour la station : le broadcaster les
/// récupère localement (défauts de métadonnées, piste suivante, idle+poll).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Metadata unavailable for {0}")]
    MetadataUnavailable(String),

    #[error("Failed to read track {id}: {source}")]
    TrackReadFailure {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Playlist is empty")]
    EmptyPlaylist,

    #[error("Invalid track identifier: {0}")]
    InvalidTrackId(String),

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Library error: {0}")]
    LibraryError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type Result spécialisé pour pmoradio
pub type Result<T> = std::result::Result<T, Error>;
