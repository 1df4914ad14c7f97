//! Playlist : rotation ordonnée des identifiants de pistes
//!
//! La tête de la file est la piste courante. `advance()` fait tourner la
//! séquence d'une position vers la gauche, la piste courante part en queue.
//! Structure non synchronisée : la [`Station`] la protège par un RwLock.
//!
//! [`Station`]: crate::Station

use std::collections::VecDeque;

/// Rotation ordonnée de pistes avec une entrée courante
#[derive(Debug, Default)]
pub struct Playlist {
    tracks: VecDeque<String>,
}

impl Playlist {
    /// Crée une playlist vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiant de la piste courante (tête de rotation)
    pub fn current(&self) -> Option<&str> {
        self.tracks.front().map(String::as_str)
    }

    /// Fait tourner la rotation : la courante part en queue, la suivante
    /// devient courante. No-op sur playlist vide.
    pub fn advance(&mut self) {
        if self.tracks.len() > 1 {
            self.tracks.rotate_left(1);
        }
    }

    /// Ajoute une piste en queue de rotation (no-op si déjà présente)
    pub fn add(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.tracks.contains(&id) {
            self.tracks.push_back(id);
        }
    }

    /// Retire une piste de la rotation
    ///
    /// Si c'est la piste courante, la suivante en ordre de rotation devient
    /// courante ; une playlist vidée n'a plus de courante.
    /// Retourne `true` si la piste était présente.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.tracks.iter().position(|t| t == id) {
            Some(pos) => {
                self.tracks.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remplace le contenu par un scan frais
    ///
    /// Les identifiants sont triés (ordre lexicographique déterministe).
    /// L'identité de la piste courante est préservée quand elle figure
    /// encore dans le scan ; sinon la rotation repart de la tête triée.
    pub fn reload(&mut self, mut ids: Vec<String>) {
        ids.sort();
        let current = self.current().map(str::to_string);

        let mut tracks: VecDeque<String> = ids.into();
        if let Some(cur) = current {
            if let Some(pos) = tracks.iter().position(|t| *t == cur) {
                tracks.rotate_left(pos);
            }
        }
        self.tracks = tracks;
    }

    /// Nombre de pistes en rotation
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Vérifie si la rotation est vide
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Snapshot de la rotation, courante en tête
    pub fn snapshot(&self) -> Vec<String> {
        self.tracks.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(ids: &[&str]) -> Playlist {
        let mut p = Playlist::new();
        p.reload(ids.iter().map(|s| s.to_string()).collect());
        p
    }

    #[test]
    fn test_advance_n_times_restores_order() {
        let mut p = playlist(&["a.mp3", "b.mp3", "c.mp3"]);
        let original = p.snapshot();

        for _ in 0..p.len() {
            p.advance();
        }
        assert_eq!(p.snapshot(), original);
    }

    #[test]
    fn test_advance_rotates_left() {
        let mut p = playlist(&["a.mp3", "b.mp3", "c.mp3"]);
        p.advance();
        assert_eq!(p.current(), Some("b.mp3"));
        assert_eq!(p.snapshot(), vec!["b.mp3", "c.mp3", "a.mp3"]);
    }

    #[test]
    fn test_advance_on_empty_is_noop() {
        let mut p = Playlist::new();
        p.advance();
        assert_eq!(p.current(), None);
    }

    #[test]
    fn test_remove_current_promotes_successor() {
        let mut p = playlist(&["a.mp3", "b.mp3", "c.mp3"]);
        assert!(p.remove("a.mp3"));
        assert_eq!(p.current(), Some("b.mp3"));
    }

    #[test]
    fn test_remove_other_keeps_current() {
        let mut p = playlist(&["a.mp3", "b.mp3", "c.mp3"]);
        assert!(p.remove("b.mp3"));
        assert_eq!(p.current(), Some("a.mp3"));
        assert_eq!(p.snapshot(), vec!["a.mp3", "c.mp3"]);
    }

    #[test]
    fn test_remove_last_leaves_empty_sentinel() {
        let mut p = playlist(&["a.mp3"]);
        assert!(p.remove("a.mp3"));
        assert_eq!(p.current(), None);
        assert!(p.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut p = playlist(&["a.mp3"]);
        assert!(!p.remove("zz.mp3"));
        assert_eq!(p.current(), Some("a.mp3"));
    }

    #[test]
    fn test_add_deduplicates() {
        let mut p = playlist(&["a.mp3"]);
        p.add("b.mp3");
        p.add("b.mp3");
        assert_eq!(p.snapshot(), vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn test_reload_preserves_current_identity() {
        let mut p = playlist(&["a.mp3", "b.mp3", "c.mp3"]);
        p.advance(); // courante = b.mp3

        p.reload(vec![
            "a.mp3".into(),
            "b.mp3".into(),
            "c.mp3".into(),
            "d.mp3".into(),
        ]);
        assert_eq!(p.current(), Some("b.mp3"));
        // Rotation triée, tournée pour garder b en tête
        assert_eq!(p.snapshot(), vec!["b.mp3", "c.mp3", "d.mp3", "a.mp3"]);
    }

    #[test]
    fn test_reload_resets_to_sorted_head_when_current_gone() {
        let mut p = playlist(&["a.mp3", "b.mp3"]);
        p.advance(); // courante = b.mp3

        p.reload(vec!["c.mp3".into(), "a.mp3".into()]);
        assert_eq!(p.current(), Some("a.mp3"));
    }
}
