//! Tests d'intégration du moteur de diffusion complet
//!
//! Les pistes sont des fichiers synthétiques sans métadonnées lisibles :
//! la politique de repli s'applique (16 000 o/s), ce qui donne des durées
//! de diffusion courtes et prévisibles (taille / 16 000 secondes).

use pmoradio::{
    AudioLibrary, BroadcastOptions, Broadcaster, ListenerRegistry, PlaybackClock, Playlist,
    RadioConfig, Station, TrackInfo,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Contenu synthétique reconnaissable (octets 0,1,2,...,255,0,1,...)
fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

fn write_track(dir: &std::path::Path, name: &str, len: usize) {
    std::fs::write(dir.join(name), pattern(len)).unwrap();
}

async fn station_on(dir: &std::path::Path) -> Station {
    let config = RadioConfig {
        audio_dir: dir.to_path_buf(),
        ..RadioConfig::default()
    };
    Station::new(config).await.unwrap()
}

/// Assemble une boucle de diffusion directe sur un répertoire
fn broadcaster_on(
    dir: &std::path::Path,
    playlist: Playlist,
    options: BroadcastOptions,
) -> (Broadcaster, PlaybackClock, ListenerRegistry) {
    let library = AudioLibrary::new(dir).unwrap();
    let clock = PlaybackClock::new();
    let listeners = ListenerRegistry::new();
    let broadcaster = Broadcaster::new(
        library,
        Arc::new(RwLock::new(playlist)),
        clock.clone(),
        listeners.clone(),
        options,
    );
    (broadcaster, clock, listeners)
}

#[tokio::test]
async fn test_pacing_matches_declared_byte_rate() {
    let dir = tempfile::tempdir().unwrap();
    // 16 000 octets à 16 000 o/s : une passe dure nominalement 1 seconde
    let track_len = TrackInfo::DEFAULT_BYTE_RATE as usize;
    write_track(dir.path(), "only.mp3", track_len);

    let station = station_on(dir.path()).await;

    // Plusieurs auditeurs : le pacing ne dépend pas de l'audience
    let mut listener = station.register_listener();
    for _ in 0..4 {
        let mut extra = station.register_listener();
        tokio::spawn(async move { while extra.recv().await.is_some() {} });
    }

    station.start();

    // Première passe : vérifier contenu et ordre
    let mut received = Vec::new();
    let first = listener.recv().await.expect("stream ended");
    let first_chunk_at = Instant::now();
    received.extend_from_slice(&first);
    while received.len() < track_len {
        let chunk = listener.recv().await.expect("stream ended");
        received.extend_from_slice(&chunk);
    }
    assert_eq!(&received[..track_len], &pattern(track_len)[..]);

    // La piste unique tourne sur elle-même : le premier chunk de la passe
    // suivante marque la fin de la transmission de la première passe
    while received.len() <= track_len {
        let chunk = listener.recv().await.expect("stream ended");
        received.extend_from_slice(&chunk);
    }
    let elapsed = first_chunk_at.elapsed();

    // Tolérance : ~2 durées de chunk (8192/16000 ≈ 0,51 s chacune)
    assert!(
        elapsed >= Duration::from_millis(800),
        "transmission too fast: {elapsed:?}"
    );
    assert!(
        elapsed <= Duration::from_millis(2200),
        "transmission too slow: {elapsed:?}"
    );

    station.shutdown().await;
}

#[tokio::test]
async fn test_two_track_rotation_order() {
    let dir = tempfile::tempdir().unwrap();
    // a ≈ 0,5 s et b ≈ 0,25 s au débit de repli
    write_track(dir.path(), "a.mp3", 8_000);
    write_track(dir.path(), "b.mp3", 4_000);

    let station = station_on(dir.path()).await;
    station.start();

    // Observer la séquence des pistes courantes
    let mut observed: Vec<String> = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(track) = station.status().await.current_track {
            if observed.last() != Some(&track) {
                observed.push(track);
            }
        }
        if observed.len() >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(
        observed.len() >= 3,
        "not enough rotations observed: {observed:?}"
    );
    assert_eq!(
        observed[..3],
        ["a.mp3".to_string(), "b.mp3".to_string(), "a.mp3".to_string()],
        "unexpected rotation sequence: {observed:?}"
    );

    station.shutdown().await;
}

#[tokio::test]
async fn test_idle_station_picks_up_new_files() {
    let dir = tempfile::tempdir().unwrap();

    let (broadcaster, clock, _listeners) = broadcaster_on(
        dir.path(),
        Playlist::new(),
        BroadcastOptions {
            idle_poll: Duration::from_millis(100),
            ..BroadcastOptions::default()
        },
    );

    let stop = CancellationToken::new();
    let handle = broadcaster.spawn_supervised(stop.clone());

    // Bibliothèque vide : rien ne joue
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(clock.snapshot().await, None);

    // Un fichier apparaît : le prochain poll doit le découvrir
    write_track(dir.path(), "fresh.mp3", 4_000);
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut playing = None;
    while Instant::now() < deadline {
        if let Some(snapshot) = clock.snapshot().await {
            playing = Some(snapshot.track_id);
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(playing.as_deref(), Some("fresh.mp3"));

    stop.cancel();
    let _ = handle.await;
}

#[tokio::test]
async fn test_unreadable_track_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_track(dir.path(), "real.mp3", 2_000);

    // La rotation référence un fichier absent : l'ouverture échoue, la
    // boucle avance sans se terminer
    let mut playlist = Playlist::new();
    playlist.add("ghost.mp3");
    playlist.add("real.mp3");

    let (broadcaster, _clock, listeners) = broadcaster_on(
        dir.path(),
        playlist,
        BroadcastOptions::default(),
    );

    let (_id, mut rx) = listeners.register();
    let stop = CancellationToken::new();
    let handle = broadcaster.spawn_supervised(stop.clone());

    // Les octets reçus sont ceux de real.mp3
    let chunk = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no chunk within deadline")
        .expect("channel closed");
    assert_eq!(&chunk[..], &pattern(2_000)[..]);

    stop.cancel();
    let _ = handle.await;
}
