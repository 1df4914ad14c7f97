//! ListenerRegistry : fan-out vers les canaux bornés des auditeurs
//!
//! La map id → sender est la seule structure mutée par plusieurs acteurs
//! concurrents (cycles de vie des connexions + le broadcaster). `deliver`
//! itère sur un snapshot : un auditeur enregistré en cours d'itération peut
//! manquer le chunk en vol, un auditeur retiré ne reçoit plus rien.
//!
//! Contrat de diffusion avec pertes : la push vers chaque canal est bornée
//! dans le temps ; un auditeur lent accumule des trous au lieu de bloquer
//! la station pour tout le monde.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock as StdRwLock;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Capacité du canal de chaque auditeur, en chunks (~2,4 Mo à 8 Kio/chunk)
pub const LISTENER_CHANNEL_CAPACITY: usize = 300;

/// Budget de la tentative de push vers un canal plein
pub const DELIVERY_TIMEOUT: Duration = Duration::from_millis(10);

/// Issue d'une tentative de livraison vers un auditeur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Le chunk a été mis en file dans le canal de l'auditeur
    Delivered,
    /// Canal plein (ou fermé) après le budget imparti : chunk perdu pour
    /// cet auditeur uniquement
    Dropped,
}

/// Bilan agrégé d'un fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Registre des auditeurs actifs
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<StdRwLock<HashMap<Uuid, mpsc::Sender<Bytes>>>>,
}

impl ListenerRegistry {
    /// Crée un registre vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre un nouvel auditeur
    ///
    /// Retourne son identifiant et le côté réception de son canal borné.
    pub fn register(&self) -> (Uuid, mpsc::Receiver<Bytes>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(LISTENER_CHANNEL_CAPACITY);
        self.inner.write().unwrap().insert(id, tx);
        tracing::info!(listener = %id, total = self.count(), "Listener connected");
        (id, rx)
    }

    /// Retire un auditeur (idempotent, id inconnu = no-op)
    pub fn unregister(&self, id: Uuid) -> bool {
        let removed = self.inner.write().unwrap().remove(&id).is_some();
        if removed {
            tracing::info!(listener = %id, remaining = self.count(), "Listener left");
        }
        removed
    }

    /// Nombre d'auditeurs actifs
    pub fn count(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Diffuse un chunk vers un snapshot des auditeurs enregistrés
    pub async fn deliver(&self, chunk: Bytes) -> DeliveryReport {
        let snapshot: Vec<mpsc::Sender<Bytes>> =
            self.inner.read().unwrap().values().cloned().collect();

        let mut report = DeliveryReport::default();
        for tx in snapshot {
            match offer(&tx, chunk.clone()).await {
                Delivery::Delivered => report.delivered += 1,
                Delivery::Dropped => report.dropped += 1,
            }
        }
        report
    }
}

/// Tente de pousser un chunk dans un canal, dans le budget imparti
async fn offer(tx: &mpsc::Sender<Bytes>, chunk: Bytes) -> Delivery {
    match tx.try_send(chunk) {
        Ok(()) => Delivery::Delivered,
        Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Dropped,
        Err(mpsc::error::TrySendError::Full(chunk)) => {
            match tokio::time::timeout(DELIVERY_TIMEOUT, tx.send(chunk)).await {
                Ok(Ok(())) => Delivery::Delivered,
                _ => Delivery::Dropped,
            }
        }
    }
}
