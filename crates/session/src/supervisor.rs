//! SessionSupervisor – oberster Besitzer der Session
//!
//! Erstellt genau eine PeerSession pro Lauf, verdrahtet sie mit einer
//! abstrakten Lebenszyklus-Quelle und stellt das Status-Observable
//! nach aussen bereit. Der Kern haengt damit an keiner UI- oder
//! Plattform-API; wer einbettet, speist `LifecycleEreignis`-Werte ein.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use tincan_core::{LifecycleEreignis, SessionConfig, SessionStatus};
use tincan_media::{CaptureBackend, MediaController};
use tincan_signaling::SignalingChannel;

use crate::link::PeerConnector;
use crate::session::{PeerSession, PeerSessionHandle};

/// Oberster Besitzer einer laufenden Session
pub struct SessionSupervisor {
    handle: PeerSessionHandle,
    session_task: JoinHandle<()>,
    lifecycle_task: JoinHandle<()>,
}

impl SessionSupervisor {
    /// Startet die Session und die Lebenszyklus-Weiterleitung
    pub fn starten<K, B, C>(
        config: SessionConfig,
        kanal: K,
        medien: MediaController<B>,
        connector: C,
        mut lebenszyklus: mpsc::Receiver<LifecycleEreignis>,
    ) -> Self
    where
        K: SignalingChannel + 'static,
        B: CaptureBackend + 'static,
        C: PeerConnector + 'static,
        C::Link: 'static,
    {
        let (session, handle) = PeerSession::neu(config, kanal, medien, connector);
        let session_task = tokio::spawn(session.betreiben());

        let lifecycle_handle = handle.clone();
        let lifecycle_task = tokio::spawn(async move {
            while let Some(ereignis) = lebenszyklus.recv().await {
                match ereignis {
                    LifecycleEreignis::Hintergrund => lifecycle_handle.hintergrund().await,
                    LifecycleEreignis::Vordergrund => lifecycle_handle.vordergrund().await,
                    LifecycleEreignis::Beenden => {
                        lifecycle_handle.stoppen().await;
                        break;
                    }
                }
            }
            debug!("Lebenszyklus-Quelle geschlossen");
        });

        Self {
            handle,
            session_task,
            lifecycle_task,
        }
    }

    /// Status-Observable; ausser dem Status wird nichts exponiert
    pub fn status(&self) -> watch::Receiver<SessionStatus> {
        self.handle.status()
    }

    /// Steuer-Handle der Session
    pub fn handle(&self) -> &PeerSessionHandle {
        &self.handle
    }

    /// Baut die Session ab und wartet auf das Ende des Session-Tasks
    pub async fn beenden(self) {
        self.handle.stoppen().await;
        let _ = self.session_task.await;
        self.lifecycle_task.abort();
    }
}
