//! Tests des SessionSupervisors

use tokio::sync::mpsc;

use tincan_core::{LifecycleEreignis, SessionConfig, SessionStatus};
use tincan_media::{CaptureConfig, MediaController};
use tincan_protocol::SignalEvent;

use super::mocks::*;
use crate::supervisor::SessionSupervisor;

/// Startet einen Supervisor mit Standard-Attrappen
fn supervisor_starten() -> (
    SessionSupervisor,
    KanalSteuerung,
    mpsc::Sender<LifecycleEreignis>,
) {
    let (kanal, kanal_steuerung) = MockKanal::neu(false);
    let (geraet, _geraet_steuerung) = MockGeraet::neu(false);
    let (connector, _protokoll, _ereignisse) = MockConnector::neu();

    let (lebenszyklus_tx, lebenszyklus_rx) = mpsc::channel(8);
    let supervisor = SessionSupervisor::starten(
        SessionConfig::default(),
        kanal,
        MediaController::neu(geraet, CaptureConfig::default()),
        connector,
        lebenszyklus_rx,
    );
    (supervisor, kanal_steuerung, lebenszyklus_tx)
}

#[tokio::test]
async fn lebenszyklus_hintergrund_schaltet_stumm() {
    let (supervisor, kanal, lebenszyklus) = supervisor_starten();
    let mut status = supervisor.status();

    kanal.einspeisen(SignalEvent::Connect);
    kanal.einspeisen(SignalEvent::AudioToggle { enabled: true });
    status_abwarten(&mut status, SessionStatus::Sendet).await;

    lebenszyklus
        .send(LifecycleEreignis::Hintergrund)
        .await
        .unwrap();
    status_abwarten(&mut status, SessionStatus::Stumm).await;

    supervisor.beenden().await;
}

#[tokio::test]
async fn lebenszyklus_beenden_baut_ab() {
    let (supervisor, kanal, lebenszyklus) = supervisor_starten();
    let mut status = supervisor.status();

    kanal.einspeisen(SignalEvent::Connect);
    status_abwarten(&mut status, SessionStatus::Verbunden).await;

    lebenszyklus.send(LifecycleEreignis::Beenden).await.unwrap();
    status_abwarten(&mut status, SessionStatus::Getrennt).await;

    // beenden nach Lebenszyklus-Beenden bleibt gefahrlos
    supervisor.beenden().await;
}

#[tokio::test]
async fn status_observable_spiegelt_uebergaenge() {
    let (supervisor, kanal, _lebenszyklus) = supervisor_starten();
    let mut status = supervisor.status();

    status_abwarten(&mut status, SessionStatus::Verbindet).await;
    kanal.einspeisen(SignalEvent::Connect);
    status_abwarten(&mut status, SessionStatus::Verbunden).await;

    supervisor.beenden().await;
    assert_eq!(*status.borrow(), SessionStatus::Getrennt);
}
