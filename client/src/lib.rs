//! tincan-client – Headless-Client fuer eine Peer-Audio-Session
//!
//! Verdrahtet die Bausteine zu einem lauffaehigen Programm:
//! TCP-Vermittlungskanal, cpal-Mikrofon, webrtc-Peer-Verbindung und
//! der SessionSupervisor. Praesentation ist hier bewusst minimal –
//! jeder Statuswechsel wird geloggt, mehr Oberflaeche gibt es nicht.

pub mod config;
pub mod lebenszyklus;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use tincan_core::LifecycleEreignis;
use tincan_media::{CpalBackend, MediaController};
use tincan_rtc::RtcConnector;
use tincan_session::SessionSupervisor;
use tincan_signaling::TcpSignalingChannel;

use crate::config::ClientConfig;

/// Startet die Session und laeuft bis zum Beenden-Signal
pub async fn ausfuehren(config: ClientConfig) -> Result<()> {
    let kanal = TcpSignalingChannel::neu(config.signaling_adresse());
    let medien = MediaController::neu(CpalBackend::neu(), config.audio.clone());
    let connector = RtcConnector::neu();

    let (lebenszyklus_tx, lebenszyklus_rx) = mpsc::channel(8);
    lebenszyklus::signale_verdrahten(lebenszyklus_tx.clone())?;

    let supervisor = SessionSupervisor::starten(
        config.session.clone(),
        kanal,
        medien,
        connector,
        lebenszyklus_rx,
    );

    // Statuswechsel als einzige "Oberflaeche" des Clients
    let mut status = supervisor.status();
    let status_task = tokio::spawn(async move {
        loop {
            let aktuell = *status.borrow_and_update();
            info!(status = %aktuell, "Session-Status");
            if status.changed().await.is_err() {
                break;
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Beende auf Benutzerwunsch");
    let _ = lebenszyklus_tx.send(LifecycleEreignis::Beenden).await;
    supervisor.beenden().await;
    status_task.abort();

    Ok(())
}
