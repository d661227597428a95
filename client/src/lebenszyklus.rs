//! Lebenszyklus-Quelle aus OS-Signalen
//!
//! Der Session-Kern kennt keine Plattform-APIs; dieser Client speist
//! die abstrakten Lebenszyklus-Ereignisse aus Unix-Signalen:
//! - SIGUSR1 -> Hintergrund (Mikrofon stumm)
//! - SIGUSR2 -> Vordergrund
//! Beenden (SIGINT) behandelt der Hauptlauf selbst.

use tokio::sync::mpsc;
use tracing::debug;

use tincan_core::LifecycleEreignis;

/// Verdrahtet die Signal-Handler mit dem Lebenszyklus-Kanal
#[cfg(unix)]
pub fn signale_verdrahten(sender: mpsc::Sender<LifecycleEreignis>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hintergrund = signal(SignalKind::user_defined1())?;
    let mut vordergrund = signal(SignalKind::user_defined2())?;

    let hintergrund_tx = sender.clone();
    tokio::spawn(async move {
        while hintergrund.recv().await.is_some() {
            debug!("SIGUSR1 empfangen -> Hintergrund");
            let _ = hintergrund_tx.send(LifecycleEreignis::Hintergrund).await;
        }
    });

    tokio::spawn(async move {
        while vordergrund.recv().await.is_some() {
            debug!("SIGUSR2 empfangen -> Vordergrund");
            let _ = sender.send(LifecycleEreignis::Vordergrund).await;
        }
    });

    Ok(())
}

/// Ohne Unix-Signale gibt es keine Hintergrund-Erkennung
#[cfg(not(unix))]
pub fn signale_verdrahten(sender: mpsc::Sender<LifecycleEreignis>) -> std::io::Result<()> {
    debug!("Keine Lebenszyklus-Signale auf dieser Plattform");
    drop(sender);
    Ok(())
}
