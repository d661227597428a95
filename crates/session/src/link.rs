//! Schnittstelle zur Peer-Verbindung
//!
//! Die Session besitzt genau einen `PeerLink` pro Lauf (keine
//! Neuverhandlung, kein ICE-Restart). Die konkrete Implementierung
//! (tincan-rtc) sitzt hinter diesen Traits, damit die Zustandsmaschine
//! ohne Netzwerk getestet werden kann.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use tincan_core::IceServerEintrag;
use tincan_media::AudioFeed;
use tincan_protocol::{IceCandidate, SessionDescription};

/// Fehler der Peer-Verbindung
#[derive(Debug, Error)]
pub enum LinkFehler {
    /// Offer/Answer-Austausch fehlerhaft oder abgelehnt
    #[error("Verhandlung fehlgeschlagen: {0}")]
    Verhandlung(String),

    /// Einzelner Kandidat nicht anwendbar (bricht die Session nicht ab)
    #[error("Kandidat nicht anwendbar: {0}")]
    Kandidat(String),

    /// Verbindung oder Medientransport gescheitert
    #[error("Transportfehler: {0}")]
    Transport(String),
}

/// Asynchrone Ereignisse der Peer-Verbindung
///
/// Werden vom Link ueber einen Kanal in die Session-Schleife gespeist,
/// damit auch diese Uebergaenge serialisiert ablaufen.
#[derive(Debug)]
pub enum LinkEreignis {
    /// Die Verbindung hat einen lokalen Kandidaten erzeugt; er wird
    /// sofort (ohne Sammeln) ueber den Vermittlungskanal verschickt
    LokalerKandidat(IceCandidate),
    /// Die Verbindung ist unwiederbringlich gescheitert
    VerbindungGescheitert(String),
}

/// Erzeugt die Peer-Verbindung beim Session-Start
#[async_trait]
pub trait PeerConnector: Send {
    type Link: PeerLink;

    /// Baut die Verbindung auf und registriert den Kandidaten-Callback
    ///
    /// Der Callback MUSS vor der Offer-Erstellung stehen, sonst gehen
    /// fruehe Kandidaten verloren.
    async fn verbinden(
        &mut self,
        ice_server: &[IceServerEintrag],
        ereignisse: mpsc::UnboundedSender<LinkEreignis>,
    ) -> Result<Self::Link, LinkFehler>;
}

/// Die verhandelte Peer-Verbindung
#[async_trait]
pub trait PeerLink: Send {
    /// Haengt den lokalen Audio-Track an; genau einmal pro Verbindung
    async fn track_anhaengen(&mut self, feed: AudioFeed) -> Result<(), LinkFehler>;

    /// Erstellt die Offer und setzt sie als lokale Beschreibung
    async fn offer_erstellen(&mut self) -> Result<SessionDescription, LinkFehler>;

    /// Setzt die Answer der Gegenstelle als entfernte Beschreibung
    async fn antwort_anwenden(&mut self, antwort: SessionDescription) -> Result<(), LinkFehler>;

    /// Wendet einen entfernten ICE-Kandidaten an
    async fn kandidat_anwenden(&mut self, kandidat: IceCandidate) -> Result<(), LinkFehler>;

    /// Schliesst die Verbindung; Fehler werden verworfen
    async fn schliessen(&mut self);
}
