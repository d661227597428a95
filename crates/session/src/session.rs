//! PeerSession – die Verhandlungs-Zustandsmaschine
//!
//! Eine Session besitzt Vermittlungskanal, Peer-Verbindung und
//! MediaController als private Felder mit explizitem Lebenszyklus;
//! es gibt keinen globalen Zustand. Alle Ereignisse laufen durch eine
//! einzige `select!`-Schleife (biased: Befehle zuerst), die
//! Zustandsmaschine ist dadurch nie reentrant.
//!
//! ## Zustaende
//!
//! ```text
//! Getrennt -> Verbindet -> Verbunden -> Sendet <-> Stumm
//!                  \________\_____________\________/
//!                            v
//!                       Gescheitert   (aus jedem Zustand)
//!                            |
//!                         Abbau -> Getrennt (Endzustand)
//! ```

use std::collections::VecDeque;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, trace, warn};

use tincan_core::{SessionConfig, SessionStatus, SitzungsId};
use tincan_media::{CaptureBackend, MediaController};
use tincan_protocol::{IceCandidate, SessionDescription, SignalEvent};
use tincan_signaling::{ChannelError, SignalingChannel};

use crate::error::{SessionError, SessionResult};
use crate::link::{LinkEreignis, LinkFehler, PeerConnector, PeerLink};

/// Kapazitaet der Befehls-Warteschlange
const BEFEHL_KAPAZITAET: usize = 16;

// ---------------------------------------------------------------------------
// Befehle und Handle
// ---------------------------------------------------------------------------

/// Befehle von aussen an die Session-Schleife
#[derive(Debug)]
enum SessionBefehl {
    /// Session abbauen; bestaetigt sobald alles freigegeben ist
    Stoppen(oneshot::Sender<()>),
    /// Anwendung hat den Vordergrund verloren
    Hintergrund,
    /// Anwendung ist wieder im Vordergrund
    Vordergrund,
}

/// Steuer-Handle einer laufenden Session
///
/// Alle Methoden sind idempotent und auch nach Ende des Session-Tasks
/// gefahrlos aufrufbar.
#[derive(Clone)]
pub struct PeerSessionHandle {
    befehle: mpsc::Sender<SessionBefehl>,
    stop: std::sync::Arc<watch::Sender<bool>>,
    status_rx: watch::Receiver<SessionStatus>,
}

impl PeerSessionHandle {
    /// Status-Observable fuer die Praesentationsschicht
    pub fn status(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }

    /// Momentaner Status
    pub fn aktueller_status(&self) -> SessionStatus {
        *self.status_rx.borrow()
    }

    /// Baut die Session ab; idempotent, aus jedem Zustand erlaubt
    ///
    /// Der Abbau hat Vorrang: das Stop-Flag wird vor dem Befehl
    /// gesetzt, damit auch ein laufendes Kandidaten-Nachspiel sofort
    /// abbricht.
    pub async fn stoppen(&self) {
        let _ = self.stop.send(true);
        let (ack_tx, ack_rx) = oneshot::channel();
        if self
            .befehle
            .send(SessionBefehl::Stoppen(ack_tx))
            .await
            .is_err()
        {
            // Session-Task bereits beendet
            return;
        }
        let _ = ack_rx.await;
    }

    /// Meldet Vordergrund-Verlust (Mikrofon wird stummgeschaltet)
    pub async fn hintergrund(&self) {
        let _ = self.befehle.send(SessionBefehl::Hintergrund).await;
    }

    /// Meldet Rueckkehr in den Vordergrund
    pub async fn vordergrund(&self) {
        let _ = self.befehle.send(SessionBefehl::Vordergrund).await;
    }
}

// ---------------------------------------------------------------------------
// PeerSession
// ---------------------------------------------------------------------------

/// Die Verhandlungs-Zustandsmaschine
///
/// Lebenszyklus:
/// 1. `neu()` – Session und Handle erstellen
/// 2. `betreiben()` – in einem Task laufen lassen; faehrt Kanal und
///    Peer-Verbindung hoch und verarbeitet dann Ereignisse
/// 3. `PeerSessionHandle::stoppen()` – Abbau, Endzustand `Getrennt`
pub struct PeerSession<K, B, C>
where
    K: SignalingChannel,
    B: CaptureBackend,
    C: PeerConnector,
{
    id: SitzungsId,
    config: SessionConfig,
    kanal: K,
    medien: MediaController<B>,
    connector: C,
    link: Option<C::Link>,

    status_tx: watch::Sender<SessionStatus>,
    befehle: mpsc::Receiver<SessionBefehl>,
    stop_rx: watch::Receiver<bool>,
    link_ereignisse: mpsc::UnboundedReceiver<LinkEreignis>,
    // Haelt den Kanal offen, auch solange kein Link existiert
    link_ereignis_tx: mpsc::UnboundedSender<LinkEreignis>,

    /// Kandidaten die vor der Remote-Beschreibung ankamen (FIFO);
    /// wird genau einmal nachgespielt und bleibt danach leer
    kandidaten: VecDeque<IceCandidate>,
    offer_gesendet: bool,
    remote_gesetzt: bool,
    kanal_offen: bool,
}

impl<K, B, C> PeerSession<K, B, C>
where
    K: SignalingChannel,
    B: CaptureBackend,
    C: PeerConnector,
{
    /// Erstellt eine neue Session samt Steuer-Handle
    pub fn neu(
        config: SessionConfig,
        kanal: K,
        medien: MediaController<B>,
        connector: C,
    ) -> (Self, PeerSessionHandle) {
        let (status_tx, status_rx) = watch::channel(SessionStatus::Getrennt);
        let (befehl_tx, befehl_rx) = mpsc::channel(BEFEHL_KAPAZITAET);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (link_ereignis_tx, link_ereignisse) = mpsc::unbounded_channel();

        let session = Self {
            id: SitzungsId::neu(),
            config,
            kanal,
            medien,
            connector,
            link: None,
            status_tx,
            befehle: befehl_rx,
            stop_rx,
            link_ereignisse,
            link_ereignis_tx,
            kandidaten: VecDeque::new(),
            offer_gesendet: false,
            remote_gesetzt: false,
            kanal_offen: true,
        };

        let handle = PeerSessionHandle {
            befehle: befehl_tx,
            stop: std::sync::Arc::new(stop_tx),
            status_rx,
        };

        (session, handle)
    }

    /// Faehrt die Session hoch und verarbeitet Ereignisse bis zum Abbau
    pub async fn betreiben(mut self) {
        info!(sitzung = %self.id, "Session startet");
        if let Err(fehler) = self.hochfahren().await {
            self.fehlschlagen(fehler).await;
        }
        self.ereignis_schleife().await;
        info!(sitzung = %self.id, "Session-Task beendet");
    }

    // -----------------------------------------------------------------------
    // Aufbau
    // -----------------------------------------------------------------------

    /// Oeffnet den Vermittlungskanal und erstellt die Peer-Verbindung
    ///
    /// Der Kandidaten-Callback haengt ab Verbindungserstellung am Link,
    /// also sicher vor der ersten Offer.
    async fn hochfahren(&mut self) -> SessionResult<()> {
        self.status_setzen(SessionStatus::Verbindet);

        tokio::time::timeout(self.config.aufbau_timeout(), self.kanal.verbinden())
            .await
            .map_err(|_| SessionError::Zeitlimit("Kanalaufbau"))??;

        let link = self
            .connector
            .verbinden(&self.config.ice_server, self.link_ereignis_tx.clone())
            .await?;
        self.link = Some(link);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Ereignisschleife
    // -----------------------------------------------------------------------

    async fn ereignis_schleife(&mut self) {
        loop {
            tokio::select! {
                biased;

                befehl = self.befehle.recv() => {
                    match befehl {
                        Some(SessionBefehl::Stoppen(ack)) => {
                            self.abbauen().await;
                            let _ = ack.send(());
                            break;
                        }
                        None => {
                            // Alle Handles weg: niemand kann mehr stoppen
                            self.abbauen().await;
                            break;
                        }
                        Some(SessionBefehl::Hintergrund) => self.hintergrund(),
                        Some(SessionBefehl::Vordergrund) => self.vordergrund(),
                    }
                }

                Some(ereignis) = self.link_ereignisse.recv() => {
                    self.link_ereignis_verarbeiten(ereignis).await;
                }

                ereignis = self.kanal.empfangen(), if self.kanal_offen => {
                    match ereignis {
                        Some(Ok(ereignis)) => self.signal_verarbeiten(ereignis).await,
                        Some(Err(fehler)) => {
                            self.kanal_offen = false;
                            self.fehlschlagen(fehler.into()).await;
                        }
                        None => {
                            self.kanal_offen = false;
                            self.fehlschlagen(ChannelError::Getrennt.into()).await;
                        }
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Signaling-Ereignisse
    // -----------------------------------------------------------------------

    async fn signal_verarbeiten(&mut self, ereignis: SignalEvent) {
        if self.status().ist_endzustand() {
            debug!(ereignis = ereignis.name(), status = %self.status(), "Ereignis im Endzustand ignoriert");
            return;
        }
        match ereignis {
            SignalEvent::Connect => self.auf_verbunden(),
            SignalEvent::AudioToggle { enabled } => self.audio_schalten(enabled).await,
            SignalEvent::Answer(antwort) => self.antwort_verarbeiten(antwort).await,
            SignalEvent::IceCandidate(kandidat) => self.kandidat_verarbeiten(kandidat).await,
            SignalEvent::Offer(_) => {
                // Wir sind die anbietende Seite; eine eingehende Offer
                // ist eine Protokollverletzung
                warn!("Offer von der Gegenstelle empfangen – ignoriert");
            }
        }
    }

    fn auf_verbunden(&mut self) {
        if self.status() == SessionStatus::Verbindet {
            self.status_setzen(SessionStatus::Verbunden);
        } else {
            debug!(status = %self.status(), "connect-Ereignis ignoriert");
        }
    }

    /// Mikrofon-Umschaltung durch die Gegenstelle
    ///
    /// Gleiche Booleans hintereinander sind wirkungslos. Der erste
    /// Einschalt-Vorgang laeuft ueber den einmaligen Streaming-Aufbau
    /// (Track anhaengen + Offer), jeder weitere schaltet nur das Flag.
    async fn audio_schalten(&mut self, aktiv: bool) {
        if aktiv {
            if self.medien.hat_track() {
                if self.status() == SessionStatus::Sendet && self.medien.ist_aktiv() {
                    debug!("audio-toggle(true) ohne Wirkung – sendet bereits");
                    return;
                }
                self.medien.schalten(true);
                self.status_setzen(SessionStatus::Sendet);
            } else {
                self.streaming_beginnen().await;
            }
        } else {
            match self.status() {
                SessionStatus::Stumm => {
                    debug!("audio-toggle(false) ohne Wirkung – bereits stumm");
                }
                SessionStatus::Sendet | SessionStatus::Verbunden => {
                    self.medien.schalten(false);
                    self.status_setzen(SessionStatus::Stumm);
                }
                andere => debug!(status = %andere, "audio-toggle(false) ignoriert"),
            }
        }
    }

    /// Einmaliger Streaming-Aufbau beim ersten Einschalten
    async fn streaming_beginnen(&mut self) {
        if let Err(fehler) = self.streaming_aufsetzen().await {
            self.fehlschlagen(fehler).await;
            return;
        }
        self.offer_gesendet = true;
        self.medien.schalten(true);
        self.status_setzen(SessionStatus::Sendet);
        info!(sitzung = %self.id, "Streaming gestartet, Offer gesendet");
    }

    async fn streaming_aufsetzen(&mut self) -> SessionResult<()> {
        // (a) Hardware beschaffen (idempotent, einmal pro Lauf)
        self.medien.aufnahme_sicherstellen()?;
        let feed = self.medien.abgriff()?;

        // (b) Track an die Peer-Verbindung haengen
        let link = self
            .link
            .as_mut()
            .ok_or_else(|| LinkFehler::Transport("keine Peer-Verbindung".into()))?;
        link.track_anhaengen(feed).await?;

        // (c) Offer erstellen, als lokale Beschreibung setzen, senden
        let offer = tokio::time::timeout(self.config.aufbau_timeout(), link.offer_erstellen())
            .await
            .map_err(|_| SessionError::Zeitlimit("Offer-Erstellung"))??;
        self.kanal.senden(SignalEvent::Offer(offer)).await?;
        Ok(())
    }

    /// Answer der Gegenstelle
    ///
    /// Vor der eigenen Offer: Protokollverletzung, loggen und
    /// ignorieren. Doppelt: wirkungslos. Nach Erfolg werden die
    /// eingereihten Kandidaten in Ankunftsreihenfolge nachgespielt.
    async fn antwort_verarbeiten(&mut self, antwort: SessionDescription) {
        if !self.offer_gesendet {
            warn!("Answer vor eigener Offer empfangen – ignoriert");
            return;
        }
        if self.remote_gesetzt {
            debug!("Answer bereits angewendet – ignoriert");
            return;
        }
        let Some(link) = self.link.as_mut() else {
            return;
        };
        match link.antwort_anwenden(antwort).await {
            Ok(()) => {
                self.remote_gesetzt = true;
                info!(sitzung = %self.id, "Remote-Beschreibung gesetzt");
                self.kandidaten_nachspielen().await;
                // Answer-Ankunft heisst: Medien fliessen
                if matches!(
                    self.status(),
                    SessionStatus::Verbindet | SessionStatus::Verbunden
                ) {
                    self.status_setzen(SessionStatus::Sendet);
                }
            }
            Err(fehler) => self.fehlschlagen(fehler.into()).await,
        }
    }

    /// Entfernter ICE-Kandidat
    ///
    /// Vor der Remote-Beschreibung wird eingereiht statt verworfen –
    /// der Transport garantiert keine Reihenfolge relativ zur Answer.
    async fn kandidat_verarbeiten(&mut self, kandidat: IceCandidate) {
        if self.remote_gesetzt {
            self.kandidat_anwenden(kandidat).await;
        } else {
            self.kandidaten.push_back(kandidat);
            debug!(
                eingereiht = self.kandidaten.len(),
                "Kandidat vor Remote-Beschreibung eingereiht"
            );
        }
    }

    async fn kandidat_anwenden(&mut self, kandidat: IceCandidate) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        if let Err(fehler) = link.kandidat_anwenden(kandidat).await {
            // Ein einzelner fehlerhafter Kandidat bricht die Session nicht ab
            warn!("ICE-Kandidat verworfen: {}", fehler);
        }
    }

    /// Spielt die Warteschlange genau einmal nach, in Ankunftsreihenfolge
    async fn kandidaten_nachspielen(&mut self) {
        if self.kandidaten.is_empty() {
            return;
        }
        debug!(anzahl = self.kandidaten.len(), "Spiele eingereihte Kandidaten nach");
        while let Some(kandidat) = self.kandidaten.pop_front() {
            if *self.stop_rx.borrow() {
                debug!("Abbau angefordert – Kandidaten-Nachspiel abgebrochen");
                return;
            }
            self.kandidat_anwenden(kandidat).await;
        }
    }

    // -----------------------------------------------------------------------
    // Link-Ereignisse
    // -----------------------------------------------------------------------

    async fn link_ereignis_verarbeiten(&mut self, ereignis: LinkEreignis) {
        if self.status().ist_endzustand() {
            return;
        }
        match ereignis {
            LinkEreignis::LokalerKandidat(kandidat) => {
                // Sofort verschicken, kein Sammeln
                if let Err(fehler) = self.kanal.senden(SignalEvent::IceCandidate(kandidat)).await {
                    self.fehlschlagen(fehler.into()).await;
                }
            }
            LinkEreignis::VerbindungGescheitert(grund) => {
                self.fehlschlagen(LinkFehler::Transport(grund).into()).await;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lebenszyklus
    // -----------------------------------------------------------------------

    /// Vordergrund verloren: Mikrofon aus, Verbindung bleibt stehen
    fn hintergrund(&mut self) {
        if self.status().ist_endzustand() {
            return;
        }
        self.medien.schalten(false);
        self.status_setzen(SessionStatus::Stumm);
        info!("Vordergrund verloren – Mikrofon stummgeschaltet");
    }

    fn vordergrund(&mut self) {
        // Kein Auto-Unmute: nur die Gegenstelle schaltet wieder ein
        trace!("Vordergrund zurueck");
    }

    /// Unwiederbringlicher Fehler: Verbindung schliessen, Status Gescheitert
    async fn fehlschlagen(&mut self, fehler: SessionError) {
        if self.status().ist_endzustand() {
            debug!("Folgefehler im Endzustand: {}", fehler);
            return;
        }
        error!(sitzung = %self.id, fehler = %fehler, "Session unwiederbringlich gescheitert");
        if let Some(mut link) = self.link.take() {
            link.schliessen().await;
        }
        self.status_setzen(SessionStatus::Gescheitert);
    }

    /// Abbau: Mikrofon freigeben, Verbindung und Kanal schliessen
    ///
    /// Aus jedem Zustand erlaubt, auch aus `Gescheitert`; mehrfacher
    /// Aufruf ist wirkungslos.
    async fn abbauen(&mut self) {
        self.medien.freigeben();
        if let Some(mut link) = self.link.take() {
            link.schliessen().await;
        }
        self.kanal.trennen().await;
        self.kandidaten.clear();
        self.status_setzen(SessionStatus::Getrennt);
        info!(sitzung = %self.id, "Session abgebaut");
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    fn status(&self) -> SessionStatus {
        *self.status_tx.borrow()
    }

    fn status_setzen(&self, neu: SessionStatus) {
        let alt = self.status();
        if alt != neu {
            info!(von = %alt, nach = %neu, "Statuswechsel");
            let _ = self.status_tx.send(neu);
        }
    }
}
