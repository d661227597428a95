//! MediaController – Capture-Lebenszyklus und Mute-Zustand
//!
//! Der Controller ist die einzige Stelle, die Hardware beschafft und
//! wieder freigibt. Er wird ausschliesslich aus dem Session-Task heraus
//! benutzt, braucht also keine eigene Synchronisation.

use tracing::{debug, info};

use crate::capture::{Aufnahme, CaptureBackend, CaptureConfig};
use crate::error::{MediaError, MediaResult};
use crate::track::{AudioFeed, LocalAudioTrack};

/// Verwaltet Mikrofon-Beschaffung und Aktiv-Flag
pub struct MediaController<B: CaptureBackend> {
    backend: B,
    config: CaptureConfig,
    aufnahme: Option<Aufnahme>,
    track: Option<LocalAudioTrack>,
}

impl<B: CaptureBackend> MediaController<B> {
    /// Erstellt einen Controller ohne beschaffte Hardware
    pub fn neu(backend: B, config: CaptureConfig) -> Self {
        Self {
            backend,
            config,
            aufnahme: None,
            track: None,
        }
    }

    /// Beschafft die Hardware beim ersten Aufruf; idempotent
    ///
    /// Weitere Aufrufe geben den bestehenden Track zurueck, ohne das
    /// Geraet erneut zu beschaffen.
    pub fn aufnahme_sicherstellen(&mut self) -> MediaResult<&LocalAudioTrack> {
        if self.track.is_none() {
            let aufnahme = self.backend.oeffnen(&self.config)?;
            self.aufnahme = Some(aufnahme);
            self.track = Some(LocalAudioTrack::neu(
                self.config.sample_rate,
                self.config.kanaele,
            ));
            info!(
                sample_rate = self.config.sample_rate,
                kanaele = self.config.kanaele,
                "Mikrofon beschafft"
            );
        }
        // track wurde soeben gesetzt falls er fehlte
        self.track.as_ref().ok_or(MediaError::KeinTrack)
    }

    /// Entnimmt den Sample-Abgriff fuer die Peer-Verbindung
    ///
    /// Nur einmal moeglich – der Track wird genau einmal angehaengt.
    pub fn abgriff(&mut self) -> MediaResult<AudioFeed> {
        let track = self.track.as_ref().ok_or(MediaError::KeinTrack)?;
        let aufnahme = self.aufnahme.as_mut().ok_or(MediaError::KeinTrack)?;
        let samples = aufnahme
            .samples_abgreifen()
            .ok_or(MediaError::AbgriffBereitsVergeben)?;
        Ok(AudioFeed {
            samples,
            aktiv: track.aktiv_flag(),
            sample_rate: track.sample_rate(),
            kanaele: track.kanaele(),
        })
    }

    /// Schaltet das Mikrofon an oder aus
    ///
    /// Kein Fehler wenn noch kein Track existiert – wer einschaltet,
    /// muss vorher `aufnahme_sicherstellen` aufrufen.
    pub fn schalten(&mut self, aktiv: bool) {
        match &self.track {
            Some(track) => {
                track.schalten(aktiv);
                debug!(aktiv, "Mikrofon geschaltet");
            }
            None => debug!(aktiv, "Schalten ohne Track ignoriert"),
        }
    }

    /// Stoppt die Hardware und verwirft den Track; idempotent
    pub fn freigeben(&mut self) {
        if let Some(mut aufnahme) = self.aufnahme.take() {
            aufnahme.beenden();
            info!("Mikrofon freigegeben");
        }
        self.track = None;
    }

    /// Existiert bereits ein Track?
    pub fn hat_track(&self) -> bool {
        self.track.is_some()
    }

    /// Ist das Mikrofon gerade aktiv?
    pub fn ist_aktiv(&self) -> bool {
        self.track.as_ref().is_some_and(|t| t.ist_aktiv())
    }
}
