//! Lokaler Audio-Track und Sample-Abgriff

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::capture::CaptureConsumer;

/// Der lokale Mikrofon-Track
///
/// Existenz und Aktiv-Zustand sind getrennt: der Track wird einmal pro
/// Lauf angelegt und die Hardware laeuft ueber Mute/Unmute hinweg
/// weiter; nur das `aktiv`-Flag wird geschaltet. Der Encoder-Pump liest
/// dasselbe Flag und verwirft Frames solange es aus ist.
#[derive(Debug, Clone)]
pub struct LocalAudioTrack {
    aktiv: Arc<AtomicBool>,
    sample_rate: u32,
    kanaele: u16,
}

impl LocalAudioTrack {
    /// Erstellt einen neuen, zunaechst inaktiven Track
    pub(crate) fn neu(sample_rate: u32, kanaele: u16) -> Self {
        Self {
            aktiv: Arc::new(AtomicBool::new(false)),
            sample_rate,
            kanaele,
        }
    }

    /// Schaltet den Track an oder aus
    pub fn schalten(&self, aktiv: bool) {
        self.aktiv.store(aktiv, Ordering::Relaxed);
    }

    /// Ist der Track gerade aktiv?
    pub fn ist_aktiv(&self) -> bool {
        self.aktiv.load(Ordering::Relaxed)
    }

    /// Abtastrate des Tracks in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Kanalanzahl des Tracks
    pub fn kanaele(&self) -> u16 {
        self.kanaele
    }

    /// Geteiltes Aktiv-Flag (fuer den Encoder-Pump)
    pub(crate) fn aktiv_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.aktiv)
    }
}

/// Sample-Abgriff fuer die Peer-Verbindung
///
/// Wird genau einmal pro Track vergeben und beim Anhaengen des Tracks
/// an die Verbindung uebergeben. Das `aktiv`-Flag ist mit dem Track
/// geteilt.
pub struct AudioFeed {
    /// Lock-free Consumer der Capture-Samples
    pub samples: CaptureConsumer,
    /// Geteiltes Aktiv-Flag des Tracks
    pub aktiv: Arc<AtomicBool>,
    /// Abtastrate in Hz
    pub sample_rate: u32,
    /// Kanalanzahl
    pub kanaele: u16,
}
