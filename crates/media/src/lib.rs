//! tincan-media – Lokales Mikrofon und Mute-Zustand
//!
//! Besitzt den Lebenszyklus der Audioaufnahme:
//! - Capture wird genau einmal pro Lauf beschafft (lazy, beim ersten
//!   Einschalten) und laeuft ueber Mute/Unmute hinweg weiter
//! - nur das `aktiv`-Flag des Tracks wird geschaltet
//! - `freigeben` stoppt die Hardware endgueltig
//!
//! Die Hardware sitzt hinter dem `CaptureBackend`-Trait; die
//! cpal-Implementierung haelt ihren Stream auf einem dedizierten
//! Thread (cpal::Stream ist !Send) und schreibt Samples in einen
//! lock-free Ring-Buffer.

pub mod capture;
pub mod controller;
pub mod error;
pub mod track;

// Bequeme Re-Exporte der wichtigsten Typen
pub use capture::{Aufnahme, CaptureBackend, CaptureConfig, CaptureConsumer, CpalBackend};
pub use controller::MediaController;
pub use error::{MediaError, MediaResult};
pub use track::{AudioFeed, LocalAudioTrack};
