//! tincan-rtc – Peer-Verbindung auf Basis von webrtc-rs
//!
//! Produktive Implementierung der `PeerLink`/`PeerConnector`-Traits aus
//! tincan-session:
//! - RTCPeerConnection mit fester ICE-Server-Konfiguration
//! - lokale Kandidaten gehen als `LinkEreignis` sofort an die Session
//!   (Callback haengt vor der Offer-Erstellung)
//! - der lokale Audio-Track wird als Opus ueber einen
//!   `TrackLocalStaticSample` gepumpt; das Mute-Flag des
//!   MediaControllers wirkt pro Frame

pub mod pumpe;
pub mod verbindung;

// Bequeme Re-Exporte
pub use verbindung::{RtcConnector, RtcVerbindung};
