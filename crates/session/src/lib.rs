//! tincan-session – Verhandlungs-Zustandsmaschine und Supervisor
//!
//! Dieses Crate implementiert den Kern von Tincan: genau eine
//! Peer-Session pro Lauf, getrieben von Signaling-Ereignissen.
//!
//! ## Architektur
//!
//! ```text
//! SessionSupervisor
//!     |  verdrahtet Lebenszyklus-Ereignisse, haelt das Status-Observable
//!     v
//! PeerSession (ein Task, serialisierte Ereignisverarbeitung)
//!     |  Zustandsmaschine:
//!     |  Getrennt -> Verbindet -> Verbunden -> Sendet <-> Stumm
//!     |  Gescheitert aus jedem Zustand, Getrennt via Abbau
//!     |
//!     +-- SignalingChannel  (Vermittlungskanal, tincan-signaling)
//!     +-- MediaController   (Mikrofon + Mute-Flag, tincan-media)
//!     +-- PeerLink          (Peer-Verbindung, z.B. tincan-rtc)
//! ```
//!
//! Alle eingehenden Ereignisse (Kanal, Link, Lebenszyklus) laufen durch
//! eine einzige `select!`-Schleife; die Zustandsmaschine sieht nie zwei
//! Uebergaenge gleichzeitig. Der Abbau-Befehl hat Vorrang vor allen
//! anstehenden Ereignissen.

pub mod error;
pub mod link;
pub mod session;
pub mod supervisor;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{SessionError, SessionResult};
pub use link::{LinkEreignis, LinkFehler, PeerConnector, PeerLink};
pub use session::{PeerSession, PeerSessionHandle};
pub use supervisor::SessionSupervisor;
