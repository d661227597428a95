//! tincan-protocol – Signaling-Nachrichten und Wire-Format
//!
//! Definiert die geschlossene Menge der Signaling-Ereignisse, die
//! zwischen Client und Gegenstelle ueber den Vermittlungskanal laufen,
//! sowie das Frame-Format (u32 BE Laenge + JSON-Payload).
//!
//! ## Design
//! - Tagged Enum fuer typsichere Ereignisse; untypisierte Payloads
//!   kommen nicht an der Zustandsmaschine vorbei
//! - SDP- und Kandidaten-Payloads bleiben opak und werden unveraendert
//!   weitergereicht
//! - JSON-Serialisierung via serde (Signaling ist nicht zeitkritisch)

pub mod signal;
pub mod wire;

// Bequeme Re-Exporte
pub use signal::{IceCandidate, SessionDescription, SignalEvent};
pub use wire::SignalCodec;
