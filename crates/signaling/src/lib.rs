//! tincan-signaling – Vermittlungskanal zur Gegenstelle
//!
//! Der Signaling-Transport ist ein externer Mitspieler: die Session
//! konsumiert ihn als abstrakten Duplex-Kanal typisierter Ereignisse
//! und kuemmert sich nicht um seine Transportmechanik. Dieses Crate
//! definiert die Schnittstelle (`SignalingChannel`) und liefert den
//! minimalen konkreten Transport: TCP mit Laengen-Prefix-Frames.
//!
//! Kein Reconnect, kein Backoff – faellt der Kanal, ist die Session
//! gescheitert.

pub mod channel;
pub mod error;
pub mod tcp;

// Bequeme Re-Exporte
pub use channel::SignalingChannel;
pub use error::{ChannelError, ChannelResult};
pub use tcp::TcpSignalingChannel;
