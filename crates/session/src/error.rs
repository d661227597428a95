//! Fehlertypen der Session-Schicht

use thiserror::Error;
use tincan_media::MediaError;
use tincan_signaling::ChannelError;

use crate::link::LinkFehler;

/// Unwiederbringliche Session-Fehler
///
/// Jeder dieser Fehler beendet die Verhandlung; die Zustandsmaschine
/// geht nach `Gescheitert` und nimmt nur noch den Abbau an.
/// Protokollverletzungen (Answer vor Offer, fehlerhafte Kandidaten)
/// tauchen hier bewusst nicht auf – sie werden geloggt und ignoriert.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Vermittlungskanal gescheitert oder getrennt
    #[error("Vermittlungskanal: {0}")]
    Kanal(#[from] ChannelError),

    /// Mikrofon-Beschaffung gescheitert
    #[error("Mikrofon: {0}")]
    Medien(#[from] MediaError),

    /// Peer-Verbindung oder Verhandlung gescheitert
    #[error("Peer-Verbindung: {0}")]
    Link(#[from] LinkFehler),

    /// Aufbau-Operation hat das Zeitlimit ueberschritten
    #[error("Zeitlimit ueberschritten: {0}")]
    Zeitlimit(&'static str),
}

/// Result-Typ der Session-Schicht
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = SessionError::Zeitlimit("Kanalaufbau");
        assert_eq!(e.to_string(), "Zeitlimit ueberschritten: Kanalaufbau");
    }

    #[test]
    fn kanalfehler_konvertierung() {
        let e: SessionError = ChannelError::Getrennt.into();
        assert!(matches!(e, SessionError::Kanal(_)));
    }
}
