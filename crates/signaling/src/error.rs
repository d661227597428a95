//! Fehlertypen fuer den Signaling-Kanal

use thiserror::Error;

/// Fehler des Signaling-Transports
///
/// Jeder dieser Fehler ist fuer die laufende Session unwiederbringlich;
/// die Zustandsmaschine geht damit in den Endzustand `Gescheitert`.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// IO-Fehler (TCP, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Verbindung wurde von der Gegenseite getrennt
    #[error("Verbindung getrennt")]
    Getrennt,

    /// Senden oder Empfangen ohne bestehende Verbindung
    #[error("Nicht mit dem Vermittlungsserver verbunden")]
    NichtVerbunden,

    /// Ungueltiges Frame oder Payload
    #[error("Protokollfehler: {0}")]
    Protokoll(String),
}

impl ChannelError {
    /// Erstellt einen Protokollfehler
    pub fn protokoll(msg: impl Into<String>) -> Self {
        Self::Protokoll(msg.into())
    }
}

/// Result-Typ fuer den Signaling-Kanal
pub type ChannelResult<T> = Result<T, ChannelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = ChannelError::NichtVerbunden;
        assert_eq!(e.to_string(), "Nicht mit dem Vermittlungsserver verbunden");
    }

    #[test]
    fn io_fehler_konvertierung() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let e: ChannelError = io.into();
        assert!(matches!(e, ChannelError::Io(_)));
    }
}
