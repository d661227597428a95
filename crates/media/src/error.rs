//! Fehlertypen fuer die Medienschicht

use thiserror::Error;

/// Alle moeglichen Fehler der Medienschicht
///
/// Capture-Fehler sind fuer die laufende Session unwiederbringlich und
/// fuehren zum Session-Status `Gescheitert`.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Kein Standard-Eingabegeraet verfuegbar")]
    KeinEingabegeraet,

    #[error("Audio-Geraet nicht verfuegbar: {0}")]
    GeraetNichtVerfuegbar(String),

    #[error("Zugriff auf das Mikrofon verweigert: {0}")]
    ZugriffVerweigert(String),

    #[error("Stream-Fehler: {0}")]
    StreamFehler(String),

    #[error("Geraetebeschaffung hat das Zeitlimit ueberschritten")]
    Zeitlimit,

    #[error("Sample-Abgriff wurde bereits vergeben")]
    AbgriffBereitsVergeben,

    #[error("Kein Track vorhanden")]
    KeinTrack,
}

/// Result-Typ fuer die Medienschicht
pub type MediaResult<T> = Result<T, MediaError>;
