//! Status- und Identifikationstypen fuer Tincan
//!
//! Der `SessionStatus` ist der einzige nach aussen sichtbare Zustand
//! einer Session. IDs verwenden das Newtype-Pattern um Verwechslungen
//! zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Zustand einer Peer-Session
///
/// Genau ein Wert zu jedem Zeitpunkt; die Uebergaenge bildet die
/// Zustandsmaschine in tincan-session ab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    /// Keine Verbindung (Ausgangs- und Endzustand)
    Getrennt,
    /// Signaling-Kanal wird aufgebaut
    Verbindet,
    /// Signaling-Kanal steht, noch kein Audio
    Verbunden,
    /// Mikrofon aktiv, Audio laeuft zum Peer
    Sendet,
    /// Mikrofon deaktiviert, Verbindung steht weiter
    Stumm,
    /// Unwiederbringlich gescheitert, nur noch Abbau moeglich
    Gescheitert,
}

impl SessionStatus {
    /// Gibt true zurueck wenn die Session keine Ereignisse mehr verarbeitet
    pub fn ist_endzustand(&self) -> bool {
        matches!(self, Self::Getrennt | Self::Gescheitert)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Getrennt => "getrennt",
            Self::Verbindet => "verbindet",
            Self::Verbunden => "verbunden",
            Self::Sendet => "sendet",
            Self::Stumm => "stumm",
            Self::Gescheitert => "gescheitert",
        };
        f.write_str(s)
    }
}

/// Eindeutige Session-ID, dient der Log-Korrelation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SitzungsId(pub Uuid);

impl SitzungsId {
    /// Erstellt eine neue zufaellige SitzungsId
    pub fn neu() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for SitzungsId {
    fn default() -> Self {
        Self::neu()
    }
}

impl std::fmt::Display for SitzungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sitzung:{}", self.0)
    }
}
