//! Session-Konfiguration
//!
//! Wird bei der Konstruktion uebergeben, keine Rekonfiguration zur
//! Laufzeit. Alle Felder haben sinnvolle Standardwerte.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ein ICE-Server-Eintrag (STUN oder TURN)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IceServerEintrag {
    /// URIs des Servers, z.B. "stun:stun.l.google.com:19302"
    pub urls: Vec<String>,
    /// Benutzername (nur TURN)
    pub username: Option<String>,
    /// Zugangsdaten (nur TURN)
    pub credential: Option<String>,
}

impl Default for IceServerEintrag {
    fn default() -> Self {
        Self {
            urls: vec!["stun:stun.l.google.com:19302".into()],
            username: None,
            credential: None,
        }
    }
}

/// Konfiguration einer Peer-Session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// ICE-Server fuer die Peer-Verbindung (mindestens ein Eintrag)
    pub ice_server: Vec<IceServerEintrag>,
    /// Zeitlimit fuer Verbindungsaufbau und Offer-Erstellung in ms
    pub aufbau_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ice_server: vec![IceServerEintrag::default()],
            aufbau_timeout_ms: 10_000,
        }
    }
}

impl SessionConfig {
    /// Gibt das Aufbau-Zeitlimit als Duration zurueck
    pub fn aufbau_timeout(&self) -> Duration {
        Duration::from_millis(self.aufbau_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_hat_stun_server() {
        let config = SessionConfig::default();
        assert_eq!(config.ice_server.len(), 1);
        assert!(config.ice_server[0].urls[0].starts_with("stun:"));
    }

    #[test]
    fn aufbau_timeout_umrechnung() {
        let config = SessionConfig {
            aufbau_timeout_ms: 2500,
            ..Default::default()
        };
        assert_eq!(config.aufbau_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn config_ist_serde_kompatibel() {
        let config = SessionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let zurueck: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck.aufbau_timeout_ms, config.aufbau_timeout_ms);
    }
}
