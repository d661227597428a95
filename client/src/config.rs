//! Client-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Client ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};
use tincan_core::SessionConfig;
use tincan_media::CaptureConfig;

/// Vollstaendige Client-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Vermittlungsserver-Einstellungen
    pub signaling: SignalingEinstellungen,
    /// Session-Einstellungen (ICE-Server, Zeitlimits)
    pub session: SessionConfig,
    /// Audio-Capture-Einstellungen
    pub audio: CaptureConfig,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Vermittlungsserver-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalingEinstellungen {
    /// Hostname oder IP des Vermittlungsservers
    pub adresse: String,
    /// TCP-Port des Vermittlungsservers
    pub port: u16,
}

impl Default for SignalingEinstellungen {
    fn default() -> Self {
        Self {
            adresse: "127.0.0.1".into(),
            port: 9400,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ClientConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!("Konfiguration '{pfad}' nicht lesbar: {e}")),
        }
    }

    /// Zieladresse des Vermittlungsservers als "host:port"
    pub fn signaling_adresse(&self) -> String {
        format!("{}:{}", self.signaling.adresse, self.signaling.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardwerte_ohne_datei() {
        let config = ClientConfig::laden("/gibt/es/nicht/tincan.toml").unwrap();
        assert_eq!(config.signaling.port, 9400);
        assert_eq!(config.logging.level, "info");
        assert!(!config.session.ice_server.is_empty());
    }

    #[test]
    fn signaling_adresse_zusammensetzen() {
        let config = ClientConfig::default();
        assert_eq!(config.signaling_adresse(), "127.0.0.1:9400");
    }

    #[test]
    fn toml_mit_teilangaben() {
        let config: ClientConfig = toml::from_str(
            r#"
            [signaling]
            adresse = "relay.example.net"
            port = 7000

            [[session.ice_server]]
            urls = ["stun:stun.example.net:3478"]

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.signaling.adresse, "relay.example.net");
        assert_eq!(config.signaling.port, 7000);
        assert_eq!(config.session.ice_server.len(), 1);
        assert_eq!(config.logging.level, "debug");
        // Nicht gesetzte Abschnitte fallen auf Standardwerte zurueck
        assert_eq!(config.audio.sample_rate, 48000);
    }
}
