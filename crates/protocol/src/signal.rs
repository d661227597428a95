//! Signaling-Ereignisse
//!
//! Alle Ereignisse die ueber den Vermittlungskanal laufen. Die
//! Ereignisnamen auf dem Draht sind kebab-case (`audio-toggle`,
//! `ice-candidate`), die Payload-Feldnamen entsprechen dem
//! JSON-Format von RTCSessionDescription bzw. RTCIceCandidateInit,
//! damit eine Browser-Gegenstelle sie unveraendert verwenden kann.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Session-Beschreibung (Offer oder Answer)
///
/// Opaker Verhandlungs-Payload; wird nicht interpretiert, nur
/// weitergereicht. Pro Verbindung existiert genau eine lokale und
/// hoechstens eine entfernte Beschreibung.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    /// "offer" oder "answer"
    #[serde(rename = "type")]
    pub typ: String,
    /// SDP-Blob
    pub sdp: String,
}

impl SessionDescription {
    /// Erstellt eine Offer-Beschreibung
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            typ: "offer".into(),
            sdp: sdp.into(),
        }
    }

    /// Erstellt eine Answer-Beschreibung
    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            typ: "answer".into(),
            sdp: sdp.into(),
        }
    }
}

/// ICE-Kandidat
///
/// Opaker Netzwerkpfad-Deskriptor. Die Reihenfolge der Kandidaten ist
/// vom Transport nicht garantiert; jeder Kandidat muss unabhaengig und
/// idempotent anwendbar sein.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    /// Kandidaten-Zeile (candidate:... Attribut)
    pub candidate: String,
    /// Media-Stream-Identifikation
    #[serde(rename = "sdpMid")]
    pub sdp_mid: Option<String>,
    /// Index der m-Line
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_mline_index: Option<u16>,
    /// ICE-Username-Fragment
    #[serde(rename = "usernameFragment")]
    pub username_fragment: Option<String>,
}

// ---------------------------------------------------------------------------
// Ereignisse
// ---------------------------------------------------------------------------

/// Geschlossene Menge aller Signaling-Ereignisse
///
/// Eingehend: `connect`, `audio-toggle`, `answer`, `ice-candidate`.
/// Ausgehend: `offer`, `ice-candidate`. Ein einziges Enum deckt beide
/// Richtungen ab; Ereignisse in der falschen Richtung behandelt die
/// Zustandsmaschine als Protokollverletzung (loggen und ignorieren).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum SignalEvent {
    /// Vermittlungskanal meldet: Gegenstelle erreichbar
    Connect,
    /// Gegenstelle schaltet unser Mikrofon an oder aus
    AudioToggle { enabled: bool },
    /// Unsere Offer an die Gegenstelle
    Offer(SessionDescription),
    /// Answer der Gegenstelle
    Answer(SessionDescription),
    /// ICE-Kandidat (beide Richtungen)
    IceCandidate(IceCandidate),
}

impl SignalEvent {
    /// Ereignisname wie er auf dem Draht steht (fuer Logs)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::AudioToggle { .. } => "audio-toggle",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice-candidate",
        }
    }
}
