//! tincan-core – Gemeinsame Typen und Konfiguration
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Tincan-Crates gemeinsam genutzt werden: Session-Status,
//! Lebenszyklus-Ereignisse und die Session-Konfiguration.

pub mod config;
pub mod lifecycle;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use config::{IceServerEintrag, SessionConfig};
pub use lifecycle::LifecycleEreignis;
pub use types::{SessionStatus, SitzungsId};
