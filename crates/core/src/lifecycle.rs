//! Lebenszyklus-Ereignisse der Anwendung
//!
//! Die Session-Schicht haengt an keiner UI- oder Plattform-API. Wer die
//! Anwendung einbettet, speist diese Ereignisse aus seiner eigenen
//! Quelle ein (Desktop-Signale, mobile App-State-Hooks, Tests).

use serde::{Deserialize, Serialize};

/// Ereignisse der einbettenden Anwendung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEreignis {
    /// Anwendung ist wieder im Vordergrund
    Vordergrund,
    /// Anwendung hat den Vordergrund verloren (Mikrofon wird stummgeschaltet)
    Hintergrund,
    /// Anwendung beendet sich, Session wird abgebaut
    Beenden,
}
