//! Schnittstelle des Vermittlungskanals
//!
//! Die Session haelt genau eine Implementierung und konsumiert sie aus
//! einem einzigen Task – die Auslieferung der Ereignisse ist dadurch
//! serialisiert, zwei Kanal-Callbacks laufen nie nebenlaeufig.

use async_trait::async_trait;
use tincan_protocol::SignalEvent;

use crate::error::ChannelResult;

/// Abstrakter Duplex-Kanal typisierter Signaling-Ereignisse
///
/// Eigenschaften auf die sich die Session verlaesst:
/// - `senden` ist fire-and-forget; die Reihenfolge pro Kanal bleibt
///   erhalten (Ereignis N kommt, wenn ueberhaupt, vor N+1 an)
/// - `empfangen` liefert eine unendliche, nicht neu startbare Folge;
///   `None` bedeutet: Kanal endgueltig zu
#[async_trait]
pub trait SignalingChannel: Send {
    /// Baut die Verbindung zum Vermittlungsserver auf
    async fn verbinden(&mut self) -> ChannelResult<()>;

    /// Sendet ein Ereignis an die Gegenstelle
    async fn senden(&mut self, ereignis: SignalEvent) -> ChannelResult<()>;

    /// Wartet auf das naechste eingehende Ereignis
    ///
    /// `None` wenn der Kanal geschlossen wurde und keine weiteren
    /// Ereignisse mehr kommen koennen.
    async fn empfangen(&mut self) -> Option<ChannelResult<SignalEvent>>;

    /// Trennt die Verbindung; Fehler beim Schliessen werden verworfen
    async fn trennen(&mut self);
}
