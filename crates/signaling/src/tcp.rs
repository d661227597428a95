//! TCP-Implementierung des Vermittlungskanals
//!
//! Nutzt den SignalCodec aus tincan-protocol fuer das Wire-Format
//! (u32 BE length + JSON payload). Alle Operationen sind async.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use tincan_protocol::{SignalCodec, SignalEvent};

use crate::channel::SignalingChannel;
use crate::error::{ChannelError, ChannelResult};

/// TCP-Verbindung zum Vermittlungsserver
///
/// Die Adresse wird bei der Konstruktion festgelegt; keine
/// Rekonfiguration, kein automatischer Reconnect.
pub struct TcpSignalingChannel {
    /// Zieladresse "host:port"
    adresse: String,
    /// Framed TCP-Stream, None solange nicht verbunden
    framed: Option<Framed<TcpStream, SignalCodec>>,
}

impl TcpSignalingChannel {
    /// Erstellt einen noch nicht verbundenen Kanal
    pub fn neu(adresse: impl Into<String>) -> Self {
        Self {
            adresse: adresse.into(),
            framed: None,
        }
    }

    /// Gibt die konfigurierte Zieladresse zurueck
    pub fn adresse(&self) -> &str {
        &self.adresse
    }
}

#[async_trait]
impl SignalingChannel for TcpSignalingChannel {
    async fn verbinden(&mut self) -> ChannelResult<()> {
        info!(adresse = %self.adresse, "Verbinde mit Vermittlungsserver");
        let stream = TcpStream::connect(&self.adresse).await?;
        self.framed = Some(Framed::new(stream, SignalCodec::new()));
        info!(adresse = %self.adresse, "TCP-Verbindung hergestellt");
        Ok(())
    }

    async fn senden(&mut self, ereignis: SignalEvent) -> ChannelResult<()> {
        let framed = self.framed.as_mut().ok_or(ChannelError::NichtVerbunden)?;
        debug!(ereignis = ereignis.name(), "Sende Signaling-Ereignis");
        framed.send(ereignis).await?;
        Ok(())
    }

    async fn empfangen(&mut self) -> Option<ChannelResult<SignalEvent>> {
        let framed = self.framed.as_mut()?;
        match framed.next().await {
            Some(Ok(ereignis)) => {
                debug!(ereignis = ereignis.name(), "Signaling-Ereignis empfangen");
                Some(Ok(ereignis))
            }
            Some(Err(e)) => {
                warn!("Fehler auf dem Vermittlungskanal: {}", e);
                // Codec-Fehler (ungueltiges Frame/JSON) von Transportfehlern trennen
                let fehler = if e.kind() == std::io::ErrorKind::InvalidData {
                    ChannelError::protokoll(e.to_string())
                } else {
                    ChannelError::Io(e)
                };
                Some(Err(fehler))
            }
            None => {
                info!("Vermittlungsserver hat die Verbindung beendet");
                None
            }
        }
    }

    async fn trennen(&mut self) {
        if let Some(mut framed) = self.framed.take() {
            // Versuche sauber zu schliessen, ignoriere Fehler
            let _ = framed.close().await;
            info!("TCP-Verbindung getrennt");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tincan_protocol::SessionDescription;
    use tokio::net::TcpListener;

    /// Gegenstellen-Attrappe: nimmt eine Verbindung an, schickt zwei
    /// Ereignisse und gibt zurueck was der Client gesendet hat.
    async fn gegenstelle(listener: TcpListener) -> Vec<SignalEvent> {
        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = Framed::new(stream, SignalCodec::new());

        framed.send(SignalEvent::Connect).await.unwrap();
        framed
            .send(SignalEvent::AudioToggle { enabled: true })
            .await
            .unwrap();

        let mut empfangen = Vec::new();
        while let Some(Ok(ereignis)) = framed.next().await {
            empfangen.push(ereignis);
            if empfangen.len() == 2 {
                break;
            }
        }
        empfangen
    }

    #[tokio::test]
    async fn tcp_kanal_sendet_und_empfaengt_in_reihenfolge() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let adresse = listener.local_addr().unwrap().to_string();
        let server = tokio::spawn(gegenstelle(listener));

        let mut kanal = TcpSignalingChannel::neu(adresse);
        kanal.verbinden().await.unwrap();

        // Reihenfolge der eingehenden Ereignisse bleibt erhalten
        let erstes = kanal.empfangen().await.unwrap().unwrap();
        assert_eq!(erstes, SignalEvent::Connect);
        let zweites = kanal.empfangen().await.unwrap().unwrap();
        assert_eq!(zweites, SignalEvent::AudioToggle { enabled: true });

        // Ausgehende Ereignisse kommen unveraendert an
        let offer = SignalEvent::Offer(SessionDescription::offer("v=0\r\n"));
        kanal.senden(offer.clone()).await.unwrap();
        kanal
            .senden(SignalEvent::IceCandidate(tincan_protocol::IceCandidate {
                candidate: "candidate:1 1 UDP 1 192.0.2.7 9 typ host".into(),
                sdp_mid: Some("0".into()),
                sdp_mline_index: Some(0),
                username_fragment: None,
            }))
            .await
            .unwrap();

        let beim_server = server.await.unwrap();
        assert_eq!(beim_server.len(), 2);
        assert_eq!(beim_server[0], offer);

        kanal.trennen().await;
    }

    #[tokio::test]
    async fn senden_ohne_verbindung_schlaegt_fehl() {
        let mut kanal = TcpSignalingChannel::neu("127.0.0.1:1");
        let result = kanal.senden(SignalEvent::Connect).await;
        assert!(matches!(result, Err(ChannelError::NichtVerbunden)));
    }

    #[tokio::test]
    async fn empfangen_nach_serverende_liefert_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let adresse = listener.local_addr().unwrap().to_string();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream); // Server beendet die Verbindung sofort
        });

        let mut kanal = TcpSignalingChannel::neu(adresse);
        kanal.verbinden().await.unwrap();
        server.await.unwrap();

        assert!(kanal.empfangen().await.is_none());
    }

    #[tokio::test]
    async fn trennen_ist_idempotent() {
        let mut kanal = TcpSignalingChannel::neu("127.0.0.1:1");
        kanal.trennen().await;
        kanal.trennen().await;
    }
}
