//! RTCPeerConnection-Anbindung
//!
//! Erstellt die Peer-Verbindung, verdrahtet Kandidaten- und
//! Zustands-Callbacks in den Link-Ereigniskanal der Session und setzt
//! die Offer/Answer-Operationen um.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MediaEngine, MIME_TYPE_OPUS};
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_local::TrackLocal;

use tincan_core::IceServerEintrag;
use tincan_media::AudioFeed;
use tincan_protocol::{IceCandidate, SessionDescription};
use tincan_session::{LinkEreignis, LinkFehler, PeerConnector, PeerLink};

use crate::pumpe::opus_pumpe;

// ---------------------------------------------------------------------------
// RtcConnector
// ---------------------------------------------------------------------------

/// Erzeugt RTCPeerConnections mit Opus-Audioprofil
#[derive(Debug, Default)]
pub struct RtcConnector;

impl RtcConnector {
    /// Erstellt einen neuen Connector
    pub fn neu() -> Self {
        Self
    }
}

#[async_trait]
impl PeerConnector for RtcConnector {
    type Link = RtcVerbindung;

    async fn verbinden(
        &mut self,
        ice_server: &[IceServerEintrag],
        ereignisse: mpsc::UnboundedSender<LinkEreignis>,
    ) -> Result<RtcVerbindung, LinkFehler> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(transportfehler)?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(transportfehler)?;
        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let config = RTCConfiguration {
            ice_servers: ice_server.iter().map(als_rtc_ice_server).collect(),
            ..Default::default()
        };
        let pc = Arc::new(
            api.new_peer_connection(config)
                .await
                .map_err(transportfehler)?,
        );
        info!("Peer-Verbindung erstellt");

        // Kandidaten-Callback VOR der Offer-Erstellung registrieren,
        // sonst gehen fruehe Kandidaten verloren. Kein Sammeln: jeder
        // Kandidat geht sofort raus.
        let kandidaten_tx = ereignisse.clone();
        pc.on_ice_candidate(Box::new(move |kandidat: Option<RTCIceCandidate>| {
            let tx = kandidaten_tx.clone();
            Box::pin(async move {
                let Some(kandidat) = kandidat else {
                    // Ende der Kandidatensammlung
                    return;
                };
                match kandidat.to_json() {
                    Ok(init) => {
                        let _ = tx.send(LinkEreignis::LokalerKandidat(als_signal_kandidat(init)));
                    }
                    Err(e) => warn!("Lokaler Kandidat nicht serialisierbar: {}", e),
                }
            })
        }));

        let status_tx = ereignisse;
        pc.on_peer_connection_state_change(Box::new(move |status: RTCPeerConnectionState| {
            let tx = status_tx.clone();
            Box::pin(async move {
                debug!(status = %status, "Peer-Verbindungsstatus");
                if status == RTCPeerConnectionState::Failed {
                    let _ = tx.send(LinkEreignis::VerbindungGescheitert(
                        "Peer-Verbindung ist fehlgeschlagen".into(),
                    ));
                }
            })
        }));

        Ok(RtcVerbindung { pc, pumpe: None })
    }
}

// ---------------------------------------------------------------------------
// RtcVerbindung
// ---------------------------------------------------------------------------

/// Die verhandelte Peer-Verbindung samt Audio-Pump-Task
pub struct RtcVerbindung {
    pc: Arc<RTCPeerConnection>,
    pumpe: Option<tokio::task::JoinHandle<()>>,
}

#[async_trait]
impl PeerLink for RtcVerbindung {
    async fn track_anhaengen(&mut self, feed: AudioFeed) -> Result<(), LinkFehler> {
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            "audio".to_owned(),
            "tincan".to_owned(),
        ));
        self.pc
            .add_track(Arc::clone(&track) as Arc<dyn TrackLocal + Send + Sync>)
            .await
            .map_err(transportfehler)?;
        self.pumpe = Some(tokio::spawn(opus_pumpe(track, feed)));
        debug!("Audio-Track angehaengt");
        Ok(())
    }

    async fn offer_erstellen(&mut self) -> Result<SessionDescription, LinkFehler> {
        let offer = self.pc.create_offer(None).await.map_err(verhandlungsfehler)?;
        self.pc
            .set_local_description(offer.clone())
            .await
            .map_err(verhandlungsfehler)?;
        Ok(SessionDescription {
            typ: offer.sdp_type.to_string(),
            sdp: offer.sdp,
        })
    }

    async fn antwort_anwenden(&mut self, antwort: SessionDescription) -> Result<(), LinkFehler> {
        if antwort.typ != "answer" {
            return Err(LinkFehler::Verhandlung(format!(
                "Unerwarteter Beschreibungstyp: {}",
                antwort.typ
            )));
        }
        let beschreibung =
            RTCSessionDescription::answer(antwort.sdp).map_err(verhandlungsfehler)?;
        self.pc
            .set_remote_description(beschreibung)
            .await
            .map_err(verhandlungsfehler)
    }

    async fn kandidat_anwenden(&mut self, kandidat: IceCandidate) -> Result<(), LinkFehler> {
        self.pc
            .add_ice_candidate(als_rtc_kandidat(kandidat))
            .await
            .map_err(|e| LinkFehler::Kandidat(e.to_string()))
    }

    async fn schliessen(&mut self) {
        if let Some(pumpe) = self.pumpe.take() {
            pumpe.abort();
        }
        if let Err(e) = self.pc.close().await {
            warn!("Peer-Verbindung liess sich nicht sauber schliessen: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// Abbildungen
// ---------------------------------------------------------------------------

fn als_rtc_ice_server(eintrag: &IceServerEintrag) -> RTCIceServer {
    RTCIceServer {
        urls: eintrag.urls.clone(),
        username: eintrag.username.clone().unwrap_or_default(),
        credential: eintrag.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn als_signal_kandidat(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_mline_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}

fn als_rtc_kandidat(kandidat: IceCandidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: kandidat.candidate,
        sdp_mid: kandidat.sdp_mid,
        sdp_mline_index: kandidat.sdp_mline_index,
        username_fragment: kandidat.username_fragment,
    }
}

fn transportfehler(e: webrtc::Error) -> LinkFehler {
    LinkFehler::Transport(e.to_string())
}

fn verhandlungsfehler(e: webrtc::Error) -> LinkFehler {
    LinkFehler::Verhandlung(e.to_string())
}
