//! Opus-Pump: Capture-Samples -> Opus -> TrackLocalStaticSample
//!
//! Sammelt 20ms-Frames aus dem Capture-Ring-Buffer, kodiert sie mit
//! audiopus und schreibt sie als Samples auf den lokalen Track. Ist das
//! Mute-Flag aus, wird der Ring-Buffer nur geleert – die Hardware
//! laeuft weiter, es verlaesst aber kein Frame den Client.

use audiopus::coder::Encoder;
use audiopus::{Application, Bitrate, Channels, SampleRate};
use bytes::Bytes;
use ringbuf::traits::Consumer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use webrtc::media::Sample;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use tincan_media::AudioFeed;

/// Frame-Laenge in Millisekunden (Opus-Standardframe)
const FRAME_MS: u64 = 20;
/// Ziel-Bitrate fuer Sprache
const BITRATE: i32 = 32_000;
/// Maximale Opus-Paketgroesse in Bytes
const MAX_PAKET: usize = 4000;

/// Pumpt Capture-Samples als Opus-Frames auf den Track
///
/// Laeuft bis der Task abgebrochen wird (beim Schliessen der
/// Verbindung) oder der Track keine Samples mehr annimmt.
pub async fn opus_pumpe(track: Arc<TrackLocalStaticSample>, mut feed: AudioFeed) {
    let mut encoder = match encoder_bauen(feed.sample_rate, feed.kanaele) {
        Ok(encoder) => encoder,
        Err(grund) => {
            error!("Opus-Encoder nicht erstellbar: {}", grund);
            return;
        }
    };

    let frame_samples =
        (feed.sample_rate as usize / 1000) * FRAME_MS as usize * feed.kanaele as usize;
    let mut pcm = vec![0.0f32; frame_samples];
    let mut opus = vec![0u8; MAX_PAKET];

    let mut takt = tokio::time::interval(Duration::from_millis(FRAME_MS));
    takt.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!(frame_samples, "Opus-Pump gestartet");
    loop {
        takt.tick().await;

        if !feed.aktiv.load(Ordering::Relaxed) {
            // Stumm: Ring-Buffer leeren, nichts senden
            while feed.samples.pop_slice(&mut pcm) == pcm.len() {}
            continue;
        }

        let gelesen = feed.samples.pop_slice(&mut pcm);
        if gelesen < pcm.len() {
            // Unterlauf: Rest mit Stille auffuellen
            for sample in &mut pcm[gelesen..] {
                *sample = 0.0;
            }
        }

        match encoder.encode_float(&pcm, &mut opus) {
            Ok(bytes) => {
                let sample = Sample {
                    data: Bytes::copy_from_slice(&opus[..bytes]),
                    duration: Duration::from_millis(FRAME_MS),
                    ..Default::default()
                };
                if track.write_sample(&sample).await.is_err() {
                    debug!("Track nimmt keine Samples mehr an – Pump endet");
                    return;
                }
            }
            Err(e) => warn!("Opus-Encoding fehlgeschlagen: {}", e),
        }
    }
}

/// Baut den Opus-Encoder fuer das Sprachprofil
fn encoder_bauen(sample_rate: u32, kanaele: u16) -> Result<Encoder, String> {
    let rate = match sample_rate {
        8000 => SampleRate::Hz8000,
        12000 => SampleRate::Hz12000,
        16000 => SampleRate::Hz16000,
        24000 => SampleRate::Hz24000,
        48000 => SampleRate::Hz48000,
        andere => return Err(format!("Abtastrate {} wird von Opus nicht getragen", andere)),
    };
    let channels = match kanaele {
        1 => Channels::Mono,
        2 => Channels::Stereo,
        andere => return Err(format!("{} Kanaele werden nicht getragen", andere)),
    };

    let mut encoder = Encoder::new(rate, channels, Application::Voip)
        .map_err(|e| e.to_string())?;
    encoder
        .set_bitrate(Bitrate::BitsPerSecond(BITRATE))
        .map_err(|e| e.to_string())?;
    Ok(encoder)
}
