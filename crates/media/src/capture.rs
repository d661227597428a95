//! Mikrofon-Capture via cpal
//!
//! Oeffnet einen cpal InputStream und schreibt Samples in einen
//! lock-free Ring-Buffer. Weil cpal::Stream !Send ist, lebt der Stream
//! auf einem dedizierten Thread; der Controller haelt nur den
//! Ring-Buffer-Consumer und ein Stop-Flag.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use ringbuf::traits::{Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::{MediaError, MediaResult};

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Konfiguration fuer den Audio-Capture
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Abtastrate in Hz
    pub sample_rate: u32,
    /// Kanalanzahl (1 = Mono, 2 = Stereo)
    pub kanaele: u16,
    /// Ring-Buffer Kapazitaet in Samples
    pub puffer_samples: usize,
    /// Zeitlimit fuer die Geraetebeschaffung in ms
    pub oeffnen_timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            kanaele: 1,
            puffer_samples: 48000 * 2, // 2 Sekunden Puffer
            oeffnen_timeout_ms: 5_000,
        }
    }
}

impl CaptureConfig {
    /// Gibt das Beschaffungs-Zeitlimit als Duration zurueck
    pub fn oeffnen_timeout(&self) -> Duration {
        Duration::from_millis(self.oeffnen_timeout_ms)
    }
}

/// Produziert Samples aus dem Mikrofon-Callback
pub type CaptureProducer = HeapProd<f32>;
/// Konsumiert Samples fuer die Weiterverarbeitung
pub type CaptureConsumer = HeapCons<f32>;

// ---------------------------------------------------------------------------
// Aufnahme
// ---------------------------------------------------------------------------

/// Laufende Hardware-Aufnahme
///
/// Haelt den Sample-Consumer und das Stop-Signal des Capture-Threads.
/// `beenden` (oder Drop) stoppt die Hardware endgueltig.
pub struct Aufnahme {
    samples: Option<CaptureConsumer>,
    stop: Option<Arc<AtomicBool>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl Aufnahme {
    /// Aufnahme ohne eigenen Thread (Backends deren Feed extern laeuft,
    /// z.B. Test-Attrappen)
    pub fn neu(samples: CaptureConsumer) -> Self {
        Self {
            samples: Some(samples),
            stop: None,
            thread: None,
        }
    }

    /// Aufnahme mit dediziertem Capture-Thread
    pub fn mit_thread(
        samples: CaptureConsumer,
        stop: Arc<AtomicBool>,
        thread: std::thread::JoinHandle<()>,
    ) -> Self {
        Self {
            samples: Some(samples),
            stop: Some(stop),
            thread: Some(thread),
        }
    }

    /// Entnimmt den Sample-Consumer; nur einmal moeglich
    pub fn samples_abgreifen(&mut self) -> Option<CaptureConsumer> {
        self.samples.take()
    }

    /// Stoppt die Hardware-Aufnahme; idempotent
    pub fn beenden(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop.store(true, Ordering::Relaxed);
        }
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                warn!("Capture-Thread hat mit Panic geendet");
            }
        }
    }
}

impl Drop for Aufnahme {
    fn drop(&mut self) {
        self.beenden();
    }
}

// ---------------------------------------------------------------------------
// CaptureBackend
// ---------------------------------------------------------------------------

/// Schnittstelle zur Capture-Hardware
///
/// Die konkrete Hardware (cpal) sitzt hinter diesem Trait, damit die
/// Session-Schicht ohne Audiogeraet getestet werden kann.
pub trait CaptureBackend: Send {
    /// Beschafft das Eingabegeraet und startet die Aufnahme
    ///
    /// Blockiert hoechstens fuer das konfigurierte Zeitlimit.
    fn oeffnen(&mut self, config: &CaptureConfig) -> MediaResult<Aufnahme>;
}

// ---------------------------------------------------------------------------
// CpalBackend
// ---------------------------------------------------------------------------

/// Capture ueber das Standard-Eingabegeraet des cpal-Hosts
#[derive(Debug, Default)]
pub struct CpalBackend;

impl CpalBackend {
    /// Erstellt ein neues Backend
    pub fn neu() -> Self {
        Self
    }
}

impl CaptureBackend for CpalBackend {
    fn oeffnen(&mut self, config: &CaptureConfig) -> MediaResult<Aufnahme> {
        let rb = HeapRb::<f32>::new(config.puffer_samples);
        let (producer, consumer) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let thread_config = config.clone();

        // Der Thread meldet das Ergebnis des Stream-Aufbaus zurueck und
        // haelt danach den cpal-Stream am Leben bis das Stop-Flag gesetzt ist.
        let (bereit_tx, bereit_rx) = std::sync::mpsc::sync_channel::<MediaResult<()>>(1);

        let thread = std::thread::Builder::new()
            .name("tincan-capture".to_string())
            .spawn(move || {
                let stream = match eingabe_stream_oeffnen(&thread_config, producer) {
                    Ok(s) => s,
                    Err(e) => {
                        let _ = bereit_tx.send(Err(e));
                        return;
                    }
                };
                if bereit_tx.send(Ok(())).is_err() {
                    // Controller wartet nicht mehr (Zeitlimit) – Stream verwerfen
                    return;
                }
                while !thread_stop.load(Ordering::Relaxed) {
                    std::thread::park_timeout(Duration::from_millis(200));
                }
                drop(stream);
                debug!("Capture-Thread beendet, cpal-Stream wird gedroppt");
            })
            .map_err(|e| MediaError::StreamFehler(e.to_string()))?;

        match bereit_rx.recv_timeout(config.oeffnen_timeout()) {
            Ok(Ok(())) => Ok(Aufnahme::mit_thread(consumer, stop, thread)),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                // Thread haengt in der Geraetebeschaffung – abkoppeln
                stop.store(true, Ordering::Relaxed);
                Err(MediaError::Zeitlimit)
            }
        }
    }
}

/// Oeffnet den cpal-InputStream auf dem Standard-Eingabegeraet
fn eingabe_stream_oeffnen(
    config: &CaptureConfig,
    mut producer: CaptureProducer,
) -> MediaResult<Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(MediaError::KeinEingabegeraet)?;

    let stream_config = StreamConfig {
        channels: config.kanaele,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    // cpal-Callback: schreibt Samples in den Ring-Buffer
    let err_fn = |err| error!("Capture-Fehler: {}", err);

    // Unterstuetzte Sample-Formate pruefen
    let supported = device
        .supported_input_configs()
        .map_err(|e| MediaError::GeraetNichtVerfuegbar(e.to_string()))?
        .find(|c| {
            c.min_sample_rate().0 <= config.sample_rate
                && c.max_sample_rate().0 >= config.sample_rate
                && c.channels() >= config.kanaele
        });

    let sample_format = supported
        .map(|c| c.sample_format())
        .unwrap_or(SampleFormat::F32);

    let stream = match sample_format {
        SampleFormat::F32 => device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _| {
                    let written = producer.push_slice(data);
                    if written < data.len() {
                        warn!(
                            "Capture Ring-Buffer voll, {} Samples verworfen",
                            data.len() - written
                        );
                    }
                },
                err_fn,
                None,
            )
            .map_err(stream_fehler)?,
        SampleFormat::I16 => device
            .build_input_stream(
                &stream_config,
                move |data: &[i16], _| {
                    let floats: Vec<f32> =
                        data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                    let written = producer.push_slice(&floats);
                    if written < floats.len() {
                        warn!("Capture Ring-Buffer voll");
                    }
                },
                err_fn,
                None,
            )
            .map_err(stream_fehler)?,
        SampleFormat::U8 => device
            .build_input_stream(
                &stream_config,
                move |data: &[u8], _| {
                    let floats: Vec<f32> =
                        data.iter().map(|&s| (s as f32 - 128.0) / 128.0).collect();
                    let written = producer.push_slice(&floats);
                    if written < floats.len() {
                        warn!("Capture Ring-Buffer voll");
                    }
                },
                err_fn,
                None,
            )
            .map_err(stream_fehler)?,
        _ => {
            return Err(MediaError::StreamFehler(format!(
                "Nicht unterstuetztes Sample-Format: {:?}",
                sample_format
            )))
        }
    };

    stream.play().map_err(|e| MediaError::StreamFehler(e.to_string()))?;

    debug!(
        "Capture-Stream geoeffnet: {}Hz {}ch",
        config.sample_rate, config.kanaele
    );

    Ok(stream)
}

/// Mappt cpal-Aufbaufehler auf die Medien-Fehlertaxonomie
fn stream_fehler(e: cpal::BuildStreamError) -> MediaError {
    match e {
        cpal::BuildStreamError::DeviceNotAvailable => {
            MediaError::GeraetNichtVerfuegbar("Geraet nicht mehr vorhanden".into())
        }
        andere => MediaError::StreamFehler(andere.to_string()),
    }
}
