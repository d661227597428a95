//! Tests der Verhandlungs-Zustandsmaschine

use std::time::Duration;

use tincan_core::SessionStatus;
use tincan_protocol::{SessionDescription, SignalEvent};

use super::mocks::*;
use crate::link::LinkEreignis;

fn answer() -> SignalEvent {
    SignalEvent::Answer(SessionDescription::answer("v=0\r\n"))
}

fn toggle(enabled: bool) -> SignalEvent {
    SignalEvent::AudioToggle { enabled }
}

#[tokio::test]
async fn verbindungsaufbau_bis_verbunden() {
    let mut aufbau = session_starten();

    aufbau.kanal.einspeisen(SignalEvent::Connect);
    status_abwarten(&mut aufbau.status, SessionStatus::Verbunden).await;

    assert!(aufbau
        .kanal
        .verbunden
        .load(std::sync::atomic::Ordering::Relaxed));
}

#[tokio::test]
async fn letzter_toggle_gewinnt_geraet_nur_einmal_beschafft() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);

    // Beliebige Toggle-Folge; der letzte Wert entscheidet
    for enabled in [true, false, true, true, false] {
        aufbau.kanal.einspeisen(toggle(enabled));
    }
    status_abwarten(&mut aufbau.status, SessionStatus::Stumm).await;

    let protokoll = aufbau.protokoll.lock().unwrap();
    assert!(!protokoll.track_ist_aktiv(), "Letzter Toggle war false");
    drop(protokoll);
    assert_eq!(
        aufbau
            .geraet
            .beschaffungen
            .load(std::sync::atomic::Ordering::Relaxed),
        1,
        "Geraet darf nur einmal beschafft werden"
    );

    // Und wieder einschalten: Endzustand sendet, Flag an
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;
    assert!(aufbau.protokoll.lock().unwrap().track_ist_aktiv());
    assert_eq!(
        aufbau
            .geraet
            .beschaffungen
            .load(std::sync::atomic::Ordering::Relaxed),
        1
    );
}

#[tokio::test]
async fn doppeltes_einschalten_erzeugt_genau_eine_offer() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);

    aufbau.kanal.einspeisen(toggle(true));
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;

    // Beide Toggles sind sicher verarbeitet sobald ein spaeteres
    // Ereignis durch ist
    aufbau.kanal.einspeisen(toggle(false));
    status_abwarten(&mut aufbau.status, SessionStatus::Stumm).await;

    assert_eq!(aufbau.protokoll.lock().unwrap().offers, 1);
    assert_eq!(aufbau.protokoll.lock().unwrap().tracks, 1);
    assert_eq!(aufbau.kanal.gesendete_offers(), 1);
}

#[tokio::test]
async fn kandidaten_vor_answer_werden_in_reihenfolge_nachgespielt() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;

    // Drei Kandidaten VOR der Answer: muessen eingereiht werden
    for nummer in 1..=3 {
        aufbau
            .kanal
            .einspeisen(SignalEvent::IceCandidate(kandidat(nummer)));
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(
        aufbau.protokoll.lock().unwrap().kandidaten.is_empty(),
        "Ohne Remote-Beschreibung darf nichts angewendet werden"
    );

    aufbau.kanal.einspeisen(answer());
    warten_bis(
        || aufbau.protokoll.lock().unwrap().kandidaten.len() == 3,
        "drei nachgespielte Kandidaten",
    )
    .await;

    let protokoll = aufbau.protokoll.lock().unwrap();
    let nummern: Vec<String> = protokoll
        .kandidaten
        .iter()
        .map(|k| k.candidate.clone())
        .collect();
    assert_eq!(nummern, vec![
        kandidat(1).candidate,
        kandidat(2).candidate,
        kandidat(3).candidate
    ]);
    assert_eq!(protokoll.antworten.len(), 1);
}

#[tokio::test]
async fn kandidaten_nach_answer_werden_direkt_angewendet() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;

    aufbau.kanal.einspeisen(answer());
    aufbau
        .kanal
        .einspeisen(SignalEvent::IceCandidate(kandidat(7)));

    warten_bis(
        || aufbau.protokoll.lock().unwrap().kandidaten.len() == 1,
        "direkt angewendeter Kandidat",
    )
    .await;
}

#[tokio::test]
async fn fehlerhafter_kandidat_bricht_die_session_nicht_ab() {
    let mut aufbau = session_starten_mit(MockOptionen {
        fehlerhafte_kandidaten: vec![kandidat(2).candidate],
        ..Default::default()
    });
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;
    aufbau.kanal.einspeisen(answer());

    for nummer in 1..=3 {
        aufbau
            .kanal
            .einspeisen(SignalEvent::IceCandidate(kandidat(nummer)));
    }

    warten_bis(
        || aufbau.protokoll.lock().unwrap().kandidaten.len() == 2,
        "zwei angewendete Kandidaten",
    )
    .await;
    assert_eq!(*aufbau.status.borrow(), SessionStatus::Sendet);
}

#[tokio::test]
async fn answer_vor_offer_wird_ignoriert() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    status_abwarten(&mut aufbau.status, SessionStatus::Verbunden).await;

    // Answer ohne vorherige Offer: Protokollverletzung, kein Absturz
    aufbau.kanal.einspeisen(answer());

    // Ein nachfolgender Toggle beweist dass die Session weiterlebt
    // und die Answer vorher verarbeitet (= verworfen) wurde
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;

    assert!(aufbau.protokoll.lock().unwrap().antworten.is_empty());
    assert_eq!(aufbau.protokoll.lock().unwrap().offers, 1);
}

#[tokio::test]
async fn doppelte_answer_ist_wirkungslos() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;

    aufbau.kanal.einspeisen(answer());
    aufbau.kanal.einspeisen(answer());
    aufbau
        .kanal
        .einspeisen(SignalEvent::IceCandidate(kandidat(1)));

    warten_bis(
        || aufbau.protokoll.lock().unwrap().kandidaten.len() == 1,
        "Kandidat nach zweiter Answer",
    )
    .await;
    assert_eq!(aufbau.protokoll.lock().unwrap().antworten.len(), 1);
}

#[tokio::test]
async fn lokale_kandidaten_gehen_sofort_raus() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    status_abwarten(&mut aufbau.status, SessionStatus::Verbunden).await;

    let sender = aufbau
        .link_ereignisse
        .lock()
        .unwrap()
        .as_ref()
        .expect("Link-Ereigniskanal nach dem Hochfahren vorhanden")
        .clone();
    sender
        .send(LinkEreignis::LokalerKandidat(kandidat(9)))
        .unwrap();

    warten_bis(
        || aufbau.kanal.gesendete_kandidaten() == 1,
        "verschickter lokaler Kandidat",
    )
    .await;
}

#[tokio::test]
async fn hintergrund_schaltet_stumm_ohne_abbau() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;

    aufbau.handle.hintergrund().await;
    status_abwarten(&mut aufbau.status, SessionStatus::Stumm).await;

    let protokoll = aufbau.protokoll.lock().unwrap();
    assert!(!protokoll.track_ist_aktiv());
    assert!(!protokoll.geschlossen, "Verbindung bleibt bestehen");
}

#[tokio::test]
async fn vordergrund_schaltet_nicht_automatisch_ein() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;

    aufbau.handle.hintergrund().await;
    status_abwarten(&mut aufbau.status, SessionStatus::Stumm).await;
    aufbau.handle.vordergrund().await;

    // Erst der Toggle der Gegenstelle schaltet wieder ein
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;
    assert_eq!(aufbau.protokoll.lock().unwrap().offers, 1, "Keine zweite Offer");
}

#[tokio::test]
async fn abbau_ist_idempotent() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    status_abwarten(&mut aufbau.status, SessionStatus::Verbunden).await;

    aufbau.handle.stoppen().await;
    aufbau.handle.stoppen().await;

    assert_eq!(*aufbau.status.borrow(), SessionStatus::Getrennt);
    assert!(aufbau
        .kanal
        .getrennt
        .load(std::sync::atomic::Ordering::Relaxed));
    aufbau.task.await.unwrap();
}

#[tokio::test]
async fn abbau_aus_gescheitert_endet_getrennt() {
    let mut aufbau = session_starten_mit(MockOptionen {
        kanal_verbinden_schlaegt_fehl: true,
        ..Default::default()
    });
    status_abwarten(&mut aufbau.status, SessionStatus::Gescheitert).await;

    aufbau.handle.stoppen().await;
    assert_eq!(*aufbau.status.borrow(), SessionStatus::Getrennt);
}

#[tokio::test]
async fn geraetefehler_fuehrt_zu_gescheitert() {
    let mut aufbau = session_starten_mit(MockOptionen {
        geraet_schlaegt_fehl: true,
        ..Default::default()
    });
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    aufbau.kanal.einspeisen(toggle(true));

    status_abwarten(&mut aufbau.status, SessionStatus::Gescheitert).await;
    assert!(
        aufbau.protokoll.lock().unwrap().geschlossen,
        "Peer-Verbindung wird beim Scheitern geschlossen"
    );
}

#[tokio::test]
async fn abgelehnte_answer_fuehrt_zu_gescheitert() {
    let mut aufbau = session_starten_mit(MockOptionen {
        antwort_schlaegt_fehl: true,
        ..Default::default()
    });
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;

    aufbau.kanal.einspeisen(answer());
    status_abwarten(&mut aufbau.status, SessionStatus::Gescheitert).await;
    assert!(aufbau.protokoll.lock().unwrap().geschlossen);
}

#[tokio::test]
async fn kanalabbruch_fuehrt_zu_gescheitert() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    status_abwarten(&mut aufbau.status, SessionStatus::Verbunden).await;

    // Kanal faellt: Sender droppen schliesst die Ereignisfolge
    let KanalSteuerung { eingang, .. } = aufbau.kanal;
    drop(eingang);

    status_abwarten(&mut aufbau.status, SessionStatus::Gescheitert).await;

    // Abbau bleibt moeglich
    aufbau.handle.stoppen().await;
    assert_eq!(*aufbau.status.borrow(), SessionStatus::Getrennt);
}

#[tokio::test]
async fn link_scheitern_fuehrt_zu_gescheitert() {
    let mut aufbau = session_starten();
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    status_abwarten(&mut aufbau.status, SessionStatus::Verbunden).await;

    let sender = aufbau
        .link_ereignisse
        .lock()
        .unwrap()
        .as_ref()
        .unwrap()
        .clone();
    sender
        .send(LinkEreignis::VerbindungGescheitert("ICE failed".into()))
        .unwrap();

    status_abwarten(&mut aufbau.status, SessionStatus::Gescheitert).await;
}

#[tokio::test]
async fn kompletter_ablauf() {
    let mut aufbau = session_starten();

    // Verbindungsaufbau
    aufbau.kanal.einspeisen(SignalEvent::Connect);
    status_abwarten(&mut aufbau.status, SessionStatus::Verbunden).await;

    // Einschalten: genau eine Offer, Status sendet
    aufbau.kanal.einspeisen(toggle(true));
    status_abwarten(&mut aufbau.status, SessionStatus::Sendet).await;
    assert_eq!(aufbau.kanal.gesendete_offers(), 1);

    // Answer: Status bleibt sendet
    aufbau.kanal.einspeisen(answer());
    warten_bis(
        || aufbau.protokoll.lock().unwrap().antworten.len() == 1,
        "angewendete Answer",
    )
    .await;
    assert_eq!(*aufbau.status.borrow(), SessionStatus::Sendet);

    // Drei Kandidaten, alle angewendet
    for nummer in 1..=3 {
        aufbau
            .kanal
            .einspeisen(SignalEvent::IceCandidate(kandidat(nummer)));
    }
    warten_bis(
        || aufbau.protokoll.lock().unwrap().kandidaten.len() == 3,
        "drei angewendete Kandidaten",
    )
    .await;

    // Vordergrund-Verlust: stumm, Mikrofon-Flag aus
    aufbau.handle.hintergrund().await;
    status_abwarten(&mut aufbau.status, SessionStatus::Stumm).await;
    assert!(!aufbau.protokoll.lock().unwrap().track_ist_aktiv());

    // Abbau: getrennt, Geraet freigegeben, Kanal zu, Verbindung zu
    aufbau.handle.stoppen().await;
    assert_eq!(*aufbau.status.borrow(), SessionStatus::Getrennt);
    assert!(aufbau
        .geraet
        .freigegeben
        .load(std::sync::atomic::Ordering::Relaxed));
    assert!(aufbau
        .kanal
        .getrennt
        .load(std::sync::atomic::Ordering::Relaxed));
    assert!(aufbau.protokoll.lock().unwrap().geschlossen);
    aufbau.task.await.unwrap();
}
