//! Two clients through a real relay, each with its own pedal engine.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tandem_netd::{RelayConfig, RoomRouter, run_server};
use tandem_netplay::{NetplayError, RelayData, RelayEvent, TapBridge, connect};
use tandem_netproto::{ConnectParams, Foot, Role, RoomCode};
use tandem_pedal::PedalFusionEngine;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

async fn spawn_relay() -> String {
    let _ = tracing_subscriber::fmt::try_init();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Arc::new(RoomRouter::new());
    tokio::spawn(async move {
        let _ = run_server(listener, router, RelayConfig::default()).await;
    });
    format!("ws://{addr}")
}

fn params(room: &str, role: Role) -> ConnectParams {
    ConnectParams::new(RoomCode::parse(room).unwrap(), role)
}

async fn next_event(rx: &mut mpsc::Receiver<RelayEvent>) -> RelayEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Tick `engine` until `done` holds or two seconds pass.
async fn tick_until(engine: &mut PedalFusionEngine, done: impl Fn(&PedalFusionEngine) -> bool) {
    for _ in 0..200 {
        engine.update(0.0);
        if done(engine) {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("engine never reached expected state: {:?}", engine.state());
}

#[tokio::test]
async fn captain_tap_turns_the_stokers_crank() {
    let url = spawn_relay().await;

    let (captain, mut captain_rx) = connect(&url, &params("BIKE", Role::Captain)).await.unwrap();
    let (stoker, mut stoker_rx) = connect(&url, &params("BIKE", Role::Stoker)).await.unwrap();
    assert_eq!(
        next_event(&mut captain_rx).await,
        RelayEvent::PartnerReady { role: Role::Stoker }
    );
    assert_eq!(
        next_event(&mut stoker_rx).await,
        RelayEvent::PartnerReady {
            role: Role::Captain
        }
    );

    let mut captain_engine = PedalFusionEngine::new();
    let mut stoker_engine = PedalFusionEngine::new();
    let captain_bridge = TapBridge::new(captain, captain_engine.tap_sender());
    let stoker_bridge = TapBridge::new(stoker, stoker_engine.tap_sender());
    let (_captain_pump, _captain_rest) = captain_bridge.spawn(captain_rx);
    let (_stoker_pump, _stoker_rest) = stoker_bridge.spawn(stoker_rx);

    captain_bridge.local_tap(Foot::A).await.unwrap();

    // Local tap lands immediately; the remote copy arrives through the relay.
    captain_engine.update(0.0);
    assert!((captain_engine.state().crank_angle - FRAC_PI_2).abs() < 1e-9);

    tick_until(&mut stoker_engine, |e| e.state().captain.is_some()).await;
    let s = stoker_engine.state();
    assert_eq!(s.captain.map(|l| l.foot), Some(Foot::A));
    assert!((s.crank_angle - FRAC_PI_2).abs() < 1e-9);
    assert!(s.stoker.is_none());

    // And back the other way.
    stoker_bridge.local_tap(Foot::B).await.unwrap();
    tick_until(&mut captain_engine, |e| e.state().stoker.is_some()).await;
    assert!(captain_engine.feedback().anti_phase);
    assert!((captain_engine.state().crank_angle - 2.0 * FRAC_PI_2).abs() < 1e-9);
}

#[tokio::test]
async fn opaque_data_and_departure_reach_the_partner() {
    let url = spawn_relay().await;
    let (captain, mut captain_rx) = connect(&url, &params("DATA", Role::Captain)).await.unwrap();
    let (stoker, mut stoker_rx) = connect(&url, &params("DATA", Role::Stoker)).await.unwrap();
    next_event(&mut captain_rx).await;
    next_event(&mut stoker_rx).await;

    captain.send_text(r#"{"type":"chat","msg":"ready?"}"#).await.unwrap();
    assert_eq!(
        next_event(&mut stoker_rx).await,
        RelayEvent::Data(RelayData::Text(r#"{"type":"chat","msg":"ready?"}"#.into()))
    );

    stoker.send_binary(vec![7u8, 8, 9]).await.unwrap();
    assert_eq!(
        next_event(&mut captain_rx).await,
        RelayEvent::Data(RelayData::Binary(Bytes::from_static(&[7, 8, 9])))
    );

    stoker.close().await.unwrap();
    assert_eq!(
        next_event(&mut captain_rx).await,
        RelayEvent::PartnerLeft { role: Role::Stoker }
    );
    assert!(matches!(
        next_event(&mut stoker_rx).await,
        RelayEvent::Disconnected { .. }
    ));
}

#[tokio::test]
async fn duplicate_role_is_rejected() {
    let url = spawn_relay().await;
    let (_first, _rx) = connect(&url, &params("DUPE", Role::Stoker)).await.unwrap();

    // The relay seats the first client right after the upgrade completes.
    let mut last = None;
    for _ in 0..50 {
        match connect(&url, &params("DUPE", Role::Stoker)).await {
            Err(NetplayError::Rejected(status)) => {
                last = Some(status);
                break;
            }
            Ok(_) => sleep(Duration::from_millis(10)).await,
            Err(other) => panic!("unexpected error {other}"),
        }
    }
    assert_eq!(last, Some(409));
}

#[tokio::test]
async fn non_websocket_url_is_refused_locally() {
    let err = connect("http://127.0.0.1:1", &params("NOPE", Role::Captain))
        .await
        .err()
        .expect("should fail");
    assert!(matches!(err, NetplayError::InvalidUrl(_)));
}
