use tandem_netproto::{Foot, Role};
use tandem_pedal::TapSender;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::{RelayClientHandle, RelayEvent};
use crate::error::NetplayError;

/// Connects a relay client to a local [`PedalFusionEngine`](tandem_pedal::PedalFusionEngine).
///
/// Local taps go into the engine and onto the wire; remote taps are stamped on receipt
/// and fed into the engine. Each client is authoritative for its own role, so a remote
/// tap that claims our role is dropped.
#[derive(Debug, Clone)]
pub struct TapBridge {
    client: RelayClientHandle,
    engine: TapSender,
}

impl TapBridge {
    pub fn new(client: RelayClientHandle, engine: TapSender) -> Self {
        Self { client, engine }
    }

    pub fn local_role(&self) -> Role {
        self.client.role()
    }

    pub fn client(&self) -> &RelayClientHandle {
        &self.client
    }

    /// Record one of our own taps locally and send it to the partner.
    ///
    /// The partner still receives the tap if the local engine is gone.
    pub async fn local_tap(&self, foot: Foot) -> Result<(), NetplayError> {
        let role = self.local_role();
        if !self.engine.send(role, foot) {
            debug!(%role, %foot, "Local engine gone, tap only sent to partner");
        }
        self.client.send_tap(foot).await
    }

    /// Feed `event` to the engine if it is a partner tap. Returns `true` if consumed.
    pub fn handle_event(&self, event: &RelayEvent) -> bool {
        let RelayEvent::RemoteTap { role, foot } = *event else {
            return false;
        };
        if role == self.local_role() {
            debug!(%role, %foot, "Ignoring remote tap for our own role");
            return true;
        }
        if !self.engine.send(role, foot) {
            debug!(%role, %foot, "Local engine gone, dropping remote tap");
        }
        true
    }

    /// Pump `events` on a task: taps go to the engine, everything else is passed on.
    ///
    /// The returned receiver ends after `Disconnected` has been forwarded.
    pub fn spawn(
        &self,
        mut events: mpsc::Receiver<RelayEvent>,
    ) -> (JoinHandle<()>, mpsc::Receiver<RelayEvent>) {
        let (tx, rx) = mpsc::channel(events.max_capacity());
        let bridge = self.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if bridge.handle_event(&event) {
                    continue;
                }
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        (task, rx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tandem_netproto::RoomCode;
    use tandem_pedal::{ManualClock, PedalFusionEngine};

    use super::*;

    fn bridge(role: Role) -> (TapBridge, PedalFusionEngine) {
        let engine = PedalFusionEngine::new().with_clock(Arc::new(ManualClock::new(2.0)));
        let (client, _cmd_rx) =
            RelayClientHandle::detached(RoomCode::parse("ABCD").unwrap(), role);
        (TapBridge::new(client, engine.tap_sender()), engine)
    }

    #[test]
    fn partner_taps_reach_the_engine() {
        let (bridge, mut engine) = bridge(Role::Stoker);
        assert!(bridge.handle_event(&RelayEvent::RemoteTap {
            role: Role::Captain,
            foot: Foot::A,
        }));
        engine.update(0.0);
        assert_eq!(engine.state().captain.map(|l| l.foot), Some(Foot::A));
        assert_eq!(engine.state().captain.map(|l| l.time), Some(2.0));
    }

    #[test]
    fn taps_claiming_our_role_are_dropped() {
        let (bridge, mut engine) = bridge(Role::Stoker);
        assert!(bridge.handle_event(&RelayEvent::RemoteTap {
            role: Role::Stoker,
            foot: Foot::A,
        }));
        assert_eq!(engine.update(0.0).crank_angle, 0.0);
        assert_eq!(engine.state().stoker, None);
    }

    #[tokio::test]
    async fn taps_outlive_a_dropped_engine() {
        let engine = PedalFusionEngine::new();
        let (client, mut cmd_rx) =
            RelayClientHandle::detached(RoomCode::parse("ABCD").unwrap(), Role::Captain);
        let bridge = TapBridge::new(client, engine.tap_sender());
        drop(engine);

        assert!(bridge.handle_event(&RelayEvent::RemoteTap {
            role: Role::Stoker,
            foot: Foot::B,
        }));
        bridge.local_tap(Foot::A).await.unwrap();
        assert!(cmd_rx.try_recv().is_ok());
    }

    #[test]
    fn other_events_pass_through() {
        let (bridge, _engine) = bridge(Role::Captain);
        assert!(!bridge.handle_event(&RelayEvent::PartnerReady { role: Role::Stoker }));
        assert!(!bridge.handle_event(&RelayEvent::Disconnected {
            reason: "closed".into()
        }));
    }
}
