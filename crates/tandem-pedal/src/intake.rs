//! Tap hand-off between input sources and the engine tick.
//!
//! Local input and network receive threads push through [`TapSender`]; the engine
//! drains the channel once per tick, so taps never mutate state mid-tick.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use tandem_netproto::{Foot, Role};
use tracing::debug;

use crate::clock::TapClock;

/// A single foot tap, stamped on receipt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapEvent {
    pub role: Role,
    pub foot: Foot,
    /// Seconds on the engine clock.
    pub timestamp: f64,
}

/// Cloneable, thread-safe handle that feeds taps into one engine.
#[derive(Clone)]
pub struct TapSender {
    tx: Sender<TapEvent>,
    clock: Arc<dyn TapClock>,
}

impl fmt::Debug for TapSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapSender")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl TapSender {
    pub(crate) fn new(tx: Sender<TapEvent>, clock: Arc<dyn TapClock>) -> Self {
        Self { tx, clock }
    }

    /// Same channel, different timestamp source.
    pub(crate) fn rebind(&self, clock: Arc<dyn TapClock>) -> Self {
        Self::new(self.tx.clone(), clock)
    }

    pub fn clock(&self) -> &Arc<dyn TapClock> {
        &self.clock
    }

    /// Enqueue a tap stamped with the current clock reading.
    ///
    /// Returns `false` if the engine is gone.
    pub fn send(&self, role: Role, foot: Foot) -> bool {
        self.send_at(role, foot, self.clock.now())
    }

    /// Enqueue a tap with an explicit timestamp. Non-finite timestamps are dropped.
    pub fn send_at(&self, role: Role, foot: Foot, timestamp: f64) -> bool {
        if !timestamp.is_finite() {
            debug!(%role, %foot, timestamp, "Dropping tap with non-finite timestamp");
            return false;
        }
        self.tx
            .send(TapEvent {
                role,
                foot,
                timestamp,
            })
            .is_ok()
    }

    /// Parse and enqueue a tap from its wire spelling. Unknown values are ignored.
    pub fn send_raw(&self, role: &str, foot: &str) -> bool {
        match (Role::parse(role), Foot::parse(foot)) {
            (Ok(role), Ok(foot)) => self.send(role, foot),
            (role_res, foot_res) => {
                debug!(
                    role,
                    foot,
                    role_ok = role_res.is_ok(),
                    foot_ok = foot_res.is_ok(),
                    "Ignoring malformed tap"
                );
                false
            }
        }
    }
}

/// Engine side of the channel.
#[derive(Debug)]
pub(crate) struct TapInbox {
    rx: Receiver<TapEvent>,
}

impl TapInbox {
    pub(crate) fn new(rx: Receiver<TapEvent>) -> Self {
        Self { rx }
    }

    /// Move every pending tap into `queue`, preserving arrival order.
    pub(crate) fn drain_into(&self, queue: &mut Vec<TapEvent>) {
        queue.extend(self.rx.try_iter());
    }
}

/// Create a connected sender/inbox pair.
pub(crate) fn channel(clock: Arc<dyn TapClock>) -> (TapSender, TapInbox) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (TapSender::new(tx, clock), TapInbox::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn drain_preserves_arrival_order_not_timestamp_order() {
        let (tx, inbox) = channel(Arc::new(ManualClock::default()));
        assert!(tx.send_at(Role::Stoker, Foot::B, 2.0));
        assert!(tx.send_at(Role::Captain, Foot::A, 1.0));

        let mut queue = Vec::new();
        inbox.drain_into(&mut queue);
        let times: Vec<_> = queue.iter().map(|e| e.timestamp).collect();
        assert_eq!(times, vec![2.0, 1.0]);

        inbox.drain_into(&mut queue);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn send_uses_the_clock() {
        let clock = Arc::new(ManualClock::new(3.0));
        let (tx, inbox) = channel(clock.clone());
        tx.send(Role::Captain, Foot::A);
        clock.advance(0.5);
        tx.send(Role::Captain, Foot::B);

        let mut queue = Vec::new();
        inbox.drain_into(&mut queue);
        assert_eq!(queue[0].timestamp, 3.0);
        assert_eq!(queue[1].timestamp, 3.5);
    }

    #[test]
    fn malformed_and_non_finite_taps_are_dropped() {
        let (tx, inbox) = channel(Arc::new(ManualClock::default()));
        assert!(!tx.send_raw("pilot", "A"));
        assert!(!tx.send_raw("captain", "C"));
        assert!(!tx.send_at(Role::Captain, Foot::A, f64::NAN));
        assert!(!tx.send_at(Role::Captain, Foot::A, f64::INFINITY));
        assert!(tx.send_raw("stoker", "b"));

        let mut queue = Vec::new();
        inbox.drain_into(&mut queue);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].role, Role::Stoker);
        assert_eq!(queue[0].foot, Foot::B);
    }

    #[test]
    fn sender_reports_dropped_engine() {
        let (tx, inbox) = channel(Arc::new(ManualClock::default()));
        drop(inbox);
        assert!(!tx.send(Role::Captain, Foot::A));
    }
}
