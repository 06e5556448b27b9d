//! Pedal fusion for a two-rider crank.
//!
//! Each client runs one [`PedalFusionEngine`] fed with its own taps and the partner's
//! relayed taps. Once per physics tick the engine turns whatever arrived since the last
//! tick into a [`DriveSignal`]: alternating feet build power, pedalling opposite the
//! partner builds the offset score, and both riders hitting the same pedal together
//! brakes the vehicle.

pub mod classify;
pub mod clock;
pub mod engine;
pub mod intake;
pub mod signal;
pub mod state;
pub mod tuning;

pub use classify::TapOutcome;
pub use clock::{ManualClock, MonotonicClock, TapClock};
pub use engine::PedalFusionEngine;
pub use intake::{TapEvent, TapSender};
pub use signal::{DriveSignal, Feedback};
pub use state::{LastTap, PedalState};
pub use tuning::PedalTuning;
