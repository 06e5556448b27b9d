use std::sync::Arc;

use tandem_netproto::{Foot, Role};
use tracing::{debug, trace};

use crate::classify::{TapOutcome, classify, is_crank_fight};
use crate::clock::{MonotonicClock, TapClock};
use crate::intake::{self, TapEvent, TapInbox, TapSender};
use crate::signal::{DriveSignal, Feedback};
use crate::state::{PedalState, unit};
use crate::tuning::PedalTuning;

/// Per-tick accumulators, reset every update.
#[derive(Debug, Default)]
struct Impulse {
    acceleration: f64,
    wobble: f64,
}

/// Fuses the captain's and stoker's tap streams into one drive signal per tick.
///
/// Taps may arrive from any thread via [`TapSender`]; they are only consumed inside
/// [`update`](Self::update), in arrival order.
#[derive(Debug)]
pub struct PedalFusionEngine {
    tuning: PedalTuning,
    state: PedalState,
    sender: TapSender,
    inbox: TapInbox,
    queue: Vec<TapEvent>,
    feedback: Feedback,
}

impl Default for PedalFusionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PedalFusionEngine {
    pub fn new() -> Self {
        Self::with_tuning(PedalTuning::default())
    }

    pub fn with_tuning(tuning: PedalTuning) -> Self {
        let (sender, inbox) = intake::channel(Arc::new(MonotonicClock::new()));
        Self {
            tuning,
            state: PedalState::default(),
            sender,
            inbox,
            queue: Vec::new(),
            feedback: Feedback::default(),
        }
    }

    /// Stamp taps from `clock` instead of the wall clock.
    ///
    /// Senders handed out earlier keep their old clock.
    pub fn with_clock(mut self, clock: Arc<dyn TapClock>) -> Self {
        self.sender = self.sender.rebind(clock);
        self
    }

    /// Start from `state` instead of the default. Out-of-range scores are clamped.
    pub fn with_state(mut self, mut state: PedalState) -> Self {
        state.clamp();
        self.state = state;
        self
    }

    pub fn receive_tap(&self, role: Role, foot: Foot) {
        self.sender.send(role, foot);
    }

    pub fn receive_tap_at(&self, role: Role, foot: Foot, timestamp: f64) {
        self.sender.send_at(role, foot, timestamp);
    }

    /// Accept a tap in wire spelling; anything unparseable is logged and dropped.
    pub fn receive_raw_tap(&self, role: &str, foot: &str) {
        self.sender.send_raw(role, foot);
    }

    pub fn tap_sender(&self) -> TapSender {
        self.sender.clone()
    }

    /// Current reading of the engine's clock.
    pub fn now(&self) -> f64 {
        self.sender.clock().now()
    }

    pub fn state(&self) -> &PedalState {
        &self.state
    }

    pub fn tuning(&self) -> &PedalTuning {
        &self.tuning
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    /// Advance one physics tick of `dt` seconds.
    pub fn update(&mut self, dt: f64) -> DriveSignal {
        self.inbox.drain_into(&mut self.queue);

        if let Some(signal) = self.try_crank_fight() {
            return signal;
        }

        let mut impulse = Impulse::default();
        let mut queue = std::mem::take(&mut self.queue);
        if !queue.is_empty() {
            let mut feedback = Feedback::default();
            for event in queue.drain(..) {
                let outcome = self.apply(&event, &mut impulse);
                trace!(role = %event.role, foot = %event.foot, ?outcome, "Tap");
                feedback.mark(outcome);
            }
            self.feedback = feedback;
        }
        self.queue = queue;

        self.decay(dt);

        DriveSignal {
            acceleration: impulse.acceleration,
            wobble: impulse.wobble,
            braking: false,
            crank_angle: self.state.crank_angle,
            feedback: self.feedback,
        }
    }

    /// Both riders stamped on the same pedal together: brake and drop the whole batch.
    fn try_crank_fight(&mut self) -> Option<DriveSignal> {
        let [first, second, ..] = self.queue.as_slice() else {
            return None;
        };
        let (first, second) = (*first, *second);
        if !is_crank_fight(&first, &second, self.tuning.crank_fight_window) {
            return None;
        }

        let discarded = self.queue.len();
        self.queue.clear();

        let t = &self.tuning;
        let s = &mut self.state;
        s.pedal_power = unit(s.pedal_power * t.crank_fight_power_scale);
        s.offset_score = unit(s.offset_score - t.crank_fight_offset_penalty);
        s.record(first.role, first.foot, first.timestamp);
        s.record(second.role, second.foot, second.timestamp);
        self.feedback = Feedback::crank_fight();

        debug!(foot = %first.foot, discarded, "Crank fight");

        Some(DriveSignal {
            acceleration: 0.0,
            wobble: t.crank_fight_wobble,
            braking: true,
            crank_angle: s.crank_angle,
            feedback: self.feedback,
        })
    }

    fn apply(&mut self, event: &TapEvent, impulse: &mut Impulse) -> TapOutcome {
        let t = &self.tuning;
        let s = &mut self.state;

        let own = s.last(event.role);
        let other = s.last(event.role.opposite());
        // Late arrivals can carry an older timestamp than the role's last tap.
        let gap = own.map_or(f64::INFINITY, |last| (event.timestamp - last.time).max(0.0));

        let outcome = classify(event.foot, own, other);
        match outcome {
            TapOutcome::WrongFoot => {
                impulse.wobble += t.wrong_foot_wobble;
                impulse.acceleration += t.wrong_foot_acceleration;
                s.pedal_power = unit(s.pedal_power - t.wrong_foot_power_penalty);
                s.offset_score = unit(s.offset_score - t.wrong_foot_offset_penalty);
            }
            TapOutcome::InPhase => {
                s.offset_score = unit(s.offset_score - t.in_phase_offset_penalty);
                let bonus = t.cadence_bonus(gap, t.in_phase_cadence_gain);
                s.pedal_power = unit(s.pedal_power + t.in_phase_power + bonus);
                impulse.acceleration +=
                    t.in_phase_acceleration + t.in_phase_power_acceleration * s.pedal_power;
                impulse.wobble += t.in_phase_wobble;
            }
            TapOutcome::AntiPhase => {
                s.offset_score = unit(s.offset_score + t.anti_phase_offset_gain);
                let bonus = t.cadence_bonus(gap, t.anti_phase_cadence_gain);
                s.pedal_power = unit(s.pedal_power + t.anti_phase_power + bonus);
                impulse.acceleration += t.anti_phase_acceleration
                    + t.anti_phase_power_acceleration * s.pedal_power
                    + s.offset_score * t.anti_phase_offset_acceleration;
            }
        }

        s.record(event.role, event.foot, event.timestamp);
        s.crank_angle += t.crank_step.max(0.0);
        outcome
    }

    fn decay(&mut self, dt: f64) {
        let dt = if dt.is_finite() {
            dt.max(0.0)
        } else {
            debug!(dt, "Ignoring non-finite tick length");
            0.0
        };
        let t = &self.tuning;
        let s = &mut self.state;
        s.pedal_power = unit(s.pedal_power * (1.0 - t.power_decay * dt));
        s.offset_score = unit(s.offset_score * (1.0 - t.offset_decay * dt));
    }
}
