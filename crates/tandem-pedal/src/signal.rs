use crate::classify::TapOutcome;

/// Which tap outcomes occurred on the most recent tick that consumed taps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Feedback {
    pub wrong_foot: bool,
    pub in_phase: bool,
    pub anti_phase: bool,
    pub crank_fight: bool,
}

impl Feedback {
    pub(crate) fn crank_fight() -> Self {
        Self {
            crank_fight: true,
            ..Self::default()
        }
    }

    pub(crate) fn mark(&mut self, outcome: TapOutcome) {
        match outcome {
            TapOutcome::WrongFoot => self.wrong_foot = true,
            TapOutcome::InPhase => self.in_phase = true,
            TapOutcome::AntiPhase => self.anti_phase = true,
        }
    }
}

/// Output of one engine tick, consumed by the vehicle physics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveSignal {
    pub acceleration: f64,
    pub wobble: f64,
    pub braking: bool,
    pub crank_angle: f64,
    pub feedback: Feedback,
}
