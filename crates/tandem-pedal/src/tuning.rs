use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

/// Every constant the fusion engine uses.
///
/// `Default` carries the reference tuning. Partial configs deserialize on top of it, so a
/// file only needs to name the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PedalTuning {
    /// Two opposing same-foot taps closer than this (seconds) are a crank-fight.
    pub crank_fight_window: f64,
    pub crank_fight_power_scale: f64,
    pub crank_fight_offset_penalty: f64,
    pub crank_fight_wobble: f64,

    pub wrong_foot_wobble: f64,
    pub wrong_foot_acceleration: f64,
    pub wrong_foot_power_penalty: f64,
    pub wrong_foot_offset_penalty: f64,

    pub in_phase_offset_penalty: f64,
    pub in_phase_power: f64,
    pub in_phase_cadence_gain: f64,
    pub in_phase_acceleration: f64,
    pub in_phase_power_acceleration: f64,
    pub in_phase_wobble: f64,

    pub anti_phase_offset_gain: f64,
    pub anti_phase_power: f64,
    pub anti_phase_cadence_gain: f64,
    pub anti_phase_acceleration: f64,
    pub anti_phase_power_acceleration: f64,
    pub anti_phase_offset_acceleration: f64,

    /// Gaps shorter than this (seconds) earn a cadence bonus.
    pub cadence_window: f64,
    /// Radians the crank advances per accepted tap.
    pub crank_step: f64,
    /// Per-second decay rates.
    pub power_decay: f64,
    pub offset_decay: f64,
}

impl Default for PedalTuning {
    fn default() -> Self {
        Self {
            crank_fight_window: 0.1,
            crank_fight_power_scale: 0.9,
            crank_fight_offset_penalty: 0.15,
            crank_fight_wobble: 0.8,

            wrong_foot_wobble: 0.5,
            wrong_foot_acceleration: 0.06,
            wrong_foot_power_penalty: 0.15,
            wrong_foot_offset_penalty: 0.1,

            in_phase_offset_penalty: 0.08,
            in_phase_power: 0.1,
            in_phase_cadence_gain: 0.3,
            in_phase_acceleration: 0.15,
            in_phase_power_acceleration: 0.3,
            in_phase_wobble: 0.2,

            anti_phase_offset_gain: 0.1,
            anti_phase_power: 0.2,
            anti_phase_cadence_gain: 0.4,
            anti_phase_acceleration: 0.35,
            anti_phase_power_acceleration: 0.6,
            anti_phase_offset_acceleration: 0.15,

            cadence_window: 0.8,
            crank_step: FRAC_PI_2,
            power_decay: 0.4,
            offset_decay: 0.05,
        }
    }
}

impl PedalTuning {
    /// `max(0, cadence_window - gap) * gain`. An infinite gap earns nothing.
    pub fn cadence_bonus(&self, gap: f64, gain: f64) -> f64 {
        (self.cadence_window - gap).max(0.0) * gain
    }
}
