use tandem_netproto::{Foot, Role};

/// The last accepted tap of one role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastTap {
    pub foot: Foot,
    pub time: f64,
}

/// Persistent drive state owned by one engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PedalState {
    /// In `[0, 1]`.
    pub pedal_power: f64,
    /// Radians; never decreases.
    pub crank_angle: f64,
    /// In `[0, 1]`. Rises with anti-phase pedalling.
    pub offset_score: f64,
    pub captain: Option<LastTap>,
    pub stoker: Option<LastTap>,
}

impl Default for PedalState {
    fn default() -> Self {
        Self {
            pedal_power: 0.0,
            crank_angle: 0.0,
            offset_score: 0.5,
            captain: None,
            stoker: None,
        }
    }
}

impl PedalState {
    pub fn last(&self, role: Role) -> Option<LastTap> {
        match role {
            Role::Captain => self.captain,
            Role::Stoker => self.stoker,
        }
    }

    pub fn record(&mut self, role: Role, foot: Foot, time: f64) {
        let slot = match role {
            Role::Captain => &mut self.captain,
            Role::Stoker => &mut self.stoker,
        };
        *slot = Some(LastTap { foot, time });
    }

    /// Pull the bounded scores back into range. Non-finite values reset to 0.
    pub(crate) fn clamp(&mut self) {
        self.pedal_power = unit(self.pedal_power);
        self.offset_score = unit(self.offset_score);
        if !self.crank_angle.is_finite() || self.crank_angle < 0.0 {
            self.crank_angle = 0.0;
        }
    }
}

pub(crate) fn unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_per_role() {
        let mut s = PedalState::default();
        s.record(Role::Stoker, Foot::B, 1.0);
        assert_eq!(s.last(Role::Captain), None);
        assert_eq!(
            s.last(Role::Stoker),
            Some(LastTap {
                foot: Foot::B,
                time: 1.0
            })
        );
    }

    #[test]
    fn clamp_repairs_out_of_range_values() {
        let mut s = PedalState {
            pedal_power: 3.0,
            offset_score: f64::NAN,
            crank_angle: -1.0,
            ..PedalState::default()
        };
        s.clamp();
        assert_eq!(s.pedal_power, 1.0);
        assert_eq!(s.offset_score, 0.0);
        assert_eq!(s.crank_angle, 0.0);
    }
}
