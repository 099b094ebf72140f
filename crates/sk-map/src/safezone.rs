use sk_entity::{DangerState, Position};

/// A single point in the shrink timeline: at `at_ms` elapsed theater time the
/// zone's radius is `radius`. Interpolated linearly between consecutive
/// keyframes, held at the last keyframe's radius afterward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShrinkKeyframe {
    pub at_ms: u64,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct SafeZone {
    pub center: Position,
    pub current_radius: f32,
    pub timeline: Vec<ShrinkKeyframe>,
    pub elapsed_ms: u64,
}

impl SafeZone {
    pub fn new(center: Position, timeline: Vec<ShrinkKeyframe>) -> Self {
        let current_radius = timeline.first().map(|k| k.radius).unwrap_or(0.0);
        Self { center, current_radius, timeline, elapsed_ms: 0 }
    }

    /// Advances the shrink timeline by `delta_ms` and recomputes the
    /// current radius.
    pub fn advance(&mut self, delta_ms: u64) {
        self.elapsed_ms += delta_ms;
        self.current_radius = self.radius_at(self.elapsed_ms);
    }

    fn radius_at(&self, elapsed_ms: u64) -> f32 {
        if self.timeline.is_empty() {
            return 0.0;
        }
        if elapsed_ms <= self.timeline[0].at_ms {
            return self.timeline[0].radius;
        }
        for pair in self.timeline.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if elapsed_ms >= a.at_ms && elapsed_ms <= b.at_ms {
                let span = (b.at_ms - a.at_ms).max(1) as f32;
                let t = (elapsed_ms - a.at_ms) as f32 / span;
                return a.radius + (b.radius - a.radius) * t;
            }
        }
        self.timeline.last().unwrap().radius
    }

    pub fn is_inside(&self, position: Position) -> bool {
        self.center.distance(position) <= self.current_radius
    }
}

/// Per-unit danger-state tracking. `entering_delay_ms` is
/// `EnteringDangerStateDelay` from config; `health_loss` /
/// `health_loss_interval_ms` are `dangerStateHealthLoss` /
/// `healthLossInterval`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DangerTracker {
    pub time_in_state_ms: u64,
    pub loss_accumulator_ms: u64,
}

impl DangerTracker {
    /// Advances the tracker for a unit currently at `state`, returning the
    /// new state and the health loss to apply this tick (always `0.0`
    /// unless the unit is `ENTERED`).
    pub fn advance(
        &mut self,
        state: DangerState,
        inside_safe_zone: bool,
        delta_ms: u64,
        entering_delay_ms: u64,
        health_loss: f32,
        health_loss_interval_ms: u64,
    ) -> (DangerState, f32) {
        if inside_safe_zone {
            *self = DangerTracker::default();
            return (DangerState::Released, 0.0);
        }

        match state {
            DangerState::Released => {
                self.time_in_state_ms = delta_ms;
                if self.time_in_state_ms >= entering_delay_ms {
                    self.time_in_state_ms = 0;
                    (DangerState::Entering, 0.0)
                } else {
                    (DangerState::Entering, 0.0)
                }
            }
            DangerState::Entering => {
                self.time_in_state_ms += delta_ms;
                if self.time_in_state_ms >= entering_delay_ms {
                    self.time_in_state_ms = 0;
                    (DangerState::Entered, 0.0)
                } else {
                    (DangerState::Entering, 0.0)
                }
            }
            DangerState::Entered => {
                self.loss_accumulator_ms += delta_ms;
                let mut loss = 0.0;
                while self.loss_accumulator_ms >= health_loss_interval_ms && health_loss_interval_ms > 0 {
                    loss += health_loss;
                    self.loss_accumulator_ms -= health_loss_interval_ms;
                }
                (DangerState::Entered, loss)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrink_interpolates_between_keyframes() {
        let mut zone = SafeZone::new(
            Position::default(),
            vec![ShrinkKeyframe { at_ms: 0, radius: 100.0 }, ShrinkKeyframe { at_ms: 1000, radius: 0.0 }],
        );
        zone.advance(500);
        assert_eq!(zone.current_radius, 50.0);
        zone.advance(1000);
        assert_eq!(zone.current_radius, 0.0);
    }

    #[test]
    fn entering_then_entered_then_released() {
        let mut tracker = DangerTracker::default();
        let (state, loss) = tracker.advance(DangerState::Released, false, 50, 100, 5.0, 1000);
        assert_eq!(state, DangerState::Entering);
        assert_eq!(loss, 0.0);

        let (state, _) = tracker.advance(DangerState::Entering, false, 60, 100, 5.0, 1000);
        assert_eq!(state, DangerState::Entered);

        let (state, loss) = tracker.advance(DangerState::Entered, false, 1000, 100, 5.0, 1000);
        assert_eq!(state, DangerState::Entered);
        assert_eq!(loss, 5.0);

        let (state, _) = tracker.advance(DangerState::Entered, true, 10, 100, 5.0, 1000);
        assert_eq!(state, DangerState::Released);
    }
}
