//! Needs domain: five bounded channels that drain every sim minute.

use bevy::prelude::*;

use crate::shared::*;

const LOW_NEED_THRESHOLD: f32 = 15.0;
const TIRED_SPEED_FACTOR: f32 = 0.6;
const HUNGRY_SPEED_FACTOR: f32 = 0.8;

pub struct NeedsPlugin;

impl Plugin for NeedsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Needs>()
            .add_systems(Update, decay_needs.in_set(FrameSet::Simulate));
    }
}

/// Subtracts `rate * minutes` from every channel, clamping into range.
pub fn decay(needs: &mut Needs, rates: &NeedsDelta, minutes: f32) {
    if minutes <= 0.0 {
        return;
    }
    for kind in NeedKind::ALL {
        needs.add(kind, -rates.get(kind) * minutes);
    }
}

/// Movement speed factor from current needs. No floor is applied here.
pub fn speed_multiplier(needs: &Needs) -> f32 {
    let mut multiplier = 1.0;
    if needs.energy < LOW_NEED_THRESHOLD {
        multiplier *= TIRED_SPEED_FACTOR;
    }
    if needs.hunger < LOW_NEED_THRESHOLD {
        multiplier *= HUNGRY_SPEED_FACTOR;
    }
    multiplier
}

fn decay_needs(frame: Res<FrameClock>, mut needs: ResMut<Needs>) {
    if frame.sim_minutes > 0.0 {
        decay(&mut needs, &NEEDS_DECAY_PER_MINUTE, frame.sim_minutes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_uses_per_channel_rates() {
        let mut needs = Needs::default();
        decay(&mut needs, &NEEDS_DECAY_PER_MINUTE, 10.0);
        assert!((needs.hunger - 98.2).abs() < 1e-4);
        assert!((needs.energy - 98.6).abs() < 1e-4);
        assert!((needs.hygiene - 98.8).abs() < 1e-4);
        assert!((needs.fun - 99.0).abs() < 1e-4);
        assert!((needs.social - 99.2).abs() < 1e-4);
    }

    #[test]
    fn test_decay_never_goes_below_zero_and_never_increases() {
        let mut needs = Needs::default();
        let mut previous = needs;
        for minutes in [0.5, 3.0, 100.0, 10_000.0, 0.0, 1.0] {
            decay(&mut needs, &NEEDS_DECAY_PER_MINUTE, minutes);
            for kind in NeedKind::ALL {
                let value = needs.get(kind);
                assert!((0.0..=MAX_NEED).contains(&value));
                assert!(value <= previous.get(kind));
            }
            previous = needs;
        }
        assert_eq!(needs.hunger, 0.0);
    }

    #[test]
    fn test_non_positive_minutes_change_nothing() {
        let mut needs = Needs::default();
        decay(&mut needs, &NEEDS_DECAY_PER_MINUTE, -4.0);
        assert_eq!(needs, Needs::default());
    }

    #[test]
    fn test_speed_multiplier_stacks() {
        let mut needs = Needs::default();
        assert_eq!(speed_multiplier(&needs), 1.0);
        needs.energy = 14.9;
        assert!((speed_multiplier(&needs) - 0.6).abs() < 1e-6);
        needs.hunger = 0.0;
        assert!((speed_multiplier(&needs) - 0.48).abs() < 1e-6);
        needs.energy = 15.0;
        assert!((speed_multiplier(&needs) - 0.8).abs() < 1e-6);
    }
}
