//! Calendar domain: the heartbeat of Tiny Acre.
//!
//! Responsible for:
//! - Clamping each frame's real delta before the simulation sees it
//! - Converting real seconds to simulated minutes (1:1)
//! - Advancing the displayed clock minute by minute, rolling hours and days
//! - Publishing `FrameClock` for every other domain to consume
//! - Ordering the frame's system sets

use bevy::prelude::*;
use std::fmt;

use crate::shared::*;

/// Tolerance when deciding a whole minute has accumulated. Float sums like
/// `0.1 * 600` land a hair under the exact total.
const MINUTE_EPSILON: f64 = 1e-6;

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>()
            .init_resource::<FrameClock>()
            .add_event::<DayStartedEvent>()
            .configure_sets(
                Update,
                (
                    FrameSet::Clock,
                    FrameSet::Simulate,
                    FrameSet::Resolve,
                    FrameSet::Motion,
                    FrameSet::Present,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnEnter(GameState::Playing), announce_start)
            .add_systems(Update, advance_clock.in_set(FrameSet::Clock));
    }
}

// ─── Clock ───────────────────────────────────────────────────────────────────

impl SimClock {
    pub fn new(time: SimTime) -> Self {
        Self {
            time,
            accumulator: 0.0,
        }
    }

    /// Feeds one frame of real time. Returns the fractional simulated minutes
    /// that elapsed, which is what decay, growth, and actions consume. The
    /// displayed time only moves in whole minutes.
    pub fn update(&mut self, real_seconds: f32) -> f32 {
        let minutes = real_seconds.max(0.0);
        self.accumulator += minutes as f64;
        while self.accumulator >= 1.0 - MINUTE_EPSILON {
            self.accumulator -= 1.0;
            self.time.advance_minute();
        }
        minutes
    }
}

impl SimTime {
    /// Minute → hour → day rollover.
    pub fn advance_minute(&mut self) {
        self.minute += 1;
        if self.minute >= 60 {
            self.minute = 0;
            self.hour += 1;
            if self.hour >= 24 {
                self.hour = 0;
                self.day += 1;
            }
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {} {:02}:{:02}", self.day, self.hour, self.minute)
    }
}

// ─── Systems ─────────────────────────────────────────────────────────────────

fn announce_start(clock: Res<SimClock>) {
    info!("[Calendar] Simulation running at {}", clock.time);
}

/// Samples the frame delta, clamps it, and advances the clock.
pub fn advance_clock(
    time: Res<Time>,
    mut clock: ResMut<SimClock>,
    mut frame: ResMut<FrameClock>,
    mut day_events: EventWriter<DayStartedEvent>,
) {
    let dt = time.delta_secs().clamp(0.0, MAX_FRAME_SECONDS);
    let day_before = clock.time.day;
    let sim_minutes = clock.update(dt);
    *frame = FrameClock { dt, sim_minutes };

    if clock.time.day != day_before {
        info!("[Calendar] Day {} begins", clock.time.day);
        day_events.send(DayStartedEvent {
            day: clock.time.day,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_day_one_eight_am() {
        let clock = SimClock::default();
        assert_eq!(clock.time.to_string(), "Day 1 08:00");
    }

    #[test]
    fn test_returns_fractional_minutes() {
        let mut clock = SimClock::default();
        assert_eq!(clock.update(0.25), 0.25);
        assert_eq!(clock.time.minute, 0);
        clock.update(0.75);
        assert_eq!(clock.time.minute, 1);
    }

    #[test]
    fn test_sixty_minutes_advance_one_hour_regardless_of_split() {
        let splits: [(f32, usize); 5] = [(0.1, 600), (0.05, 1200), (0.016, 3750), (0.25, 240), (7.5, 8)];
        for (step, count) in splits {
            let mut clock = SimClock::default();
            for _ in 0..count {
                clock.update(step);
            }
            assert_eq!(
                (clock.time.day, clock.time.hour, clock.time.minute),
                (1, 9, 0),
                "split {step} x {count}"
            );
        }
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut clock = SimClock::default();
        assert_eq!(clock.update(-5.0), 0.0);
        assert_eq!(clock.time, SimTime::default());
    }

    #[test]
    fn test_day_rollover() {
        let mut clock = SimClock::new(SimTime {
            day: 3,
            hour: 23,
            minute: 59,
        });
        clock.update(1.0);
        assert_eq!(clock.time.to_string(), "Day 4 00:00");
    }

    #[test]
    fn test_large_delta_advances_many_minutes() {
        let mut clock = SimClock::default();
        clock.update(125.5);
        assert_eq!((clock.time.hour, clock.time.minute), (10, 5));
        assert!((clock.accumulator - 0.5).abs() < 1e-6);
    }
}
