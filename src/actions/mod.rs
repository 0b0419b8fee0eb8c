//! Actions domain: the single-slot timed-action executor.
//!
//! At most one action runs at a time. While it runs, its needs delta is
//! applied in proportion to the sim minutes consumed, so the full delta is
//! only realised once the whole duration has elapsed.

use bevy::prelude::*;
use serde::Serialize;

use crate::shared::*;

pub struct ActionsPlugin;

impl Plugin for ActionsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionQueue>()
            .init_resource::<ActionCatalog>()
            .add_event::<ActionCompletedEvent>();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// QUEUE
// ═══════════════════════════════════════════════════════════════════════

impl ActionQueue {
    /// Starts `action` if nothing is running. Returns whether it started.
    pub fn start_action(&mut self, action: &ActionDef) -> bool {
        if self.active.is_some() {
            debug!("[Actions] '{}' rejected, another action is running", action.id);
            return false;
        }
        info!(
            "[Actions] Started '{}' for {} min",
            action.id, action.duration_minutes
        );
        self.active = Some(ActiveAction {
            action: action.clone(),
            remaining_minutes: action.duration_minutes,
        });
        true
    }

    /// Consumes up to the remaining minutes of the running action and applies
    /// the prorated needs delta. Minutes beyond the action's end are dropped,
    /// so at most one action completes per tick. Returns the id of the action
    /// that finished, if any.
    pub fn tick(&mut self, elapsed_minutes: f32, needs: &mut Needs) -> Option<ActionId> {
        if elapsed_minutes <= 0.0 {
            return None;
        }
        let active = self.active.as_mut()?;

        let consumed = elapsed_minutes.min(active.remaining_minutes);
        let fraction = consumed / active.action.duration_minutes.max(1.0);
        for kind in NeedKind::ALL {
            let delta = active.action.needs_delta.get(kind);
            if delta != 0.0 {
                needs.add(kind, delta * fraction);
            }
        }
        active.remaining_minutes -= consumed;

        if active.remaining_minutes <= 0.0 {
            let finished = self.active.take().map(|a| a.action.id);
            if let Some(id) = &finished {
                info!("[Actions] Completed '{}'", id);
            }
            return finished;
        }
        None
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveAction> {
        self.active.as_ref()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CATALOG LOOKUPS
// ═══════════════════════════════════════════════════════════════════════

/// HUD-facing view of one action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionButton {
    pub id: ActionId,
    pub label: String,
    pub enabled: bool,
}

impl ActionCatalog {
    /// First definition with this id.
    pub fn get(&self, id: &str) -> Option<&ActionDef> {
        self.actions.iter().find(|action| action.id == id)
    }

    /// Action bound to a key code name such as `"Digit1"`.
    pub fn action_for_hotkey(&self, code: &str) -> Option<&ActionDef> {
        self.hotkeys.get(code).and_then(|id| self.get(id))
    }

    /// Buttons from the configured ids, or the first three actions when none
    /// of those ids resolve. Buttons are enabled only while no action runs.
    pub fn buttons(&self, enabled: bool) -> Vec<ActionButton> {
        let to_button = |action: &ActionDef| ActionButton {
            id: action.id.clone(),
            label: action.label.clone(),
            enabled,
        };
        let configured: Vec<ActionButton> = self
            .buttons
            .iter()
            .filter_map(|id| self.get(id))
            .map(to_button)
            .collect();
        if !configured.is_empty() {
            return configured;
        }
        self.actions.iter().take(3).map(to_button).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest() -> ActionDef {
        ActionDef {
            id: "rest".into(),
            label: "Rest".into(),
            duration_minutes: 30.0,
            needs_delta: NeedsDelta::default()
                .with(NeedKind::Energy, 15.0)
                .with(NeedKind::Hunger, -3.0)
                .with(NeedKind::Hygiene, -2.0),
        }
    }

    fn snack() -> ActionDef {
        ActionDef {
            id: "snack".into(),
            label: "Snack".into(),
            duration_minutes: 15.0,
            needs_delta: NeedsDelta::default()
                .with(NeedKind::Hunger, 10.0)
                .with(NeedKind::Energy, -1.0),
        }
    }

    fn needs_at(value: f32) -> Needs {
        Needs {
            hunger: value,
            energy: value,
            hygiene: value,
            fun: value,
            social: value,
        }
    }

    #[test]
    fn test_only_one_action_at_a_time() {
        let mut queue = ActionQueue::default();
        assert!(queue.start_action(&rest()));
        assert!(!queue.start_action(&snack()));
        assert!(!queue.start_action(&rest()));
        assert_eq!(queue.active().map(|a| a.action.id.as_str()), Some("rest"));
    }

    #[test]
    fn test_rest_split_ticks_apply_full_delta() {
        let mut queue = ActionQueue::default();
        let mut needs = needs_at(50.0);
        queue.start_action(&rest());

        assert_eq!(queue.tick(10.0, &mut needs), None);
        assert!((needs.energy - 55.0).abs() < 1e-4);
        assert!(queue.is_active());

        assert_eq!(queue.tick(20.0, &mut needs), Some("rest".to_string()));
        assert!((needs.energy - 65.0).abs() < 1e-4);
        assert!((needs.hunger - 47.0).abs() < 1e-4);
        assert!((needs.hygiene - 48.0).abs() < 1e-4);
        assert!(!queue.is_active());
    }

    #[test]
    fn test_many_small_ticks_sum_to_delta() {
        let mut queue = ActionQueue::default();
        let mut needs = needs_at(50.0);
        queue.start_action(&rest());
        let mut ticks = 0;
        while queue.is_active() && ticks < 10_000 {
            queue.tick(0.05, &mut needs);
            ticks += 1;
        }
        assert!(!queue.is_active());
        assert!((needs.energy - 65.0).abs() < 1e-2);
    }

    #[test]
    fn test_leftover_minutes_are_dropped() {
        let mut queue = ActionQueue::default();
        let mut needs = needs_at(50.0);
        queue.start_action(&snack());
        assert_eq!(queue.tick(500.0, &mut needs), Some("snack".to_string()));
        assert!((needs.hunger - 60.0).abs() < 1e-4);
        assert!((needs.energy - 49.0).abs() < 1e-4);
        // The next tick has nothing to drain into.
        assert_eq!(queue.tick(500.0, &mut needs), None);
        assert!((needs.hunger - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_tick_when_idle_or_non_positive_is_noop() {
        let mut queue = ActionQueue::default();
        let mut needs = needs_at(50.0);
        assert_eq!(queue.tick(5.0, &mut needs), None);
        queue.start_action(&rest());
        queue.tick(0.0, &mut needs);
        queue.tick(-3.0, &mut needs);
        assert_eq!(needs, needs_at(50.0));
        assert_eq!(queue.active().map(|a| a.remaining_minutes), Some(30.0));
    }

    #[test]
    fn test_deltas_clamp_to_range() {
        let mut queue = ActionQueue::default();
        let mut needs = needs_at(95.0);
        queue.start_action(&rest());
        queue.tick(30.0, &mut needs);
        assert_eq!(needs.energy, MAX_NEED);
    }

    #[test]
    fn test_start_succeeds_again_after_completion() {
        let mut queue = ActionQueue::default();
        let mut needs = Needs::default();
        assert!(queue.start_action(&snack()));
        queue.tick(15.0, &mut needs);
        assert!(queue.start_action(&snack()));
    }

    #[test]
    fn test_buttons_fall_back_to_first_three_actions() {
        let wash = ActionDef {
            id: "wash".into(),
            label: "Wash".into(),
            duration_minutes: 20.0,
            needs_delta: NeedsDelta::default(),
        };
        let mut nap = wash.clone();
        nap.id = "nap".into();
        let mut catalog = ActionCatalog {
            actions: vec![rest(), snack(), wash, nap],
            hotkeys: Default::default(),
            buttons: vec!["missing".into()],
        };
        let ids: Vec<String> = catalog.buttons(true).into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["rest", "snack", "wash"]);

        catalog.buttons = vec!["snack".into(), "missing".into()];
        let buttons = catalog.buttons(false);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].label, "Snack");
        assert!(!buttons[0].enabled);
    }
}
