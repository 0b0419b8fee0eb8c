//! Input domain: the single point where devices become [`GameCommand`]s.
//!
//! Keyboard, mouse and touch are read in `PreUpdate`, after Bevy UI has
//! resolved which node a press landed on. Nothing here touches the
//! simulation; the controller decides what each command means.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::ui::UiSystem;
use bevy::window::PrimaryWindow;

use crate::player::CameraRig;
use crate::shared::*;

/// Screen pixels a press must travel before it counts as a drag.
const DRAG_THRESHOLD: f32 = 8.0;
/// Pinch ratios closer to 1 than this are jitter.
const PINCH_DEADZONE: f32 = 0.002;
/// Zoom factor per pixel of wheel travel.
const WHEEL_ZOOM_BASE: f32 = 1.0015;
/// Pixels assumed per wheel notch when the platform reports lines.
const PIXELS_PER_LINE: f32 = 100.0;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CommandQueue>()
            .init_resource::<PointerTracker>()
            .add_systems(
                PreUpdate,
                (read_keyboard, read_mouse, read_touches)
                    .chain()
                    .after(UiSystem::Focus)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// One press being followed from down to up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PressTrack {
    start: Vec2,
    last: Vec2,
    dragging: bool,
    /// The press began on a UI node, so its release is not a world tap.
    on_ui: bool,
}

impl PressTrack {
    fn new(at: Vec2, on_ui: bool) -> Self {
        Self {
            start: at,
            last: at,
            dragging: false,
            on_ui,
        }
    }

    /// Records a move and returns the drag delta to emit, if any.
    fn moved_to(&mut self, at: Vec2) -> Option<Vec2> {
        let delta = at - self.last;
        self.last = at;
        if self.start.distance(at) >= DRAG_THRESHOLD {
            self.dragging = true;
        }
        (self.dragging && delta != Vec2::ZERO).then_some(delta)
    }
}

#[derive(Resource, Debug, Default)]
pub struct PointerTracker {
    mouse: Option<PressTrack>,
    last_cursor: Option<Vec2>,
    touch: Option<(u64, PressTrack)>,
    pinch_distance: Option<f32>,
}

// ═══════════════════════════════════════════════════════════════════════
// KEYBOARD
// ═══════════════════════════════════════════════════════════════════════

fn read_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    actions: Res<ActionCatalog>,
    mut queue: ResMut<CommandQueue>,
) {
    let mut axis = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        axis.x += 1.0;
    }
    if axis != Vec2::ZERO {
        queue.push(GameCommand::MoveVector(axis));
    }

    for key in keys.get_just_pressed() {
        if let Some(action) = actions.action_for_hotkey(&key_code_name(*key)) {
            queue.push(GameCommand::ActionTrigger(action.id.clone()));
            continue;
        }
        if let Some(command) = key_command(*key) {
            queue.push(command);
        }
    }
}

/// Hotkeys are configured with W3C `code` names ("Digit1", "Numpad1"),
/// which is how Bevy names its physical key codes.
pub fn key_code_name(key: KeyCode) -> String {
    format!("{key:?}")
}

fn key_command(key: KeyCode) -> Option<GameCommand> {
    let command = match key {
        KeyCode::KeyE => GameCommand::FarmInteract,
        KeyCode::Tab => GameCommand::UiTab,
        KeyCode::Enter | KeyCode::NumpadEnter => GameCommand::UiConfirm,
        KeyCode::ArrowUp => GameCommand::UiNav { dx: 0, dy: -1 },
        KeyCode::ArrowDown => GameCommand::UiNav { dx: 0, dy: 1 },
        KeyCode::ArrowLeft => GameCommand::UiNav { dx: -1, dy: 0 },
        KeyCode::ArrowRight => GameCommand::UiNav { dx: 1, dy: 0 },
        KeyCode::Space => GameCommand::Interact,
        KeyCode::Escape => GameCommand::OpenMenu,
        _ => return None,
    };
    Some(command)
}

// ═══════════════════════════════════════════════════════════════════════
// POINTERS
// ═══════════════════════════════════════════════════════════════════════

fn pressed_hit(targets: &Query<(&Interaction, &UiHitTarget)>) -> Option<UiHit> {
    targets
        .iter()
        .find(|(interaction, _)| **interaction == Interaction::Pressed)
        .map(|(_, target)| target.0.clone())
}

fn cursor_tile(rig: &CameraRig, window: &Window, cursor: Vec2) -> TilePos {
    let viewport = Vec2::new(window.width(), window.height());
    TilePos::containing(rig.viewport_to_world(cursor, viewport))
}

fn read_mouse(
    mouse: Res<ButtonInput<MouseButton>>,
    mut wheel: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    targets: Query<(&Interaction, &UiHitTarget)>,
    rig: Res<CameraRig>,
    mut tracker: ResMut<PointerTracker>,
    mut queue: ResMut<CommandQueue>,
) {
    let mut wheel_pixels = 0.0;
    for event in wheel.read() {
        wheel_pixels += match event.unit {
            MouseScrollUnit::Line => event.y * PIXELS_PER_LINE,
            MouseScrollUnit::Pixel => event.y,
        };
    }

    let Ok(window) = windows.get_single() else {
        return;
    };
    let cursor = window.cursor_position();
    let cursor_moved = cursor.is_some() && cursor != tracker.last_cursor;
    tracker.last_cursor = cursor;

    let mut drag = None;
    let mut hover = None;
    let mut release = None;

    if let Some(at) = cursor {
        if mouse.just_pressed(MouseButton::Left) {
            let hit = pressed_hit(&targets);
            tracker.mouse = Some(PressTrack::new(at, hit.is_some()));
            queue.push(GameCommand::PointerDown {
                pointer: PointerKind::Mouse,
                hit,
            });
        }

        if let Some(track) = tracker.mouse.as_mut() {
            if mouse.pressed(MouseButton::Left) {
                drag = track.moved_to(at);
            }
        }

        let dragging = tracker.mouse.is_some_and(|track| track.dragging);
        if cursor_moved && !dragging {
            hover = Some(cursor_tile(&rig, window, at));
        }
    }

    if mouse.just_released(MouseButton::Left) {
        if let Some(track) = tracker.mouse.take() {
            if !track.dragging && !track.on_ui {
                if let Some(at) = cursor {
                    let tile = cursor_tile(&rig, window, at);
                    release = Some(tile);
                    hover = Some(tile);
                }
            }
        }
        queue.push(GameCommand::PointerUp {
            pointer: PointerKind::Mouse,
        });
    }

    if let Some(tile) = hover {
        queue.push(GameCommand::HoverTile {
            tile,
            pointer: PointerKind::Mouse,
        });
    }
    if let Some(tile) = release {
        queue.push(GameCommand::MoveToTile(tile));
    }
    if let Some(delta) = drag {
        queue.push(GameCommand::Drag(delta));
    }
    if wheel_pixels != 0.0 {
        queue.push(GameCommand::Zoom(WHEEL_ZOOM_BASE.powf(wheel_pixels)));
    }
}

/// Bevy reports pens as touches, so every touch is tagged `Touch`.
fn read_touches(
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    targets: Query<(&Interaction, &UiHitTarget)>,
    rig: Res<CameraRig>,
    mut tracker: ResMut<PointerTracker>,
    mut queue: ResMut<CommandQueue>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    for touch in touches.iter_just_pressed() {
        let hit = pressed_hit(&targets);
        if tracker.touch.is_none() {
            tracker.touch = Some((touch.id(), PressTrack::new(touch.position(), hit.is_some())));
        }
        queue.push(GameCommand::PointerDown {
            pointer: PointerKind::Touch,
            hit,
        });
    }

    let active: Vec<Vec2> = touches.iter().map(|touch| touch.position()).collect();
    if active.len() >= 2 {
        let distance = active[0].distance(active[1]);
        if let Some(previous) = tracker.pinch_distance {
            if previous > 0.0 && distance > 0.0 {
                let factor = distance / previous;
                if (factor - 1.0).abs() > PINCH_DEADZONE {
                    queue.push(GameCommand::Zoom(factor));
                }
            }
        }
        tracker.pinch_distance = Some(distance);
        // A pinch is never a tap.
        if let Some((_, track)) = tracker.touch.as_mut() {
            track.dragging = true;
        }
    } else {
        tracker.pinch_distance = None;
        if let Some((id, track)) = tracker.touch.as_mut() {
            if let Some(touch) = touches.get_pressed(*id) {
                if let Some(delta) = track.moved_to(touch.position()) {
                    queue.push(GameCommand::Drag(delta));
                }
            }
        }
    }

    for touch in touches.iter_just_released() {
        if let Some((id, track)) = tracker.touch {
            if id == touch.id() {
                tracker.touch = None;
                if !track.dragging && !track.on_ui {
                    queue.push(GameCommand::TapTile {
                        tile: cursor_tile(&rig, window, touch.position()),
                        pointer: PointerKind::Touch,
                    });
                }
            }
        }
        queue.push(GameCommand::PointerUp {
            pointer: PointerKind::Touch,
        });
    }
}
