//! Controller: resolves one frame of [`GameCommand`]s against the simulation.
//!
//! Precedence, highest first:
//! 1. An open shop swallows everything except shop commands. Timed actions
//!    keep ticking underneath and the avatar stands still.
//! 2. Action triggers, then farm-interact (shop when near the shopkeeper,
//!    otherwise the context task on the avatar's tile).
//! 3. Movement, unless an action is running. Taps and clicks on the
//!    shopkeeper open the shop; on a plot they start its task or do nothing.
//!
//! Camera zoom always applies. Drags pan the camera unless the press that
//! started them landed on an action button.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::economy::shop::{ShopReceipt, ShopSession};
use crate::farming::context::{apply_farm_task, try_start_farm_task, PendingFarmTask};
use crate::needs::speed_multiplier;
use crate::player::{CameraRig, PlayerMotion};
use crate::shared::*;
use crate::world::layout::{is_farm_tile, is_shopkeeper_tile, SHOPKEEPER_TILE};
use crate::world::TileWorld;

pub mod hud;

pub use hud::{HudSnapshot, MovementMode};

pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CommandQueue>()
            .init_resource::<InteractionState>()
            .init_resource::<HudSnapshot>()
            .add_systems(Update, route_commands.in_set(FrameSet::Resolve))
            .add_systems(Update, hud::publish_hud.in_set(FrameSet::Present));
    }
}

/// Interaction memory that outlives a single frame.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    /// Farm task whose effect lands once its timed action finishes.
    pub pending_farm_task: Option<PendingFarmTask>,
    /// Last in-bounds tile under the mouse.
    pub hover_tile: Option<TilePos>,
    /// Last tile a touch tap acknowledged. A second tap on the shopkeeper
    /// while it is highlighted confirms the shop.
    pub tap_highlight: Option<TilePos>,
    /// Set while a press that hit an action button is held down.
    pub pointer_block_movement: bool,
    /// Direction keys steered the avatar this frame.
    pub keyboard_active: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// COMMAND FOLDING
// ═══════════════════════════════════════════════════════════════════════

/// One frame's commands folded into the single intent per kind that the
/// router acts on. Later commands of a kind win, except drags (summed) and
/// zooms (multiplied).
#[derive(Debug, Clone, PartialEq)]
pub struct FrameIntent {
    pub move_vector: Option<Vec2>,
    pub keyboard_active: bool,
    pub move_to: Option<(TilePos, PointerKind)>,
    pub tap: Option<(TilePos, PointerKind)>,
    pub pointer_down: Option<(PointerKind, Option<UiHit>)>,
    pub pointer_up: bool,
    pub hover: Option<TilePos>,
    pub action_request: Option<ActionId>,
    pub drag: Option<Vec2>,
    pub zoom: f32,
    pub farm_interact: bool,
}

impl Default for FrameIntent {
    fn default() -> Self {
        Self {
            move_vector: None,
            keyboard_active: false,
            move_to: None,
            tap: None,
            pointer_down: None,
            pointer_up: false,
            hover: None,
            action_request: None,
            drag: None,
            zoom: 1.0,
            farm_interact: false,
        }
    }
}

impl FrameIntent {
    pub fn gather(commands: &[GameCommand]) -> Self {
        let mut intent = Self::default();
        for command in commands {
            match command {
                GameCommand::MoveVector(vector) => {
                    intent.move_vector = Some(*vector);
                    intent.keyboard_active = *vector != Vec2::ZERO;
                }
                GameCommand::MoveToTile(tile) => intent.move_to = Some((*tile, PointerKind::Mouse)),
                GameCommand::HoverTile { tile, pointer } => {
                    if *pointer == PointerKind::Mouse {
                        intent.hover = Some(*tile);
                    }
                }
                GameCommand::TapTile { tile, pointer } => intent.tap = Some((*tile, *pointer)),
                GameCommand::PointerDown { pointer, hit } => {
                    intent.pointer_down = Some((*pointer, hit.clone()));
                }
                GameCommand::PointerUp { .. } => intent.pointer_up = true,
                GameCommand::ActionTrigger(id) => intent.action_request = Some(id.clone()),
                GameCommand::Drag(delta) => {
                    *intent.drag.get_or_insert(Vec2::ZERO) += *delta;
                }
                GameCommand::Zoom(factor) => intent.zoom *= *factor,
                GameCommand::FarmInteract => intent.farm_interact = true,
                GameCommand::UiNav { .. }
                | GameCommand::UiConfirm
                | GameCommand::UiTab
                | GameCommand::OpenMenu
                | GameCommand::Interact => {}
            }
        }
        intent
    }

    fn clear_pointer_movement(&mut self) {
        self.tap = None;
        self.move_to = None;
    }

    fn clear_all_movement(&mut self) {
        self.clear_pointer_movement();
        self.move_vector = None;
        self.keyboard_active = false;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SIMULATION ACCESS
// ═══════════════════════════════════════════════════════════════════════

/// Every resource the router reads or mutates in one frame.
#[derive(SystemParam)]
pub struct Sim<'w> {
    frame: Res<'w, FrameClock>,
    world: Res<'w, TileWorld>,
    needs: ResMut<'w, Needs>,
    farm: ResMut<'w, FarmState>,
    crops: Res<'w, CropCatalog>,
    inventory: ResMut<'w, Inventory>,
    player: ResMut<'w, PlayerState>,
    queue: ResMut<'w, ActionQueue>,
    actions: Res<'w, ActionCatalog>,
    shop: ResMut<'w, ShopState>,
    shop_catalog: Res<'w, ShopCatalog>,
    grid: Res<'w, ShopGrid>,
    motion: ResMut<'w, PlayerMotion>,
    rig: ResMut<'w, CameraRig>,
    interaction: ResMut<'w, InteractionState>,
}

/// Events the router emits.
#[derive(SystemParam)]
pub struct Outcomes<'w> {
    completed: EventWriter<'w, ActionCompletedEvent>,
    harvested: EventWriter<'w, CropHarvestedEvent>,
    trades: EventWriter<'w, ShopTransactionEvent>,
}

impl Outcomes<'_> {
    fn trade(&mut self, receipt: ShopReceipt) {
        self.trades.send(ShopTransactionEvent {
            item_id: receipt.item_id,
            mode: receipt.mode,
            quantity: receipt.quantity,
            total: receipt.total,
        });
    }
}

impl Sim<'_> {
    fn shop_session(&mut self) -> ShopSession<'_> {
        ShopSession {
            state: &mut self.shop,
            catalog: &self.shop_catalog,
            grid: *self.grid,
            money: &mut self.player.money,
            inventory: &mut self.inventory,
        }
    }

    fn open_shop(&mut self) {
        self.shop_session().open();
        self.motion.stop();
    }

    fn player_near_shopkeeper(&self) -> bool {
        distance_to_tile(self.motion.position, SHOPKEEPER_TILE) <= SHOPKEEPER_INTERACT_RANGE
    }

    /// Starts the context task at `tile`. The avatar stops when it starts.
    fn try_farm_task(&mut self, tile: TilePos) -> bool {
        let Some(pending) = try_start_farm_task(tile, &self.farm, &self.crops, &mut self.queue) else {
            return false;
        };
        self.motion.stop();
        self.interaction.pending_farm_task = Some(pending);
        true
    }

    /// Lands the pending farm task once the queue has gone idle.
    fn finish_farm_task(&mut self, out: &mut Outcomes) {
        if self.queue.is_active() {
            return;
        }
        let Some(pending) = self.interaction.pending_farm_task.take() else {
            return;
        };
        if let Some(crop_id) = apply_farm_task(&pending, &mut self.farm, &mut self.inventory) {
            out.harvested.send(CropHarvestedEvent {
                crop_id,
                tile: pending.tile,
            });
        }
    }

    fn tick_queue(&mut self, out: &mut Outcomes) {
        let minutes = self.frame.sim_minutes;
        if let Some(action_id) = self.queue.tick(minutes, &mut self.needs) {
            out.completed.send(ActionCompletedEvent { action_id });
        }
    }

    fn refresh_speed(&mut self) {
        let multiplier = speed_multiplier(&self.needs);
        self.motion.set_speed_multiplier(multiplier);
    }

    fn start_requested_action(&mut self, id: &str) {
        let Some(action) = self.actions.get(id).cloned() else {
            debug!("[Actions] Unknown action '{}' requested", id);
            return;
        };
        if self.queue.start_action(&action) {
            self.motion.stop();
        }
    }

    fn handle_shop_commands(&mut self, commands: &[GameCommand], out: &mut Outcomes) {
        let mut session = self.shop_session();
        session.sync_page_to_selection();
        for command in commands {
            let receipt = match command {
                GameCommand::UiNav { dx, dy } => {
                    session.navigate(*dx, *dy);
                    None
                }
                GameCommand::UiTab => {
                    session.toggle_mode();
                    None
                }
                GameCommand::UiConfirm => session.confirm(),
                GameCommand::OpenMenu => {
                    session.close();
                    None
                }
                GameCommand::PointerDown {
                    hit: Some(UiHit::Shop(action)),
                    ..
                } => session.apply_ui_action(*action),
                _ => None,
            };
            if let Some(receipt) = receipt {
                out.trade(receipt);
            }
        }
    }

    /// Touch and pen taps: approach the shopkeeper, then tap again to
    /// confirm; tap a plot to work it; tap anywhere else to walk there.
    fn resolve_touch_tap(&mut self, tile: TilePos, pointer: PointerKind, intent: &mut FrameIntent) -> bool {
        if !self.world.is_walkable(tile) {
            return false;
        }
        if is_shopkeeper_tile(tile) {
            let distance = distance_to_tile(self.motion.position, tile);
            let same_tap = self.interaction.tap_highlight == Some(tile);
            if distance > SHOPKEEPER_TAP_RANGE {
                self.interaction.tap_highlight = Some(tile);
                intent.move_to = Some((tile, pointer));
            } else if same_tap {
                self.open_shop();
                return true;
            } else {
                self.interaction.tap_highlight = Some(tile);
            }
            return false;
        }
        // Plots are worked, never walked onto. A plot with no task ignores the tap.
        if is_farm_tile(tile) && !self.queue.is_active() {
            if self.try_farm_task(tile) {
                self.interaction.tap_highlight = Some(tile);
            }
            intent.move_to = None;
            return false;
        }
        self.interaction.tap_highlight = Some(tile);
        intent.move_to = Some((tile, pointer));
        false
    }

    fn apply_movement(&mut self, intent: &FrameIntent) {
        if intent.keyboard_active {
            if let Some(vector) = intent.move_vector {
                self.motion.set_move_vector(vector);
                self.motion.set_target_tile(None);
            }
            return;
        }
        self.motion.set_move_vector(Vec2::ZERO);
        let Some((tile, _)) = intent.move_to else {
            return;
        };
        if !self.world.is_walkable(tile) {
            return;
        }
        if is_farm_tile(tile) && !self.queue.is_active() {
            self.try_farm_task(tile);
            return;
        }
        self.motion.set_target_tile(Some(tile));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEM
// ═══════════════════════════════════════════════════════════════════════

pub fn route_commands(mut queue: ResMut<CommandQueue>, mut sim: Sim, mut out: Outcomes) {
    let commands = queue.drain();

    if sim.shop.is_open {
        sim.handle_shop_commands(&commands, &mut out);
        sim.tick_queue(&mut out);
        sim.finish_farm_task(&mut out);
        sim.refresh_speed();
        sim.motion.stop();
        sim.interaction.keyboard_active = false;
        return;
    }

    let mut intent = FrameIntent::gather(&commands);

    if let Some(tile) = intent.hover {
        if sim.world.tile(tile).is_some() {
            sim.interaction.hover_tile = Some(tile);
        }
    }

    let mut ignore_pointer_movement = false;
    if let Some((_, hit)) = &intent.pointer_down {
        sim.interaction.pointer_block_movement = false;
        // Buttons are disabled while an action runs, so they cannot be hit.
        if let Some(UiHit::ActionButton(id)) = hit {
            if !sim.queue.is_active() {
                intent.action_request = Some(id.clone());
                ignore_pointer_movement = true;
                sim.interaction.pointer_block_movement = true;
            }
        }
    }
    if intent.pointer_up {
        sim.interaction.pointer_block_movement = false;
    }

    if intent.zoom != 1.0 {
        sim.rig.apply_zoom(intent.zoom);
    }
    if let Some(drag) = intent.drag {
        if !sim.interaction.pointer_block_movement {
            let world_delta = sim.rig.screen_delta_to_world(drag);
            sim.rig.pan_by_world(world_delta);
        }
    }

    if let Some(id) = intent.action_request.clone() {
        sim.start_requested_action(&id);
    }

    sim.finish_farm_task(&mut out);

    let mut shop_opened = false;
    if intent.farm_interact && !sim.queue.is_active() {
        if sim.player_near_shopkeeper() {
            sim.open_shop();
            shop_opened = true;
        } else {
            let tile = sim.motion.tile();
            sim.try_farm_task(tile);
        }
    }

    sim.tick_queue(&mut out);
    sim.refresh_speed();

    if ignore_pointer_movement || sim.interaction.pointer_block_movement {
        intent.clear_pointer_movement();
    }
    if sim.queue.is_active() {
        intent.clear_all_movement();
        sim.motion.stop();
    }

    if !shop_opened {
        if let Some((tile, pointer)) = intent.tap {
            if pointer.is_touch_like() {
                shop_opened = sim.resolve_touch_tap(tile, pointer, &mut intent);
            }
        }
    }

    if !shop_opened {
        if let Some((tile, PointerKind::Mouse)) = intent.move_to {
            if is_shopkeeper_tile(tile) {
                sim.open_shop();
                shop_opened = true;
            }
        }
    }

    if shop_opened {
        sim.motion.stop();
        sim.interaction.keyboard_active = false;
        return;
    }

    sim.apply_movement(&intent);
    sim.interaction.keyboard_active = intent.keyboard_active;
}
