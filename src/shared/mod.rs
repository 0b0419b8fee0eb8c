//! Shared resources, events, and states for Tiny Acre.
//!
//! This is the type contract. Every domain plugin imports from here and
//! adds behaviour to these types in its own module; only the controller
//! orchestrates several domains in one system.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    /// Content catalogs are being read and validated.
    #[default]
    Loading,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// FRAME ORDERING: one simulation step per rendered frame, in this order
// ═══════════════════════════════════════════════════════════════════════

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Sample and clamp frame time, advance the sim clock.
    Clock,
    /// Continuous decay and growth.
    Simulate,
    /// Resolve this frame's commands against the simulation.
    Resolve,
    /// Move the avatar and camera.
    Motion,
    /// Publish read-only snapshots for rendering.
    Present,
}

// ═══════════════════════════════════════════════════════════════════════
// TILE COORDINATES
// ═══════════════════════════════════════════════════════════════════════

/// Integer grid coordinate. `x` grows east, `y` grows south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    /// Tile containing a continuous world position.
    pub fn containing(position: Vec2) -> Self {
        Self {
            x: position.x.floor() as i32,
            y: position.y.floor() as i32,
        }
    }
}

/// Euclidean distance from a continuous position to the centre of a tile.
pub fn distance_to_tile(position: Vec2, tile: TilePos) -> f32 {
    position.distance(tile.center())
}

/// Axis-aligned tile rectangle, inclusive of `x`/`y`, exclusive of the far edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl TileRect {
    pub fn contains(&self, tile: TilePos) -> bool {
        tile.x >= self.x && tile.x < self.x + self.w && tile.y >= self.y && tile.y < self.y + self.h
    }

    pub fn tiles(self) -> impl Iterator<Item = TilePos> {
        (self.y..self.y + self.h)
            .flat_map(move |y| (self.x..self.x + self.w).map(move |x| TilePos::new(x, y)))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// NEEDS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedKind {
    Hunger,
    Energy,
    Hygiene,
    Fun,
    Social,
}

impl NeedKind {
    pub const ALL: [NeedKind; 5] = [
        NeedKind::Hunger,
        NeedKind::Energy,
        NeedKind::Hygiene,
        NeedKind::Fun,
        NeedKind::Social,
    ];

    /// Key used by content files.
    pub fn key(self) -> &'static str {
        match self {
            NeedKind::Hunger => "hunger",
            NeedKind::Energy => "energy",
            NeedKind::Hygiene => "hygiene",
            NeedKind::Fun => "fun",
            NeedKind::Social => "social",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        NeedKind::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Five bounded channels, each kept within `[0, MAX_NEED]`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    pub hunger: f32,
    pub energy: f32,
    pub hygiene: f32,
    pub fun: f32,
    pub social: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: MAX_NEED,
            energy: MAX_NEED,
            hygiene: MAX_NEED,
            fun: MAX_NEED,
            social: MAX_NEED,
        }
    }
}

impl Needs {
    pub fn get(&self, kind: NeedKind) -> f32 {
        match kind {
            NeedKind::Hunger => self.hunger,
            NeedKind::Energy => self.energy,
            NeedKind::Hygiene => self.hygiene,
            NeedKind::Fun => self.fun,
            NeedKind::Social => self.social,
        }
    }

    /// Stores `value` clamped into the valid range.
    pub fn set(&mut self, kind: NeedKind, value: f32) {
        let clamped = value.clamp(0.0, MAX_NEED);
        match kind {
            NeedKind::Hunger => self.hunger = clamped,
            NeedKind::Energy => self.energy = clamped,
            NeedKind::Hygiene => self.hygiene = clamped,
            NeedKind::Fun => self.fun = clamped,
            NeedKind::Social => self.social = clamped,
        }
    }

    pub fn add(&mut self, kind: NeedKind, amount: f32) {
        self.set(kind, self.get(kind) + amount);
    }
}

/// Signed per-channel amounts. Channels a content entry leaves out stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NeedsDelta {
    pub hunger: f32,
    pub energy: f32,
    pub hygiene: f32,
    pub fun: f32,
    pub social: f32,
}

impl NeedsDelta {
    pub fn get(&self, kind: NeedKind) -> f32 {
        match kind {
            NeedKind::Hunger => self.hunger,
            NeedKind::Energy => self.energy,
            NeedKind::Hygiene => self.hygiene,
            NeedKind::Fun => self.fun,
            NeedKind::Social => self.social,
        }
    }

    pub fn with(mut self, kind: NeedKind, amount: f32) -> Self {
        match kind {
            NeedKind::Hunger => self.hunger = amount,
            NeedKind::Energy => self.energy = amount,
            NeedKind::Hygiene => self.hygiene = amount,
            NeedKind::Fun => self.fun = amount,
            NeedKind::Social => self.social = amount,
        }
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SIMULATED TIME
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTime {
    pub day: u32,    // 1-based
    pub hour: u8,    // 0-23
    pub minute: u8,  // 0-59
}

impl Default for SimTime {
    fn default() -> Self {
        Self {
            day: 1,
            hour: START_HOUR,
            minute: 0,
        }
    }
}

/// Real-seconds-to-sim-minutes converter. Display time advances in whole
/// minutes; the fractional remainder waits in `accumulator`.
#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    pub time: SimTime,
    pub accumulator: f64,
}

/// Per-frame timing published by the calendar before any consumer runs.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FrameClock {
    /// Clamped real seconds for this frame.
    pub dt: f32,
    /// Fractional simulated minutes elapsed this frame.
    pub sim_minutes: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// CONTENT CATALOGS: supplied by the data plugin, never mutated afterwards
// ═══════════════════════════════════════════════════════════════════════

pub type ItemId = String;
pub type CropId = String;
pub type ActionId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropDef {
    pub id: CropId,
    pub name: String,
    pub growth_minutes: f32,
}

/// Ordered crop list, unique by id.
#[derive(Resource, Debug, Clone, Default)]
pub struct CropCatalog {
    pub crops: Vec<CropDef>,
}

impl CropCatalog {
    pub fn get(&self, id: &str) -> Option<&CropDef> {
        self.crops.iter().find(|crop| crop.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    pub id: ActionId,
    pub label: String,
    pub duration_minutes: f32,
    pub needs_delta: NeedsDelta,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ActionCatalog {
    pub actions: Vec<ActionDef>,
    /// Key code name (e.g. `"Digit1"`) to action id.
    pub hotkeys: HashMap<String, ActionId>,
    /// Action ids shown as HUD buttons, in order.
    pub buttons: Vec<ActionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Negative means the item cannot be bought.
    pub price_buy: i32,
    /// Negative means the item cannot be sold.
    pub price_sell: i32,
    pub icon_label: String,
    pub icon_color: String,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ShopCatalog {
    pub items: Vec<ShopItem>,
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER LEDGERS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub money: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            money: STARTING_MONEY,
        }
    }
}

/// Item-count ledger. Absence means zero; stored counts are always positive.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: HashMap<ItemId, u32>,
}

impl Inventory {
    /// Credits `amount` units. Zero is ignored.
    pub fn add(&mut self, item_id: &str, amount: u32) {
        if amount == 0 {
            return;
        }
        let count = self.items.entry(item_id.to_string()).or_insert(0);
        *count = count.saturating_add(amount);
    }

    /// Debits `amount` units. Fails without change when fewer are held.
    /// Removing zero always succeeds.
    pub fn remove(&mut self, item_id: &str, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        let Some(count) = self.items.get_mut(item_id) else {
            return false;
        };
        if *count < amount {
            return false;
        }
        *count -= amount;
        if *count == 0 {
            self.items.remove(item_id);
        }
        true
    }

    pub fn count(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    pub fn has(&self, item_id: &str, amount: u32) -> bool {
        self.count(item_id) >= amount
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FARMING
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SoilState {
    #[default]
    Empty,
    Tilled,
    Watered,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotState {
    pub soil: SoilState,
    pub crop: Option<CropId>,
    pub growth_minutes: f32,
}

/// One plot per tile of the farm patch.
#[derive(Resource, Debug, Clone)]
pub struct FarmState {
    pub plots: HashMap<TilePos, PlotState>,
}

// ═══════════════════════════════════════════════════════════════════════
// ACTIONS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAction {
    pub action: ActionDef,
    pub remaining_minutes: f32,
}

/// Single-slot timed-action executor.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActionQueue {
    pub active: Option<ActiveAction>,
}

// ═══════════════════════════════════════════════════════════════════════
// SHOP SESSION
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShopMode {
    #[default]
    Buy,
    Sell,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopState {
    pub is_open: bool,
    pub mode: ShopMode,
    pub selected_index: usize,
    /// Always at least 1.
    pub quantity: u32,
    pub page_index: usize,
}

impl Default for ShopState {
    fn default() -> Self {
        Self {
            is_open: false,
            mode: ShopMode::Buy,
            selected_index: 0,
            quantity: 1,
            page_index: 0,
        }
    }
}

/// Slot grid of the shop panel, set by whoever lays the panel out.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopGrid {
    pub columns: usize,
    pub rows: usize,
}

impl Default for ShopGrid {
    fn default() -> Self {
        Self {
            columns: 5,
            rows: 3,
        }
    }
}

impl ShopGrid {
    pub fn for_viewport_width(width: f32) -> Self {
        if width < NARROW_VIEWPORT_WIDTH {
            Self { columns: 3, rows: 4 }
        } else {
            Self::default()
        }
    }

    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }
}

/// Result of hit-testing the shop panel, resolved by the UI before it
/// reaches the command queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopUiAction {
    Select(usize),
    Tab(ShopMode),
    Page(i32),
    Quantity(i32),
    Confirm,
    Close,
}

// ═══════════════════════════════════════════════════════════════════════
// COMMANDS: decoded input, consumed once per frame by the controller
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Touch and pen share the approach-then-confirm tap policy.
    pub fn is_touch_like(self) -> bool {
        matches!(self, PointerKind::Touch | PointerKind::Pen)
    }
}

/// What a pointer press landed on, resolved by the UI before the press
/// becomes a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiHit {
    ActionButton(ActionId),
    Shop(ShopUiAction),
}

/// Marks a UI node that resolves pointer presses to a [`UiHit`].
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct UiHitTarget(pub UiHit);

#[derive(Debug, Clone, PartialEq)]
pub enum GameCommand {
    /// Held direction keys, not yet normalised.
    MoveVector(Vec2),
    /// Mouse click on a world tile.
    MoveToTile(TilePos),
    HoverTile { tile: TilePos, pointer: PointerKind },
    /// Touch or pen release on a world tile.
    TapTile { tile: TilePos, pointer: PointerKind },
    PointerDown { pointer: PointerKind, hit: Option<UiHit> },
    PointerUp { pointer: PointerKind },
    /// Screen-space pixels.
    Drag(Vec2),
    /// Multiplicative.
    Zoom(f32),
    ActionTrigger(ActionId),
    FarmInteract,
    UiNav { dx: i32, dy: i32 },
    UiConfirm,
    UiTab,
    OpenMenu,
    Interact,
}

/// Commands collected since the controller last ran.
#[derive(Resource, Debug, Clone, Default)]
pub struct CommandQueue {
    commands: Vec<GameCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, command: GameCommand) {
        self.commands.push(command);
    }

    /// Takes every pending command in arrival order.
    pub fn drain(&mut self) -> Vec<GameCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// A timed action ran to completion.
#[derive(Event, Debug, Clone)]
pub struct ActionCompletedEvent {
    pub action_id: ActionId,
}

#[derive(Event, Debug, Clone)]
pub struct CropHarvestedEvent {
    pub crop_id: CropId,
    pub tile: TilePos,
}

#[derive(Event, Debug, Clone)]
pub struct ShopTransactionEvent {
    pub item_id: ItemId,
    pub mode: ShopMode,
    pub quantity: u32,
    pub total: u32,
}

#[derive(Event, Debug, Clone)]
pub struct DayStartedEvent {
    pub day: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const MAP_WIDTH: i32 = 30;
pub const MAP_HEIGHT: i32 = 30;
pub const WORLD_SEED: u64 = 42;

pub const TILE_W: f32 = 96.0; // isometric diamond footprint in pixels
pub const TILE_H: f32 = 48.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;
pub const NARROW_VIEWPORT_WIDTH: f32 = 720.0;

pub const MAX_FRAME_SECONDS: f32 = 0.05;
pub const START_HOUR: u8 = 8;
pub const STARTING_MONEY: u32 = 100;

pub const MAX_NEED: f32 = 100.0;
pub const NEEDS_DECAY_PER_MINUTE: NeedsDelta = NeedsDelta {
    hunger: 0.18,
    energy: 0.14,
    hygiene: 0.12,
    fun: 0.1,
    social: 0.08,
};
pub const MIN_SPEED_MULTIPLIER: f32 = 0.1;

pub const PLAYER_SPEED: f32 = 3.5; // tiles per second
pub const TARGET_EPSILON: f32 = 0.05;
pub const CAMERA_SMOOTHING: f32 = 7.0;
pub const ZOOM_MIN: f32 = 0.6;
pub const ZOOM_MAX: f32 = 1.8;
pub const ZOOM_START: f32 = 1.0;

pub const SHOPKEEPER_INTERACT_RANGE: f32 = 1.1;
pub const SHOPKEEPER_TAP_RANGE: f32 = 1.2;
pub const MAX_SHOP_QUANTITY: u32 = 99;
