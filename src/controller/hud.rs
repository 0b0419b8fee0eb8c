use bevy::prelude::*;

use super::InteractionState;
use crate::actions::ActionButton;
use crate::economy::shop::{max_quantity, page_count};
use crate::player::PlayerMotion;
use crate::shared::*;
use crate::world::layout::SHOPKEEPER_TILE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    #[default]
    Idle,
    Keyboard,
    Pointer,
}

impl MovementMode {
    pub fn label(self) -> &'static str {
        match self {
            MovementMode::Idle => "Idle",
            MovementMode::Keyboard => "Keyboard",
            MovementMode::Pointer => "Pointer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveActionView {
    pub label: String,
    /// Rounded up, so a running action never reads `0m`.
    pub remaining_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSlotView {
    pub index: usize,
    pub item_id: ItemId,
    pub name: String,
    pub icon_label: String,
    pub icon_color: String,
    /// Price in the session's current mode.
    pub price: i32,
    pub owned: u32,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopView {
    pub mode: ShopMode,
    pub page_index: usize,
    pub page_count: usize,
    pub quantity: u32,
    pub max_quantity: u32,
    pub slots: Vec<ShopSlotView>,
    pub selected_description: Option<String>,
}

/// Read-only picture of the simulation handed to the renderer each frame.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct HudSnapshot {
    pub player_tile: TilePos,
    pub mode: MovementMode,
    /// Shown while the shopkeeper is in reach.
    pub hint: Option<&'static str>,
    pub time: String,
    pub money: u32,
    pub needs: Needs,
    pub action_buttons: Vec<ActionButton>,
    pub active_action: Option<ActiveActionView>,
    pub target_tile: Option<TilePos>,
    /// Hover wins over the last tap; nothing is highlighted while shopping.
    pub highlight_tile: Option<TilePos>,
    pub shop: Option<ShopView>,
}

/// How the avatar is being steered right now.
pub fn movement_mode(
    interaction: &InteractionState,
    queue: &ActionQueue,
    motion: &PlayerMotion,
    shop: &ShopState,
) -> MovementMode {
    if shop.is_open || queue.is_active() {
        MovementMode::Idle
    } else if interaction.keyboard_active {
        MovementMode::Keyboard
    } else if motion.target_tile.is_some() {
        MovementMode::Pointer
    } else {
        MovementMode::Idle
    }
}

fn shop_view(
    state: &ShopState,
    catalog: &ShopCatalog,
    grid: ShopGrid,
    money: u32,
    inventory: &Inventory,
) -> ShopView {
    let capacity = grid.capacity().max(1);
    let start = state.page_index * capacity;
    let slots = catalog
        .items
        .iter()
        .enumerate()
        .skip(start)
        .take(capacity)
        .map(|(index, item)| ShopSlotView {
            index,
            item_id: item.id.clone(),
            name: item.name.clone(),
            icon_label: item.icon_label.clone(),
            icon_color: item.icon_color.clone(),
            price: match state.mode {
                ShopMode::Buy => item.price_buy,
                ShopMode::Sell => item.price_sell,
            },
            owned: inventory.count(&item.id),
            selected: index == state.selected_index,
        })
        .collect();

    let selected = catalog.items.get(state.selected_index);
    let owned = selected.map_or(0, |item| inventory.count(&item.id));

    ShopView {
        mode: state.mode,
        page_index: state.page_index,
        page_count: page_count(catalog.items.len(), grid),
        quantity: state.quantity,
        max_quantity: max_quantity(state.mode, selected, money, owned),
        slots,
        selected_description: selected.map(|item| item.description.clone()),
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn publish_hud(
    clock: Res<SimClock>,
    needs: Res<Needs>,
    player: Res<PlayerState>,
    inventory: Res<Inventory>,
    queue: Res<ActionQueue>,
    actions: Res<ActionCatalog>,
    shop_catalog: Res<ShopCatalog>,
    grid: Res<ShopGrid>,
    motion: Res<PlayerMotion>,
    interaction: Res<InteractionState>,
    shop: Res<ShopState>,
    mut hud: ResMut<HudSnapshot>,
) {
    let shop_open = shop.is_open;
    let near_shopkeeper =
        distance_to_tile(motion.position, SHOPKEEPER_TILE) <= SHOPKEEPER_INTERACT_RANGE;

    let snapshot = HudSnapshot {
        player_tile: motion.tile(),
        mode: movement_mode(&interaction, &queue, &motion, &shop),
        hint: (!shop_open && near_shopkeeper).then_some("Interact"),
        time: clock.time.to_string(),
        money: player.money,
        needs: *needs,
        action_buttons: actions.buttons(!queue.is_active()),
        active_action: queue.active().map(|active| ActiveActionView {
            label: active.action.label.clone(),
            remaining_minutes: active.remaining_minutes.max(0.0).ceil() as u32,
        }),
        target_tile: motion.target_tile,
        highlight_tile: if shop_open {
            None
        } else {
            interaction.hover_tile.or(interaction.tap_highlight)
        },
        shop: shop_open.then(|| {
            shop_view(&shop, &shop_catalog, *grid, player.money, &inventory)
        }),
    };

    if *hud != snapshot {
        *hud = snapshot;
    }
}
