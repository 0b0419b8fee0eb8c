use bevy::prelude::*;

use crate::controller::hud::{HudSnapshot, ShopView};
use crate::economy::wallet::format_money;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudStatusText;

#[derive(Component)]
pub struct HudNeedsText;

#[derive(Component)]
pub struct HudActionText;

/// The "[E] Interact" prompt near the shopkeeper.
#[derive(Component)]
pub struct HudHintText;

#[derive(Component)]
pub struct ActionButtonNode {
    pub id: ActionId,
}

#[derive(Component)]
pub struct ShopPanel;

/// Container whose children are rebuilt whenever the shop view changes.
#[derive(Component)]
pub struct ShopPanelBody;

const PANEL_BG: Color = Color::srgba(0.0, 0.0, 0.0, 0.6);
const BUTTON_ENABLED: Color = Color::srgb(0.22, 0.40, 0.28);
const BUTTON_DISABLED: Color = Color::srgb(0.25, 0.25, 0.25);
const SLOT_BG: Color = Color::srgb(0.18, 0.16, 0.14);
const SLOT_SELECTED: Color = Color::srgb(0.45, 0.36, 0.18);

fn label(text: impl Into<String>, size: f32) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(Color::WHITE),
        PickingBehavior::IGNORE,
    )
}

/// A clickable node tagged with what a press on it means.
fn hit_button(parent: &mut ChildBuilder, text: &str, hit: UiHit, color: Color) {
    parent
        .spawn((
            Button,
            Node {
                padding: UiRect::axes(Val::Px(10.0), Val::Px(6.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(color),
            UiHitTarget(hit),
        ))
        .with_children(|button| {
            button.spawn(label(text, 16.0));
        });
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(mut commands: Commands, actions: Res<ActionCatalog>) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|root| {
            // ─── TOP BAR ───
            root.spawn((
                Node {
                    width: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                    row_gap: Val::Px(2.0),
                    ..default()
                },
                BackgroundColor(PANEL_BG),
                PickingBehavior::IGNORE,
            ))
            .with_children(|top| {
                top.spawn((HudStatusText, label("", 18.0)));
                top.spawn((HudNeedsText, label("", 14.0)));
                top.spawn((HudActionText, label("", 14.0)));
            });

            root.spawn((HudHintText, label("", 16.0)));

            // ─── ACTION BAR ───
            root.spawn((
                Node {
                    width: Val::Percent(100.0),
                    flex_direction: FlexDirection::Row,
                    justify_content: JustifyContent::Center,
                    column_gap: Val::Px(8.0),
                    padding: UiRect::all(Val::Px(8.0)),
                    ..default()
                },
                PickingBehavior::IGNORE,
            ))
            .with_children(|bar| {
                for button in actions.buttons(true) {
                    bar.spawn((
                        ActionButtonNode {
                            id: button.id.clone(),
                        },
                        Button,
                        Node {
                            padding: UiRect::axes(Val::Px(14.0), Val::Px(8.0)),
                            ..default()
                        },
                        BackgroundColor(BUTTON_ENABLED),
                        UiHitTarget(UiHit::ActionButton(button.id.clone())),
                    ))
                    .with_children(|node| {
                        node.spawn(label(button.label, 16.0));
                    });
                }
            });
        });

    commands
        .spawn((
            ShopPanel,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Percent(10.0),
                right: Val::Percent(10.0),
                top: Val::Percent(12.0),
                padding: UiRect::all(Val::Px(12.0)),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::srgba(0.08, 0.07, 0.06, 0.92)),
            Visibility::Hidden,
        ))
        .with_children(|panel| {
            panel.spawn((
                ShopPanelBody,
                Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(8.0),
                    ..default()
                },
            ));
        });
}

// ═══════════════════════════════════════════════════════════════════════
// SYNC
// ═══════════════════════════════════════════════════════════════════════

fn needs_line(needs: &Needs) -> String {
    NeedKind::ALL
        .iter()
        .map(|kind| format!("{} {:.0}", kind.key(), needs.get(*kind)))
        .collect::<Vec<_>>()
        .join("  ")
}

#[allow(clippy::type_complexity)]
pub fn sync_status(
    hud: Res<HudSnapshot>,
    mut status: Query<&mut Text, With<HudStatusText>>,
    mut needs: Query<&mut Text, (With<HudNeedsText>, Without<HudStatusText>)>,
    mut action: Query<
        &mut Text,
        (
            With<HudActionText>,
            Without<HudStatusText>,
            Without<HudNeedsText>,
        ),
    >,
    mut hint: Query<
        &mut Text,
        (
            With<HudHintText>,
            Without<HudStatusText>,
            Without<HudNeedsText>,
            Without<HudActionText>,
        ),
    >,
) {
    if !hud.is_changed() {
        return;
    }
    for mut text in &mut status {
        **text = format!(
            "{}   {}   Tile {},{}   {}",
            hud.time,
            format_money(hud.money),
            hud.player_tile.x,
            hud.player_tile.y,
            hud.mode.label()
        );
    }
    for mut text in &mut needs {
        **text = needs_line(&hud.needs);
    }
    for mut text in &mut action {
        **text = hud
            .active_action
            .as_ref()
            .map(|active| format!("{} ({}m left)", active.label, active.remaining_minutes))
            .unwrap_or_default();
    }
    for mut text in &mut hint {
        **text = hud
            .hint
            .map(|hint| format!("[E] {hint}"))
            .unwrap_or_default();
    }
}

pub fn sync_action_buttons(
    hud: Res<HudSnapshot>,
    mut buttons: Query<(&ActionButtonNode, &mut BackgroundColor)>,
) {
    if !hud.is_changed() {
        return;
    }
    for (node, mut background) in &mut buttons {
        let enabled = hud
            .action_buttons
            .iter()
            .any(|button| button.id == node.id && button.enabled);
        background.0 = if enabled {
            BUTTON_ENABLED
        } else {
            BUTTON_DISABLED
        };
    }
}

fn icon_color(hex: &str) -> Color {
    Srgba::hex(hex)
        .map(Color::from)
        .unwrap_or(Color::srgb(0.5, 0.5, 0.5))
}

fn build_shop_body(body: &mut ChildBuilder, view: &ShopView, grid: ShopGrid) {
    body.spawn(Node {
        column_gap: Val::Px(8.0),
        ..default()
    })
    .with_children(|tabs| {
        for mode in [ShopMode::Buy, ShopMode::Sell] {
            let color = if mode == view.mode {
                SLOT_SELECTED
            } else {
                SLOT_BG
            };
            let text = match mode {
                ShopMode::Buy => "Buy",
                ShopMode::Sell => "Sell",
            };
            hit_button(tabs, text, UiHit::Shop(ShopUiAction::Tab(mode)), color);
        }
        hit_button(tabs, "Close", UiHit::Shop(ShopUiAction::Close), SLOT_BG);
    });

    let slot_width = 100.0 / grid.columns.max(1) as f32;
    body.spawn(Node {
        flex_wrap: FlexWrap::Wrap,
        width: Val::Percent(100.0),
        ..default()
    })
    .with_children(|slots| {
        for slot in &view.slots {
            slots
                .spawn((
                    Button,
                    Node {
                        width: Val::Percent(slot_width),
                        padding: UiRect::all(Val::Px(6.0)),
                        column_gap: Val::Px(6.0),
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(if slot.selected { SLOT_SELECTED } else { SLOT_BG }),
                    UiHitTarget(UiHit::Shop(ShopUiAction::Select(slot.index))),
                ))
                .with_children(|node| {
                    node.spawn((
                        Node {
                            width: Val::Px(24.0),
                            height: Val::Px(24.0),
                            justify_content: JustifyContent::Center,
                            ..default()
                        },
                        BackgroundColor(icon_color(&slot.icon_color)),
                        PickingBehavior::IGNORE,
                    ))
                    .with_children(|icon| {
                        icon.spawn(label(slot.icon_label.clone(), 16.0));
                    });
                    node.spawn(label(
                        format!("{}  {}  x{}", slot.name, format_money(slot.price.max(0) as u32), slot.owned),
                        14.0,
                    ));
                });
        }
    });

    body.spawn(label(
        view.selected_description.clone().unwrap_or_default(),
        14.0,
    ));

    body.spawn(Node {
        column_gap: Val::Px(8.0),
        align_items: AlignItems::Center,
        ..default()
    })
    .with_children(|row| {
        hit_button(row, "<", UiHit::Shop(ShopUiAction::Page(-1)), SLOT_BG);
        row.spawn(label(
            format!("Page {}/{}", view.page_index + 1, view.page_count),
            14.0,
        ));
        hit_button(row, ">", UiHit::Shop(ShopUiAction::Page(1)), SLOT_BG);
        hit_button(row, "-", UiHit::Shop(ShopUiAction::Quantity(-1)), SLOT_BG);
        row.spawn(label(
            format!("Qty {} / {}", view.quantity, view.max_quantity),
            14.0,
        ));
        hit_button(row, "+", UiHit::Shop(ShopUiAction::Quantity(1)), SLOT_BG);
        let confirm = match view.mode {
            ShopMode::Buy => "Buy",
            ShopMode::Sell => "Sell",
        };
        hit_button(
            row,
            confirm,
            UiHit::Shop(ShopUiAction::Confirm),
            BUTTON_ENABLED,
        );
    });
}

pub fn sync_shop_panel(
    mut commands: Commands,
    hud: Res<HudSnapshot>,
    grid: Res<ShopGrid>,
    mut panels: Query<&mut Visibility, With<ShopPanel>>,
    bodies: Query<Entity, With<ShopPanelBody>>,
    mut shown: Local<Option<ShopView>>,
) {
    if !hud.is_changed() || *shown == hud.shop {
        return;
    }
    *shown = hud.shop.clone();

    for mut visibility in &mut panels {
        *visibility = if hud.shop.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    for body in &bodies {
        let mut entity = commands.entity(body);
        entity.despawn_descendants();
        if let Some(view) = &hud.shop {
            entity.with_children(|children| build_shop_body(children, view, *grid));
        }
    }
}
