use std::collections::HashMap;

use crate::shared::*;

fn crop(id: &str, name: &str, growth_minutes: f32) -> CropDef {
    CropDef {
        id: id.into(),
        name: name.into(),
        growth_minutes,
    }
}

pub fn default_crops() -> Vec<CropDef> {
    vec![
        crop("carrot", "Carrot", 240.0),
        crop("potato", "Potato", 360.0),
        crop("strawberry", "Strawberry", 480.0),
    ]
}

pub fn default_actions() -> Vec<ActionDef> {
    vec![
        ActionDef {
            id: "rest".into(),
            label: "Rest".into(),
            duration_minutes: 30.0,
            needs_delta: NeedsDelta::default()
                .with(NeedKind::Energy, 15.0)
                .with(NeedKind::Hunger, -3.0)
                .with(NeedKind::Hygiene, -2.0),
        },
        ActionDef {
            id: "snack".into(),
            label: "Snack".into(),
            duration_minutes: 15.0,
            needs_delta: NeedsDelta::default()
                .with(NeedKind::Hunger, 10.0)
                .with(NeedKind::Energy, -1.0),
        },
        ActionDef {
            id: "wash".into(),
            label: "Wash".into(),
            duration_minutes: 20.0,
            needs_delta: NeedsDelta::default()
                .with(NeedKind::Hygiene, 20.0)
                .with(NeedKind::Fun, -1.0),
        },
    ]
}

pub fn default_hotkeys() -> HashMap<String, ActionId> {
    [
        ("Digit1", "rest"),
        ("Numpad1", "rest"),
        ("Digit2", "snack"),
        ("Numpad2", "snack"),
        ("Digit3", "wash"),
        ("Numpad3", "wash"),
    ]
    .into_iter()
    .map(|(code, id)| (code.to_string(), id.to_string()))
    .collect()
}

pub fn default_buttons() -> Vec<ActionId> {
    vec!["rest".into(), "snack".into(), "wash".into()]
}

pub fn default_action_catalog() -> ActionCatalog {
    ActionCatalog {
        actions: default_actions(),
        hotkeys: default_hotkeys(),
        buttons: default_buttons(),
    }
}

#[allow(clippy::too_many_arguments)]
fn item(
    id: &str,
    name: &str,
    description: &str,
    category: &str,
    price_buy: i32,
    price_sell: i32,
    icon_label: &str,
    icon_color: &str,
) -> ShopItem {
    ShopItem {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        category: category.into(),
        price_buy,
        price_sell,
        icon_label: icon_label.into(),
        icon_color: icon_color.into(),
    }
}

pub fn default_shop_items() -> Vec<ShopItem> {
    vec![
        item(
            "carrot_seed",
            "Carrot Seeds",
            "Quick-growing roots. Reliable starter crop.",
            "Seed",
            15,
            6,
            "C",
            "#e58b4a",
        ),
        item(
            "potato_seed",
            "Potato Seeds",
            "Sturdy sprouts that love steady watering.",
            "Seed",
            20,
            8,
            "P",
            "#c29a6b",
        ),
        item(
            "strawberry_seed",
            "Strawberry Seeds",
            "Sweet berries with a slower grow cycle.",
            "Seed",
            30,
            12,
            "S",
            "#de5e7d",
        ),
        item(
            "gift_trinket",
            "Gift Trinket",
            "A small charm to brighten someone's day.",
            "Gift",
            45,
            20,
            "G",
            "#6a9ac7",
        ),
    ]
}
