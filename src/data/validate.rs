//! Lenient per-entry validation of the content documents.
//!
//! A document with the wrong top-level shape is an error. Inside a good
//! document, entries that fail validation are dropped and counted; the
//! first entry with a given id wins.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use super::defaults::{default_buttons, default_hotkeys};
use super::ContentError;
use crate::shared::*;

/// Entries that survived validation, plus how many were thrown away.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub value: T,
    pub dropped: usize,
}

/// A number, or a string holding one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn finite(&self) -> Option<f64> {
        let value = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

fn text(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn finite(value: Option<Numeric>) -> Option<f64> {
    value.as_ref().and_then(Numeric::finite)
}

fn positive(value: Option<Numeric>) -> Option<f32> {
    finite(value).filter(|v| *v > 0.0).map(|v| v as f32)
}

// ═══════════════════════════════════════════════════════════════════════
// CROPS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct CropsFile {
    crops: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCrop {
    id: Option<String>,
    name: Option<String>,
    growth_minutes: Option<Numeric>,
}

impl RawCrop {
    fn into_def(self) -> Option<CropDef> {
        Some(CropDef {
            id: text(self.id)?,
            name: text(self.name)?,
            growth_minutes: positive(self.growth_minutes)?,
        })
    }
}

pub fn validate_crops(doc: Value) -> Result<Validated<Vec<CropDef>>, ContentError> {
    let file: CropsFile = serde_json::from_value(doc).map_err(|_| ContentError::Shape {
        file: "crops.json",
        field: "crops",
    })?;
    let total = file.crops.len();
    let mut seen = HashSet::new();
    let crops: Vec<CropDef> = file
        .crops
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawCrop>(entry).ok()?.into_def())
        .filter(|crop| seen.insert(crop.id.clone()))
        .collect();
    if crops.is_empty() {
        return Err(ContentError::Empty { file: "crops.json" });
    }
    Ok(Validated {
        dropped: total - crops.len(),
        value: crops,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// ACTIONS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct ActionsFile {
    actions: Vec<Value>,
    #[serde(default)]
    hotkeys: Option<Value>,
    #[serde(default)]
    buttons: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAction {
    id: Option<String>,
    label: Option<String>,
    duration_minutes: Option<Numeric>,
    #[serde(default)]
    needs_delta: Option<Value>,
}

impl RawAction {
    fn into_def(self) -> Option<ActionDef> {
        Some(ActionDef {
            id: text(self.id)?,
            label: text(self.label)?,
            duration_minutes: positive(self.duration_minutes)?,
            needs_delta: needs_delta(self.needs_delta.as_ref()),
        })
    }
}

/// Only the five known channels, only real numbers. Anything else is zero.
fn needs_delta(value: Option<&Value>) -> NeedsDelta {
    let Some(Value::Object(map)) = value else {
        return NeedsDelta::default();
    };
    NeedKind::ALL
        .into_iter()
        .fold(NeedsDelta::default(), |delta, kind| {
            match map.get(kind.key()).and_then(Value::as_f64) {
                Some(amount) if amount.is_finite() => delta.with(kind, amount as f32),
                _ => delta,
            }
        })
}

fn hotkeys(value: Option<&Value>, ids: &HashSet<&str>) -> HashMap<String, ActionId> {
    let configured: HashMap<String, ActionId> = match value {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(code, id)| {
                let id = id.as_str()?;
                ids.contains(id).then(|| (code.clone(), id.to_string()))
            })
            .collect(),
        _ => HashMap::new(),
    };
    if !configured.is_empty() {
        return configured;
    }
    default_hotkeys()
        .into_iter()
        .filter(|(_, id)| ids.contains(id.as_str()))
        .collect()
}

fn buttons(value: Option<&Value>, actions: &[ActionDef], ids: &HashSet<&str>) -> Vec<ActionId> {
    let configured: Vec<ActionId> = match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .filter(|id| ids.contains(id))
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    if !configured.is_empty() {
        return configured;
    }
    let fallback: Vec<ActionId> = default_buttons()
        .into_iter()
        .filter(|id| ids.contains(id.as_str()))
        .collect();
    if !fallback.is_empty() {
        return fallback;
    }
    actions.iter().take(3).map(|action| action.id.clone()).collect()
}

pub fn validate_actions(doc: Value) -> Result<Validated<ActionCatalog>, ContentError> {
    let file: ActionsFile = serde_json::from_value(doc).map_err(|_| ContentError::Shape {
        file: "actions.json",
        field: "actions",
    })?;
    let total = file.actions.len();
    let mut seen = HashSet::new();
    let actions: Vec<ActionDef> = file
        .actions
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawAction>(entry).ok()?.into_def())
        .filter(|action| seen.insert(action.id.clone()))
        .collect();
    if actions.is_empty() {
        return Err(ContentError::Empty { file: "actions.json" });
    }

    let ids: HashSet<&str> = actions.iter().map(|action| action.id.as_str()).collect();
    let hotkeys = hotkeys(file.hotkeys.as_ref(), &ids);
    let buttons = buttons(file.buttons.as_ref(), &actions, &ids);
    let dropped = total - actions.len();
    Ok(Validated {
        value: ActionCatalog {
            actions,
            hotkeys,
            buttons,
        },
        dropped,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// SHOP ITEMS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct ShopFile {
    items: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShopItem {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    price_buy: Option<Numeric>,
    price_sell: Option<Numeric>,
    icon_label: Option<String>,
    icon_color: Option<String>,
}

impl RawShopItem {
    fn into_item(self) -> Option<ShopItem> {
        Some(ShopItem {
            id: text(self.id)?,
            name: text(self.name)?,
            description: text(self.description)?,
            category: text(self.category)?,
            price_buy: finite(self.price_buy)?.round() as i32,
            price_sell: finite(self.price_sell)?.round() as i32,
            icon_label: text(self.icon_label)?,
            icon_color: text(self.icon_color)?,
        })
    }
}

pub fn validate_shop_items(doc: Value) -> Result<Validated<Vec<ShopItem>>, ContentError> {
    let file: ShopFile = serde_json::from_value(doc).map_err(|_| ContentError::Shape {
        file: "shop_items.json",
        field: "items",
    })?;
    let total = file.items.len();
    let mut seen = HashSet::new();
    let items: Vec<ShopItem> = file
        .items
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawShopItem>(entry).ok()?.into_item())
        .filter(|item| seen.insert(item.id.clone()))
        .collect();
    if items.is_empty() {
        return Err(ContentError::Empty { file: "shop_items.json" });
    }
    Ok(Validated {
        dropped: total - items.len(),
        value: items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_crops_accept_numeric_strings_and_drop_bad_entries() {
        let doc = json!({
            "crops": [
                { "id": " carrot ", "name": "Carrot", "growthMinutes": "240" },
                { "id": "carrot", "name": "Second Carrot", "growthMinutes": 10 },
                { "id": "bean", "name": "Bean", "growthMinutes": 0 },
                { "id": "", "name": "Nameless", "growthMinutes": 5 },
                { "id": "pea", "name": "Pea", "growthMinutes": "soon" },
                "not an object",
                { "id": "leek", "name": "Leek", "growthMinutes": 90.5 }
            ]
        });
        let crops = validate_crops(doc).unwrap();
        assert_eq!(crops.dropped, 5);
        let ids: Vec<&str> = crops.value.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["carrot", "leek"]);
        assert_eq!(crops.value[0].name, "Carrot");
        assert_eq!(crops.value[0].growth_minutes, 240.0);
    }

    #[test]
    fn test_wrong_shape_and_empty_are_errors() {
        assert!(matches!(
            validate_crops(json!([1, 2, 3])),
            Err(ContentError::Shape { .. })
        ));
        assert!(matches!(
            validate_shop_items(json!({ "items": "nope" })),
            Err(ContentError::Shape { .. })
        ));
        assert!(matches!(
            validate_actions(json!({ "actions": [{ "id": "x" }] })),
            Err(ContentError::Empty { .. })
        ));
    }

    #[test]
    fn test_actions_keep_only_known_need_keys() {
        let doc = json!({
            "actions": [{
                "id": "nap",
                "label": "Nap",
                "durationMinutes": 12,
                "needsDelta": { "energy": 8, "thirst": 3, "fun": "2", "social": -1.5 }
            }]
        });
        let catalog = validate_actions(doc).unwrap().value;
        let nap = &catalog.actions[0];
        assert_eq!(nap.needs_delta.energy, 8.0);
        assert_eq!(nap.needs_delta.fun, 0.0);
        assert_eq!(nap.needs_delta.social, -1.5);
        assert_eq!(nap.needs_delta.hunger, 0.0);
    }

    #[test]
    fn test_hotkeys_and_buttons_filter_to_known_actions() {
        let doc = json!({
            "actions": [
                { "id": "rest", "label": "Rest", "durationMinutes": 30 },
                { "id": "nap", "label": "Nap", "durationMinutes": 10 }
            ],
            "hotkeys": { "KeyR": "rest", "KeyZ": "missing", "KeyN": 4 },
            "buttons": ["nap", "missing", 7]
        });
        let catalog = validate_actions(doc).unwrap().value;
        assert_eq!(catalog.hotkeys.len(), 1);
        assert_eq!(catalog.hotkeys.get("KeyR").map(String::as_str), Some("rest"));
        assert_eq!(catalog.buttons, vec!["nap".to_string()]);
    }

    #[test]
    fn test_hotkeys_and_buttons_fall_back_to_filtered_defaults() {
        let doc = json!({
            "actions": [
                { "id": "snack", "label": "Snack", "durationMinutes": 15 },
                { "id": "nap", "label": "Nap", "durationMinutes": 10 }
            ],
            "hotkeys": { "KeyZ": "missing" }
        });
        let catalog = validate_actions(doc).unwrap().value;
        let mut codes: Vec<&str> = catalog.hotkeys.keys().map(String::as_str).collect();
        codes.sort_unstable();
        assert_eq!(codes, vec!["Digit2", "Numpad2"]);
        assert_eq!(catalog.buttons, vec!["snack".to_string()]);

        let doc = json!({
            "actions": [
                { "id": "a", "label": "A", "durationMinutes": 1 },
                { "id": "b", "label": "B", "durationMinutes": 1 },
                { "id": "c", "label": "C", "durationMinutes": 1 },
                { "id": "d", "label": "D", "durationMinutes": 1 }
            ]
        });
        let catalog = validate_actions(doc).unwrap().value;
        assert!(catalog.hotkeys.is_empty());
        assert_eq!(catalog.buttons, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_shop_items_need_every_field() {
        let full = json!({
            "id": "seed", "name": "Seed", "description": "A seed.", "category": "Seed",
            "priceBuy": 12, "priceSell": "-1", "iconLabel": "S", "iconColor": "#ffffff"
        });
        let mut missing_icon = full.clone();
        missing_icon["iconColor"] = json!("   ");
        let items = validate_shop_items(json!({ "items": [full, missing_icon] })).unwrap();
        assert_eq!(items.dropped, 1);
        assert_eq!(items.value[0].price_buy, 12);
        assert_eq!(items.value[0].price_sell, -1);
    }
}
