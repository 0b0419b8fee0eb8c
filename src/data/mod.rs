//! Data layer: fills the content catalogs at startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), reads the crop, action
//! and shop documents, validates them, and transitions to Playing. Bad or
//! missing content never stops the game: each catalog falls back to its
//! built-in defaults with a warning.

mod defaults;
pub mod validate;

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde_json::Value;

use crate::shared::*;

pub use defaults::{default_action_catalog, default_crops, default_shop_items};
use validate::{validate_actions, validate_crops, validate_shop_items, Validated};

/// Overrides the directory the content documents are read from.
pub const DATA_DIR_ENV: &str = "TINYACRE_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "assets/data";

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CropCatalog>()
            .init_resource::<ActionCatalog>()
            .init_resource::<ShopCatalog>()
            .add_systems(OnEnter(GameState::Loading), load_content);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{file} must be an object with a `{field}` array")]
    Shape {
        file: &'static str,
        field: &'static str,
    },
    #[error("{file} had no valid entries")]
    Empty { file: &'static str },
}

/// The three validated catalogs the simulation runs on.
#[derive(Debug, Clone)]
pub struct Content {
    pub crops: CropCatalog,
    pub actions: ActionCatalog,
    pub shop: ShopCatalog,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            crops: CropCatalog {
                crops: default_crops(),
            },
            actions: default_action_catalog(),
            shop: ShopCatalog {
                items: default_shop_items(),
            },
        }
    }
}

/// Unwraps a validated catalog, or logs why it is unusable and falls back.
fn accept<T>(file: &str, result: Result<Validated<T>, ContentError>, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(validated) => {
            if validated.dropped > 0 {
                warn!(
                    "[Content] {}: {} invalid entries ignored",
                    file, validated.dropped
                );
            }
            validated.value
        }
        Err(err) => {
            warn!("[Content] {}. Using defaults.", err);
            fallback()
        }
    }
}

impl Content {
    /// Validates already-read documents. Each document fails independently.
    pub fn from_documents(
        crops: Result<Value, ContentError>,
        actions: Result<Value, ContentError>,
        shop: Result<Value, ContentError>,
    ) -> Self {
        let crops = accept("crops.json", crops.and_then(validate_crops), default_crops);
        let actions = accept(
            "actions.json",
            actions.and_then(validate_actions),
            default_action_catalog,
        );
        let items = accept(
            "shop_items.json",
            shop.and_then(validate_shop_items),
            default_shop_items,
        );
        Self {
            crops: CropCatalog { crops },
            actions,
            shop: ShopCatalog { items },
        }
    }

    pub fn load_from_dir(dir: &Path) -> Self {
        Self::from_documents(
            read_document(&dir.join("crops.json")),
            read_document(&dir.join("actions.json")),
            read_document(&dir.join("shop_items.json")),
        )
    }
}

pub fn read_document(path: &Path) -> Result<Value, ContentError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ContentError::Json {
        path: display,
        source,
    })
}

/// Where content lives on this platform. `None` means built-in defaults only.
fn content_dir() -> Option<PathBuf> {
    if cfg!(target_arch = "wasm32") {
        return None;
    }
    let dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    Some(PathBuf::from(dir))
}

fn load_content(
    mut crops: ResMut<CropCatalog>,
    mut actions: ResMut<ActionCatalog>,
    mut shop: ResMut<ShopCatalog>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let content = match content_dir() {
        Some(dir) => {
            info!("[Content] Reading catalogs from {}", dir.display());
            Content::load_from_dir(&dir)
        }
        None => {
            info!("[Content] No content directory on this platform, using built-in catalogs");
            Content::default()
        }
    };

    info!(
        "[Content] Loaded {} crops, {} actions ({} hotkeys), {} shop items",
        content.crops.crops.len(),
        content.actions.actions.len(),
        content.actions.hotkeys.len(),
        content.shop.items.len()
    );
    *crops = content.crops;
    *actions = content.actions;
    *shop = content.shop;

    next_state.set(GameState::Playing);
}
