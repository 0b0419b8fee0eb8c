//! Farming domain: plot soil state, planting, crop growth, harvest.
//!
//! Plots follow `empty → tilled → watered → growing → harvestable`, and a
//! harvest drops the plot back to tilled. The setters here perform no
//! precondition checks; `context` decides which single task is legal.

use bevy::prelude::*;

use crate::shared::*;
use crate::world::layout::FARM_PATCH;

pub mod context;

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FarmState>()
            .init_resource::<CropCatalog>()
            .add_event::<CropHarvestedEvent>()
            .add_systems(Update, grow_crops.in_set(FrameSet::Simulate));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FARM STATE
// ═══════════════════════════════════════════════════════════════════════

impl Default for FarmState {
    fn default() -> Self {
        Self::for_rect(FARM_PATCH)
    }
}

impl FarmState {
    /// One empty plot per tile of `rect`.
    pub fn for_rect(rect: TileRect) -> Self {
        Self {
            plots: rect.tiles().map(|tile| (tile, PlotState::default())).collect(),
        }
    }

    pub fn plot(&self, tile: TilePos) -> Option<&PlotState> {
        self.plots.get(&tile)
    }

    pub fn plot_mut(&mut self, tile: TilePos) -> Option<&mut PlotState> {
        self.plots.get_mut(&tile)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLOT TRANSITIONS
// ═══════════════════════════════════════════════════════════════════════

impl PlotState {
    /// Forces tilled with no crop. Also serves as the hard reset after harvest.
    pub fn till(&mut self) {
        self.soil = SoilState::Tilled;
        self.crop = None;
        self.growth_minutes = 0.0;
    }

    pub fn water(&mut self) {
        self.soil = SoilState::Watered;
    }

    pub fn plant(&mut self, crop: &str) {
        self.crop = Some(crop.to_string());
        self.growth_minutes = 0.0;
    }
}

/// Grows every watered plot that carries a crop, clamped to that crop's
/// total. Water never dries out on its own.
pub fn tick_growth(farm: &mut FarmState, crops: &CropCatalog, minutes: f32) {
    if minutes <= 0.0 {
        return;
    }
    for plot in farm.plots.values_mut() {
        if plot.soil != SoilState::Watered {
            continue;
        }
        let Some(total) = plot
            .crop
            .as_deref()
            .and_then(|id| crops.get(id))
            .map(|def| def.growth_minutes)
        else {
            continue;
        };
        plot.growth_minutes = (plot.growth_minutes + minutes).min(total).max(0.0);
    }
}

fn crop_total(plot: &PlotState, crops: &CropCatalog) -> Option<f32> {
    let def = crops.get(plot.crop.as_deref()?)?;
    (def.growth_minutes > 0.0).then_some(def.growth_minutes)
}

/// Fraction grown in `[0, 1]`; zero without a known crop.
pub fn growth_percent(plot: &PlotState, crops: &CropCatalog) -> f32 {
    crop_total(plot, crops)
        .map(|total| (plot.growth_minutes / total).clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

/// Visual stage 0..=3.
pub fn growth_stage(plot: &PlotState, crops: &CropCatalog) -> u8 {
    ((growth_percent(plot, crops) * 4.0).floor() as u8).min(3)
}

pub fn is_harvestable(plot: &PlotState, crops: &CropCatalog) -> bool {
    crop_total(plot, crops).is_some_and(|total| plot.growth_minutes >= total)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn grow_crops(frame: Res<FrameClock>, crops: Res<CropCatalog>, mut farm: ResMut<FarmState>) {
    if frame.sim_minutes > 0.0 {
        tick_growth(&mut farm, &crops, frame.sim_minutes);
    }
}
