//! Context-sensitive farm tasks.
//!
//! A plot offers at most one task at a time, chosen by fixed priority:
//! harvest, till, water, plant. Task costs are balance constants, not
//! content, and live in the table below.

use bevy::prelude::*;

use super::is_harvestable;
use crate::shared::*;
use crate::world::layout::is_farm_tile;

/// Crop planted when the player has no other choice.
const PREFERRED_CROP: &str = "carrot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmTask {
    Till,
    Water,
    Plant(CropId),
    Harvest(CropId),
}

/// Duration and needs cost of one farm task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskBalance {
    pub duration_minutes: f32,
    pub needs_delta: NeedsDelta,
}

const fn cost(duration_minutes: f32, hunger: f32, energy: f32, fun: f32) -> TaskBalance {
    TaskBalance {
        duration_minutes,
        needs_delta: NeedsDelta {
            hunger,
            energy,
            hygiene: 0.0,
            fun,
            social: 0.0,
        },
    }
}

//                                        minutes  hunger  energy  fun
pub const TILL_BALANCE: TaskBalance = cost(15.0, -1.0, -2.0, 0.0);
pub const WATER_BALANCE: TaskBalance = cost(10.0, 0.0, -1.0, 0.0);
pub const PLANT_BALANCE: TaskBalance = cost(15.0, 0.0, -2.0, 0.0);
pub const HARVEST_BALANCE: TaskBalance = cost(10.0, 0.0, -1.0, 1.0);

impl FarmTask {
    pub fn balance(&self) -> TaskBalance {
        match self {
            FarmTask::Till => TILL_BALANCE,
            FarmTask::Water => WATER_BALANCE,
            FarmTask::Plant(_) => PLANT_BALANCE,
            FarmTask::Harvest(_) => HARVEST_BALANCE,
        }
    }

    /// The timed action the queue runs for this task.
    pub fn to_action(&self, crops: &CropCatalog) -> ActionDef {
        let (id, label) = match self {
            FarmTask::Till => ("farm_till".to_string(), "Till".to_string()),
            FarmTask::Water => ("farm_water".to_string(), "Water".to_string()),
            FarmTask::Plant(crop) => (
                format!("farm_plant_{crop}"),
                crops
                    .get(crop)
                    .map_or_else(|| "Plant".to_string(), |def| format!("Plant {}", def.name)),
            ),
            FarmTask::Harvest(_) => ("farm_harvest".to_string(), "Harvest".to_string()),
        };
        let balance = self.balance();
        ActionDef {
            id,
            label,
            duration_minutes: balance.duration_minutes,
            needs_delta: balance.needs_delta,
        }
    }
}

/// Carrot when the catalog has it, otherwise the first crop listed.
pub fn default_plant_crop(crops: &CropCatalog) -> Option<&CropDef> {
    crops
        .get(PREFERRED_CROP)
        .or_else(|| crops.crops.first())
}

/// The single task `plot` currently offers, if any.
pub fn context_task(plot: &PlotState, crops: &CropCatalog) -> Option<FarmTask> {
    if let Some(crop) = &plot.crop {
        if is_harvestable(plot, crops) {
            return Some(FarmTask::Harvest(crop.clone()));
        }
    }
    match plot.soil {
        SoilState::Empty => Some(FarmTask::Till),
        SoilState::Tilled => Some(FarmTask::Water),
        SoilState::Watered if plot.crop.is_none() => {
            default_plant_crop(crops).map(|def| FarmTask::Plant(def.id.clone()))
        }
        SoilState::Watered => None,
    }
}

/// A started farm task whose effect lands when its action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFarmTask {
    pub tile: TilePos,
    pub task: FarmTask,
}

/// Resolves the context task at `tile` and starts it on the queue.
/// Returns the pending effect only when the action actually started.
pub fn try_start_farm_task(
    tile: TilePos,
    farm: &FarmState,
    crops: &CropCatalog,
    queue: &mut ActionQueue,
) -> Option<PendingFarmTask> {
    if !is_farm_tile(tile) {
        return None;
    }
    let plot = farm.plot(tile)?;
    let task = context_task(plot, crops)?;
    if !queue.start_action(&task.to_action(crops)) {
        return None;
    }
    info!("[Farming] {:?} started at ({}, {})", task, tile.x, tile.y);
    Some(PendingFarmTask { tile, task })
}

/// Applies a finished task to its plot. A harvest credits the inventory and
/// resets the plot in the same step. Returns the harvested crop, if any.
pub fn apply_farm_task(
    pending: &PendingFarmTask,
    farm: &mut FarmState,
    inventory: &mut Inventory,
) -> Option<CropId> {
    let plot = farm.plot_mut(pending.tile)?;
    let harvested = match &pending.task {
        FarmTask::Till => {
            plot.till();
            None
        }
        FarmTask::Water => {
            plot.water();
            None
        }
        FarmTask::Plant(crop) => {
            plot.plant(crop);
            None
        }
        FarmTask::Harvest(fallback) => {
            let crop = plot.crop.clone().unwrap_or_else(|| fallback.clone());
            inventory.add(&crop, 1);
            plot.till();
            Some(crop)
        }
    };
    info!(
        "[Farming] {:?} applied at ({}, {})",
        pending.task, pending.tile.x, pending.tile.y
    );
    harvested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farming::tests::catalog;
    use crate::farming::tick_growth;

    const PLOT: TilePos = TilePos::new(12, 23);

    fn run_to_completion(queue: &mut ActionQueue) {
        let mut needs = Needs::default();
        queue.tick(1000.0, &mut needs);
        assert!(!queue.is_active());
    }

    #[test]
    fn test_priority_order() {
        let crops = catalog();
        let mut plot = PlotState::default();
        assert_eq!(context_task(&plot, &crops), Some(FarmTask::Till));
        plot.till();
        assert_eq!(context_task(&plot, &crops), Some(FarmTask::Water));
        plot.water();
        assert_eq!(context_task(&plot, &crops), Some(FarmTask::Plant("carrot".into())));
        plot.plant("potato");
        assert_eq!(context_task(&plot, &crops), None);
        plot.growth_minutes = 360.0;
        assert_eq!(context_task(&plot, &crops), Some(FarmTask::Harvest("potato".into())));
    }

    #[test]
    fn test_plant_falls_back_to_first_crop_and_needs_a_catalog() {
        let mut plot = PlotState::default();
        plot.till();
        plot.water();
        let only_potato = CropCatalog {
            crops: vec![CropDef {
                id: "potato".into(),
                name: "Potato".into(),
                growth_minutes: 360.0,
            }],
        };
        assert_eq!(context_task(&plot, &only_potato), Some(FarmTask::Plant("potato".into())));
        assert_eq!(context_task(&plot, &CropCatalog::default()), None);
    }

    #[test]
    fn test_task_actions_carry_balance() {
        let crops = catalog();
        let plant = FarmTask::Plant("carrot".into()).to_action(&crops);
        assert_eq!(plant.id, "farm_plant_carrot");
        assert_eq!(plant.label, "Plant Carrot");
        assert_eq!(plant.duration_minutes, 15.0);
        assert_eq!(plant.needs_delta.energy, -2.0);

        let till = FarmTask::Till.to_action(&crops);
        assert_eq!((till.needs_delta.energy, till.needs_delta.hunger), (-2.0, -1.0));

        let harvest = FarmTask::Harvest("carrot".into()).to_action(&crops);
        assert_eq!(harvest.duration_minutes, 10.0);
        assert_eq!((harvest.needs_delta.energy, harvest.needs_delta.fun), (-1.0, 1.0));
    }

    #[test]
    fn test_full_cycle_yields_one_carrot() {
        let crops = catalog();
        let mut farm = FarmState::default();
        let mut inventory = Inventory::default();
        let mut queue = ActionQueue::default();

        for _ in 0..3 {
            let pending = try_start_farm_task(PLOT, &farm, &crops, &mut queue).expect("task");
            run_to_completion(&mut queue);
            assert_eq!(apply_farm_task(&pending, &mut farm, &mut inventory), None);
        }
        let plot = farm.plot(PLOT).unwrap();
        assert_eq!(plot.soil, SoilState::Watered);
        assert_eq!(plot.crop.as_deref(), Some("carrot"));

        tick_growth(&mut farm, &crops, 240.0);

        let pending = try_start_farm_task(PLOT, &farm, &crops, &mut queue).expect("harvest");
        assert_eq!(pending.task, FarmTask::Harvest("carrot".into()));
        run_to_completion(&mut queue);
        assert_eq!(
            apply_farm_task(&pending, &mut farm, &mut inventory),
            Some("carrot".to_string())
        );

        assert_eq!(inventory.count("carrot"), 1);
        let plot = farm.plot(PLOT).unwrap();
        assert_eq!(plot.soil, SoilState::Tilled);
        assert_eq!(plot.crop, None);
        assert_eq!(plot.growth_minutes, 0.0);
    }

    #[test]
    fn test_start_rejected_off_farm_or_while_busy() {
        let crops = catalog();
        let farm = FarmState::default();
        let mut queue = ActionQueue::default();
        assert!(try_start_farm_task(TilePos::new(0, 0), &farm, &crops, &mut queue).is_none());
        assert!(try_start_farm_task(PLOT, &farm, &crops, &mut queue).is_some());
        assert!(try_start_farm_task(TilePos::new(13, 23), &farm, &crops, &mut queue).is_none());
    }

    #[test]
    fn test_harvest_uses_fallback_when_plot_lost_its_crop() {
        let mut farm = FarmState::default();
        let mut inventory = Inventory::default();
        farm.plot_mut(PLOT).unwrap().till();
        let pending = PendingFarmTask {
            tile: PLOT,
            task: FarmTask::Harvest("potato".into()),
        };
        apply_farm_task(&pending, &mut farm, &mut inventory);
        assert_eq!(inventory.count("potato"), 1);
    }
}
