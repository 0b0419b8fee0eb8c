//! Economy domain: the shop, the wallet, and the item ledger.
//!
//! The controller drives shop sessions; this plugin owns the resources and
//! keeps trade totals.

use bevy::prelude::*;

use crate::shared::*;

pub mod shop;
pub mod wallet;

use wallet::{record_transactions, TradeStats};

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerState>()
            .init_resource::<Inventory>()
            .init_resource::<ShopState>()
            .init_resource::<ShopCatalog>()
            .init_resource::<ShopGrid>()
            .init_resource::<TradeStats>()
            .add_event::<ShopTransactionEvent>()
            .add_systems(Update, record_transactions.in_set(FrameSet::Present));
    }
}
