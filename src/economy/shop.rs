//! Shop session logic: quantity bounds, buy/sell confirmation, grid
//! navigation and paging.
//!
//! Affordability is only checked when a purchase is confirmed; the quantity
//! selector may run ahead of the wallet.

use bevy::prelude::*;

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PURE RULES
// ═══════════════════════════════════════════════════════════════════════

/// Upper bound for the quantity selector. Never below 1.
pub fn max_quantity(mode: ShopMode, item: Option<&ShopItem>, money: u32, owned: u32) -> u32 {
    let Some(item) = item else {
        return 1;
    };
    match mode {
        ShopMode::Buy => {
            if item.price_buy <= 0 {
                return MAX_SHOP_QUANTITY;
            }
            let affordable = money / item.price_buy as u32;
            affordable.clamp(1, MAX_SHOP_QUANTITY)
        }
        ShopMode::Sell => owned.clamp(1, MAX_SHOP_QUANTITY),
    }
}

/// Pages needed to show `item_count` items. Always at least one.
pub fn page_count(item_count: usize, grid: ShopGrid) -> usize {
    let capacity = grid.capacity();
    if capacity == 0 {
        return 1;
    }
    item_count.div_ceil(capacity).max(1)
}

/// A completed buy or sell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopReceipt {
    pub item_id: ItemId,
    pub mode: ShopMode,
    pub quantity: u32,
    pub total: u32,
}

/// Buys or sells `quantity` of `item`. Returns `None` and changes nothing
/// when the price is negative, the wallet is short, or stock is missing.
pub fn confirm(
    mode: ShopMode,
    item: &ShopItem,
    quantity: u32,
    money: &mut u32,
    inventory: &mut Inventory,
) -> Option<ShopReceipt> {
    match mode {
        ShopMode::Buy => {
            if item.price_buy < 0 {
                return None;
            }
            let total = item.price_buy as u64 * quantity as u64;
            if (*money as u64) < total {
                return None;
            }
            let total = total as u32;
            *money -= total;
            inventory.add(&item.id, quantity);
            Some(ShopReceipt {
                item_id: item.id.clone(),
                mode,
                quantity,
                total,
            })
        }
        ShopMode::Sell => {
            if item.price_sell < 0 || inventory.count(&item.id) < quantity {
                return None;
            }
            if !inventory.remove(&item.id, quantity) {
                return None;
            }
            let total = u32::try_from(item.price_sell as u64 * quantity as u64).unwrap_or(u32::MAX);
            *money = money.saturating_add(total);
            Some(ShopReceipt {
                item_id: item.id.clone(),
                mode,
                quantity,
                total,
            })
        }
    }
}

/// Where a grid move lands: the new selected index and page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCursor {
    pub index: usize,
    pub page: usize,
}

/// Moves the selection by `(dx, dy)` cells. Columns clamp at the edges;
/// rows spill onto the previous or next page when one exists. A move past
/// the last item lands on the last item.
pub fn move_selection(
    current: usize,
    dx: i32,
    dy: i32,
    grid: ShopGrid,
    item_count: usize,
    page: usize,
) -> GridCursor {
    if item_count == 0 {
        return GridCursor { index: 0, page: 0 };
    }
    let columns = grid.columns.max(1) as i64;
    let rows = grid.rows.max(1) as i64;
    let capacity = columns * rows;
    let max_index = item_count as i64 - 1;
    let page_count = (item_count as i64 + capacity - 1) / capacity;

    let mut page = (page as i64).clamp(0, page_count - 1);
    let local = (current as i64 - page * capacity).clamp(0, capacity - 1);
    let col = (local % columns + dx as i64).clamp(0, columns - 1);
    let mut row = local / columns + dy as i64;

    if row < 0 {
        if page > 0 {
            page -= 1;
            row = rows - 1;
        } else {
            row = 0;
        }
    } else if row >= rows {
        if page < page_count - 1 {
            page += 1;
            row = 0;
        } else {
            row = rows - 1;
        }
    }

    let mut index = page * capacity + row * columns + col;
    if index > max_index {
        index = max_index;
        page = index / capacity;
    }
    GridCursor {
        index: index as usize,
        page: page as usize,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════

/// Borrowed view over everything one shop interaction touches.
pub struct ShopSession<'a> {
    pub state: &'a mut ShopState,
    pub catalog: &'a ShopCatalog,
    pub grid: ShopGrid,
    pub money: &'a mut u32,
    pub inventory: &'a mut Inventory,
}

impl ShopSession<'_> {
    pub fn selected_item(&self) -> Option<&ShopItem> {
        self.catalog.items.get(self.state.selected_index)
    }

    fn max_quantity(&self) -> u32 {
        let item = self.selected_item();
        let owned = item.map_or(0, |item| self.inventory.count(&item.id));
        max_quantity(self.state.mode, item, *self.money, owned)
    }

    pub fn clamp_quantity(&mut self) {
        let max = self.max_quantity();
        self.state.quantity = self.state.quantity.clamp(1, max);
    }

    pub fn page_count(&self) -> usize {
        page_count(self.catalog.items.len(), self.grid)
    }

    /// Clamps the selection into the catalog and moves to its page.
    pub fn sync_page_to_selection(&mut self) {
        let max_index = self.catalog.items.len().saturating_sub(1);
        self.state.selected_index = self.state.selected_index.min(max_index);
        let capacity = self.grid.capacity();
        if capacity == 0 {
            self.state.page_index = 0;
            return;
        }
        let page = self.state.selected_index / capacity;
        self.state.page_index = page.min(self.page_count() - 1);
    }

    pub fn open(&mut self) {
        self.state.is_open = true;
        self.sync_page_to_selection();
        self.state.quantity = 1;
        info!("[Shop] Opened ({:?} mode)", self.state.mode);
    }

    pub fn close(&mut self) {
        self.state.is_open = false;
        self.state.quantity = 1;
        info!("[Shop] Closed");
    }

    pub fn set_mode(&mut self, mode: ShopMode) {
        self.state.mode = mode;
        self.clamp_quantity();
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.state.mode {
            ShopMode::Buy => ShopMode::Sell,
            ShopMode::Sell => ShopMode::Buy,
        };
        self.set_mode(next);
    }

    pub fn select(&mut self, index: usize) {
        self.state.selected_index = index;
        self.sync_page_to_selection();
        self.clamp_quantity();
    }

    pub fn adjust_quantity(&mut self, delta: i32) {
        let max = self.max_quantity() as i64;
        let next = (self.state.quantity as i64 + delta as i64).clamp(1, max);
        self.state.quantity = next as u32;
    }

    /// Turns the page. The selection jumps to the first slot of the new
    /// page when it falls outside it.
    pub fn shift_page(&mut self, delta: i32) {
        let capacity = self.grid.capacity();
        let page_count = self.page_count();
        if page_count <= 1 || capacity == 0 {
            return;
        }
        let next = (self.state.page_index as i64 + delta as i64).clamp(0, page_count as i64 - 1) as usize;
        if next == self.state.page_index {
            return;
        }
        self.state.page_index = next;
        let start = next * capacity;
        let end = (start + capacity - 1).min(self.catalog.items.len().saturating_sub(1));
        if self.state.selected_index < start || self.state.selected_index > end {
            self.state.selected_index = start;
        }
        self.clamp_quantity();
    }

    pub fn navigate(&mut self, dx: i32, dy: i32) {
        let cursor = move_selection(
            self.state.selected_index,
            dx,
            dy,
            self.grid,
            self.catalog.items.len(),
            self.state.page_index,
        );
        if cursor.index != self.state.selected_index || cursor.page != self.state.page_index {
            self.state.selected_index = cursor.index;
            self.state.page_index = cursor.page;
            self.clamp_quantity();
        }
    }

    /// Buys or sells the selected item at the current quantity.
    pub fn confirm(&mut self) -> Option<ShopReceipt> {
        let item = self.catalog.items.get(self.state.selected_index)?;
        let receipt = confirm(
            self.state.mode,
            item,
            self.state.quantity,
            self.money,
            self.inventory,
        );
        match &receipt {
            Some(r) => info!(
                "[Shop] {:?} {} x{} for {}. Balance: {}",
                r.mode, r.item_id, r.quantity, r.total, self.money
            ),
            None => warn!(
                "[Shop] {:?} of {} x{} rejected",
                self.state.mode, item.id, self.state.quantity
            ),
        }
        self.clamp_quantity();
        receipt
    }

    pub fn apply_ui_action(&mut self, action: ShopUiAction) -> Option<ShopReceipt> {
        match action {
            ShopUiAction::Close => self.close(),
            ShopUiAction::Select(index) => self.select(index),
            ShopUiAction::Tab(mode) => self.set_mode(mode),
            ShopUiAction::Page(delta) => self.shift_page(delta),
            ShopUiAction::Quantity(delta) => self.adjust_quantity(delta),
            ShopUiAction::Confirm => return self.confirm(),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, buy: i32, sell: i32) -> ShopItem {
        ShopItem {
            id: id.into(),
            name: id.into(),
            description: "test".into(),
            category: "Seed".into(),
            price_buy: buy,
            price_sell: sell,
            icon_label: "T".into(),
            icon_color: "#ffffff".into(),
        }
    }

    fn catalog(count: usize) -> ShopCatalog {
        ShopCatalog {
            items: (0..count).map(|i| item(&format!("item_{i}"), 10, 4)).collect(),
        }
    }

    #[test]
    fn test_buy_six_succeeds_seven_fails() {
        let seeds = item("carrot_seed", 15, 6);
        let mut money = 100;
        let mut inventory = Inventory::default();

        assert!(confirm(ShopMode::Buy, &seeds, 7, &mut money, &mut inventory).is_none());
        assert_eq!(money, 100);
        assert_eq!(inventory, Inventory::default());

        let receipt = confirm(ShopMode::Buy, &seeds, 6, &mut money, &mut inventory).expect("buy");
        assert_eq!(receipt.total, 90);
        assert_eq!(money, 10);
        assert_eq!(inventory.count("carrot_seed"), 6);
    }

    #[test]
    fn test_sell_requires_stock_and_credits_money() {
        let seeds = item("carrot_seed", 15, 6);
        let mut money = 0;
        let mut inventory = Inventory::default();
        inventory.add("carrot_seed", 2);
        assert!(confirm(ShopMode::Sell, &seeds, 3, &mut money, &mut inventory).is_none());
        assert!(confirm(ShopMode::Sell, &seeds, 2, &mut money, &mut inventory).is_some());
        assert_eq!(money, 12);
        assert_eq!(inventory.count("carrot_seed"), 0);
    }

    #[test]
    fn test_negative_prices_block_trade() {
        let cursed = item("cursed", -1, -1);
        let mut money = 500;
        let mut inventory = Inventory::default();
        inventory.add("cursed", 1);
        assert!(confirm(ShopMode::Buy, &cursed, 1, &mut money, &mut inventory).is_none());
        assert!(confirm(ShopMode::Sell, &cursed, 1, &mut money, &mut inventory).is_none());
        assert_eq!(money, 500);
    }

    #[test]
    fn test_max_quantity_bounds() {
        let seeds = item("s", 15, 6);
        assert_eq!(max_quantity(ShopMode::Buy, Some(&seeds), 100, 0), 6);
        assert_eq!(max_quantity(ShopMode::Buy, Some(&seeds), 0, 0), 1);
        assert_eq!(max_quantity(ShopMode::Buy, Some(&seeds), 1_000_000, 0), 99);
        assert_eq!(max_quantity(ShopMode::Buy, Some(&item("free", 0, 0)), 0, 0), 99);
        assert_eq!(max_quantity(ShopMode::Sell, Some(&seeds), 0, 0), 1);
        assert_eq!(max_quantity(ShopMode::Sell, Some(&seeds), 0, 250), 99);
        assert_eq!(max_quantity(ShopMode::Sell, None, 0, 50), 1);
    }

    #[test]
    fn test_navigation_rolls_rows_across_pages() {
        let grid = ShopGrid { columns: 5, rows: 3 };
        // Bottom row of page 0, moving down lands on page 1 row 0.
        let cursor = move_selection(12, 0, 1, grid, 20, 0);
        assert_eq!(cursor, GridCursor { index: 17, page: 1 });
        // Past the last item clamps to it.
        let cursor = move_selection(15, 4, 0, grid, 17, 1);
        assert_eq!(cursor, GridCursor { index: 16, page: 1 });
        // Moving up from page 1 row 0 returns to page 0 bottom row.
        let cursor = move_selection(16, 0, -1, grid, 17, 1);
        assert_eq!(cursor, GridCursor { index: 11, page: 0 });
        // Edges clamp on the first page.
        let cursor = move_selection(0, -1, -1, grid, 17, 0);
        assert_eq!(cursor, GridCursor { index: 0, page: 0 });
        assert_eq!(move_selection(3, 1, 0, grid, 0, 0), GridCursor { index: 0, page: 0 });
    }

    #[test]
    fn test_quantity_reclamped_after_mode_switch() {
        let catalog = ShopCatalog {
            items: vec![item("carrot_seed", 15, 6)],
        };
        let mut state = ShopState::default();
        let mut money = 100;
        let mut inventory = Inventory::default();
        inventory.add("carrot_seed", 2);
        let mut session = ShopSession {
            state: &mut state,
            catalog: &catalog,
            grid: ShopGrid::default(),
            money: &mut money,
            inventory: &mut inventory,
        };
        session.open();
        session.adjust_quantity(10);
        assert_eq!(session.state.quantity, 6);
        session.toggle_mode();
        assert_eq!(session.state.mode, ShopMode::Sell);
        assert_eq!(session.state.quantity, 2);
        session.adjust_quantity(-10);
        assert_eq!(session.state.quantity, 1);
    }

    #[test]
    fn test_confirm_reclamps_after_purchase() {
        let catalog = ShopCatalog {
            items: vec![item("carrot_seed", 15, 6)],
        };
        let mut state = ShopState::default();
        let mut money = 100;
        let mut inventory = Inventory::default();
        let mut session = ShopSession {
            state: &mut state,
            catalog: &catalog,
            grid: ShopGrid::default(),
            money: &mut money,
            inventory: &mut inventory,
        };
        session.open();
        session.adjust_quantity(5);
        let receipt = session.confirm().expect("six seeds");
        assert_eq!(receipt.quantity, 6);
        // 10 money left buys nothing, selector falls to its floor.
        assert_eq!(session.state.quantity, 1);
        assert!(session.confirm().is_none());
        assert_eq!(money, 10);
    }

    #[test]
    fn test_page_shift_moves_selection_onto_page() {
        let catalog = catalog(20);
        let mut state = ShopState::default();
        let mut money = 100;
        let mut inventory = Inventory::default();
        let mut session = ShopSession {
            state: &mut state,
            catalog: &catalog,
            grid: ShopGrid { columns: 5, rows: 3 },
            money: &mut money,
            inventory: &mut inventory,
        };
        assert_eq!(session.page_count(), 2);
        session.apply_ui_action(ShopUiAction::Page(1));
        assert_eq!((session.state.page_index, session.state.selected_index), (1, 15));
        session.apply_ui_action(ShopUiAction::Page(5));
        assert_eq!(session.state.page_index, 1);
        session.apply_ui_action(ShopUiAction::Select(3));
        assert_eq!((session.state.page_index, session.state.selected_index), (0, 3));
        session.apply_ui_action(ShopUiAction::Select(99));
        assert_eq!((session.state.page_index, session.state.selected_index), (1, 19));
    }

    #[test]
    fn test_open_and_close_reset_quantity() {
        let catalog = catalog(3);
        let mut state = ShopState {
            selected_index: 10,
            quantity: 5,
            ..Default::default()
        };
        let mut money = 100;
        let mut inventory = Inventory::default();
        let mut session = ShopSession {
            state: &mut state,
            catalog: &catalog,
            grid: ShopGrid::default(),
            money: &mut money,
            inventory: &mut inventory,
        };
        session.open();
        assert!(session.state.is_open);
        assert_eq!((session.state.selected_index, session.state.quantity), (2, 1));
        session.adjust_quantity(2);
        session.apply_ui_action(ShopUiAction::Close);
        assert!(!session.state.is_open);
        assert_eq!(session.state.quantity, 1);
    }
}
