//! Money display and running trade totals.

use bevy::prelude::*;

use crate::shared::*;

/// Lifetime shop totals, fed by `ShopTransactionEvent`s.
#[derive(Resource, Debug, Clone, Default)]
pub struct TradeStats {
    pub total_spent: u64,
    pub total_earned: u64,
    pub transactions: u64,
}

pub fn record_transactions(
    mut events: EventReader<ShopTransactionEvent>,
    mut stats: ResMut<TradeStats>,
) {
    for ev in events.read() {
        match ev.mode {
            ShopMode::Buy => stats.total_spent += ev.total as u64,
            ShopMode::Sell => stats.total_earned += ev.total as u64,
        }
        stats.transactions += 1;
    }
}

/// Formats money with thousands separators, e.g. `"$1,234"`.
pub fn format_money(amount: u32) -> String {
    let digits = amount.to_string();
    let mut result = String::from("$");
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0), "$0");
        assert_eq!(format_money(100), "$100");
        assert_eq!(format_money(1234), "$1,234");
        assert_eq!(format_money(1_000_000), "$1,000,000");
    }

    #[test]
    fn test_trade_stats_default() {
        let stats = TradeStats::default();
        assert_eq!(stats.total_spent, 0);
        assert_eq!(stats.total_earned, 0);
        assert_eq!(stats.transactions, 0);
    }
}
