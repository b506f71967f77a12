use crate::model::{Food, Inventory};

/// How many of `food` the current coin balance can pay for.
pub(crate) fn affordability(coins: u32, food: Food) -> u32 {
    coins / food.price()
}

pub(crate) fn can_buy(coins: u32, food: Food, qty: u32) -> bool {
    qty >= 1 && qty * food.price() <= coins
}

/// Cursor plus one pending quantity per shop row. Quantities clamp to
/// `[1, affordability]`; a row nobody can afford pins at 1 and renders
/// disabled.
#[derive(Clone, Debug)]
pub(crate) struct ShopState {
    pub(crate) cursor: usize,
    pub(crate) qty: [u32; Food::ALL.len()],
}

impl ShopState {
    pub(crate) fn new() -> Self {
        Self {
            cursor: 0,
            qty: [1; Food::ALL.len()],
        }
    }

    pub(crate) fn selected(&self) -> Food {
        Food::ALL[self.cursor]
    }

    pub(crate) fn selected_qty(&self) -> u32 {
        self.qty[self.cursor]
    }

    pub(crate) fn move_cursor(&mut self, delta: i32, coins: u32) {
        let len = Food::ALL.len() as i32;
        self.cursor = (self.cursor as i32 + delta).rem_euclid(len) as usize;
        self.clamp_row(self.cursor, coins);
    }

    pub(crate) fn adjust_qty(&mut self, delta: i32, coins: u32) {
        let food = self.selected();
        let max = affordability(coins, food).max(1);
        let q = self.qty[self.cursor] as i64 + delta as i64;
        self.qty[self.cursor] = q.clamp(1, max as i64) as u32;
    }

    /// Re-clamp after the coin balance changed underneath us.
    pub(crate) fn reclamp(&mut self, coins: u32) {
        for i in 0..Food::ALL.len() {
            self.clamp_row(i, coins);
        }
    }

    fn clamp_row(&mut self, i: usize, coins: u32) {
        let max = affordability(coins, Food::ALL[i]).max(1);
        self.qty[i] = self.qty[i].clamp(1, max);
    }

    pub(crate) fn buy_enabled(&self, inventory: Option<&Inventory>) -> bool {
        let coins = inventory.map(|inv| inv.coins).unwrap_or(0);
        can_buy(coins, self.selected(), self.selected_qty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affordability_is_floor_of_coins_over_price() {
        assert_eq!(affordability(100, Food::TreeSeed), 100);
        assert_eq!(affordability(100, Food::Acorn), 16); // 100 / 6
        assert_eq!(affordability(5, Food::Blueberries), 1);
        assert_eq!(affordability(2, Food::Blueberries), 0);
    }

    #[test]
    fn buy_enabled_iff_total_price_fits() {
        assert!(can_buy(6, Food::Acorn, 1));
        assert!(!can_buy(5, Food::Acorn, 1));
        assert!(can_buy(12, Food::Acorn, 2));
        assert!(!can_buy(11, Food::Acorn, 2));
        assert!(!can_buy(100, Food::Acorn, 0));
    }

    #[test]
    fn qty_clamps_to_affordability() {
        let mut shop = ShopState::new();
        shop.cursor = 3; // acorn, price 6
        shop.adjust_qty(10, 20); // affordability 3
        assert_eq!(shop.selected_qty(), 3);
        shop.adjust_qty(-10, 20);
        assert_eq!(shop.selected_qty(), 1);
    }

    #[test]
    fn unaffordable_row_pins_at_one_and_disables_buy() {
        let mut shop = ShopState::new();
        shop.cursor = 3; // acorn
        shop.adjust_qty(5, 2); // cannot afford any
        assert_eq!(shop.selected_qty(), 1);
        let inv = Inventory {
            coins: 2,
            ..Default::default()
        };
        assert!(!shop.buy_enabled(Some(&inv)));
    }

    #[test]
    fn reclamp_after_purchase_shrinks_quantities() {
        let mut shop = ShopState::new();
        shop.cursor = 1; // blueberries, price 3
        shop.adjust_qty(9, 30); // max 10
        assert_eq!(shop.selected_qty(), 10);
        shop.reclamp(9); // only 3 affordable now
        assert_eq!(shop.selected_qty(), 3);
    }
}
