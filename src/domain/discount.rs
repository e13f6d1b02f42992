use serde::Serialize;

/// A percentage discount between 0 and 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Discount(i32);

impl Discount {
    pub fn none() -> Self {
        Self(0)
    }

    pub fn percent(&self) -> i32 {
        self.0
    }

    /// `pretotal * (1 - percent / 100)`, rounded half up to the minor unit.
    pub fn apply(&self, pretotal_cents: i64) -> i64 {
        let remaining = i128::from(100 - self.0);
        let total = (i128::from(pretotal_cents) * remaining + 50).div_euclid(100);
        // Never above the pretotal, so it fits back into i64.
        total as i64
    }
}

impl TryFrom<i32> for Discount {
    type Error = String;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (0..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("Discount must be between 0 and 100, got {}.", value))
        }
    }
}

/// Price breakdown for a table with an optional food order.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PriceQuote {
    pub table_price_cents: i64,
    pub food_total_cents: i64,
    pub chair_count: i32,
    pub pretotal_cents: i64,
    pub discount_percent: i32,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl PriceQuote {
    /// Food is ordered per chair, so its total is multiplied by the
    /// chair count before the discount applies. `None` when the amounts
    /// do not fit into 64 bits.
    pub fn new(
        table_price_cents: i64,
        food_prices: &[i64],
        chair_count: i32,
        discount: Discount,
    ) -> Option<Self> {
        let food_total_cents = food_prices
            .iter()
            .try_fold(0i64, |sum, price| sum.checked_add(*price))?;
        let pretotal_cents = food_total_cents
            .checked_mul(i64::from(chair_count))?
            .checked_add(table_price_cents)?;
        let total_cents = discount.apply(pretotal_cents);
        Some(Self {
            table_price_cents,
            food_total_cents,
            chair_count,
            pretotal_cents,
            discount_percent: discount.percent(),
            discount_cents: pretotal_cents - total_cents,
            total_cents,
        })
    }
}
