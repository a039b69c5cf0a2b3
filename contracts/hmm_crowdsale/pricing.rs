//! Exchange rate and sale window arithmetic.

pub type Balance = u128;
pub type Timestamp = u64;

#[derive(scale::Encode, scale::Decode, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout))]
pub struct SaleWindow {
    pub opening: Timestamp,
    pub closing: Timestamp,
}

impl SaleWindow {
    pub fn is_open(&self, now: Timestamp) -> bool {
        now >= self.opening && now <= self.closing
    }

    pub fn has_closed(&self, now: Timestamp) -> bool {
        now > self.closing
    }
}

/// Tokens minted per smallest native unit.
#[derive(scale::Encode, scale::Decode, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout))]
pub enum Pricing {
    Fixed(Balance),
    /// Linear move from `initial` at opening to `final_rate` at closing.
    Increasing { initial: Balance, final_rate: Balance },
}

impl Pricing {
    /// Rate at `now`. Outside a window, or for a fixed price, the rate at
    /// the nearest window edge applies.
    pub fn rate_at(&self, window: Option<&SaleWindow>, now: Timestamp) -> Balance {
        match (*self, window) {
            (Pricing::Fixed(rate), _) => rate,
            (Pricing::Increasing { initial, .. }, None) => initial,
            (Pricing::Increasing { initial, final_rate }, Some(window)) => {
                let time_range = window.closing.saturating_sub(window.opening);
                if time_range == 0 {
                    return final_rate
                }
                let elapsed = Balance::from(now.clamp(window.opening, window.closing) - window.opening);
                let time_range = Balance::from(time_range);
                let rate_range = initial.saturating_sub(final_rate);
                // floor(rate_range * elapsed / time_range) without a 256-bit product
                let step = rate_range / time_range * elapsed + rate_range % time_range * elapsed / time_range;
                initial - step
            }
        }
    }
}

pub fn token_amount(wei: Balance, rate: Balance) -> Option<Balance> {
    wei.checked_mul(rate)
}
