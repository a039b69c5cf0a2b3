//! Reward schedule of the giveaway.
//!
//! The reward shrinks geometrically with every `level_size` tokens given
//! away. `9^level` outgrows `u128` after level 40, so the ratio is evaluated
//! in 512-bit integers and truncated once, at `precision` resolution.

use hmm_coin::constants::ONE_HMC;
use primitive_types::U512;

pub const BASE_AMOUNT: u128 = ONE_HMC;
pub const LEVEL_SIZE: u128 = 1_000_000 * ONE_HMC;
pub const DECAY_NUMERATOR: u128 = 9;
pub const DECAY_DENOMINATOR: u128 = 10;
/// Rewards are whole multiples of `BASE_AMOUNT / REWARD_PRECISION`.
pub const REWARD_PRECISION: u128 = 1_000_000;
pub const GIVEAWAY_CEILING: u128 = 80_000_000 * ONE_HMC;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub base_amount: u128,
    pub level_size: u128,
    pub decay_numerator: u128,
    pub decay_denominator: u128,
    pub precision: u128,
    pub ceiling: u128,
}

pub const HMC_SCHEDULE: Schedule = Schedule {
    base_amount: BASE_AMOUNT,
    level_size: LEVEL_SIZE,
    decay_numerator: DECAY_NUMERATOR,
    decay_denominator: DECAY_DENOMINATOR,
    precision: REWARD_PRECISION,
    ceiling: GIVEAWAY_CEILING,
};

impl Schedule {
    pub fn level_of(&self, given_away: u128) -> u128 {
        given_away / self.level_size
    }

    pub fn is_exhausted(&self, given_away: u128) -> bool {
        given_away >= self.ceiling
    }

    /// `floor(precision * num^level / den^level) * (base / precision)`.
    /// `None` when the powers do not fit in 512 bits.
    pub fn amount_at_level(&self, level: u128) -> Option<u128> {
        let exponent = U512::from(level);
        let num_pow = U512::from(self.decay_numerator).checked_pow(exponent)?;
        let den_pow = U512::from(self.decay_denominator).checked_pow(exponent)?;
        if den_pow.is_zero() {
            return None
        }

        let units = U512::from(self.precision).checked_mul(num_pow)? / den_pow;
        if units > U512::from(u128::MAX) {
            return None
        }
        units.low_u128().checked_mul(self.base_amount / self.precision)
    }

    /// Reward for the next claim. The level is taken before the claim is
    /// counted, so a claim straddling a boundary is priced at the old level.
    pub fn amount_for(&self, given_away: u128) -> Option<u128> {
        self.amount_at_level(self.level_of(given_away))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MICRO_HMC: u128 = ONE_HMC / 1_000_000;

    #[test]
    fn first_level_gives_base_amount() {
        assert_eq!(HMC_SCHEDULE.amount_for(0), Some(ONE_HMC));
        assert_eq!(HMC_SCHEDULE.amount_for(LEVEL_SIZE - 1), Some(ONE_HMC));
    }

    #[test]
    fn each_level_decays_by_a_tenth() {
        assert_eq!(HMC_SCHEDULE.amount_for(LEVEL_SIZE), Some(900_000 * MICRO_HMC));
        assert_eq!(HMC_SCHEDULE.amount_for(2 * LEVEL_SIZE), Some(810_000 * MICRO_HMC));
        assert_eq!(HMC_SCHEDULE.amount_at_level(3), Some(729_000 * MICRO_HMC));
    }

    #[test]
    fn deep_levels_truncate_once() {
        // 0.9^41 = 0.0133027946...
        assert_eq!(HMC_SCHEDULE.amount_for(41_000_000 * ONE_HMC), Some(13_302 * MICRO_HMC));
        // 0.9^79 = 0.0002427494...
        assert_eq!(HMC_SCHEDULE.amount_for(79_555_555 * ONE_HMC), Some(242 * MICRO_HMC));
    }

    #[test]
    fn level_boundary_uses_counter_before_claim() {
        let just_below = LEVEL_SIZE - ONE_HMC / 2;
        assert_eq!(HMC_SCHEDULE.level_of(just_below), 0);
        assert_eq!(HMC_SCHEDULE.amount_for(just_below), Some(ONE_HMC));
        assert_eq!(HMC_SCHEDULE.level_of(just_below + ONE_HMC), 1);
    }

    #[test]
    fn exhaustion_starts_at_the_ceiling() {
        assert!(!HMC_SCHEDULE.is_exhausted(GIVEAWAY_CEILING - 1));
        assert!(HMC_SCHEDULE.is_exhausted(GIVEAWAY_CEILING));
        assert!(HMC_SCHEDULE.is_exhausted(GIVEAWAY_CEILING + LEVEL_SIZE));
    }

    #[test]
    fn far_levels_round_down_to_zero_or_overflow() {
        assert_eq!(HMC_SCHEDULE.amount_at_level(140), Some(0));
        assert_eq!(HMC_SCHEDULE.amount_at_level(1_000), None);
    }

    #[test]
    fn custom_schedule_without_decay_loss() {
        let halving = Schedule {
            base_amount: 1_000,
            level_size: 10,
            decay_numerator: 1,
            decay_denominator: 2,
            precision: 1_000,
            ceiling: 100,
        };
        assert_eq!(halving.amount_for(0), Some(1_000));
        assert_eq!(halving.amount_for(10), Some(500));
        assert_eq!(halving.amount_for(35), Some(125));
    }
}
