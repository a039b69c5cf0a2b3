#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod tiers;
pub mod timelock;

pub use self::hmm_giveaway::{Error, HmmCoinGiveaway, HmmCoinGiveawayRef};

pub mod constants {
    pub const HOUR: u64 = 60 * 60 * 1_000;
    pub const DAY: u64 = 24 * HOUR;
}

/// Free HMC faucet with a decaying reward.
///
/// Every claim mints the reward of the current level to the beneficiary.
/// The timelocked variant lets each account claim once per window.
#[ink::contract]
mod hmm_giveaway {
    use crate::tiers::HMC_SCHEDULE;
    use crate::timelock;
    use hmm_access::{
        ensure_role, is_zero, AccessControl, AccessControlError, RoleType, Roles, DEFAULT_ADMIN_ROLE,
    };
    use hmm_coin::HmmCoinRef;
    use ink::env::call::FromAccountId;
    use ink::storage::Mapping;

    pub type Result<T> = core::result::Result<T, Error>;

    #[derive(scale::Encode, scale::Decode, Debug, PartialEq, Eq, Clone, Copy)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        TokenIsZero,
        WindowIsZero,
        BeneficiaryIsZero,
        NotOwner,
        Paused,
        NotPaused,
        AllTokensGivenAway,
        AlreadyRequested,
        Overflow,
        Token(hmm_coin::Error),
    }

    impl Error {
        pub fn reason(&self) -> &'static str {
            match self {
                Error::TokenIsZero => "Giveaway: token must be non-zero address",
                Error::WindowIsZero => "HmmCoinGiveaway: time period must be > 0",
                Error::BeneficiaryIsZero => "Giveaway: beneficiary must be non-zero address",
                Error::NotOwner => "HmmCoinGiveaway: must have owner role to pause",
                Error::Paused => "Pausable: paused",
                Error::NotPaused => "Pausable: not paused",
                Error::AllTokensGivenAway => "HmmCoinGiveaway: all tokens given away",
                Error::AlreadyRequested => "HmmCoinGiveaway: address already requested within the time period",
                Error::Overflow => "HmmCoinGiveaway: arithmetic overflow",
                Error::Token(inner) => inner.reason(),
            }
        }
    }

    impl core::fmt::Display for Error {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str(self.reason())
        }
    }

    impl From<hmm_coin::Error> for Error {
        fn from(inner: hmm_coin::Error) -> Self {
            Error::Token(inner)
        }
    }

    #[ink(event)]
    pub struct TokensGivenAway {
        #[ink(topic)]
        pub beneficiary_acc: AccountId,
        pub amount: Balance,
    }

    #[ink(event)]
    pub struct Paused {
        pub account_acc: AccountId,
    }

    #[ink(event)]
    pub struct Unpaused {
        pub account_acc: AccountId,
    }

    #[ink(storage)]
    pub struct HmmCoinGiveaway {
        token_acc: AccountId,

        // governance / control
        roles: Roles,
        paused_flag: bool,

        // issuance state
        tokens_given_away: Balance,
        window_opt: Option<Timestamp>,
        next_eligible: Mapping<AccountId, Timestamp>,
    }

    impl HmmCoinGiveaway {
        // -------- constructors --------

        /// Timelocked giveaway: one claim per account per `window` ms.
        #[ink(constructor)]
        pub fn new(token_acc: AccountId, window: Timestamp) -> Result<Self> {
            if window == 0 {
                return Err(Error::WindowIsZero)
            }
            Self::init(token_acc, Some(window))
        }

        /// Giveaway without a per-account lock.
        #[ink(constructor)]
        pub fn without_timelock(token_acc: AccountId) -> Result<Self> {
            Self::init(token_acc, None)
        }

        fn init(token_acc: AccountId, window_opt: Option<Timestamp>) -> Result<Self> {
            if is_zero(&token_acc) {
                return Err(Error::TokenIsZero)
            }
            let mut instance = Self {
                token_acc,
                roles: Roles::default(),
                paused_flag: false,
                tokens_given_away: 0,
                window_opt,
                next_eligible: Mapping::default(),
            };
            let deployer_acc = Self::env().caller();
            instance.roles.setup_role(DEFAULT_ADMIN_ROLE, deployer_acc, deployer_acc);
            Ok(instance)
        }

        // -------- modifiers (helpers) --------

        fn only_owner(&self) -> Result<()> {
            ensure_role(&self.roles, DEFAULT_ADMIN_ROLE, self.env().caller(), Error::NotOwner)
        }

        fn when_not_paused(&self) -> Result<()> {
            if self.paused_flag {
                return Err(Error::Paused)
            }
            Ok(())
        }

        fn token_ref(&self) -> HmmCoinRef {
            FromAccountId::from_account_id(self.token_acc)
        }

        // -------- admin --------

        #[ink(message)]
        pub fn pause_giveaway(&mut self) -> Result<()> {
            self.only_owner()?;
            self.when_not_paused()?;
            self.paused_flag = true;
            self.env().emit_event(Paused { account_acc: self.env().caller() });
            Ok(())
        }

        #[ink(message)]
        pub fn unpause_giveaway(&mut self) -> Result<()> {
            self.only_owner()?;
            if !self.paused_flag {
                return Err(Error::NotPaused)
            }
            self.paused_flag = false;
            self.env().emit_event(Unpaused { account_acc: self.env().caller() });
            Ok(())
        }

        // -------- read API --------

        #[ink(message)]
        pub fn token(&self) -> AccountId {
            self.token_acc
        }

        #[ink(message)]
        pub fn paused(&self) -> bool {
            self.paused_flag
        }

        /// Total units ever minted by this giveaway.
        #[ink(message)]
        pub fn tokens_given_away(&self) -> Balance {
            self.tokens_given_away
        }

        #[ink(message)]
        pub fn current_level(&self) -> u128 {
            HMC_SCHEDULE.level_of(self.tokens_given_away)
        }

        /// Reward of the next claim. Fails the way `get_tokens` would once
        /// the giveaway is exhausted.
        #[ink(message)]
        pub fn current_amount(&self) -> Result<Balance> {
            if HMC_SCHEDULE.is_exhausted(self.tokens_given_away) {
                return Err(Error::AllTokensGivenAway)
            }
            HMC_SCHEDULE.amount_for(self.tokens_given_away).ok_or(Error::Overflow)
        }

        #[ink(message)]
        pub fn window(&self) -> Option<Timestamp> {
            self.window_opt
        }

        #[ink(message)]
        pub fn next_eligible_time(&self, account_acc: AccountId) -> Option<Timestamp> {
            self.next_eligible.get(&account_acc)
        }

        // -------- write API --------

        /// Mints the current level's reward to `beneficiary_acc`. Anyone may
        /// call this; the timelock binds the beneficiary, not the caller.
        #[ink(message)]
        pub fn get_tokens(&mut self, beneficiary_acc: AccountId) -> Result<()> {
            let amount = self.record_claim(beneficiary_acc, self.env().block_timestamp())?;
            self.token_ref().mint(beneficiary_acc, amount)?;

            self.env().emit_event(TokensGivenAway { beneficiary_acc, amount });
            Ok(())
        }

        /// Checks a claim made at `now` and books it. Returns the amount to
        /// mint; nothing is written when it fails.
        fn record_claim(&mut self, beneficiary_acc: AccountId, now: Timestamp) -> Result<Balance> {
            if is_zero(&beneficiary_acc) {
                return Err(Error::BeneficiaryIsZero)
            }
            self.when_not_paused()?;
            if HMC_SCHEDULE.is_exhausted(self.tokens_given_away) {
                return Err(Error::AllTokensGivenAway)
            }

            let next_opt = match self.window_opt {
                Some(window) => {
                    let previous = self.next_eligible.get(&beneficiary_acc);
                    if !timelock::is_eligible(now, previous) {
                        return Err(Error::AlreadyRequested)
                    }
                    Some(timelock::next_eligible(now, previous, window).ok_or(Error::Overflow)?)
                }
                None => None,
            };

            let amount = self.current_amount()?;
            let new_given = self.tokens_given_away.checked_add(amount).ok_or(Error::Overflow)?;

            if HMC_SCHEDULE.level_of(new_given) != HMC_SCHEDULE.level_of(self.tokens_given_away) {
                ink::env::debug_println!("giveaway entering level {}", HMC_SCHEDULE.level_of(new_given));
            }
            self.tokens_given_away = new_given;
            if let Some(next) = next_opt {
                self.next_eligible.insert(&beneficiary_acc, &next);
            }
            Ok(amount)
        }
    }

    impl AccessControl for HmmCoinGiveaway {
        #[ink(message)]
        fn has_role(&self, role: RoleType, account_acc: AccountId) -> bool {
            self.roles.has_role(role, account_acc)
        }

        #[ink(message)]
        fn get_role_admin(&self, role: RoleType) -> RoleType {
            self.roles.role_admin(role)
        }

        #[ink(message)]
        fn grant_role(&mut self, role: RoleType, account_acc: AccountId) -> core::result::Result<(), AccessControlError> {
            let caller_acc = self.env().caller();
            self.roles.grant_role(caller_acc, role, account_acc)
        }

        #[ink(message)]
        fn revoke_role(&mut self, role: RoleType, account_acc: AccountId) -> core::result::Result<(), AccessControlError> {
            let caller_acc = self.env().caller();
            self.roles.revoke_role(caller_acc, role, account_acc)
        }

        #[ink(message)]
        fn renounce_role(&mut self, role: RoleType, account_acc: AccountId) -> core::result::Result<(), AccessControlError> {
            let caller_acc = self.env().caller();
            self.roles.renounce_role(caller_acc, role, account_acc)
        }
    }


}
