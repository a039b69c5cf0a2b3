#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod pricing;

pub use self::hmm_crowdsale::{Error, HmmCoinCrowdsale, HmmCoinCrowdsaleRef};

pub mod constants {
    use hmm_coin::constants::ONE_HMC;

    pub const DEFAULT_RATE: u128 = 3;
    /// Cap on native currency raised, in its smallest unit.
    pub const DEFAULT_CAP: u128 = 20_000_000 * ONE_HMC;
}

/// Capped crowdsale selling HMC for the chain's native currency.
///
/// Purchases mint straight to the beneficiary. Payments stay in the
/// contract until an owner moves them out with `forward_funds`.
#[ink::contract]
mod hmm_crowdsale {
    use crate::pricing::{self, Pricing, SaleWindow};
    use hmm_access::{
        ensure_role, is_zero, AccessControl, AccessControlError, RoleType, Roles, DEFAULT_ADMIN_ROLE,
    };
    use hmm_coin::HmmCoinRef;
    use ink::env::call::FromAccountId;

    pub type Result<T> = core::result::Result<T, Error>;

    #[derive(scale::Encode, scale::Decode, Debug, PartialEq, Eq, Clone, Copy)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        // construction
        RateIsZero,
        TokenIsZero,
        OwnerIsZero,
        CapIsZero,
        OpeningBeforeNow,
        OpeningNotBeforeClosing,
        FinalRateIsZero,
        InitialRateNotAboveFinal,
        // purchase
        BeneficiaryIsZero,
        ValueIsZero,
        NotOpened,
        Closed,
        CapExceeded,
        // withdrawal
        NotOwner,
        RecipientIsZero,
        AmountZero,
        ExceedsBalance,
        TransferFailed,
        Overflow,
        Token(hmm_coin::Error),
    }

    impl Error {
        pub fn reason(&self) -> &'static str {
            match self {
                Error::RateIsZero => "Crowdsale: rate is 0",
                Error::TokenIsZero => "Crowdsale: token is the zero address",
                Error::OwnerIsZero => "Crowdsale: owner is the zero address",
                Error::CapIsZero => "CappedCrowdsale: cap is 0",
                Error::OpeningBeforeNow => "TimedCrowdsale: opening time is before current time",
                Error::OpeningNotBeforeClosing => "TimedCrowdsale: opening time is not before closing time",
                Error::FinalRateIsZero => "IncreasingPriceCrowdsale: final rate is 0",
                Error::InitialRateNotAboveFinal => "IncreasingPriceCrowdsale: initial rate is not greater than final rate",
                Error::BeneficiaryIsZero => "Crowdsale: beneficiary is the zero address",
                Error::ValueIsZero => "Crowdsale: weiAmount is 0",
                Error::NotOpened => "TimedCrowdsale: crowdsale not opened",
                Error::Closed => "TimedCrowdsale: crowdsale closed",
                Error::CapExceeded => "CappedCrowdsale: cap exceeded",
                Error::NotOwner => "HmmCoinCrowdsale: must have owner role to forward funds",
                Error::RecipientIsZero => "HmmCoinCrowdsale: recipient must be non-zero address",
                Error::AmountZero => "HmmCoinCrowdsale: amount must be > 0",
                Error::ExceedsBalance => "HmmCoinCrowdsale: amount exceeds balance",
                Error::TransferFailed => "HmmCoinCrowdsale: native transfer failed",
                Error::Overflow => "HmmCoinCrowdsale: arithmetic overflow",
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
    pub struct TokensPurchased {
        #[ink(topic)]
        pub purchaser_acc: AccountId,
        #[ink(topic)]
        pub beneficiary_acc: AccountId,
        pub value: Balance,
        pub amount: Balance,
    }

    #[ink(event)]
    pub struct FundsForwarded {
        #[ink(topic)]
        pub to_acc: AccountId,
        pub amount: Balance,
    }

    #[ink(storage)]
    pub struct HmmCoinCrowdsale {
        token_acc: AccountId,
        roles: Roles,

        // sale terms, fixed at construction
        pricing: Pricing,
        cap: Balance,
        window_opt: Option<SaleWindow>,

        wei_raised: Balance,
    }

    impl HmmCoinCrowdsale {
        // -------- constructors --------

        /// Always-open sale at a fixed rate.
        #[ink(constructor)]
        pub fn new(rate: Balance, token_acc: AccountId, cap: Balance, owner_acc: AccountId) -> Result<Self> {
            if rate == 0 {
                return Err(Error::RateIsZero)
            }
            Self::init(Pricing::Fixed(rate), token_acc, cap, owner_acc, None)
        }

        /// Fixed-rate sale accepting payments in `[opening, closing]`.
        #[ink(constructor)]
        pub fn new_timed(
            rate: Balance,
            token_acc: AccountId,
            cap: Balance,
            owner_acc: AccountId,
            opening: Timestamp,
            closing: Timestamp,
        ) -> Result<Self> {
            if rate == 0 {
                return Err(Error::RateIsZero)
            }
            let window = Self::checked_window(opening, closing)?;
            Self::init(Pricing::Fixed(rate), token_acc, cap, owner_acc, Some(window))
        }

        /// Timed sale whose rate falls linearly from `initial_rate` to
        /// `final_rate` over the window.
        #[ink(constructor)]
        pub fn new_increasing_price(
            token_acc: AccountId,
            cap: Balance,
            owner_acc: AccountId,
            opening: Timestamp,
            closing: Timestamp,
            initial_rate: Balance,
            final_rate: Balance,
        ) -> Result<Self> {
            if final_rate == 0 {
                return Err(Error::FinalRateIsZero)
            }
            if initial_rate <= final_rate {
                return Err(Error::InitialRateNotAboveFinal)
            }
            let window = Self::checked_window(opening, closing)?;
            let pricing = Pricing::Increasing { initial: initial_rate, final_rate };
            Self::init(pricing, token_acc, cap, owner_acc, Some(window))
        }

        fn checked_window(opening: Timestamp, closing: Timestamp) -> Result<SaleWindow> {
            if opening < Self::env().block_timestamp() {
                return Err(Error::OpeningBeforeNow)
            }
            if opening >= closing {
                return Err(Error::OpeningNotBeforeClosing)
            }
            Ok(SaleWindow { opening, closing })
        }

        fn init(
            pricing: Pricing,
            token_acc: AccountId,
            cap: Balance,
            owner_acc: AccountId,
            window_opt: Option<SaleWindow>,
        ) -> Result<Self> {
            if is_zero(&token_acc) {
                return Err(Error::TokenIsZero)
            }
            if is_zero(&owner_acc) {
                return Err(Error::OwnerIsZero)
            }
            if cap == 0 {
                return Err(Error::CapIsZero)
            }
            let mut instance = Self {
                token_acc,
                roles: Roles::default(),
                pricing,
                cap,
                window_opt,
                wei_raised: 0,
            };
            instance.roles.setup_role(DEFAULT_ADMIN_ROLE, owner_acc, Self::env().caller());
            Ok(instance)
        }

        // -------- read API --------

        #[ink(message)]
        pub fn token(&self) -> AccountId {
            self.token_acc
        }

        #[ink(message)]
        pub fn cap(&self) -> Balance {
            self.cap
        }

        #[ink(message)]
        pub fn wei_raised(&self) -> Balance {
            self.wei_raised
        }

        #[ink(message)]
        pub fn cap_reached(&self) -> bool {
            self.wei_raised >= self.cap
        }

        /// Rate a purchase in the current block would get.
        #[ink(message)]
        pub fn rate(&self) -> Balance {
            self.pricing.rate_at(self.window_opt.as_ref(), self.env().block_timestamp())
        }

        #[ink(message)]
        pub fn opening_time(&self) -> Option<Timestamp> {
            self.window_opt.map(|w| w.opening)
        }

        #[ink(message)]
        pub fn closing_time(&self) -> Option<Timestamp> {
            self.window_opt.map(|w| w.closing)
        }

        #[ink(message)]
        pub fn is_open(&self) -> bool {
            let now = self.env().block_timestamp();
            self.window_opt.map_or(true, |w| w.is_open(now))
        }

        #[ink(message)]
        pub fn has_closed(&self) -> bool {
            let now = self.env().block_timestamp();
            self.window_opt.map_or(false, |w| w.has_closed(now))
        }

        /// Native balance held for later forwarding.
        #[ink(message)]
        pub fn held_funds(&self) -> Balance {
            self.env().balance()
        }

        // -------- write API --------

        /// Buys tokens for `beneficiary_acc` with the transferred value.
        /// A purchase that would push `wei_raised` over the cap is rejected
        /// whole.
        #[ink(message, payable)]
        pub fn buy_tokens(&mut self, beneficiary_acc: AccountId) -> Result<()> {
            let purchaser_acc = self.env().caller();
            let wei = self.env().transferred_value();
            if is_zero(&beneficiary_acc) {
                return Err(Error::BeneficiaryIsZero)
            }
            if wei == 0 {
                return Err(Error::ValueIsZero)
            }

            let now = self.env().block_timestamp();
            if let Some(window) = self.window_opt {
                if now < window.opening {
                    return Err(Error::NotOpened)
                }
                if window.has_closed(now) {
                    return Err(Error::Closed)
                }
            }

            let new_raised = self.wei_raised.checked_add(wei).ok_or(Error::Overflow)?;
            if new_raised > self.cap {
                return Err(Error::CapExceeded)
            }
            let rate = self.pricing.rate_at(self.window_opt.as_ref(), now);
            let amount = pricing::token_amount(wei, rate).ok_or(Error::Overflow)?;

            self.wei_raised = new_raised;
            let mut token: HmmCoinRef = FromAccountId::from_account_id(self.token_acc);
            token.mint(beneficiary_acc, amount)?;

            self.env().emit_event(TokensPurchased { purchaser_acc, beneficiary_acc, value: wei, amount });
            Ok(())
        }

        #[ink(message)]
        pub fn forward_funds(&mut self, to_acc: AccountId, amount: Balance) -> Result<()> {
            ensure_role(&self.roles, DEFAULT_ADMIN_ROLE, self.env().caller(), Error::NotOwner)?;
            if is_zero(&to_acc) {
                return Err(Error::RecipientIsZero)
            }
            if amount == 0 {
                return Err(Error::AmountZero)
            }
            if amount > self.env().balance() {
                return Err(Error::ExceedsBalance)
            }
            self.env().transfer(to_acc, amount).map_err(|_| Error::TransferFailed)?;
            self.env().emit_event(FundsForwarded { to_acc, amount });
            Ok(())
        }
    }

    impl AccessControl for HmmCoinCrowdsale {
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


    #[cfg(all(test, feature = "e2e-tests"))]
    mod e2e_tests {
        use super::*;
        use hmm_access::MINTER_ROLE;
        use hmm_coin::constants::{HMC_INITIAL_SUPPLY, HMC_MAX_SUPPLY};
        use hmm_coin::{HmmCoin, HmmCoinRef};
        use ink_e2e::ContractsBackend;

        type E2EResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

        const RATE: Balance = 3;
        const CAP: Balance = 1_000_000;

        #[ink_e2e::test]
        async fn buys_up_to_the_cap(mut client: ink_e2e::Client<C, E>) -> E2EResult<()> {
            let alice_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Alice);
            let bob_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Bob);

            let mut token_constructor =
                HmmCoinRef::new("HmmCoin".into(), "HMC".into(), alice_acc, HMC_INITIAL_SUPPLY, HMC_MAX_SUPPLY);
            let token = client
                .instantiate("hmm_coin", &ink_e2e::alice(), &mut token_constructor)
                .submit()
                .await
                .expect("token instantiate failed");
            let mut token_calls = token.call_builder::<HmmCoin>();

            let mut sale_constructor = HmmCoinCrowdsaleRef::new(RATE, token.account_id, CAP, alice_acc);
            let sale = client
                .instantiate("hmm_crowdsale", &ink_e2e::alice(), &mut sale_constructor)
                .submit()
                .await
                .expect("crowdsale instantiate failed");
            let mut sale_calls = sale.call_builder::<HmmCoinCrowdsale>();

            let grant = token_calls.grant_role(MINTER_ROLE, sale.account_id);
            client.call(&ink_e2e::alice(), &grant).submit().await.expect("grant failed");

            let charlie_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Charlie);
            let buy = sale_calls.buy_tokens(bob_acc);
            let buy_res = client.call(&ink_e2e::charlie(), &buy).value(CAP).submit().await.expect("purchase failed");

            let purchases: Vec<TokensPurchased> = buy_res
                .contract_emitted_events()?
                .iter()
                .filter(|emitted| emitted.event.contract == sale.account_id)
                .map(|emitted| {
                    <TokensPurchased as ink::scale::Decode>::decode(&mut &emitted.event.data[..])
                        .expect("decode TokensPurchased")
                })
                .collect();
            assert_eq!(purchases.len(), 1);
            assert_eq!(purchases[0].purchaser_acc, charlie_acc);
            assert_eq!(purchases[0].beneficiary_acc, bob_acc);
            assert_eq!(purchases[0].value, CAP);
            assert_eq!(purchases[0].amount, CAP * RATE);

            let balance = token_calls.balance_of(bob_acc);
            let balance_res = client.call(&ink_e2e::alice(), &balance).dry_run().await?;
            assert_eq!(balance_res.return_value(), CAP * RATE);

            let over = client.call(&ink_e2e::charlie(), &buy).value(1).dry_run().await?;
            assert_eq!(over.return_value(), Err(Error::CapExceeded));

            let raised = sale_calls.wei_raised();
            let raised_res = client.call(&ink_e2e::alice(), &raised).dry_run().await?;
            assert_eq!(raised_res.return_value(), CAP);

            let held = sale_calls.held_funds();
            let held_res = client.call(&ink_e2e::alice(), &held).dry_run().await?;
            let too_much = sale_calls.forward_funds(alice_acc, held_res.return_value() + 1);
            let res = client.call(&ink_e2e::alice(), &too_much).dry_run().await?;
            assert_eq!(res.return_value(), Err(Error::ExceedsBalance));
            Ok(())
        }
    }
}
