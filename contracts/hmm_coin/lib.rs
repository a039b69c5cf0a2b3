#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub use self::hmm_coin::{Error, HmmCoin, HmmCoinRef};

/// Deployment presets for the public HMC token.
pub mod constants {
    pub const DECIMALS: u8 = 18;
    pub const ONE_HMC: u128 = 1_000_000_000_000_000_000;

    pub const HMC_INITIAL_SUPPLY: u128 = 1_101_101 * ONE_HMC;
    pub const HMC_MAX_SUPPLY: u128 = 101_101_101 * ONE_HMC;
}

/// Capped, mintable and burnable fungible token.
///
/// New supply only enters through [`HmmCoin::mint`], which requires the
/// caller to hold `MINTER_ROLE` and keeps `total_supply <= cap`.
#[ink::contract]
mod hmm_coin {
    use crate::constants::DECIMALS;
    use hmm_access::{
        ensure_role, is_zero, AccessControl, AccessControlError, RoleType, Roles, DEFAULT_ADMIN_ROLE,
        MINTER_ROLE,
    };
    use ink::prelude::string::String;
    use ink::storage::Mapping;

    pub type Result<T> = core::result::Result<T, Error>;

    #[derive(scale::Encode, scale::Decode, Debug, PartialEq, Eq, Clone, Copy)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        CapIsZero,
        OwnerIsZero,
        InitialSupplyAboveCap,
        NotMinter,
        MintToZero,
        CapExceeded,
        BurnExceedsBalance,
        BurnExceedsAllowance,
        TransferFromZero,
        TransferToZero,
        TransferExceedsBalance,
        TransferExceedsAllowance,
        ApproveToZero,
        AllowanceBelowZero,
        Overflow,
    }

    impl Error {
        pub fn reason(&self) -> &'static str {
            match self {
                Error::CapIsZero => "ERC20Capped: cap is 0",
                Error::OwnerIsZero => "HmmCoin: owner must be non-zero address",
                Error::InitialSupplyAboveCap => "HmmCoin: initial supply must be lower or equal max supply",
                Error::NotMinter => "HmmCoin: must have minter role to mint",
                Error::MintToZero => "ERC20: mint to the zero address",
                Error::CapExceeded => "ERC20Capped: cap exceeded",
                Error::BurnExceedsBalance => "ERC20: burn amount exceeds balance",
                Error::BurnExceedsAllowance => "ERC20: burn amount exceeds allowance",
                Error::TransferFromZero => "ERC20: transfer from the zero address",
                Error::TransferToZero => "ERC20: transfer to the zero address",
                Error::TransferExceedsBalance => "ERC20: transfer amount exceeds balance",
                Error::TransferExceedsAllowance => "ERC20: transfer amount exceeds allowance",
                Error::ApproveToZero => "ERC20: approve to the zero address",
                Error::AllowanceBelowZero => "ERC20: decreased allowance below zero",
                Error::Overflow => "HmmCoin: arithmetic overflow",
            }
        }
    }

    impl core::fmt::Display for Error {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str(self.reason())
        }
    }

    /// `from_acc == None` is a mint, `to_acc == None` is a burn.
    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        pub from_acc: Option<AccountId>,
        #[ink(topic)]
        pub to_acc: Option<AccountId>,
        pub value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        pub owner_acc: AccountId,
        #[ink(topic)]
        pub spender_acc: AccountId,
        pub value: Balance,
    }

    #[ink(storage)]
    pub struct HmmCoin {
        // metadata
        name: String,
        symbol: String,
        cap: Balance,

        // governance
        roles: Roles,

        // token state
        total_supply: Balance,
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
    }

    impl HmmCoin {
        // -------- constructors --------

        /// `initial_holder` becomes default admin and minter and receives
        /// `initial_supply`.
        #[ink(constructor)]
        pub fn new(
            name: String,
            symbol: String,
            initial_holder: AccountId,
            initial_supply: Balance,
            max_supply: Balance,
        ) -> Result<Self> {
            if max_supply == 0 {
                return Err(Error::CapIsZero)
            }
            if is_zero(&initial_holder) {
                return Err(Error::OwnerIsZero)
            }
            if initial_supply > max_supply {
                return Err(Error::InitialSupplyAboveCap)
            }

            let mut instance = Self {
                name,
                symbol,
                cap: max_supply,
                roles: Roles::default(),
                total_supply: 0,
                balances: Mapping::default(),
                allowances: Mapping::default(),
            };

            let deployer_acc = Self::env().caller();
            instance.roles.setup_role(DEFAULT_ADMIN_ROLE, initial_holder, deployer_acc);
            instance.roles.setup_role(MINTER_ROLE, initial_holder, deployer_acc);
            if initial_supply > 0 {
                instance.mint_internal(initial_holder, initial_supply)?;
            }
            Ok(instance)
        }

        // -------- read API --------

        #[ink(message)]
        pub fn name(&self) -> String {
            self.name.clone()
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            self.symbol.clone()
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            DECIMALS
        }

        /// Upper bound on `total_supply`, fixed at construction.
        #[ink(message)]
        pub fn cap(&self) -> Balance {
            self.cap
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn balance_of(&self, owner_acc: AccountId) -> Balance {
            self.balances.get(&owner_acc).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner_acc: AccountId, spender_acc: AccountId) -> Balance {
            self.allowances.get(&(owner_acc, spender_acc)).unwrap_or(0)
        }

        // -------- issuance --------

        /// Privileged mint: caller must hold `MINTER_ROLE`.
        #[ink(message)]
        pub fn mint(&mut self, to_acc: AccountId, amount: Balance) -> Result<()> {
            ensure_role(&self.roles, MINTER_ROLE, self.env().caller(), Error::NotMinter)?;
            self.mint_internal(to_acc, amount)
        }

        #[ink(message)]
        pub fn burn(&mut self, amount: Balance) -> Result<()> {
            let from_acc = self.env().caller();
            self.burn_internal(from_acc, amount)
        }

        /// Burns from `owner_acc`, spending the caller's allowance.
        #[ink(message)]
        pub fn burn_from(&mut self, owner_acc: AccountId, amount: Balance) -> Result<()> {
            let caller_acc = self.env().caller();
            let current_allow = self.allowance(owner_acc, caller_acc);
            if current_allow < amount {
                return Err(Error::BurnExceedsAllowance)
            }
            if self.balance_of(owner_acc) < amount {
                return Err(Error::BurnExceedsBalance)
            }
            self.approve_internal(owner_acc, caller_acc, current_allow - amount)?;
            self.burn_internal(owner_acc, amount)
        }

        // -------- transfers --------

        #[ink(message)]
        pub fn transfer(&mut self, to_acc: AccountId, amount: Balance) -> Result<()> {
            let from_acc = self.env().caller();
            self.move_balance(from_acc, to_acc, amount)
        }

        #[ink(message)]
        pub fn transfer_from(&mut self, from_acc: AccountId, to_acc: AccountId, amount: Balance) -> Result<()> {
            let caller_acc = self.env().caller();
            self.check_transfer(from_acc, to_acc, amount)?;

            let current_allow = self.allowance(from_acc, caller_acc);
            if current_allow < amount {
                return Err(Error::TransferExceedsAllowance)
            }

            self.move_balance(from_acc, to_acc, amount)?;
            self.approve_internal(from_acc, caller_acc, current_allow - amount)
        }

        // -------- allowances --------

        #[ink(message)]
        pub fn approve(&mut self, spender_acc: AccountId, amount: Balance) -> Result<()> {
            let owner_acc = self.env().caller();
            self.approve_internal(owner_acc, spender_acc, amount)
        }

        #[ink(message)]
        pub fn increase_allowance(&mut self, spender_acc: AccountId, added: Balance) -> Result<()> {
            let owner_acc = self.env().caller();
            let new_val = self
                .allowance(owner_acc, spender_acc)
                .checked_add(added)
                .ok_or(Error::Overflow)?;
            self.approve_internal(owner_acc, spender_acc, new_val)
        }

        #[ink(message)]
        pub fn decrease_allowance(&mut self, spender_acc: AccountId, subtracted: Balance) -> Result<()> {
            let owner_acc = self.env().caller();
            let new_val = self
                .allowance(owner_acc, spender_acc)
                .checked_sub(subtracted)
                .ok_or(Error::AllowanceBelowZero)?;
            self.approve_internal(owner_acc, spender_acc, new_val)
        }

        // ---- internals ----

        fn mint_internal(&mut self, to_acc: AccountId, amount: Balance) -> Result<()> {
            if is_zero(&to_acc) {
                return Err(Error::MintToZero)
            }
            let new_total = self.total_supply.checked_add(amount).ok_or(Error::Overflow)?;
            if new_total > self.cap {
                return Err(Error::CapExceeded)
            }
            let new_to = self.balance_of(to_acc).checked_add(amount).ok_or(Error::Overflow)?;

            self.total_supply = new_total;
            self.balances.insert(&to_acc, &new_to);

            self.env().emit_event(Transfer { from_acc: None, to_acc: Some(to_acc), value: amount });
            Ok(())
        }

        fn burn_internal(&mut self, from_acc: AccountId, amount: Balance) -> Result<()> {
            let from_bal = self.balance_of(from_acc);
            if from_bal < amount {
                return Err(Error::BurnExceedsBalance)
            }
            let new_total = self.total_supply.checked_sub(amount).ok_or(Error::Overflow)?;

            self.balances.insert(&from_acc, &(from_bal - amount));
            self.total_supply = new_total;

            self.env().emit_event(Transfer { from_acc: Some(from_acc), to_acc: None, value: amount });
            Ok(())
        }

        fn check_transfer(&self, from_acc: AccountId, to_acc: AccountId, amount: Balance) -> Result<()> {
            if is_zero(&from_acc) {
                return Err(Error::TransferFromZero)
            }
            if is_zero(&to_acc) {
                return Err(Error::TransferToZero)
            }
            if self.balance_of(from_acc) < amount {
                return Err(Error::TransferExceedsBalance)
            }
            Ok(())
        }

        fn move_balance(&mut self, from_acc: AccountId, to_acc: AccountId, amount: Balance) -> Result<()> {
            self.check_transfer(from_acc, to_acc, amount)?;

            let new_from = self.balance_of(from_acc) - amount;
            self.balances.insert(&from_acc, &new_from);

            // read after the debit so a self transfer nets to zero
            let new_to = self.balance_of(to_acc).checked_add(amount).ok_or(Error::Overflow)?;
            self.balances.insert(&to_acc, &new_to);

            self.env().emit_event(Transfer { from_acc: Some(from_acc), to_acc: Some(to_acc), value: amount });
            Ok(())
        }

        fn approve_internal(&mut self, owner_acc: AccountId, spender_acc: AccountId, value: Balance) -> Result<()> {
            if is_zero(&spender_acc) {
                return Err(Error::ApproveToZero)
            }
            self.allowances.insert(&(owner_acc, spender_acc), &value);
            self.env().emit_event(Approval { owner_acc, spender_acc, value });
            Ok(())
        }
    }

    impl AccessControl for HmmCoin {
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
        use crate::constants::{HMC_INITIAL_SUPPLY, HMC_MAX_SUPPLY};
        use ink_e2e::ContractsBackend;

        type E2EResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

        #[ink_e2e::test]
        async fn mint_requires_minter_role(mut client: ink_e2e::Client<C, E>) -> E2EResult<()> {
            let alice_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Alice);
            let bob_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Bob);

            let mut constructor =
                HmmCoinRef::new("HmmCoin".into(), "HMC".into(), alice_acc, HMC_INITIAL_SUPPLY, HMC_MAX_SUPPLY);
            let token = client
                .instantiate("hmm_coin", &ink_e2e::alice(), &mut constructor)
                .submit()
                .await
                .expect("instantiate failed");
            let mut call_builder = token.call_builder::<HmmCoin>();

            let mint = call_builder.mint(bob_acc, 9_999);
            let denied = client.call(&ink_e2e::bob(), &mint).dry_run().await?;
            assert_eq!(denied.return_value(), Err(Error::NotMinter));

            client.call(&ink_e2e::alice(), &mint).submit().await.expect("mint failed");

            let balance = call_builder.balance_of(bob_acc);
            let balance_res = client.call(&ink_e2e::alice(), &balance).dry_run().await?;
            assert_eq!(balance_res.return_value(), 9_999);
            Ok(())
        }
    }
}
