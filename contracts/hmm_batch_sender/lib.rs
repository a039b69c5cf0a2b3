#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub use self::hmm_batch_sender::{Error, HmmCoinBatchSender, HmmCoinBatchSenderRef};

/// Mints a fixed HMC amount to each account of a list, in one call.
///
/// The contract needs `MINTER_ROLE` on the token. A single failing mint
/// makes `send_batch` return `Err`, which reverts every mint of the call.
#[ink::contract]
mod hmm_batch_sender {
    use hmm_access::{
        ensure_role, is_zero, AccessControl, AccessControlError, RoleType, Roles, DEFAULT_ADMIN_ROLE,
    };
    use hmm_coin::HmmCoinRef;
    use ink::env::call::FromAccountId;
    use ink::prelude::vec::Vec;

    pub type Result<T> = core::result::Result<T, Error>;

    #[derive(scale::Encode, scale::Decode, Debug, PartialEq, Eq, Clone, Copy)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        AmountZero,
        OwnerIsZero,
        TokenIsZero,
        NotOwner,
        Token(hmm_coin::Error),
    }

    impl Error {
        pub fn reason(&self) -> &'static str {
            match self {
                Error::AmountZero => "HmmCoinBatchSender: amount must be > 0",
                Error::OwnerIsZero => "HmmCoinBatchSender: owner must be non-zero address",
                Error::TokenIsZero => "HmmCoinBatchSender: token must be non-zero address",
                Error::NotOwner => "HmmCoinBatchSender: must have owner role to execute giveaway",
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

    /// Every recipient received `amount`.
    #[ink(event)]
    pub struct BatchSent {
        #[ink(topic)]
        pub sender_acc: AccountId,
        pub recipients: Vec<AccountId>,
        pub amount: Balance,
    }

    #[ink(storage)]
    pub struct HmmCoinBatchSender {
        token_acc: AccountId,
        amount: Balance,
        roles: Roles,
    }

    impl HmmCoinBatchSender {
        #[ink(constructor)]
        pub fn new(amount: Balance, token_acc: AccountId, owner_acc: AccountId) -> Result<Self> {
            if amount == 0 {
                return Err(Error::AmountZero)
            }
            if is_zero(&owner_acc) {
                return Err(Error::OwnerIsZero)
            }
            if is_zero(&token_acc) {
                return Err(Error::TokenIsZero)
            }
            let mut instance = Self { token_acc, amount, roles: Roles::default() };
            instance.roles.setup_role(DEFAULT_ADMIN_ROLE, owner_acc, Self::env().caller());
            Ok(instance)
        }

        #[ink(message)]
        pub fn token(&self) -> AccountId {
            self.token_acc
        }

        /// Amount every recipient receives.
        #[ink(message)]
        pub fn amount(&self) -> Balance {
            self.amount
        }

        /// Total a batch of `recipients` would mint.
        #[ink(message)]
        pub fn batch_total(&self, recipients: u32) -> Option<Balance> {
            self.amount.checked_mul(Balance::from(recipients))
        }

        #[ink(message)]
        pub fn send_batch(&mut self, recipients: Vec<AccountId>) -> Result<()> {
            let sender_acc = self.env().caller();
            ensure_role(&self.roles, DEFAULT_ADMIN_ROLE, sender_acc, Error::NotOwner)?;

            let mut token: HmmCoinRef = FromAccountId::from_account_id(self.token_acc);
            for (index, to_acc) in recipients.iter().enumerate() {
                if let Err(e) = token.mint(*to_acc, self.amount) {
                    ink::env::debug_println!("batch aborted at recipient {}: {}", index, e);
                    return Err(e.into())
                }
            }

            self.env().emit_event(BatchSent { sender_acc, recipients, amount: self.amount });
            Ok(())
        }
    }

    impl AccessControl for HmmCoinBatchSender {
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
