#![cfg_attr(not(feature = "std"), no_std)]

//! Role registry shared by the HmmCoin contracts.
//!
//! Every contract embeds a [`Roles`] storage item and exposes it through the
//! [`AccessControl`] trait. Contract-specific permission checks go through
//! [`ensure_role`] so that each contract reports its own reason string while
//! the membership logic lives in one place.

use ink::env::DefaultEnvironment;
use ink::primitives::AccountId;
use ink::storage::Mapping;

pub type RoleType = u32;

/// Admin of every role that has no explicit admin, including itself.
pub const DEFAULT_ADMIN_ROLE: RoleType = 0;

pub const MINTER_ROLE: RoleType = ink::selector_id!("MINTER_ROLE");

#[derive(scale::Encode, scale::Decode, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum AccessControlError {
    NotAdminToGrant,
    NotAdminToRevoke,
    RenounceForSelfOnly,
}

impl AccessControlError {
    pub fn reason(&self) -> &'static str {
        match self {
            AccessControlError::NotAdminToGrant => "AccessControl: sender must be an admin to grant",
            AccessControlError::NotAdminToRevoke => "AccessControl: sender must be an admin to revoke",
            AccessControlError::RenounceForSelfOnly => "AccessControl: can only renounce roles for self",
        }
    }
}

impl core::fmt::Display for AccessControlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.reason())
    }
}

#[ink::event]
pub struct RoleGranted {
    #[ink(topic)]
    pub role: RoleType,
    #[ink(topic)]
    pub account_acc: AccountId,
    #[ink(topic)]
    pub sender_acc: AccountId,
}

#[ink::event]
pub struct RoleRevoked {
    #[ink(topic)]
    pub role: RoleType,
    #[ink(topic)]
    pub account_acc: AccountId,
    #[ink(topic)]
    pub sender_acc: AccountId,
}

/// The null account. Never a valid holder, spender or recipient.
pub fn zero_account() -> AccountId {
    AccountId::from([0u8; 32])
}

pub fn is_zero(account_acc: &AccountId) -> bool {
    *account_acc == zero_account()
}

/// Fails with `denied` unless `account_acc` holds `role`.
pub fn ensure_role<E>(roles: &Roles, role: RoleType, account_acc: AccountId, denied: E) -> Result<(), E> {
    if !roles.has_role(role, account_acc) {
        return Err(denied)
    }
    Ok(())
}

#[ink::storage_item]
#[derive(Default, Debug)]
pub struct Roles {
    // (role, holder) -> present
    members: Mapping<(RoleType, AccountId), ()>,
}

impl Roles {
    pub fn has_role(&self, role: RoleType, account_acc: AccountId) -> bool {
        self.members.contains(&(role, account_acc))
    }

    /// Every role, `DEFAULT_ADMIN_ROLE` included, is administered by
    /// `DEFAULT_ADMIN_ROLE`.
    pub fn role_admin(&self, _role: RoleType) -> RoleType {
        DEFAULT_ADMIN_ROLE
    }

    /// Unchecked grant used by constructors. Returns whether anything changed.
    pub fn setup_role(&mut self, role: RoleType, account_acc: AccountId, sender_acc: AccountId) -> bool {
        if self.has_role(role, account_acc) {
            return false
        }
        self.members.insert(&(role, account_acc), &());
        ink::env::emit_event::<DefaultEnvironment, _>(RoleGranted { role, account_acc, sender_acc });
        true
    }

    fn remove_role(&mut self, role: RoleType, account_acc: AccountId, sender_acc: AccountId) -> bool {
        if !self.has_role(role, account_acc) {
            return false
        }
        self.members.remove(&(role, account_acc));
        ink::env::emit_event::<DefaultEnvironment, _>(RoleRevoked { role, account_acc, sender_acc });
        true
    }

    pub fn grant_role(
        &mut self,
        caller_acc: AccountId,
        role: RoleType,
        account_acc: AccountId,
    ) -> Result<(), AccessControlError> {
        ensure_role(self, self.role_admin(role), caller_acc, AccessControlError::NotAdminToGrant)?;
        self.setup_role(role, account_acc, caller_acc);
        Ok(())
    }

    pub fn revoke_role(
        &mut self,
        caller_acc: AccountId,
        role: RoleType,
        account_acc: AccountId,
    ) -> Result<(), AccessControlError> {
        ensure_role(self, self.role_admin(role), caller_acc, AccessControlError::NotAdminToRevoke)?;
        self.remove_role(role, account_acc, caller_acc);
        Ok(())
    }

    pub fn renounce_role(
        &mut self,
        caller_acc: AccountId,
        role: RoleType,
        account_acc: AccountId,
    ) -> Result<(), AccessControlError> {
        if caller_acc != account_acc {
            return Err(AccessControlError::RenounceForSelfOnly)
        }
        self.remove_role(role, account_acc, caller_acc);
        Ok(())
    }
}

/// Message surface every HmmCoin contract exposes for its role registry.
#[ink::trait_definition]
pub trait AccessControl {
    #[ink(message)]
    fn has_role(&self, role: RoleType, account_acc: AccountId) -> bool;

    #[ink(message)]
    fn get_role_admin(&self, role: RoleType) -> RoleType;

    /// Caller must hold the admin role of `role`. Granting a held role is a no-op.
    #[ink(message)]
    fn grant_role(&mut self, role: RoleType, account_acc: AccountId) -> Result<(), AccessControlError>;

    /// Caller must hold the admin role of `role`. Revoking an absent role is a no-op.
    #[ink(message)]
    fn revoke_role(&mut self, role: RoleType, account_acc: AccountId) -> Result<(), AccessControlError>;

    /// Caller must be `account_acc`.
    #[ink(message)]
    fn renounce_role(&mut self, role: RoleType, account_acc: AccountId) -> Result<(), AccessControlError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink::env::test;

    const ROLE: RoleType = ink::selector_id!("ROLE");
    const OTHER_ROLE: RoleType = ink::selector_id!("OTHER_ROLE");

    fn accounts() -> test::DefaultAccounts<DefaultEnvironment> {
        test::default_accounts::<DefaultEnvironment>()
    }

    fn event_count() -> usize {
        test::recorded_events().count()
    }

    fn with_admin(admin_acc: AccountId) -> Roles {
        let mut roles = Roles::default();
        roles.setup_role(DEFAULT_ADMIN_ROLE, admin_acc, admin_acc);
        roles
    }

    #[ink::test]
    fn default_admin_is_its_own_admin() {
        let roles = with_admin(accounts().alice);
        assert!(roles.has_role(DEFAULT_ADMIN_ROLE, accounts().alice));
        assert_eq!(roles.role_admin(DEFAULT_ADMIN_ROLE), DEFAULT_ADMIN_ROLE);
        assert_eq!(roles.role_admin(ROLE), DEFAULT_ADMIN_ROLE);
        assert_eq!(roles.role_admin(MINTER_ROLE), DEFAULT_ADMIN_ROLE);
    }

    #[ink::test]
    fn role_ids_are_distinct() {
        assert_ne!(MINTER_ROLE, DEFAULT_ADMIN_ROLE);
        assert_ne!(ROLE, OTHER_ROLE);
    }

    #[ink::test]
    fn admin_can_grant_and_grant_twice_emits_once() {
        let acc = accounts();
        let mut roles = with_admin(acc.alice);
        let before = event_count();

        assert_eq!(roles.grant_role(acc.alice, ROLE, acc.bob), Ok(()));
        assert!(roles.has_role(ROLE, acc.bob));
        assert_eq!(event_count(), before + 1);

        assert_eq!(roles.grant_role(acc.alice, ROLE, acc.bob), Ok(()));
        assert_eq!(event_count(), before + 1);
    }

    #[ink::test]
    fn non_admin_cannot_grant_or_revoke() {
        let acc = accounts();
        let mut roles = with_admin(acc.alice);
        assert_eq!(roles.grant_role(acc.charlie, ROLE, acc.bob), Err(AccessControlError::NotAdminToGrant));

        roles.grant_role(acc.alice, ROLE, acc.bob).unwrap();
        let err = roles.revoke_role(acc.charlie, ROLE, acc.bob).unwrap_err();
        assert_eq!(err.reason(), "AccessControl: sender must be an admin to revoke");
        assert!(roles.has_role(ROLE, acc.bob));
    }

    #[ink::test]
    fn revoke_is_idempotent() {
        let acc = accounts();
        let mut roles = with_admin(acc.alice);
        let before = event_count();
        assert_eq!(roles.revoke_role(acc.alice, ROLE, acc.bob), Ok(()));
        assert_eq!(event_count(), before);

        roles.grant_role(acc.alice, ROLE, acc.bob).unwrap();
        roles.revoke_role(acc.alice, ROLE, acc.bob).unwrap();
        assert!(!roles.has_role(ROLE, acc.bob));
        let after_first = event_count();
        roles.revoke_role(acc.alice, ROLE, acc.bob).unwrap();
        assert_eq!(event_count(), after_first);
    }

    #[ink::test]
    fn only_bearer_can_renounce() {
        let acc = accounts();
        let mut roles = with_admin(acc.alice);
        roles.grant_role(acc.alice, ROLE, acc.bob).unwrap();

        let err = roles.renounce_role(acc.alice, ROLE, acc.bob).unwrap_err();
        assert_eq!(err.reason(), "AccessControl: can only renounce roles for self");

        assert_eq!(roles.renounce_role(acc.bob, ROLE, acc.bob), Ok(()));
        assert!(!roles.has_role(ROLE, acc.bob));
        let before = event_count();
        assert_eq!(roles.renounce_role(acc.bob, ROLE, acc.bob), Ok(()));
        assert_eq!(event_count(), before);
    }

    #[ink::test]
    fn admin_can_renounce_own_admin_role() {
        let acc = accounts();
        let mut roles = with_admin(acc.alice);
        roles.renounce_role(acc.alice, DEFAULT_ADMIN_ROLE, acc.alice).unwrap();
        assert_eq!(roles.grant_role(acc.alice, ROLE, acc.bob), Err(AccessControlError::NotAdminToGrant));
    }

    #[ink::test]
    fn holders_of_other_roles_cannot_administer_them() {
        let acc = accounts();
        let mut roles = with_admin(acc.alice);
        roles.grant_role(acc.alice, ROLE, acc.charlie).unwrap();
        assert_eq!(roles.role_admin(ROLE), DEFAULT_ADMIN_ROLE);

        assert_eq!(roles.grant_role(acc.charlie, ROLE, acc.bob), Err(AccessControlError::NotAdminToGrant));
        assert_eq!(roles.revoke_role(acc.charlie, ROLE, acc.charlie), Err(AccessControlError::NotAdminToRevoke));
        assert!(!roles.has_role(ROLE, acc.bob));

        roles.grant_role(acc.alice, DEFAULT_ADMIN_ROLE, acc.charlie).unwrap();
        assert_eq!(roles.grant_role(acc.charlie, ROLE, acc.bob), Ok(()));
    }

    #[ink::test]
    fn ensure_role_returns_caller_error() {
        let acc = accounts();
        let roles = with_admin(acc.alice);
        assert_eq!(ensure_role(&roles, DEFAULT_ADMIN_ROLE, acc.alice, "denied"), Ok(()));
        assert_eq!(ensure_role(&roles, MINTER_ROLE, acc.alice, "denied"), Err("denied"));
    }

    #[ink::test]
    fn zero_account_detection() {
        assert!(is_zero(&zero_account()));
        assert!(!is_zero(&accounts().alice));
    }
}
