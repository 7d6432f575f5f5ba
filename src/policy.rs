//! Privilege checks for library operations.
//!
//! Every action has a category; administrative actions require the caller to
//! hold the admin role, lending and read-only actions are open to anyone (the
//! library applies its own membership rules to lending).

use crate::error::{LibraryError, LibraryResult};
use crate::library::User;

/// Permission decision result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// Operations a caller can request from the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddBook,
    RemoveBook,
    RegisterMember,
    RemoveMember,
    Borrow,
    Return,
    ViewProfile,
}

/// Action category for default behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    /// Profile views
    ReadOnly,
    /// Borrow and return
    Lending,
    /// Mutations of the book or member collections
    Administrative,
}

impl Action {
    pub fn category(&self) -> ActionCategory {
        match self {
            Self::AddBook | Self::RemoveBook | Self::RegisterMember | Self::RemoveMember => {
                ActionCategory::Administrative
            }
            Self::Borrow | Self::Return => ActionCategory::Lending,
            Self::ViewProfile => ActionCategory::ReadOnly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddBook => "add_book",
            Self::RemoveBook => "remove_book",
            Self::RegisterMember => "register_member",
            Self::RemoveMember => "remove_member",
            Self::Borrow => "borrow",
            Self::Return => "return",
            Self::ViewProfile => "view_profile",
        }
    }

    /// Phrase used in the denial message ("Only admins can ...")
    fn denial_phrase(&self) -> &'static str {
        match self {
            Self::AddBook => "add books",
            Self::RemoveBook => "remove books",
            Self::RegisterMember => "register new members",
            Self::RemoveMember => "remove members",
            Self::Borrow => "borrow books",
            Self::Return => "return books",
            Self::ViewProfile => "view profiles",
        }
    }
}

/// Decide whether `actor` may perform `action`
pub fn decide(actor: &User, action: Action) -> Decision {
    match action.category() {
        ActionCategory::Administrative if !actor.is_admin() => Decision::Deny,
        _ => Decision::Allow,
    }
}

/// Like [`decide`], but a denial becomes [`LibraryError::NotAuthorized`]
pub fn authorize(actor: &User, action: Action) -> LibraryResult<()> {
    match decide(actor, action) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(LibraryError::NotAuthorized(action.denial_phrase())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_category() {
        assert_eq!(
            Action::AddBook.category(),
            ActionCategory::Administrative
        );
        assert_eq!(
            Action::RemoveMember.category(),
            ActionCategory::Administrative
        );
        assert_eq!(Action::Borrow.category(), ActionCategory::Lending);
        assert_eq!(Action::ViewProfile.category(), ActionCategory::ReadOnly);
    }

    #[test]
    fn test_admin_allowed_everywhere() {
        let admin = User::admin("Admin", "admin123");
        for action in [
            Action::AddBook,
            Action::RemoveBook,
            Action::RegisterMember,
            Action::RemoveMember,
            Action::Borrow,
        ] {
            assert_eq!(decide(&admin, action), Decision::Allow);
        }
    }

    #[test]
    fn test_patron_denied_administrative() {
        let patron = User::new("alice", "pw");
        assert_eq!(decide(&patron, Action::AddBook), Decision::Deny);
        assert_eq!(decide(&patron, Action::Borrow), Decision::Allow);
        assert_eq!(
            authorize(&patron, Action::RegisterMember),
            Err(LibraryError::NotAuthorized("register new members"))
        );
    }
}
