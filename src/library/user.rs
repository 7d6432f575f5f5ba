use super::book::BookId;

/// Default cap on concurrently borrowed books
pub const MAX_BORROW_LIMIT: usize = 3;

/// Privilege level of a library user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Patron,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patron => "patron",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    password: String,
    borrowed: Vec<BookId>,
    is_member: bool,
    role: Role,
}

impl User {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            borrowed: Vec::new(),
            is_member: false,
            role: Role::Patron,
        }
    }

    pub fn admin(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            role: Role::Admin,
            ..Self::new(name, password)
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_member(&self) -> bool {
        self.is_member
    }

    pub(crate) fn set_member(&mut self, member: bool) {
        self.is_member = member;
    }

    pub fn check_password(&self, password: &str) -> bool {
        self.password == password
    }

    /// Ids of the books currently held, in borrow order
    pub fn borrowed(&self) -> &[BookId] {
        &self.borrowed
    }

    pub fn holds(&self, id: BookId) -> bool {
        self.borrowed.contains(&id)
    }

    pub(crate) fn push_borrowed(&mut self, id: BookId) {
        self.borrowed.push(id);
    }

    pub(crate) fn remove_borrowed(&mut self, id: BookId) {
        self.borrowed.retain(|held| *held != id);
    }
}
