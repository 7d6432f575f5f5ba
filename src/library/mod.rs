//! Library checkout tracking: books, members and the lending rules binding them.
//!
//! The library owns every [`Book`] and every registered [`User`]. Users refer to
//! the books they hold by [`BookId`], so a borrow relationship is always
//! resolved through the library and cannot outlive the book.

mod book;
mod user;

pub use book::{format_due, Book, BookId, DEFAULT_LOAN_DAYS, MAX_LOAN_DAYS};
pub use user::{User, MAX_BORROW_LIMIT};

use crate::error::{LibraryError, LibraryResult};
use crate::policy::{self, Action};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;

/// Books every fresh library starts with: (title, author, isbn)
pub const STARTER_BOOKS: &[(&str, &str, &str)] = &[
    ("Python Programming", "John Doe", "1234567890123"),
    ("Data Science Basics", "Jane Smith", "9876543210987"),
    ("Machine Learning Guide", "Alice Brown", "5678901234567"),
    ("Deep Learning Insights", "Tom Wilson", "8901234567890"),
    ("Artificial Intelligence", "Emma Davis", "2345678901234"),
    ("Big Data Concepts", "Chris Taylor", "3456789012345"),
];

/// Limits applied to every loan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingRules {
    pub max_borrowed: usize,
    pub loan_days: i64,
}

impl Default for LendingRules {
    fn default() -> Self {
        Self {
            max_borrowed: MAX_BORROW_LIMIT,
            loan_days: DEFAULT_LOAN_DAYS,
        }
    }
}

#[derive(Debug, Default)]
pub struct Library {
    books: Vec<Book>,
    members: BTreeMap<String, User>,
    rules: LendingRules,
    next_id: u32,
}

impl Library {
    pub fn new(rules: LendingRules) -> Self {
        Self {
            books: Vec::new(),
            members: BTreeMap::new(),
            rules,
            next_id: 1,
        }
    }

    /// Add the starter catalog on behalf of `admin`
    pub fn seed_starter_books(&mut self, admin: &User) -> LibraryResult<Vec<BookId>> {
        STARTER_BOOKS
            .iter()
            .map(|(title, author, isbn)| {
                self.add_book(admin, Book::new(*title, *author, *isbn))
            })
            .collect()
    }

    pub fn add_book(&mut self, actor: &User, mut book: Book) -> LibraryResult<BookId> {
        policy::authorize(actor, Action::AddBook)?;
        let id = BookId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        book.set_id(id);
        self.books.push(book);
        Ok(id)
    }

    /// Remove the first book whose title matches (case-insensitive)
    pub fn remove_book(&mut self, actor: &User, title: &str) -> LibraryResult<Book> {
        policy::authorize(actor, Action::RemoveBook)?;
        let id = self
            .find_book_by_title(title)
            .map(|b| b.id())
            .ok_or_else(|| LibraryError::BookNotFound(title.to_string()))?;
        let idx = self
            .books
            .iter()
            .position(|b| b.id() == id)
            .ok_or_else(|| LibraryError::BookNotFound(title.to_string()))?;
        if self.books[idx].is_borrowed() {
            return Err(LibraryError::BookOnLoan(self.books[idx].title.clone()));
        }
        Ok(self.books.remove(idx))
    }

    pub fn register_user(&mut self, actor: &User, mut user: User) -> LibraryResult<()> {
        policy::authorize(actor, Action::RegisterMember)?;
        if self.members.contains_key(&user.name) {
            return Err(LibraryError::AlreadyMember(user.name));
        }
        user.set_member(true);
        self.members.insert(user.name.clone(), user);
        Ok(())
    }

    pub fn remove_user(&mut self, actor: &User, name: &str) -> LibraryResult<User> {
        policy::authorize(actor, Action::RemoveMember)?;
        let member = self
            .members
            .get(name)
            .ok_or_else(|| LibraryError::NotAMember(name.to_string()))?;
        if !member.borrowed().is_empty() {
            return Err(LibraryError::MemberHasLoans(name.to_string()));
        }
        let mut user = self
            .members
            .remove(name)
            .ok_or_else(|| LibraryError::NotAMember(name.to_string()))?;
        user.set_member(false);
        Ok(user)
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id() == id)
    }

    fn book_mut(&mut self, id: BookId) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| b.id() == id)
    }

    /// Books not currently on loan, in catalog order
    pub fn available_books(&self) -> Vec<&Book> {
        self.books.iter().filter(|b| !b.is_borrowed()).collect()
    }

    /// First book whose title matches, ignoring case
    pub fn find_book_by_title(&self, title: &str) -> Option<&Book> {
        let needle = title.to_lowercase();
        self.books.iter().find(|b| b.title.to_lowercase() == needle)
    }

    pub fn member(&self, name: &str) -> Option<&User> {
        self.members.get(name)
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.members.get(name).is_some_and(|u| u.is_member())
    }

    /// Look up a member by name and plaintext password
    pub fn authenticate(&self, name: &str, password: &str) -> Option<&User> {
        self.members
            .get(name)
            .filter(|user| user.check_password(password))
    }

    /// Membership and borrow-limit checks, without touching any state
    pub fn check_can_borrow(&self, name: &str) -> LibraryResult<()> {
        let member = self
            .member(name)
            .filter(|_| self.is_member(name))
            .ok_or_else(|| LibraryError::NotAMember(name.to_string()))?;
        if member.borrowed().len() >= self.rules.max_borrowed {
            return Err(LibraryError::BorrowLimitExceeded(self.rules.max_borrowed));
        }
        Ok(())
    }

    /// Lend book `id` to member `name`. All checks run before anything changes.
    pub fn borrow(
        &mut self,
        name: &str,
        id: BookId,
        now: DateTime<Local>,
    ) -> LibraryResult<&Book> {
        self.check_can_borrow(name)?;

        let loan_days = self.rules.loan_days;
        let book = self
            .book_mut(id)
            .ok_or_else(|| LibraryError::UnknownBookId(id.0))?;
        book.borrow(name, loan_days, now)?;

        if let Some(member) = self.members.get_mut(name) {
            member.push_borrowed(id);
        }
        self.book(id)
            .ok_or_else(|| LibraryError::UnknownBookId(id.0))
    }

    /// Take back book `id` from member `name`. The book must be in their list
    /// and the book itself must name them as borrower.
    pub fn return_book(&mut self, name: &str, id: BookId) -> LibraryResult<&Book> {
        let member = self
            .members
            .get(name)
            .ok_or_else(|| LibraryError::NotAMember(name.to_string()))?;
        if !member.holds(id) {
            return Err(LibraryError::NotHeldByUser(name.to_string()));
        }

        let book = self
            .book_mut(id)
            .ok_or_else(|| LibraryError::UnknownBookId(id.0))?;
        if book.is_borrowed() && book.borrower() != Some(name) {
            return Err(LibraryError::NotHeldByUser(name.to_string()));
        }
        book.return_book()?;

        if let Some(member) = self.members.get_mut(name) {
            member.remove_borrowed(id);
        }
        self.book(id)
            .ok_or_else(|| LibraryError::UnknownBookId(id.0))
    }

    /// Books held by `name`, in borrow order
    pub fn borrowed_by(&self, name: &str) -> Vec<&Book> {
        self.members
            .get(name)
            .map(|u| u.borrowed().iter().filter_map(|id| self.book(*id)).collect())
            .unwrap_or_default()
    }

    pub fn profile(&self, name: &str, now: DateTime<Local>) -> LibraryResult<Profile> {
        let user = self
            .members
            .get(name)
            .ok_or_else(|| LibraryError::NotAMember(name.to_string()))?;
        let loans = self
            .borrowed_by(name)
            .into_iter()
            .map(|book| ProfileLoan {
                title: book.title.clone(),
                due: book.due_date(),
                overdue: book.is_overdue(now),
            })
            .collect();
        Ok(Profile {
            name: user.name.clone(),
            is_member: user.is_member(),
            loans,
        })
    }
}

/// Snapshot of a member's account for display
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub is_member: bool,
    pub loans: Vec<ProfileLoan>,
}

#[derive(Debug, Clone)]
pub struct ProfileLoan {
    pub title: String,
    pub due: Option<DateTime<Local>>,
    pub overdue: bool,
}

impl Profile {
    pub fn format_display(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Profile of {}\n", self.name));
        out.push_str(&format!(
            "Membership Status: {}\n",
            if self.is_member { "Active" } else { "Inactive" }
        ));
        out.push_str("Borrowed Books:\n");
        if self.loans.is_empty() {
            out.push_str("No books borrowed.\n");
        }
        for loan in &self.loans {
            let due = loan.due.as_ref().map(format_due).unwrap_or_default();
            let overdue = if loan.overdue { " OVERDUE" } else { "" };
            out.push_str(&format!("- {} (Due: {}){}\n", loan.title, due, overdue));
        }
        out
    }
}
