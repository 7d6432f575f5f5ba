//! Books and their lending state.

use crate::error::{LibraryError, LibraryResult};
use chrono::{DateTime, Duration, Local};
use std::fmt;

/// Default loan length in days
pub const DEFAULT_LOAN_DAYS: i64 = 14;

/// Longest loan the library will grant, in days
pub const MAX_LOAN_DAYS: i64 = 3650;

/// Identifier assigned by the library when a book is added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub u32);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lending state of a book. Borrower and due date only exist together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoanState {
    #[default]
    Available,
    Borrowed {
        borrower: String,
        due: DateTime<Local>,
    },
}

#[derive(Debug, Clone)]
pub struct Book {
    id: BookId,
    pub title: String,
    pub author: String,
    isbn: String,
    state: LoanState,
}

impl Book {
    /// Create an unregistered book; the library assigns the real id on add
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            id: BookId(0),
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            state: LoanState::Available,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: BookId) {
        self.id = id;
    }

    /// ISBN with everything but the last four characters hidden
    pub fn masked_isbn(&self) -> String {
        let chars: Vec<char> = self.isbn.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("****{}", tail)
    }

    pub fn state(&self) -> &LoanState {
        &self.state
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self.state, LoanState::Borrowed { .. })
    }

    pub fn borrower(&self) -> Option<&str> {
        match &self.state {
            LoanState::Borrowed { borrower, .. } => Some(borrower),
            LoanState::Available => None,
        }
    }

    pub fn due_date(&self) -> Option<DateTime<Local>> {
        match &self.state {
            LoanState::Borrowed { due, .. } => Some(*due),
            LoanState::Available => None,
        }
    }

    /// Lend the book out for `days` starting at `now`
    pub fn borrow(
        &mut self,
        borrower: &str,
        days: i64,
        now: DateTime<Local>,
    ) -> LibraryResult<()> {
        if self.is_borrowed() {
            return Err(LibraryError::BookNotAvailable(self.title.clone()));
        }
        let due = Duration::try_days(days)
            .filter(|_| (1..=MAX_LOAN_DAYS).contains(&days))
            .and_then(|period| now.checked_add_signed(period))
            .ok_or(LibraryError::InvalidLoanPeriod(days))?;
        self.state = LoanState::Borrowed {
            borrower: borrower.to_string(),
            due,
        };
        Ok(())
    }

    pub fn return_book(&mut self) -> LibraryResult<()> {
        if !self.is_borrowed() {
            return Err(LibraryError::BookAlreadyReturned(self.title.clone()));
        }
        self.state = LoanState::Available;
        Ok(())
    }

    pub fn is_overdue(&self, now: DateTime<Local>) -> bool {
        self.due_date().is_some_and(|due| now > due)
    }

    /// One-line summary used by listings
    pub fn display_info(&self) -> String {
        let status = match self.state() {
            LoanState::Available => "Available".to_string(),
            LoanState::Borrowed { borrower, due } => {
                format!("Borrowed by {} (Due: {})", borrower, format_due(due))
            }
        };
        format!(
            "Title: {}, Author: {}, ISBN: {}, Status: {}",
            self.title,
            self.author,
            self.masked_isbn(),
            status
        )
    }
}

pub fn format_due(due: &DateTime<Local>) -> String {
    due.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        Book::new("Python Programming", "John Doe", "1234567890123")
    }

    #[test]
    fn test_masked_isbn() {
        assert_eq!(book().masked_isbn(), "****0123");
        assert_eq!(Book::new("T", "A", "12").masked_isbn(), "****12");
        assert_eq!(Book::new("T", "A", "").masked_isbn(), "****");
    }

    #[test]
    fn test_borrow_sets_borrower_and_due() {
        let now = Local::now();
        let mut b = book();
        b.borrow("alice", 14, now).unwrap();
        assert!(b.is_borrowed());
        assert_eq!(b.borrower(), Some("alice"));
        assert_eq!(b.due_date(), Some(now + Duration::days(14)));
    }

    #[test]
    fn test_second_borrow_fails_without_change() {
        let now = Local::now();
        let mut b = book();
        b.borrow("alice", 14, now).unwrap();
        let err = b.borrow("bob", 7, now).unwrap_err();
        assert_eq!(
            err,
            LibraryError::BookNotAvailable("Python Programming".to_string())
        );
        assert_eq!(b.borrower(), Some("alice"));
    }

    #[test]
    fn test_return_clears_state() {
        let mut b = book();
        b.borrow("alice", 14, Local::now()).unwrap();
        b.return_book().unwrap();
        assert_eq!(b.state(), &LoanState::Available);
        assert!(b.borrower().is_none());
        assert!(b.due_date().is_none());
    }

    #[test]
    fn test_return_available_book_fails() {
        let mut b = book();
        assert!(matches!(
            b.return_book(),
            Err(LibraryError::BookAlreadyReturned(_))
        ));
    }

    #[test]
    fn test_out_of_range_loan_is_rejected() {
        let now = Local::now();
        let mut b = book();
        assert_eq!(
            b.borrow("alice", 1_000_000_000, now).unwrap_err(),
            LibraryError::InvalidLoanPeriod(1_000_000_000)
        );
        assert_eq!(
            b.borrow("alice", 0, now).unwrap_err(),
            LibraryError::InvalidLoanPeriod(0)
        );
        assert!(!b.is_borrowed());
        b.borrow("alice", MAX_LOAN_DAYS, now).unwrap();
        assert_eq!(b.due_date(), Some(now + Duration::days(MAX_LOAN_DAYS)));
    }

    #[test]
    fn test_overdue() {
        let now = Local::now();
        let mut b = book();
        assert!(!b.is_overdue(now));
        b.borrow("alice", 1, now).unwrap();
        assert!(!b.is_overdue(now));
        assert!(b.is_overdue(now + Duration::days(2)));
    }

    #[test]
    fn test_display_info() {
        let mut b = book();
        assert_eq!(
            b.display_info(),
            "Title: Python Programming, Author: John Doe, ISBN: ****0123, Status: Available"
        );
        b.borrow("alice", 14, Local::now()).unwrap();
        assert!(b.display_info().contains("Borrowed by alice (Due: "));
    }
}
