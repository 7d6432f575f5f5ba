//! Domain error types for the library and the learning subsystems.

use thiserror::Error;

/// Failures of lending and collection operations on a [`crate::library::Library`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("The book '{0}' is currently borrowed.")]
    BookNotAvailable(String),

    #[error("The book '{0}' is not currently borrowed.")]
    BookAlreadyReturned(String),

    #[error("Borrow limit of {0} reached. Return a book to borrow a new one.")]
    BorrowLimitExceeded(usize),

    #[error("{0} is not a registered member. Please register to borrow books.")]
    NotAMember(String),

    #[error("Only admins can {0}.")]
    NotAuthorized(&'static str),

    #[error("No book found with the title '{0}'.")]
    BookNotFound(String),

    #[error("No book with id #{0} in the library.")]
    UnknownBookId(u32),

    #[error("A loan of {0} days is out of range.")]
    InvalidLoanPeriod(i64),

    #[error("User '{0}' is already a registered member.")]
    AlreadyMember(String),

    #[error("The book '{0}' is on loan and cannot be removed.")]
    BookOnLoan(String),

    #[error("User '{0}' still has borrowed books and cannot be removed.")]
    MemberHasLoans(String),

    #[error("{0} does not hold that book.")]
    NotHeldByUser(String),
}

/// Failures of the account store in the learning subsystem
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("User '{0}' already exists.")]
    AlreadyExists(String),

    #[error("User '{0}' does not exist.")]
    UnknownUser(String),

    #[error("Failed to save account data: {0}")]
    Save(#[from] std::io::Error),

    #[error("Failed to encode account data: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type LibraryResult<T> = Result<T, LibraryError>;
