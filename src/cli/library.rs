//! Menu loop for the library checkout tracker.

use super::{ask, parse_index, Flow, InputClosed, Prompter};
use crate::config::LibraryConfig;
use crate::error::LibraryError;
use crate::library::{format_due, Book, Library, User};
use crate::policy::{self, Action};
use crate::transcript::Transcript;
use anyhow::Result;
use chrono::Local;

pub struct LibrarySession {
    pub library: Library,
    pub admin: User,
    pub transcript: Transcript,
}

impl LibrarySession {
    pub fn new(config: &LibraryConfig, transcript: Transcript) -> Result<Self> {
        let admin = config.admin();
        let mut library = Library::new(config.rules());
        if config.seed_books() {
            library.seed_starter_books(&admin)?;
            tracing::debug!(count = library.books().len(), "seeded starter books");
        }
        Ok(Self {
            library,
            admin,
            transcript,
        })
    }
}

/// Record the gate decision for `actor` attempting `action`
fn audit(transcript: &mut Transcript, actor: &User, action: Action) {
    let decision = policy::decide(actor, action);
    tracing::debug!(
        actor = %actor.name,
        action = action.as_str(),
        decision = decision.as_str(),
        "policy decision"
    );
    let _ = transcript.policy_decision(
        &actor.name,
        actor.role().as_str(),
        action.as_str(),
        decision.as_str(),
    );
}

pub fn run(session: &mut LibrarySession, prompter: &mut dyn Prompter) -> Result<()> {
    let _ = session.transcript.session_start();
    if !session.library.books().is_empty() {
        println!("\nInitial set of books added to the library.");
    }
    display_available_books(&session.library);

    loop {
        print_menu();
        let Some(choice) = prompter.read_line("Enter your choice: ")? else {
            break;
        };

        match handle_choice(session, prompter, choice.trim()) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) if e.is::<InputClosed>() => break,
            Err(e) => match e.downcast::<LibraryError>() {
                Ok(domain) => {
                    println!("Error: {}", domain);
                    let _ = session.transcript.error(choice.trim(), &domain.to_string());
                }
                Err(other) => return Err(other),
            },
        }
    }

    let _ = session.transcript.session_end();
    Ok(())
}

fn print_menu() {
    println!("\n--- Library Management System ---");
    println!("1. Admin: Add Book");
    println!("2. Admin: Remove Book");
    println!("3. Admin: Register User");
    println!("4. Admin: Remove User");
    println!("5. User: Borrow Book");
    println!("6. User: Return Book");
    println!("7. User: View Profile");
    println!("8. Display Available Books");
    println!("9. Display All Books");
    println!("10. Exit");
}

fn handle_choice(
    session: &mut LibrarySession,
    prompter: &mut dyn Prompter,
    choice: &str,
) -> Result<Flow> {
    match choice {
        "1" => {
            let title = ask(prompter, "Enter book title: ")?;
            let author = ask(prompter, "Enter book author: ")?;
            let isbn = ask(prompter, "Enter book ISBN: ")?;
            audit(&mut session.transcript, &session.admin, Action::AddBook);
            let book = Book::new(title.trim(), author.trim(), isbn.trim());
            let title = book.title.clone();
            session.library.add_book(&session.admin, book)?;
            println!(
                "Admin '{}' added the book '{}' to the library.",
                session.admin.name, title
            );
            let _ = session.transcript.book_added(&session.admin.name, &title);
        }
        "2" => {
            let title = ask(prompter, "Enter book title to remove: ")?;
            audit(&mut session.transcript, &session.admin, Action::RemoveBook);
            let removed = session.library.remove_book(&session.admin, title.trim())?;
            println!(
                "Admin '{}' removed the book '{}' from the library.",
                session.admin.name, removed.title
            );
            let _ = session
                .transcript
                .book_removed(&session.admin.name, &removed.title);
        }
        "3" => {
            let name = ask(prompter, "Enter new user name: ")?;
            let password = ask(prompter, "Enter password for the user: ")?;
            let name = name.trim().to_string();
            if name.is_empty() {
                println!("User name cannot be empty.");
                return Ok(Flow::Continue);
            }
            audit(&mut session.transcript, &session.admin, Action::RegisterMember);
            session
                .library
                .register_user(&session.admin, User::new(name.clone(), password))?;
            println!(
                "Admin '{}' registered '{}' as a member.",
                session.admin.name, name
            );
            let _ = session
                .transcript
                .member_registered(&session.admin.name, &name);
        }
        "4" => {
            let name = ask(prompter, "Enter user name to remove: ")?;
            audit(&mut session.transcript, &session.admin, Action::RemoveMember);
            let removed = session.library.remove_user(&session.admin, name.trim())?;
            println!(
                "Admin '{}' removed '{}' from the library members.",
                session.admin.name, removed.name
            );
            let _ = session
                .transcript
                .member_removed(&session.admin.name, &removed.name);
        }
        "5" => {
            if let Some(name) = authenticate(session, prompter, Action::Borrow)? {
                borrow_book(session, prompter, &name)?;
            }
        }
        "6" => {
            if let Some(name) = authenticate(session, prompter, Action::Return)? {
                return_book(session, prompter, &name)?;
            }
        }
        "7" => {
            if let Some(name) = authenticate(session, prompter, Action::ViewProfile)? {
                let profile = session.library.profile(&name, Local::now())?;
                println!();
                print!("{}", profile.format_display());
            }
        }
        "8" => display_available_books(&session.library),
        "9" => display_all_books(&session.library),
        "10" => {
            println!("Exiting the Library Management System. Goodbye!");
            return Ok(Flow::Exit);
        }
        _ => println!("Invalid choice. Please try again."),
    }
    Ok(Flow::Continue)
}

/// Prompt for member credentials before a member action; returns the
/// member name on success
fn authenticate(
    session: &mut LibrarySession,
    prompter: &mut dyn Prompter,
    action: Action,
) -> Result<Option<String>> {
    let name = ask(prompter, "Enter your name: ")?;
    let password = ask(prompter, "Enter your password: ")?;
    match session.library.authenticate(name.trim(), &password) {
        Some(user) => {
            audit(&mut session.transcript, user, action);
            Ok(Some(user.name.clone()))
        }
        None => {
            println!("Invalid credentials. Please try again.");
            Ok(None)
        }
    }
}

fn display_available_books(library: &Library) {
    println!("\nAvailable Books:");
    let available = library.available_books();
    if available.is_empty() {
        println!("No books are currently available.");
    }
    for (idx, book) in available.iter().enumerate() {
        println!("{}. {} by {}", idx + 1, book.title, book.author);
    }
}

fn display_all_books(library: &Library) {
    println!("\nAll Books:");
    if library.books().is_empty() {
        println!("The library has no books.");
    }
    for book in library.books() {
        println!("{} {}", book.id(), book.display_info());
    }
}

fn borrow_book(
    session: &mut LibrarySession,
    prompter: &mut dyn Prompter,
    name: &str,
) -> Result<()> {
    session.library.check_can_borrow(name)?;

    display_available_books(&session.library);
    let available: Vec<_> = session
        .library
        .available_books()
        .iter()
        .map(|b| b.id())
        .collect();
    if available.is_empty() {
        println!("No books available to borrow.");
        return Ok(());
    }

    let choice = ask(prompter, "Enter the number of the book you want to borrow: ")?;
    let Some(idx) = parse_index(&choice, available.len()) else {
        println!("Invalid choice.");
        return Ok(());
    };

    let book = session.library.borrow(name, available[idx], Local::now())?;
    let title = book.title.clone();
    let due = book.due_date().as_ref().map(format_due).unwrap_or_default();
    println!("'{}' has been borrowed by {} (Due: {}).", title, name, due);
    let _ = session.transcript.book_borrowed(name, &title, &due);
    Ok(())
}

fn return_book(
    session: &mut LibrarySession,
    prompter: &mut dyn Prompter,
    name: &str,
) -> Result<()> {
    let held: Vec<_> = session
        .library
        .borrowed_by(name)
        .iter()
        .map(|b| (b.id(), b.title.clone(), b.due_date()))
        .collect();
    if held.is_empty() {
        println!("You have no books to return.");
        return Ok(());
    }

    println!("\nYour Borrowed Books:");
    for (idx, (_, title, due)) in held.iter().enumerate() {
        let due = due.as_ref().map(format_due).unwrap_or_default();
        println!("{}. {} (Due: {})", idx + 1, title, due);
    }

    let choice = ask(prompter, "Enter the number of the book you want to return: ")?;
    let Some(idx) = parse_index(&choice, held.len()) else {
        println!("Invalid choice.");
        return Ok(());
    };

    let (id, title, _) = &held[idx];
    session.library.return_book(name, *id)?;
    println!("{} returned '{}'.", name, title);
    let _ = session.transcript.book_returned(name, title);
    Ok(())
}
