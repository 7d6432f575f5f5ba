//! Menu loop for the lesson and quiz program.

use super::{ask, parse_index, Flow, InputClosed, Prompter};
use crate::error::AccountError;
use crate::learn::{
    format_lesson_menu, format_progress, AccountProgress, AccountStore, AuthOutcome, Catalog,
    Feedback, GuidedLesson, LoadSource,
};
use crate::transcript::Transcript;
use anyhow::Result;

pub struct LearnSession {
    pub store: AccountStore,
    pub catalog: Catalog,
    pub transcript: Transcript,
    pub current_user: Option<String>,
}

impl LearnSession {
    pub fn new(store: AccountStore, catalog: Catalog, transcript: Transcript) -> Self {
        Self {
            store,
            catalog,
            transcript,
            current_user: None,
        }
    }
}

/// Report how the account store was loaded
pub fn report_load(store: &AccountStore, source: &LoadSource) {
    match source {
        LoadSource::File => {
            tracing::debug!(accounts = store.len(), "loaded account store");
        }
        LoadSource::Missing => {
            tracing::info!(path = %store.path().display(), "no account file yet, starting empty");
        }
        LoadSource::Discarded(e) => println!("Error loading user data: {}", e),
    }
}

pub fn run(session: &mut LearnSession, prompter: &mut dyn Prompter) -> Result<()> {
    let _ = session.transcript.session_start();

    loop {
        if let Some(user) = &session.current_user {
            if !session.store.contains(user) {
                println!("User session invalid. Please log in again.");
                session.current_user = None;
            }
        }

        print_menu(session.current_user.as_deref());
        let Some(choice) = prompter.read_line("Enter your choice: ")? else {
            println!("\nExiting the program. Goodbye!");
            save_store(&session.store);
            break;
        };

        let result = match session.current_user.clone() {
            Some(user) => handle_member_choice(session, prompter, &user, choice.trim()),
            None => handle_guest_choice(session, prompter, choice.trim()),
        };

        match result {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) if e.is::<InputClosed>() => {
                println!("\nExiting the program. Goodbye!");
                save_store(&session.store);
                break;
            }
            Err(e) => match e.downcast::<AccountError>() {
                Ok(account) => {
                    println!("Error: {}", account);
                    let _ = session.transcript.error(choice.trim(), &account.to_string());
                }
                Err(other) => return Err(other),
            },
        }
    }

    let _ = session.transcript.session_end();
    Ok(())
}

fn print_menu(current_user: Option<&str>) {
    println!("\n--- Python Learning Program ---");
    match current_user {
        Some(user) => {
            println!("Logged in as: {}", user);
            println!("1. View Lessons");
            println!("2. View Progress");
            println!("3. Log Out");
            println!("4. Exit");
        }
        None => {
            println!("1. Log in / Sign up");
            println!("2. Exit");
        }
    }
}

fn save_store(store: &AccountStore) {
    if let Err(e) = store.save() {
        println!("Error saving user data: {}", e);
    }
}

fn handle_guest_choice(
    session: &mut LearnSession,
    prompter: &mut dyn Prompter,
    choice: &str,
) -> Result<Flow> {
    match choice {
        "1" => {
            session.current_user = log_in(session, prompter)?;
        }
        "2" => {
            println!("Exiting the program. Goodbye!");
            return Ok(Flow::Exit);
        }
        _ => println!("Invalid choice! Please try again."),
    }
    Ok(Flow::Continue)
}

fn handle_member_choice(
    session: &mut LearnSession,
    prompter: &mut dyn Prompter,
    user: &str,
    choice: &str,
) -> Result<Flow> {
    match choice {
        "1" => view_categories(session, prompter, user)?,
        "2" => {
            if let Some(progress) = session.store.progress(user) {
                println!();
                print!("{}", format_progress(user, &session.catalog, progress));
            } else {
                println!("User '{}' does not exist or has no progress data.", user);
            }
        }
        "3" => {
            println!("\n--- Logging Out ---");
            println!("You have been logged out successfully. Returning to the main menu...");
            session.current_user = None;
        }
        "4" => {
            println!("Saving progress and exiting. Goodbye!");
            save_store(&session.store);
            return Ok(Flow::Exit);
        }
        _ => println!("Invalid choice! Please try again."),
    }
    Ok(Flow::Continue)
}

/// Log in an existing user, reset their password, or sign up a new one.
/// Returns the logged-in username.
fn log_in(session: &mut LearnSession, prompter: &mut dyn Prompter) -> Result<Option<String>> {
    println!("\n--- Log In / Sign Up ---");
    let username = ask(prompter, "Enter your username: ")?.trim().to_string();
    if username.is_empty() {
        println!("Username cannot be empty.");
        return Ok(None);
    }

    if !session.store.contains(&username) {
        println!("Username not found. Creating a new account...");
        let Some(password) =
            confirmed_password(prompter, "Set your password: ", "Confirm your password: ")?
        else {
            return Ok(None);
        };
        session.store.add_user(&username, &password)?;
        let _ = session.transcript.account_created(&username);
        println!("Account created successfully!");
        return Ok(Some(username));
    }

    println!("Welcome back, returning user!");
    let password = ask(prompter, "Enter your password or type 'reset' to reset it: ")?;
    if password.trim().eq_ignore_ascii_case("reset") {
        println!("Resetting your password...");
        let Some(new_password) = confirmed_password(
            prompter,
            "Enter your new password: ",
            "Confirm your new password: ",
        )?
        else {
            return Ok(None);
        };
        session.store.reset_password(&username, &new_password)?;
        let _ = session.transcript.password_reset(&username);
        println!("Password reset successfully!");
        return Ok(Some(username));
    }

    match session.store.authenticate(&username, &password) {
        AuthOutcome::Ok => {
            let _ = session.transcript.login(&username, true);
            println!("Welcome back, {}!", username);
            Ok(Some(username))
        }
        AuthOutcome::WrongPassword | AuthOutcome::UnknownUser => {
            let _ = session.transcript.login(&username, false);
            println!("Incorrect password. Try again or type 'reset' to reset it.");
            Ok(None)
        }
    }
}

/// Ask for a password twice; `None` when the two entries differ
fn confirmed_password(
    prompter: &mut dyn Prompter,
    prompt: &str,
    confirm_prompt: &str,
) -> Result<Option<String>> {
    let password = ask(prompter, prompt)?;
    let confirm = ask(prompter, confirm_prompt)?;
    if password != confirm {
        println!("Passwords do not match. Please try again.");
        return Ok(None);
    }
    Ok(Some(password))
}

fn view_categories(
    session: &mut LearnSession,
    prompter: &mut dyn Prompter,
    user: &str,
) -> Result<()> {
    loop {
        println!("\n--- Categories ---");
        for (i, category) in session.catalog.categories.iter().enumerate() {
            println!("{}. {}", i + 1, category.name);
        }
        println!("m. Main Menu");

        let choice = ask(
            prompter,
            "\nEnter the category number or 'm' to return to the main menu: ",
        )?;
        if choice.trim().eq_ignore_ascii_case("m") {
            return Ok(());
        }
        match parse_index(&choice, session.catalog.categories.len()) {
            Some(idx) => {
                if view_lessons(session, prompter, user, idx)? == Flow::Exit {
                    return Ok(());
                }
            }
            None => println!("Invalid choice!"),
        }
    }
}

/// Lesson list of one category. `Flow::Exit` means back to the main menu.
fn view_lessons(
    session: &mut LearnSession,
    prompter: &mut dyn Prompter,
    user: &str,
    category_idx: usize,
) -> Result<Flow> {
    loop {
        let category = &session.catalog.categories[category_idx];
        println!("\n--- {} Lessons ---", category.name);
        let empty = Default::default();
        let progress = session.store.progress(user).unwrap_or(&empty);
        for line in format_lesson_menu(category, progress) {
            println!("{}", line);
        }
        println!("m. Main Menu");

        let choice = ask(
            prompter,
            "\nEnter the lesson number to view or 'm' to return to the main menu: ",
        )?;
        let choice = choice.trim();
        if choice.eq_ignore_ascii_case("m") {
            return Ok(Flow::Exit);
        }
        if category.lesson(choice).is_some() {
            view_lesson(session, prompter, user, category_idx, choice)?;
        } else {
            println!("Invalid choice!");
        }
    }
}

fn view_lesson(
    session: &mut LearnSession,
    prompter: &mut dyn Prompter,
    user: &str,
    category_idx: usize,
    lesson_id: &str,
) -> Result<()> {
    let LearnSession {
        store,
        catalog,
        transcript,
        ..
    } = session;
    let Some(lesson) = catalog.categories[category_idx].lesson(lesson_id) else {
        return Ok(());
    };

    println!("\n{}", lesson.display());
    ask(prompter, "\nPress Enter to take the quiz...")?;

    let tracker = AccountProgress {
        store,
        username: user,
    };
    let mut guided = GuidedLesson::new(lesson, tracker);
    let mut attempt = guided.attempt();
    while let Some(prompt) = attempt.next_prompt() {
        let given = ask(prompter, &prompt)?;
        match attempt.answer(&given) {
            Some(Feedback::Correct) => println!("Correct!"),
            Some(Feedback::Incorrect { expected }) => {
                println!("Incorrect. The correct answer is '{}'.", expected)
            }
            None => break,
        }
    }

    let outcome = attempt.outcome();
    println!("\n{}", outcome.summary());
    let _ = transcript.quiz_result(user, &lesson.id, outcome.correct, outcome.total);
    if guided.finish(outcome)? {
        println!("Lesson marked as complete!");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::ScriptedPrompter;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> LearnSession {
        LearnSession::new(
            reopen(dir),
            Catalog::builtin().unwrap(),
            Transcript::disabled("test", "learn"),
        )
    }

    fn reopen(dir: &TempDir) -> AccountStore {
        let mut store = AccountStore::new(dir.path().join("users.json"));
        store.load();
        store
    }

    const SYNTAX_ANSWERS: [&str; 5] = ["print", "indentation", "yes", "def", "newline"];

    #[test]
    fn test_sign_up_and_complete_lesson() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut script = vec!["1", "alice", "pw", "pw", "1", "1", "1", ""];
        script.extend(SYNTAX_ANSWERS);
        script.extend(["m", "4"]);
        let mut p = ScriptedPrompter::new(&script);
        run(&mut s, &mut p).unwrap();

        let reloaded = reopen(&dir);
        assert!(reloaded.get("alice").unwrap().has_completed("1"));
    }

    #[test]
    fn test_wrong_answer_leaves_lesson_incomplete() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut p = ScriptedPrompter::new(&[
            "1", "alice", "pw", "pw", "1", "1", "1", "", "echo", "indentation", "yes", "def",
            "newline", "m", "4",
        ]);
        run(&mut s, &mut p).unwrap();
        assert!(!s.store.get("alice").unwrap().has_completed("1"));
    }

    #[test]
    fn test_mismatched_signup_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut p = ScriptedPrompter::new(&["1", "alice", "pw", "other", "2"]);
        run(&mut s, &mut p).unwrap();
        assert_eq!(s.store.len(), 0);
        assert!(s.current_user.is_none());
    }

    #[test]
    fn test_returning_user_login_and_reset() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.store.add_user("bob", "old").unwrap();

        let mut p = ScriptedPrompter::new(&[
            "1", "bob", "wrong", // rejected
            "1", "bob", "reset", "new", "new", // reset logs in
            "3", // log out
            "1", "bob", "new", // log in with new password
        ]);
        run(&mut s, &mut p).unwrap();
        assert_eq!(s.current_user.as_deref(), Some("bob"));

        let reloaded = reopen(&dir);
        assert_eq!(reloaded.authenticate("bob", "new"), AuthOutcome::Ok);
    }

    #[test]
    fn test_invalid_menu_choices() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut p = ScriptedPrompter::new(&[
            "9", "1", "alice", "pw", "pw", "7", "1", "0", "9", "m", "2", "4",
        ]);
        run(&mut s, &mut p).unwrap();
        assert!(s.store.contains("alice"));
        assert!(p.prompts.iter().any(|pr| pr.contains("category number")));
    }
}
