//! Lessons, quizzes and learner accounts.

pub mod accounts;
pub mod catalog;
pub mod quiz;

pub use accounts::{AccountStore, AuthOutcome, LoadSource, DEFAULT_ACCOUNTS_FILE};
pub use catalog::Catalog;
pub use quiz::{AccountProgress, Feedback, GuidedLesson};

use catalog::Category;
use quiz::ProgressTracker;

/// Per-category completion listing for one learner
pub fn format_progress<P: ProgressTracker>(
    username: &str,
    catalog: &Catalog,
    progress: &P,
) -> String {
    let mut out = format!("--- {}'s Progress ---\n", username);
    for category in &catalog.categories {
        out.push_str(&format!("{}:\n", category.name));
        for lesson in &category.lessons {
            let status = if progress.is_complete(&lesson.id) {
                "Completed"
            } else {
                "Not Completed"
            };
            out.push_str(&format!("  {}: {}\n", lesson.name, status));
        }
    }
    out
}

/// Lesson menu lines for a category with completion markers
pub fn format_lesson_menu<P: ProgressTracker>(category: &Category, progress: &P) -> Vec<String> {
    category
        .lessons
        .iter()
        .map(|lesson| {
            let mark = if progress.is_complete(&lesson.id) {
                "[x]"
            } else {
                "[ ]"
            };
            format!("{}. {} {}", lesson.id, lesson.name, mark)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learn::accounts::Progress;

    #[test]
    fn test_format_progress() {
        let catalog = Catalog::builtin().unwrap();
        let mut progress = Progress::new();
        progress.insert("2".to_string(), true);

        let report = format_progress("alice", &catalog, &progress);
        assert!(report.starts_with("--- alice's Progress ---"));
        assert!(report.contains("Python Basics:\n"));
        assert!(report.contains("  Variables: Completed\n"));
        assert!(report.contains("  Python Syntax: Not Completed\n"));
    }

    #[test]
    fn test_format_lesson_menu() {
        let catalog = Catalog::builtin().unwrap();
        let mut progress = Progress::new();
        progress.insert("1".to_string(), true);

        let lines = format_lesson_menu(&catalog.categories[0], &progress);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "1. Python Syntax [x]");
        assert_eq!(lines[1], "2. Variables [ ]");
    }
}
