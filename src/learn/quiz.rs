//! Quiz attempts and lesson completion.
//!
//! A [`GuidedLesson`] pairs a lesson's content with something that tracks
//! progress; the attempt itself is driven one answer at a time by the caller.

use super::accounts::{AccountStore, Progress};
use super::catalog::{Lesson, Question};
use crate::error::AccountError;

/// Result of a single answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect { expected: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub correct: usize,
    pub total: usize,
}

impl QuizOutcome {
    pub fn is_perfect(&self) -> bool {
        self.correct == self.total
    }

    pub fn summary(&self) -> String {
        format!(
            "Quiz completed! You got {}/{} correct.",
            self.correct, self.total
        )
    }
}

/// An in-progress walk through a lesson's questions
#[derive(Debug)]
pub struct QuizAttempt<'a> {
    questions: &'a [Question],
    position: usize,
    correct: usize,
}

impl<'a> QuizAttempt<'a> {
    pub fn new(lesson: &'a Lesson) -> Self {
        Self {
            questions: &lesson.quiz,
            position: 0,
            correct: 0,
        }
    }

    /// Prompt text for the next unanswered question
    pub fn next_prompt(&self) -> Option<String> {
        self.questions
            .get(self.position)
            .map(|q| format!("{} (Hint: {}) ", q.question, q.hint()))
    }

    /// Grade `given` against the current question and advance.
    /// Returns `None` once every question has been answered.
    pub fn answer(&mut self, given: &str) -> Option<Feedback> {
        let question = self.questions.get(self.position)?;
        self.position += 1;
        if question.accepts(given) {
            self.correct += 1;
            Some(Feedback::Correct)
        } else {
            Some(Feedback::Incorrect {
                expected: question.answer.clone(),
            })
        }
    }

    pub fn outcome(&self) -> QuizOutcome {
        QuizOutcome {
            correct: self.correct,
            total: self.questions.len(),
        }
    }
}

/// Something that records which lessons a learner has completed
pub trait ProgressTracker {
    fn is_complete(&self, lesson_id: &str) -> bool;
    fn mark_complete(&mut self, lesson_id: &str) -> Result<(), AccountError>;
}

impl ProgressTracker for Progress {
    fn is_complete(&self, lesson_id: &str) -> bool {
        self.get(lesson_id).copied().unwrap_or(false)
    }

    fn mark_complete(&mut self, lesson_id: &str) -> Result<(), AccountError> {
        self.insert(lesson_id.to_string(), true);
        Ok(())
    }
}

/// Progress of one account, persisted through the store on every change
pub struct AccountProgress<'a> {
    pub store: &'a mut AccountStore,
    pub username: &'a str,
}

impl ProgressTracker for AccountProgress<'_> {
    fn is_complete(&self, lesson_id: &str) -> bool {
        self.store
            .get(self.username)
            .is_some_and(|a| a.has_completed(lesson_id))
    }

    fn mark_complete(&mut self, lesson_id: &str) -> Result<(), AccountError> {
        self.store.mark_complete(self.username, lesson_id)
    }
}

/// A lesson bundled with the progress it reports to
pub struct GuidedLesson<'a, P: ProgressTracker> {
    pub lesson: &'a Lesson,
    pub tracker: P,
}

impl<'a, P: ProgressTracker> GuidedLesson<'a, P> {
    pub fn new(lesson: &'a Lesson, tracker: P) -> Self {
        Self { lesson, tracker }
    }

    pub fn attempt(&self) -> QuizAttempt<'a> {
        QuizAttempt::new(self.lesson)
    }

    /// Record the attempt; the lesson completes only on a perfect score.
    /// Returns whether the lesson was marked complete.
    pub fn finish(&mut self, outcome: QuizOutcome) -> Result<bool, AccountError> {
        if !outcome.is_perfect() {
            return Ok(false);
        }
        self.tracker.mark_complete(&self.lesson.id)?;
        Ok(true)
    }
}
