//! Console front ends for both subsystems.

pub mod learn;
pub mod library;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Source of user input lines
pub trait Prompter {
    /// Read one line; `None` when the input is closed (EOF or Ctrl-C)
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive prompter backed by rustyline
pub struct EditorPrompter {
    rl: DefaultEditor,
}

impl EditorPrompter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rl: DefaultEditor::new()?,
        })
    }
}

impl Prompter for EditorPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.rl.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Raised when the user closes input in the middle of a prompt sequence
#[derive(Debug, thiserror::Error)]
#[error("input closed")]
pub struct InputClosed;

/// Read a line, treating closed input as an error the menu loops unwind on
pub fn ask(prompter: &mut dyn Prompter, prompt: &str) -> Result<String> {
    prompter
        .read_line(prompt)?
        .ok_or_else(|| InputClosed.into())
}

/// What a menu loop does after handling a choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Parse a 1-based menu number into an index into a list of `len` entries
pub fn parse_index(input: &str, len: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

#[cfg(test)]
pub mod testing {
    use super::Prompter;
    use anyhow::Result;
    use std::collections::VecDeque;

    /// Replays canned answers; input closes once they run out
    pub struct ScriptedPrompter {
        lines: VecDeque<String>,
        pub prompts: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|s| s.to_string()).collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
            self.prompts.push(prompt.to_string());
            Ok(self.lines.pop_front())
        }
    }
}
