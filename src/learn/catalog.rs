//! Static lesson catalog.
//!
//! The built-in catalog is compiled into the binary from `assets/lessons.toml`.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::HashSet;

const BUILTIN_LESSONS: &str = include_str!("../../assets/lessons.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub question: String,
    pub answer: String,
}

impl Question {
    /// First character of the expected answer
    pub fn hint(&self) -> String {
        self.answer.chars().next().map(String::from).unwrap_or_default()
    }

    /// Answers match when equal after trimming, ignoring case
    pub fn accepts(&self, given: &str) -> bool {
        given.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub quiz: Vec<Question>,
}

impl Lesson {
    pub fn display(&self) -> String {
        format!("--- {} ---\n{}", self.name, self.content)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(rename = "lesson", default)]
    pub lessons: Vec<Lesson>,
}

impl Category {
    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(rename = "category", default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    /// The catalog shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_LESSONS)
    }

    /// Parse a TOML catalog and check lesson ids are unique
    pub fn parse(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content)?;
        let mut seen = HashSet::new();
        for category in &catalog.categories {
            for lesson in &category.lessons {
                if !seen.insert(lesson.id.as_str()) {
                    return Err(anyhow!(
                        "duplicate lesson id '{}' in category '{}'",
                        lesson.id,
                        category.name
                    ));
                }
            }
        }
        Ok(catalog)
    }

    pub fn lesson_count(&self) -> usize {
        self.categories.iter().map(|c| c.lessons.len()).sum()
    }
}
