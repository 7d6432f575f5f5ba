use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Append-only JSONL record of a console session
pub struct Transcript {
    session_id: String,
    subsystem: String,
    file: Option<File>,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    subsystem: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Transcript {
    pub fn new(path: &Path, session_id: &str, subsystem: &str) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            session_id: session_id.to_string(),
            subsystem: subsystem.to_string(),
            file: Some(file),
        })
    }

    /// A transcript that records nothing
    pub fn disabled(session_id: &str, subsystem: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            subsystem: subsystem.to_string(),
            file: None,
        }
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            subsystem: &self.subsystem,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }

    pub fn session_start(&mut self) -> Result<()> {
        self.log("session_start", serde_json::json!({}))
    }

    pub fn session_end(&mut self) -> Result<()> {
        self.log("session_end", serde_json::json!({}))
    }

    /// Log a privilege decision for a library action
    pub fn policy_decision(
        &mut self,
        actor: &str,
        role: &str,
        action: &str,
        decision: &str,
    ) -> Result<()> {
        self.log(
            "policy_decision",
            serde_json::json!({
                "actor": actor,
                "role": role,
                "action": action,
                "decision": decision,
            }),
        )
    }

    pub fn book_added(&mut self, actor: &str, title: &str) -> Result<()> {
        self.log(
            "book_added",
            serde_json::json!({ "actor": actor, "title": title }),
        )
    }

    pub fn book_removed(&mut self, actor: &str, title: &str) -> Result<()> {
        self.log(
            "book_removed",
            serde_json::json!({ "actor": actor, "title": title }),
        )
    }

    pub fn member_registered(&mut self, actor: &str, member: &str) -> Result<()> {
        self.log(
            "member_registered",
            serde_json::json!({ "actor": actor, "member": member }),
        )
    }

    pub fn member_removed(&mut self, actor: &str, member: &str) -> Result<()> {
        self.log(
            "member_removed",
            serde_json::json!({ "actor": actor, "member": member }),
        )
    }

    pub fn book_borrowed(&mut self, member: &str, title: &str, due: &str) -> Result<()> {
        self.log(
            "book_borrowed",
            serde_json::json!({ "member": member, "title": title, "due": due }),
        )
    }

    pub fn book_returned(&mut self, member: &str, title: &str) -> Result<()> {
        self.log(
            "book_returned",
            serde_json::json!({ "member": member, "title": title }),
        )
    }

    /// Log a domain error reported to the user
    pub fn error(&mut self, context: &str, message: &str) -> Result<()> {
        self.log(
            "error",
            serde_json::json!({ "context": context, "message": message }),
        )
    }

    pub fn login(&mut self, username: &str, ok: bool) -> Result<()> {
        self.log(
            "login",
            serde_json::json!({ "username": username, "ok": ok }),
        )
    }

    pub fn account_created(&mut self, username: &str) -> Result<()> {
        self.log(
            "account_created",
            serde_json::json!({ "username": username }),
        )
    }

    pub fn password_reset(&mut self, username: &str) -> Result<()> {
        self.log(
            "password_reset",
            serde_json::json!({ "username": username }),
        )
    }

    pub fn quiz_result(
        &mut self,
        username: &str,
        lesson_id: &str,
        correct: usize,
        total: usize,
    ) -> Result<()> {
        self.log(
            "quiz_result",
            serde_json::json!({
                "username": username,
                "lesson_id": lesson_id,
                "correct": correct,
                "total": total,
            }),
        )
    }
}
