//! Task status state machine and progress-note ledger.
//!
//! ```text
//! todo ──> in_progress ──> completed
//!   │           │
//!   └───────────┴────────> cancelled
//! ```
//!
//! Re-setting the current status is always accepted, including on terminal tasks, so a
//! progress note can still be attached.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use crate::error::{Error, Result};
use crate::task::{Task, TaskStatus};

/// Longest progress note accepted, in characters
pub const MAX_NOTE_LENGTH: usize = 2000;

// == Transition Table ==
impl TaskStatus {
    /// Whether `self -> next` is a permitted transition.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;

        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Todo, InProgress) | (Todo, Cancelled) | (InProgress, Completed) | (InProgress, Cancelled)
        )
    }
}

/// Checks a requested status change.
pub fn check_transition(from: TaskStatus, to: TaskStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(Error::InvalidTransition { from, to })
    }
}

// == Notes ==
/// Trims a note, strips control characters, and enforces length limits.
pub fn sanitize_note(text: &str) -> Result<String> {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(Error::validation("progress_note", "must not be empty"));
    }
    if cleaned.chars().count() > MAX_NOTE_LENGTH {
        return Err(Error::validation(
            "progress_note",
            format!("must be at most {} characters", MAX_NOTE_LENGTH),
        ));
    }
    Ok(cleaned.to_string())
}

/// Formats a ledger record as `"<rfc3339 timestamp>: <text>"`.
pub fn format_note(at: DateTime<Utc>, text: &str) -> String {
    format!("{}: {}", at.to_rfc3339_opts(SecondsFormat::Millis, true), text)
}

// == Apply ==
/// Applies a status change and optional note to `task`.
///
/// Everything is validated before `task` is touched: on error the task is unchanged.
/// On success `updated_at` becomes `now`.
pub fn apply_status_update(
    task: &mut Task,
    requested: Option<TaskStatus>,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    if let Some(next) = requested {
        if let Err(err) = check_transition(task.status, next) {
            warn!(task_id = %task.id, from = %task.status, to = %next, "rejected status transition");
            return Err(err);
        }
    }
    let note = note.map(sanitize_note).transpose()?;

    if let Some(next) = requested {
        task.status = next;
    }
    if let Some(text) = note {
        task.progress_notes.push(format_note(now, &text));
    }
    task.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use TaskStatus::*;

    #[test]
    fn test_transition_table() {
        let allowed = [
            (Todo, InProgress),
            (Todo, Cancelled),
            (InProgress, Completed),
            (InProgress, Cancelled),
        ];

        for from in TaskStatus::ALL {
            for to in TaskStatus::ALL {
                let expected = from == to || allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_todo_cannot_complete_directly() {
        assert!(matches!(
            check_transition(Todo, Completed),
            Err(Error::InvalidTransition { from: Todo, to: Completed })
        ));
    }

    #[test]
    fn test_terminal_rejects_changes() {
        for terminal in [Completed, Cancelled] {
            for to in TaskStatus::ALL.into_iter().filter(|s| *s != terminal) {
                assert!(check_transition(terminal, to).is_err());
            }
        }
    }

    #[test]
    fn test_apply_appends_note_and_bumps_updated_at() {
        let mut task = Task::new("1", "t");
        let now = task.updated_at + chrono::Duration::seconds(5);

        apply_status_update(&mut task, Some(InProgress), Some("  started\n"), now).unwrap();

        assert_eq!(task.status, InProgress);
        assert_eq!(task.updated_at, now);
        assert_eq!(task.progress_notes.len(), 1);
        assert!(task.progress_notes[0].ends_with(": started"));
        assert!(task.progress_notes[0].starts_with(&now.to_rfc3339_opts(SecondsFormat::Millis, true)));
    }

    #[test]
    fn test_identity_on_completed_allows_note() {
        let mut task = Task::new("1", "t").with_status(Completed);
        task.progress_notes.push("old".to_string());

        apply_status_update(&mut task, Some(Completed), Some("follow-up"), Utc::now()).unwrap();

        assert_eq!(task.status, Completed);
        assert_eq!(task.progress_notes.len(), 2);
        assert_eq!(task.progress_notes[0], "old");
    }

    #[test]
    fn test_rejected_transition_leaves_task_untouched() {
        let mut task = Task::new("1", "t").with_status(Cancelled);
        let before = task.clone();

        let result = apply_status_update(&mut task, Some(InProgress), Some("note"), Utc::now());

        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        assert_eq!(task, before);
    }

    #[test]
    fn test_invalid_note_leaves_task_untouched() {
        let mut task = Task::new("1", "t");
        let before = task.clone();

        let result = apply_status_update(&mut task, Some(InProgress), Some("   "), Utc::now());

        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(task, before);
    }

    #[test]
    fn test_sanitize_note_limits() {
        assert_eq!(sanitize_note("a\tb").unwrap(), "a b");
        assert!(sanitize_note(&"x".repeat(MAX_NOTE_LENGTH)).is_ok());
        assert!(sanitize_note(&"x".repeat(MAX_NOTE_LENGTH + 1)).is_err());
    }
}
