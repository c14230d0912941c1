//! Entity managers
//!
//! Input sanitization and id allocation on top of [`EntityStore`](crate::store::EntityStore).

mod context;
mod memory;
mod task;

pub use context::{ContextEntry, ContextManager, ContextUpdate, NewContext};
pub use memory::{Memory, MemoryManager, MemoryUpdate, NewMemory};
pub use task::{NewTask, TaskManager, TaskUpdate};

use crate::error::{Error, Result};

/// Longest title or name accepted, in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Longest free-text body accepted, in characters
pub const MAX_CONTENT_LENGTH: usize = 50_000;

/// Drops control characters other than newlines and tabs, then trims.
fn strip_controls(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitizes a required single-line field.
fn required_text(field: &str, value: &str, max: usize) -> Result<String> {
    let cleaned = strip_controls(&value.replace(['\n', '\r', '\t'], " "));
    if cleaned.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    check_length(field, &cleaned, max)?;
    Ok(cleaned)
}

/// Sanitizes a free-text field that may be empty.
fn optional_text(field: &str, value: &str, max: usize) -> Result<String> {
    let cleaned = strip_controls(value);
    check_length(field, &cleaned, max)?;
    Ok(cleaned)
}

/// Sanitizes a multi-line field that must not be blank.
fn required_block(field: &str, value: &str, max: usize) -> Result<String> {
    let cleaned = optional_text(field, value, max)?;
    if cleaned.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(cleaned)
}

fn check_length(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(Error::validation(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// Next decimal id: one more than the largest numeric id in use.
fn next_id<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let max = ids
        .into_iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    max.checked_add(1)
        .map(|next| next.to_string())
        .ok_or_else(|| Error::validation("id", format!("no numeric id left after {}", max)))
}
