//! User interaction seam for delete confirmation and notifications.
//!
//! The manager never talks to a terminal or a window directly; front ends
//! provide a [`DialogService`]. [`ScriptedDialog`] answers with a fixed choice
//! and records what it was shown, for non-interactive runs and tests.

use std::sync::{Mutex, PoisonError};

/// Answer to the delete-or-remove question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeleteChoice {
    /// Unlink the attachment from the entry, keep the file.
    Remove,
    /// Unlink the attachment and delete the file from disk.
    Delete,
    /// Do nothing.
    Cancel,
}

impl std::str::FromStr for DeleteChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remove" | "r" => Ok(Self::Remove),
            "delete" | "d" => Ok(Self::Delete),
            "cancel" | "c" => Ok(Self::Cancel),
            other => Err(format!(
                "unknown choice '{other}' (expected remove, delete or cancel)"
            )),
        }
    }
}

/// Content of the three-way delete confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub title: String,
    pub message: String,
    pub remove_label: String,
    pub delete_label: String,
    pub cancel_label: String,
}

impl DeletePrompt {
    /// Builds the standard prompt for deleting `path`.
    #[must_use]
    pub fn for_file(path: &std::path::Path) -> Self {
        Self {
            title: "Delete file".to_string(),
            message: format!("Delete '{}'?", path.display()),
            remove_label: "Remove from entry".to_string(),
            delete_label: "Delete from disk".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// Front-end hook for confirmation prompts and user-visible messages.
pub trait DialogService: Send + Sync {
    /// Asks whether to remove, delete or cancel. `None` means the prompt was
    /// dismissed and is treated as cancel.
    fn ask_delete_or_remove(&self, prompt: &DeletePrompt) -> Option<DeleteChoice>;

    /// Shows an informational or error message.
    fn notify(&self, message: &str);
}

/// Dialog that always answers with the same choice and records every
/// prompt and notification it receives.
#[derive(Debug)]
pub struct ScriptedDialog {
    answer: Option<DeleteChoice>,
    prompts: Mutex<Vec<DeletePrompt>>,
    notifications: Mutex<Vec<String>>,
}

impl ScriptedDialog {
    #[must_use]
    pub fn new(answer: Option<DeleteChoice>) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn answering(choice: DeleteChoice) -> Self {
        Self::new(Some(choice))
    }

    /// Prompts shown so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<DeletePrompt> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages passed to [`DialogService::notify`] so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ScriptedDialog {
    fn default() -> Self {
        Self::new(Some(DeleteChoice::Cancel))
    }
}

impl DialogService for ScriptedDialog {
    fn ask_delete_or_remove(&self, prompt: &DeletePrompt) -> Option<DeleteChoice> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.clone());
        self.answer
    }

    fn notify(&self, message: &str) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
