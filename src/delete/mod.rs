//! The delete-or-remove protocol for a single attachment.
//!
//! ```text
//! Resolving ──file missing──────────────────────────────▶ Done(removed)
//!     │
//!     └─file found─▶ AwaitingConfirmation ──Cancel/None──▶ Done(kept)
//!                          │
//!                          └─Remove/Delete─▶ Removing ──▶ Done(removed)
//! ```

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use crate::dialog::{DeleteChoice, DeletePrompt, DialogService};
use crate::entry::{LinkedFile, SharedEntry, lock_entry};
use crate::path::PathResolver;

/// Protocol states. Each run passes through them in order and ends in
/// [`DeleteState::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteState {
    Resolving,
    AwaitingConfirmation { path: PathBuf },
    Removing { path: PathBuf, choice: DeleteChoice },
    Done(DeleteOutcome),
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// True unless the user cancelled.
    pub removed: bool,
    /// The user's answer; `None` when no prompt was needed.
    pub choice: Option<DeleteChoice>,
    /// True if the file was deleted from disk.
    pub file_deleted: bool,
    /// Message for a non-fatal failure to delete the physical file.
    pub warning: Option<String>,
}

impl DeleteOutcome {
    fn unlinked_without_prompt() -> Self {
        Self {
            removed: true,
            choice: None,
            file_deleted: false,
            warning: None,
        }
    }

    fn cancelled() -> Self {
        Self {
            removed: false,
            choice: Some(DeleteChoice::Cancel),
            file_deleted: false,
            warning: None,
        }
    }
}

/// Runs the protocol against one entry and one dialog.
pub struct DeletionCoordinator<'a> {
    resolver: PathResolver<'a>,
    dialog: &'a dyn DialogService,
}

impl<'a> DeletionCoordinator<'a> {
    #[must_use]
    pub fn new(resolver: PathResolver<'a>, dialog: &'a dyn DialogService) -> Self {
        Self { resolver, dialog }
    }

    /// Deletes or unlinks `linked_file` from `entry` as the user decides.
    ///
    /// Never fails: a missing file short-circuits to an unlink, and a failed
    /// physical delete is reported through the dialog as a warning while the
    /// attachment is still unlinked.
    #[instrument(skip(self, entry), fields(link = %linked_file.link()))]
    pub fn delete(&self, linked_file: &LinkedFile, entry: &SharedEntry) -> DeleteOutcome {
        let mut state = DeleteState::Resolving;
        loop {
            debug!(state = ?state, "delete protocol step");
            state = match state {
                DeleteState::Resolving => match self.resolver.resolve(linked_file) {
                    Some(path) => DeleteState::AwaitingConfirmation { path },
                    None => {
                        info!("file not found on disk, unlinking without confirmation");
                        unlink(linked_file, entry);
                        DeleteState::Done(DeleteOutcome::unlinked_without_prompt())
                    }
                },
                DeleteState::AwaitingConfirmation { path } => {
                    let prompt = DeletePrompt::for_file(&path);
                    match self.dialog.ask_delete_or_remove(&prompt) {
                        Some(choice @ (DeleteChoice::Remove | DeleteChoice::Delete)) => {
                            DeleteState::Removing { path, choice }
                        }
                        Some(DeleteChoice::Cancel) | None => {
                            debug!("delete cancelled by user");
                            DeleteState::Done(DeleteOutcome::cancelled())
                        }
                    }
                }
                DeleteState::Removing { path, choice } => {
                    DeleteState::Done(self.remove(linked_file, entry, &path, choice))
                }
                DeleteState::Done(outcome) => return outcome,
            };
        }
    }

    fn remove(
        &self,
        linked_file: &LinkedFile,
        entry: &SharedEntry,
        path: &std::path::Path,
        choice: DeleteChoice,
    ) -> DeleteOutcome {
        let mut outcome = DeleteOutcome {
            removed: true,
            choice: Some(choice),
            file_deleted: false,
            warning: None,
        };

        if choice == DeleteChoice::Delete {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    info!(path = %path.display(), "deleted file from disk");
                    outcome.file_deleted = true;
                }
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "could not delete file, unlinking anyway");
                    let message = format!("Cannot delete file '{}': {error}", path.display());
                    self.dialog.notify(&message);
                    outcome.warning = Some(message);
                }
            }
        }

        unlink(linked_file, entry);
        outcome
    }
}

fn unlink(linked_file: &LinkedFile, entry: &SharedEntry) {
    if !lock_entry(entry).remove_file(linked_file) {
        debug!(link = %linked_file.link(), "attachment was already detached from the entry");
    }
}
