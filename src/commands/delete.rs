//! `delete`: unlink an attachment, optionally deleting the file.

use std::sync::Arc;

use anyhow::Result;
use linkfile_core::{
    Collaborators, CurrentThreadTaskExecutor, DialogService, HttpClient, ScriptedDialog,
};

use super::Session;
use crate::app_config::FileConfig;
use crate::cli::DeleteArgs;
use crate::terminal::TerminalDialog;

pub fn run_delete_command(args: &DeleteArgs, config: &FileConfig) -> Result<()> {
    let dialog: Arc<dyn DialogService> = match args.choice {
        Some(choice) => Arc::new(ScriptedDialog::answering(choice)),
        None => Arc::new(TerminalDialog),
    };
    let session = Session::open(
        &args.target,
        config,
        Collaborators {
            dialog,
            executor: Arc::new(CurrentThreadTaskExecutor),
            fetcher: Arc::new(HttpClient::new()),
        },
    )?;

    let outcome = session.manager.delete_with_outcome();
    if let Some(warning) = &outcome.warning {
        eprintln!("warning: {warning}");
    }
    if outcome.removed {
        session.save()?;
        println!(
            "{} {}",
            if outcome.file_deleted { "deleted" } else { "removed" },
            session.manager.linked_file().link()
        );
    } else {
        println!("cancelled");
    }
    Ok(())
}
