//! `normalize`: move an attachment to its generated directory and name.

use std::sync::Arc;

use anyhow::Result;
use linkfile_core::{Collaborators, CurrentThreadTaskExecutor, HttpClient, lock_entry};

use super::Session;
use crate::app_config::FileConfig;
use crate::cli::TargetArgs;
use crate::terminal::TerminalDialog;

pub fn run_normalize_command(args: &TargetArgs, config: &FileConfig) -> Result<()> {
    let session = Session::open(
        args,
        config,
        Collaborators {
            dialog: Arc::new(TerminalDialog),
            executor: Arc::new(CurrentThreadTaskExecutor),
            fetcher: Arc::new(HttpClient::new()),
        },
    )?;

    if !session.manager.move_to_default_directory_and_rename()? {
        println!("unchanged {}", session.manager.linked_file().link());
        return Ok(());
    }

    session.save()?;
    let index = usize::from(args.file).saturating_sub(1);
    let entry = lock_entry(session.manager.entry());
    let new_link = entry
        .files()
        .get(index)
        .map_or_else(String::new, |file| file.link().to_string());
    println!("moved {} -> {new_link}", session.manager.linked_file().link());
    Ok(())
}
