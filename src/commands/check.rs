//! `check`: report where an attachment resolves and whether it is normalized.

use std::sync::Arc;

use anyhow::Result;
use linkfile_core::{Collaborators, CurrentThreadTaskExecutor, HttpClient, ScriptedDialog};

use super::Session;
use crate::app_config::FileConfig;
use crate::cli::TargetArgs;

pub fn run_check_command(args: &TargetArgs, config: &FileConfig) -> Result<()> {
    let session = Session::open(
        args,
        config,
        Collaborators {
            dialog: Arc::new(ScriptedDialog::default()),
            executor: Arc::new(CurrentThreadTaskExecutor),
            fetcher: Arc::new(HttpClient::new()),
        },
    )?;
    let manager = &session.manager;
    let linked = manager.linked_file();

    println!("link = {}", linked.link());
    println!("file_type = {}", linked.file_type());
    println!("online = {}", linked.is_online_link());
    match manager.find_file() {
        Some(path) => println!("resolved = {}", path.display()),
        None => println!("resolved = <not found>"),
    }
    println!(
        "generated_directory_matches = {}",
        manager.is_generated_path_same_as_original()
    );
    println!(
        "generated_name_matches = {}",
        manager.is_generated_name_same_as_original()
    );
    Ok(())
}
