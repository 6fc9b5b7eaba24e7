//! `download`: fetch an online attachment into the library.

use std::sync::Arc;

use anyhow::{Result, bail};
use linkfile_core::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use linkfile_core::{Collaborators, HttpClient, TaskStatus, TokioTaskExecutor, lock_entry};
use tracing::info;

use super::Session;
use crate::app_config::FileConfig;
use crate::cli::DownloadArgs;
use crate::terminal::TerminalDialog;

pub async fn run_download_command(args: &DownloadArgs, config: &FileConfig) -> Result<()> {
    let connect_timeout = args
        .connect_timeout
        .or(config.connect_timeout_secs)
        .unwrap_or(CONNECT_TIMEOUT_SECS);
    let read_timeout = args
        .read_timeout
        .or(config.read_timeout_secs)
        .unwrap_or(READ_TIMEOUT_SECS);

    let session = Session::open(
        &args.target,
        config,
        Collaborators {
            dialog: Arc::new(TerminalDialog),
            executor: Arc::new(TokioTaskExecutor::default()),
            fetcher: Arc::new(HttpClient::new_with_timeouts(connect_timeout, read_timeout)),
        },
    )?;

    let status = session.manager.download_and_wait().await?;
    if status == TaskStatus::Failed {
        bail!("Download of '{}' failed", session.manager.linked_file().link());
    }

    session.save()?;
    let index = usize::from(args.target.file).saturating_sub(1);
    let entry = lock_entry(session.manager.entry());
    if let Some(file) = entry.files().get(index) {
        info!(link = %file.link(), file_type = %file.file_type(), "attachment downloaded");
        println!("{}", file.link());
    }
    Ok(())
}
