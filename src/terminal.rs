//! Interactive dialog on stdin/stderr.

use std::io::{self, BufRead, IsTerminal, Write};

use linkfile_core::{DeleteChoice, DeletePrompt, DialogService};
use tracing::debug;

/// Asks on the terminal. Without an interactive stdin every prompt is
/// treated as dismissed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalDialog;

impl DialogService for TerminalDialog {
    fn ask_delete_or_remove(&self, prompt: &DeletePrompt) -> Option<DeleteChoice> {
        if !io::stdin().is_terminal() {
            debug!("stdin is not a terminal, treating prompt as dismissed");
            return None;
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}: {}", prompt.title, prompt.message);
        let _ = write!(
            stderr,
            "[r] {}  [d] {}  [c] {} > ",
            prompt.remove_label, prompt.delete_label, prompt.cancel_label
        );
        let _ = stderr.flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => answer.parse().ok(),
        }
    }

    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}
