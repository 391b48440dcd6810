//! Console-backed operator session
//!
//! Owns the prompt reader and the progress bar, so nothing in the
//! installer touches process-wide terminal state directly.

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use romflash_errors::{Error, Result};
use romflash_install::Session;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

const PROGRESS_TICKS: u64 = 1000;

pub struct ConsoleSession {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleSession {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Session for ConsoleSession {
    async fn prompt(&self, text: &str) -> Result<String> {
        let text = text.to_string();
        // Stdin reads block the whole process; that is fine for a tool
        // with exactly one consumer and no background work.
        tokio::task::spawn_blocking(move || -> Result<String> {
            print!("{text}");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line.trim_end_matches(['\r', '\n']).to_string())
        })
        .await
        .map_err(|e| Error::internal(format!("input task failed: {e}")))?
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn warn(&self, message: &str) {
        eprintln!("Warning: {message}");
    }

    fn progress_begin(&self, title: &str) {
        let bar = ProgressBar::new(PROGRESS_TICKS);
        let style = ProgressStyle::with_template("{msg} [{bar:40}] {percent:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.set_message(title.to_string());
        *self.bar.lock().unwrap() = Some(bar);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn progress_update(&self, fraction: f64) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.set_position((fraction.clamp(0.0, 1.0) * PROGRESS_TICKS as f64) as u64);
        }
    }

    fn progress_end(&self) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}
