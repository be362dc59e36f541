//! Append-only failure log and the error reporting path
//!
//! The only state this bot persists: one `timestamp - component - message`
//! line per reported failure.

use crate::error::Result;
use crate::notify::Notifier;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, warn};

/// Append-only, human-readable error log
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, component: &str, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let line = format!(
            "{} - {} - {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            component,
            message
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Routes a failure to the log and the operator channel; never fails the
/// caller, so a broken disk or Telegram outage cannot take down a cycle.
pub struct ErrorReporter {
    log: ErrorLog,
    notifier: Arc<Notifier>,
}

impl ErrorReporter {
    pub fn new(log: ErrorLog, notifier: Arc<Notifier>) -> Self {
        Self { log, notifier }
    }

    pub async fn report(&self, component: &str, message: &str) {
        error!(component, message, "component failure");

        if let Err(e) = self.log.append(component, message) {
            warn!(error = %e, "failed to append to error log");
        }

        self.notifier.error_alert(component, message).await;
    }
}
