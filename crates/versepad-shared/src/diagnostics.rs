//! Opt-in file diagnostics, separate from the `log` facade.
//!
//! Embedders that want a persistent trace of state-machine events (storage
//! switches, skipped reloads, invariant violations) enable this via
//! [`set_enabled`] or the `VERSEPAD_DIAG` env var. Lines are appended to
//! `~/.versepad/logs/diagnostics.log` and echoed to stderr.

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::now_rfc3339;

const DIAG_ENV: &str = "VERSEPAD_DIAG";

static ENABLED: AtomicBool = AtomicBool::new(false);
static ENABLED_INIT: OnceLock<()> = OnceLock::new();

/// Overrides the env-var check. Call early in the embedding app if used.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
    let _ = ENABLED_INIT.set(());
}

fn enabled() -> bool {
    ENABLED_INIT.get_or_init(|| {
        let from_env = std::env::var(DIAG_ENV)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        ENABLED.store(from_env, Ordering::Relaxed);
    });
    ENABLED.load(Ordering::Relaxed)
}

/// Directory the diagnostics file lives in, when a home dir exists.
pub fn log_dir() -> Option<PathBuf> {
    static DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
    DIR.get_or_init(|| Some(dirs::home_dir()?.join(".versepad").join("logs")))
        .clone()
}

/// Appends one timestamped line when diagnostics are enabled.
pub fn log(message: impl AsRef<str>) {
    if !enabled() {
        return;
    }
    let message = message.as_ref();
    let line = format!("[{}] {}\n", now_rfc3339(), message);

    if let Some(dir) = log_dir() {
        let _ = create_dir_all(&dir);
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("diagnostics.log"))
        {
            let _ = file.write_all(line.as_bytes());
        }
    }
    eprintln!("[diag] {}", message);
}
