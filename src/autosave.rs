//! Fixed-interval auto-save loop.
//!
//! A worker thread ticks every five seconds and asks the editor to save the
//! active tab. Each save is a complete overwrite of the referent, so ticks
//! are idempotent and need no mutual exclusion. The thread is stopped and
//! joined on drop; a tick never observes a dropped editor because the loop
//! owns its own `Arc`.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::editor::Editor;

pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);

pub struct AutosaveLoop {
    stop: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl AutosaveLoop {
    pub fn start(editor: Arc<Editor>) -> Self {
        Self::start_with_interval(editor, AUTOSAVE_INTERVAL)
    }

    pub fn start_with_interval(editor: Arc<Editor>, interval: Duration) -> Self {
        let (stop, rx) = mpsc::channel();
        let worker = thread::spawn(move || loop {
            match rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => editor.autosave_tick(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self {
            stop,
            worker: Some(worker),
        }
    }
}

impl Drop for AutosaveLoop {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
