//! Debounced persistence wrapper.
//!
//! A single worker thread drains save requests from an mpsc channel and
//! coalesces rapid calls into one trailing-edge write of the latest snapshot.
//! An optional gate closure is re-checked at flush time so a write queued
//! before a storage-mode switch (or other invalidating event) becomes a
//! no-op instead of clobbering freshly loaded data.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::json_store::{JsonFile, StoreResult};

/// Gate consulted immediately before a debounced write lands. Returning
/// `false` discards the pending snapshot.
pub type WriteGate = Arc<dyn Fn() -> bool + Send + Sync>;

enum SaveMessage {
    Save,
    Flush,
    Shutdown,
}

/// Debounced wrapper around a [`JsonFile`] that coalesces rapid saves.
pub struct Debounced<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + 'static,
{
    file: JsonFile<T>,
    // Mutex keeps the store Sync regardless of the channel's Sender.
    sender: Mutex<Sender<SaveMessage>>,
    pending: Arc<Mutex<Option<T>>>,
    gate: Option<WriteGate>,
    worker: Option<JoinHandle<()>>,
}

impl<T> Debounced<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + 'static,
{
    /// Creates a debounced store with the given delay in milliseconds.
    pub fn new(file: JsonFile<T>, debounce_ms: u64) -> Self {
        Self::with_gate(file, debounce_ms, None)
    }

    /// Creates a debounced store whose writes are conditional on `gate`.
    pub fn with_gate(file: JsonFile<T>, debounce_ms: u64, gate: Option<WriteGate>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let pending: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
        let pending_clone = pending.clone();
        let file_clone = file.clone();
        let gate_clone = gate.clone();
        let debounce = Duration::from_millis(debounce_ms);

        let worker = thread::spawn(move || {
            Self::worker_loop(receiver, file_clone, pending_clone, gate_clone, debounce);
        });

        Self {
            file,
            sender: Mutex::new(sender),
            pending,
            gate,
            worker: Some(worker),
        }
    }

    /// Queues a save of `snapshot` (trailing-edge debounced).
    pub fn save(&self, snapshot: &T) {
        *self.pending.lock() = Some(snapshot.clone());
        let _ = self.sender.lock().send(SaveMessage::Save);
    }

    /// Writes immediately, bypassing the debounce. Any pending debounced
    /// snapshot is discarded since it is now stale.
    pub fn save_immediate(&self, snapshot: &T) -> StoreResult<()> {
        *self.pending.lock() = None;
        self.file.save(snapshot)
    }

    /// Forces any pending debounced snapshot to disk now.
    pub fn flush(&self) -> StoreResult<()> {
        let _ = self.sender.lock().send(SaveMessage::Flush);
        let snapshot = self.pending.lock().take();
        if let Some(snapshot) = snapshot {
            if self.gate_open() {
                self.file.save(&snapshot)?;
            }
        }
        Ok(())
    }

    fn gate_open(&self) -> bool {
        self.gate.as_ref().map(|g| g()).unwrap_or(true)
    }

    fn worker_loop(
        receiver: Receiver<SaveMessage>,
        file: JsonFile<T>,
        pending: Arc<Mutex<Option<T>>>,
        gate: Option<WriteGate>,
        debounce: Duration,
    ) {
        let gate_open = || gate.as_ref().map(|g| g()).unwrap_or(true);
        let mut last_request: Option<Instant> = None;

        loop {
            let timeout = if last_request.is_some() {
                debounce
            } else {
                Duration::from_secs(60)
            };

            match receiver.recv_timeout(timeout) {
                Ok(SaveMessage::Save) => {
                    last_request = Some(Instant::now());
                }
                Ok(SaveMessage::Flush) => {
                    // Caller performs the write itself; just reset the timer.
                    last_request = None;
                }
                Ok(SaveMessage::Shutdown) => {
                    let snapshot = pending.lock().take();
                    if let Some(snapshot) = snapshot {
                        if gate_open() {
                            if let Err(e) = file.save(&snapshot) {
                                log::warn!("debounced shutdown write failed: {}", e);
                            }
                        }
                    }
                    break;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if let Some(t) = last_request {
                        if t.elapsed() >= debounce {
                            let snapshot = pending.lock().take();
                            if let Some(snapshot) = snapshot {
                                if gate_open() {
                                    if let Err(e) = file.save(&snapshot) {
                                        log::warn!("debounced write failed: {}", e);
                                    }
                                }
                            }
                            last_request = None;
                        }
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl<T> Drop for Debounced<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + 'static,
{
    fn drop(&mut self) {
        let _ = self.sender.lock().send(SaveMessage::Shutdown);
        let snapshot = self.pending.lock().take();
        if let Some(snapshot) = snapshot {
            if self.gate_open() {
                let _ = self.file.save(&snapshot);
            }
        }
        if let Some(w) = self.worker.take() {
            let _ = w.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        value: u32,
    }

    #[test]
    fn test_rapid_saves_coalesce_to_latest() {
        let temp = TempDir::new().unwrap();
        let file: JsonFile<Doc> = JsonFile::new(temp.path().join("doc.json"));
        let debounced = Debounced::new(file.clone(), 30);

        for i in 0..20 {
            debounced.save(&Doc { value: i });
        }
        thread::sleep(Duration::from_millis(150));
        assert_eq!(file.load().unwrap().value, 19);
    }

    #[test]
    fn test_drop_flushes_pending() {
        let temp = TempDir::new().unwrap();
        let file: JsonFile<Doc> = JsonFile::new(temp.path().join("doc.json"));
        {
            let debounced = Debounced::new(file.clone(), 10_000);
            debounced.save(&Doc { value: 42 });
        }
        assert_eq!(file.load().unwrap().value, 42);
    }

    #[test]
    fn test_flush_writes_now() {
        let temp = TempDir::new().unwrap();
        let file: JsonFile<Doc> = JsonFile::new(temp.path().join("doc.json"));
        let debounced = Debounced::new(file.clone(), 10_000);
        debounced.save(&Doc { value: 5 });
        debounced.flush().unwrap();
        assert_eq!(file.load().unwrap().value, 5);
    }

    #[test]
    fn test_closed_gate_discards_pending() {
        let temp = TempDir::new().unwrap();
        let file: JsonFile<Doc> = JsonFile::new(temp.path().join("doc.json"));
        let open = Arc::new(AtomicBool::new(false));
        let gate_flag = open.clone();
        let gate: WriteGate = Arc::new(move || gate_flag.load(Ordering::SeqCst));

        let debounced = Debounced::with_gate(file.clone(), 30, Some(gate));
        debounced.save(&Doc { value: 9 });
        thread::sleep(Duration::from_millis(150));
        assert!(!file.path().exists());

        open.store(true, Ordering::SeqCst);
        debounced.save(&Doc { value: 10 });
        thread::sleep(Duration::from_millis(150));
        assert_eq!(file.load().unwrap().value, 10);
    }

    #[test]
    fn test_save_immediate_bypasses_debounce() {
        let temp = TempDir::new().unwrap();
        let file: JsonFile<Doc> = JsonFile::new(temp.path().join("doc.json"));
        let debounced = Debounced::new(file.clone(), 10_000);
        debounced.save_immediate(&Doc { value: 3 }).unwrap();
        assert_eq!(file.load().unwrap().value, 3);
    }
}
