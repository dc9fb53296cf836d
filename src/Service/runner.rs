// Background relay and worker threads

use super::service::DataService;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace};

/// A background thread that runs until `stop` is called or the handle is dropped.
pub struct RunnerHandle {
    keep_alive: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl RunnerHandle {
    fn spawn<F>(name: &str, mut step: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let keep_alive = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&keep_alive);
        let thread_name = name.to_string();
        let thread = thread::Builder::new().name(name.to_string()).spawn(move || {
            debug!(thread = %thread_name, "runner started");
            while flag.load(Ordering::Acquire) {
                step();
            }
            debug!(thread = %thread_name, "runner stopped");
        })?;

        Ok(Self {
            keep_alive,
            thread: Some(thread),
        })
    }

    /// The flag the loop checks between steps.
    pub fn keep_alive(&self) -> &Arc<AtomicBool> {
        &self.keep_alive
    }

    /// Clear the keep-alive flag and wait for the current step to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.keep_alive.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for RunnerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run both relays every `interval`.
pub fn spawn_relay(service: Arc<DataService>, interval: Duration) -> io::Result<RunnerHandle> {
    RunnerHandle::spawn("ds-relay", move || {
        let rx = service.rx_copy();
        let tx = service.tx_copy();
        if rx + tx > 0 {
            trace!(rx, tx, "relay pass");
        }
        thread::sleep(interval);
    })
}

/// Dispatch inbound messages, re-checking the keep-alive flag at least
/// every `poll`.
pub fn spawn_worker(service: Arc<DataService>, poll: Duration) -> io::Result<RunnerHandle> {
    RunnerHandle::spawn("ds-worker", move || {
        // Outcomes are already counted and logged by `process`
        let _ = service.handle_rx_timeout(poll);
    })
}
