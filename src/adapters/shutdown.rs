//! Cooperative shutdown on SIGINT / SIGTERM.
//!
//! The signal handlers only raise a flag.  The polling loop checks it
//! between cycles and while waiting, then returns normally so every
//! `Drop` (relay bank, GPIO lines) runs before the process exits.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::info;
use signal_hook::consts::{SIGINT, SIGTERM};

/// Longest single sleep while waiting for the next cycle.
const WAIT_SLICE: Duration = Duration::from_millis(250);

#[derive(Debug, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    /// Register SIGINT and SIGTERM handlers that request shutdown.
    pub fn install() -> io::Result<Self> {
        let shutdown = Self::default();
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&shutdown.requested))?;
        }
        Ok(shutdown)
    }

    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }

    /// Sleep for up to `total`, waking early on a shutdown request.
    /// Returns true when shutdown was requested.
    pub fn wait(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        loop {
            if self.requested() {
                info!("Shutdown requested");
                return true;
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return false;
            }
            thread::sleep(left.min(WAIT_SLICE));
        }
    }
}
