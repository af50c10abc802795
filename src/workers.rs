//! Polling loops on named OS threads.
//!
//! Each subsystem (GPIO, analog, I²C, 1-Wire + SPI) runs its pass in its own
//! thread and owns its hardware handle. Loops sleep on a shared
//! [`StopToken`] between passes so shutdown does not wait out the interval,
//! only the pass in progress.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{info, warn};
use parking_lot::{Condvar, Mutex};

/// Stack for each polling thread.
const WORKER_STACK_KB: usize = 64;

// ── Stop token ────────────────────────────────────────────────

#[derive(Debug, Default)]
struct StopState {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Cloneable cancellation flag with a timed wait.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    state: Arc<StopState>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake every waiting loop.
    pub fn stop(&self) {
        *self.state.stopped.lock() = true;
        self.state.wake.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.state.stopped.lock()
    }

    /// Block for up to `timeout`. Returns `true` if stop was requested.
    ///
    /// A timeout too large to represent as a deadline waits for stop only.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut stopped = self.state.stopped.lock();
        while !*stopped {
            match deadline {
                Some(deadline) => {
                    if self.state.wake.wait_until(&mut stopped, deadline).timed_out() {
                        break;
                    }
                }
                None => self.state.wake.wait(&mut stopped),
            }
        }
        *stopped
    }
}

// ── Spawning ──────────────────────────────────────────────────

/// Spawn a named thread with the worker stack size.
pub fn spawn_named(
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    info!("Spawning '{}' (stack={}KB)", name, WORKER_STACK_KB);
    thread::Builder::new()
        .name(name.into())
        .stack_size(WORKER_STACK_KB * 1024)
        .spawn(f)
}

/// Run `pass` every `interval` until `token` is stopped.
///
/// The interval is measured between pass starts; an overrunning pass starts
/// the next one immediately.
pub fn poll_every(token: &StopToken, interval: Duration, mut pass: impl FnMut()) {
    while !token.is_stopped() {
        let started = Instant::now();
        pass();
        let remaining = interval.saturating_sub(started.elapsed());
        if token.wait_timeout(remaining) {
            break;
        }
    }
}

/// The set of running polling loops.
pub struct Workers {
    token: StopToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Workers {
    pub fn new(token: StopToken) -> Self {
        Self {
            token,
            handles: Vec::new(),
        }
    }

    /// Start a loop running `pass` every `interval` on thread `name`.
    pub fn spawn(
        &mut self,
        name: &'static str,
        interval: Duration,
        mut pass: impl FnMut() + Send + 'static,
    ) -> io::Result<()> {
        let token = self.token.clone();
        let handle = spawn_named(name, move || {
            poll_every(&token, interval, &mut pass);
            info!("'{}' stopped", name);
        })?;
        self.handles.push((name, handle));
        Ok(())
    }

    pub fn token(&self) -> &StopToken {
        &self.token
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Stop every loop and join its thread.
    pub fn shutdown(self) {
        self.token.stop();
        for (name, handle) in self.handles {
            if handle.join().is_err() {
                warn!("'{}' panicked", name);
            }
        }
    }
}
