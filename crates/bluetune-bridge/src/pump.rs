//! Message pump
//!
//! One thread per player blocks on the engine, decodes each frame and hands
//! the typed message to the listener:
//! - Direct: the listener runs on the pump thread, one message at a time
//! - Redirected: the callback is posted to a [`Dispatcher`] and the pump
//!   moves on without waiting
//!
//! The first error status from the engine ends the loop for good.

use crate::dispatch::Dispatcher;
use crate::engine::EngineSession;
use crate::error::{BridgeError, Result};
use crate::listener::{deliver, PlayerListener};
use bluetune_core::{Message, Status};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Default name of the pump thread
pub const PUMP_THREAD_NAME: &str = "bluetune-pump";

/// Pump loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Active,
    /// Terminal; entered on the first error status or a listener panic
    Terminated,
}

/// Pump counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Messages delivered, or accepted by the dispatcher
    pub delivered: u64,
    /// Messages the dispatcher refused because its context was gone
    pub undelivered: u64,
    /// Well-formed frames with nothing to deliver
    pub dropped: u64,
    /// Frames that failed to decode
    pub malformed: u64,
}

/// Marks the pump terminated however its thread ends, including a panic
/// in a listener callback
struct ExitGuard {
    running: Arc<AtomicBool>,
    exit_status: Arc<RwLock<Option<Status>>>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("Message pump thread panicked");
            self.exit_status.write().get_or_insert(Status::FAILURE);
        }
        self.running.store(false, Ordering::Release);
    }
}

/// Handle to a running pump thread
pub struct MessagePump {
    running: Arc<AtomicBool>,
    stats: Arc<RwLock<PumpStats>>,
    exit_status: Arc<RwLock<Option<Status>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl MessagePump {
    /// Start pumping on a thread named [`PUMP_THREAD_NAME`]
    pub fn spawn(
        session: Arc<EngineSession>,
        listener: Arc<dyn PlayerListener>,
        dispatcher: Option<Arc<dyn Dispatcher>>,
    ) -> Result<Self> {
        Self::spawn_named(PUMP_THREAD_NAME, session, listener, dispatcher)
    }

    pub fn spawn_named(
        name: &str,
        session: Arc<EngineSession>,
        listener: Arc<dyn PlayerListener>,
        dispatcher: Option<Arc<dyn Dispatcher>>,
    ) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(RwLock::new(PumpStats::default()));
        let exit_status = Arc::new(RwLock::new(None));

        let thread = {
            let guard = ExitGuard {
                running: running.clone(),
                exit_status: exit_status.clone(),
            };
            let stats = stats.clone();
            thread::Builder::new().name(name.to_string()).spawn(move || {
                info!("Message pump started");
                let status = run(&session, &listener, dispatcher.as_deref(), &stats);
                *guard.exit_status.write() = Some(status);
                drop(guard);
                if session.is_terminated() {
                    info!("Message pump stopped ({})", status);
                } else {
                    error!("Message pump failed with status {}", status);
                }
            })?
        };

        Ok(Self {
            running,
            stats,
            exit_status,
            thread: Mutex::new(Some(thread)),
        })
    }

    pub fn state(&self) -> PumpState {
        if self.running.load(Ordering::Acquire) {
            PumpState::Active
        } else {
            PumpState::Terminated
        }
    }

    /// Status that ended the loop, once it has ended
    pub fn exit_status(&self) -> Option<Status> {
        *self.exit_status.read()
    }

    pub fn delivered(&self) -> u64 {
        self.stats.read().delivered
    }

    pub fn stats(&self) -> PumpStats {
        *self.stats.read()
    }

    /// Wait for the loop to end and return its exit status.
    ///
    /// Called from the pump thread itself (a listener closing its player),
    /// this returns immediately and leaves the thread detached.
    pub fn join(&self) -> Result<Option<Status>> {
        let thread = self.thread.lock().take();
        if let Some(thread) = thread {
            if thread.thread().id() == thread::current().id() {
                debug!("join() called on the pump thread, detaching");
                return Ok(self.exit_status());
            }
            thread.join().map_err(|_| BridgeError::PumpPanicked)?;
        }
        Ok(self.exit_status())
    }
}

fn run(
    session: &EngineSession,
    listener: &Arc<dyn PlayerListener>,
    dispatcher: Option<&dyn Dispatcher>,
    stats: &RwLock<PumpStats>,
) -> Status {
    loop {
        let raw = match session.pump() {
            Ok(raw) => raw,
            Err(status) => return status,
        };

        let message = match Message::decode(&raw) {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!("Dropping {:?} frame with nothing to deliver", raw);
                stats.write().dropped += 1;
                continue;
            }
            Err(e) => {
                warn!("Skipping malformed frame: {}", e);
                stats.write().malformed += 1;
                continue;
            }
        };

        debug!("Delivering {}", message.kind());
        match dispatcher {
            Some(dispatcher) => {
                let kind = message.kind();
                let listener = listener.clone();
                let task = Box::new(move || deliver(&message, listener.as_ref()));
                if dispatcher.post(task) {
                    stats.write().delivered += 1;
                } else {
                    debug!("Dispatcher refused {}", kind);
                    stats.write().undelivered += 1;
                }
            }
            None => {
                stats.write().delivered += 1;
                deliver(&message, listener.as_ref());
            }
        }
    }
}
