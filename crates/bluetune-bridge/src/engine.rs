//! Engine boundary
//!
//! An [`Engine`] is the opaque native side: it accepts commands and produces
//! a blocking stream of raw frames. [`EngineSession`] owns one engine handle
//! and releases it exactly once.

use bluetune_core::{Command, RawMessage, Status};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// A playback engine
pub trait Engine: Send + Sync {
    /// Block until the next frame is available.
    ///
    /// `Err` carries the non-zero status that ends the message stream.
    fn pump_message(&self) -> Result<RawMessage, Status>;

    /// Submit a command. The returned status is immediate; the final outcome
    /// arrives later as an Ack or Nack.
    fn submit(&self, command: Command) -> Status;

    /// Release the engine. A blocked [`Engine::pump_message`] must return
    /// with an error afterwards.
    fn terminate(&self);
}

/// Owned engine handle
pub struct EngineSession {
    engine: Arc<dyn Engine>,
    terminated: AtomicBool,
}

impl EngineSession {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            terminated: AtomicBool::new(false),
        }
    }

    /// Submit a command, or return [`Status::TERMINATED`] once closed
    pub fn submit(&self, command: Command) -> Status {
        if self.is_terminated() {
            debug!("Dropping {} command: session terminated", command.kind());
            return Status::TERMINATED;
        }
        self.engine.submit(command)
    }

    pub fn pump(&self) -> Result<RawMessage, Status> {
        self.engine.pump_message()
    }

    /// Terminate the engine. Returns `true` on the call that actually did it.
    pub fn terminate(&self) -> bool {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return false;
        }
        info!("Terminating engine session");
        self.engine.terminate();
        true
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingEngine {
        terminations: AtomicUsize,
        submissions: AtomicUsize,
    }

    impl Engine for CountingEngine {
        fn pump_message(&self) -> Result<RawMessage, Status> {
            Err(Status::TERMINATED)
        }

        fn submit(&self, _command: Command) -> Status {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            Status::SUCCESS
        }

        fn terminate(&self) {
            self.terminations.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_terminates_exactly_once() {
        let engine = Arc::new(CountingEngine::default());
        let session = EngineSession::new(engine.clone());

        assert!(session.terminate());
        assert!(!session.terminate());
        drop(session);

        assert_eq!(engine.terminations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_terminates() {
        let engine = Arc::new(CountingEngine::default());
        drop(EngineSession::new(engine.clone()));
        assert_eq!(engine.terminations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_submit_after_terminate_is_refused() {
        let engine = Arc::new(CountingEngine::default());
        let session = EngineSession::new(engine.clone());

        assert_eq!(session.submit(Command::Play), Status::SUCCESS);
        session.terminate();
        assert_eq!(session.submit(Command::Play), Status::TERMINATED);
        assert_eq!(engine.submissions.load(Ordering::SeqCst), 1);
    }
}
