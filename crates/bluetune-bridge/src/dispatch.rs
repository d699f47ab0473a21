//! Execution contexts for listener callbacks
//!
//! By default the pump calls the listener on its own thread. A [`Dispatcher`]
//! redirects each callback onto another context instead, e.g. the thread
//! that owns a UI.

use crate::error::Result;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Unit of work posted to a dispatcher
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Target context for redirected callbacks
pub trait Dispatcher: Send + Sync {
    /// Queue a task. Never waits for the task to run.
    ///
    /// Returns `false` when the target context is gone and the task was
    /// discarded.
    fn post(&self, task: Task) -> bool;
}

/// Queue drained by the thread that owns it
pub struct DispatchQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Dispatcher posting into this queue
    pub fn handle(&self) -> QueueDispatcher {
        QueueDispatcher {
            sender: self.sender.clone(),
        }
    }

    /// Run every queued task without blocking. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            count += 1;
        }
        count
    }

    /// Wait up to `timeout` for a task, then run it and everything queued
    /// behind it. Returns how many ran.
    pub fn run_until_idle(&self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(task) => {
                task();
                1 + self.run_pending()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle posting into a [`DispatchQueue`]
#[derive(Clone)]
pub struct QueueDispatcher {
    sender: Sender<Task>,
}

impl Dispatcher for QueueDispatcher {
    fn post(&self, task: Task) -> bool {
        if self.sender.send(task).is_err() {
            debug!("Dispatch queue dropped, discarding task");
            return false;
        }
        true
    }
}

/// Dedicated worker thread running posted tasks in order
pub struct ThreadDispatcher {
    sender: Option<Sender<Task>>,
    thread: Option<JoinHandle<()>>,
}

impl ThreadDispatcher {
    pub fn spawn(name: &str) -> Result<Self> {
        let (sender, receiver) = unbounded::<Task>();
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                info!("Dispatch thread started");
                for task in receiver {
                    task();
                }
                info!("Dispatch thread stopped");
            })?;

        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
        })
    }
}

impl Dispatcher for ThreadDispatcher {
    fn post(&self, task: Task) -> bool {
        let accepted = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(task).is_ok());
        if !accepted {
            debug!("Dispatch thread gone, discarding task");
        }
        accepted
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() != thread::current().id() {
                let _ = thread.join();
            }
        }
    }
}
