//! BlueTune Bridge - command submission and message pump
//!
//! Connects an application to a BlueTune playback engine:
//! - **Commands** go out through [`Player`] and return an immediate [`Status`]
//! - **Notifications** come back on a dedicated pump thread and reach a
//!   [`PlayerListener`], optionally redirected through a [`Dispatcher`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bluetune_bridge::{runtime, LoopbackEngine, PlaybackMonitor, Player};
//! use std::convert::Infallible;
//! use std::sync::Arc;
//!
//! runtime::initialize("loopback", |_| Ok::<_, Infallible>(None)).unwrap();
//! let monitor = Arc::new(PlaybackMonitor::new());
//! let player = Player::open(Arc::new(LoopbackEngine::new()), monitor.clone()).unwrap();
//! player.set_input("song.mp3", Some("audio/mpeg"));
//! player.play();
//! ```
//!
//! [`Status`]: bluetune_core::Status

/// Callback execution contexts
pub mod dispatch;
/// Engine boundary
pub mod engine;
/// Error types
pub mod error;
/// Listener trait and message delivery
pub mod listener;
/// In-process reference engine
pub mod loopback;
pub mod monitor;
pub mod player;
/// Message pump thread
pub mod pump;
/// Process-wide runtime initialization
pub mod runtime;

pub use dispatch::{DispatchQueue, Dispatcher, QueueDispatcher, Task, ThreadDispatcher};
pub use engine::{Engine, EngineSession};
pub use error::{BridgeError, Result};
pub use listener::{deliver, LoggingListener, PlayerListener};
pub use loopback::LoopbackEngine;
pub use monitor::{PlaybackMonitor, PlaybackSnapshot};
pub use player::{Player, PlayerOptions};
pub use pump::{MessagePump, PumpState, PumpStats};
pub use runtime::RuntimeInfo;
