//! Player session
//!
//! A [`Player`] owns one engine session and its message pump. Command
//! methods return the engine's immediate status; the definitive outcome is
//! the Ack or Nack delivered to the listener later.

use crate::dispatch::Dispatcher;
use crate::engine::{Engine, EngineSession};
use crate::error::Result;
use crate::listener::PlayerListener;
use crate::pump::{MessagePump, PumpState, PumpStats, PUMP_THREAD_NAME};
use crate::runtime;
use bluetune_core::{Command, Input, InputSource, PropertyScope, PropertyValue, Status, TimeCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Options for [`Player::open_with_options`]
#[derive(Clone)]
pub struct PlayerOptions {
    thread_name: String,
    dispatcher: Option<Arc<dyn Dispatcher>>,
}

impl PlayerOptions {
    pub fn new() -> Self {
        Self {
            thread_name: PUMP_THREAD_NAME.to_string(),
            dispatcher: None,
        }
    }

    /// Name of the pump thread
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Deliver callbacks through `dispatcher` instead of the pump thread
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback session on one engine
pub struct Player {
    session: Arc<EngineSession>,
    pump: MessagePump,
}

impl Player {
    /// Open a player delivering callbacks on the pump thread
    pub fn open(engine: Arc<dyn Engine>, listener: Arc<dyn PlayerListener>) -> Result<Self> {
        Self::open_with_options(engine, listener, PlayerOptions::default())
    }

    /// Open a player delivering callbacks through `dispatcher`
    pub fn open_with_dispatcher(
        engine: Arc<dyn Engine>,
        listener: Arc<dyn PlayerListener>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self> {
        Self::open_with_options(engine, listener, PlayerOptions::new().dispatcher(dispatcher))
    }

    pub fn open_with_options(
        engine: Arc<dyn Engine>,
        listener: Arc<dyn PlayerListener>,
        options: PlayerOptions,
    ) -> Result<Self> {
        runtime::ensure_initialized()?;

        let session = Arc::new(EngineSession::new(engine));
        let pump = MessagePump::spawn_named(
            &options.thread_name,
            session.clone(),
            listener,
            options.dispatcher,
        )?;
        info!("Player opened (pump thread: {})", options.thread_name);

        Ok(Self { session, pump })
    }

    fn submit(&self, command: Command) -> Status {
        let kind = command.kind();
        let status = self.session.submit(command);
        if status.is_failure() {
            debug!("{} rejected: {}", kind, status);
        }
        status
    }

    /// Open a named input; `mime_type` is a hint for the engine
    pub fn set_input(&self, name: &str, mime_type: Option<&str>) -> Status {
        self.submit(Command::SetInput {
            source: InputSource::Name(name.to_string()),
            mime_type: mime_type.map(str::to_string),
        })
    }

    /// Read media from a caller-owned byte source
    pub fn set_input_stream(&self, input: Box<dyn Input>, mime_type: Option<&str>) -> Status {
        self.submit(Command::SetInput {
            source: InputSource::Stream(input),
            mime_type: mime_type.map(str::to_string),
        })
    }

    pub fn set_output(&self, name: &str, mime_type: Option<&str>) -> Status {
        self.submit(Command::SetOutput {
            name: name.to_string(),
            mime_type: mime_type.map(str::to_string),
        })
    }

    /// Set the volume. The level is clamped to [0.0, 1.0]; NaN and
    /// infinities are rejected without reaching the engine.
    pub fn set_volume(&self, level: f32) -> Status {
        if !level.is_finite() {
            return Status::INVALID_PARAMETERS;
        }
        self.submit(Command::SetVolume(level.clamp(0.0, 1.0)))
    }

    pub fn play(&self) -> Status {
        self.submit(Command::Play)
    }

    pub fn pause(&self) -> Status {
        self.submit(Command::Pause)
    }

    pub fn stop(&self) -> Status {
        self.submit(Command::Stop)
    }

    pub fn ping(&self, cookie: i32) -> Status {
        self.submit(Command::Ping { cookie })
    }

    pub fn seek_to_time(&self, time: Duration) -> Status {
        let millis = u64::try_from(time.as_millis()).unwrap_or(u64::MAX);
        self.submit(Command::SeekToTime { millis })
    }

    /// Seek to `h:m:s` plus `f` hundredths of a second
    pub fn seek_to_timestamp(&self, h: u8, m: u8, s: u8, f: u8) -> Status {
        self.submit(Command::SeekToTimeStamp(TimeCode::new(h, m, s, f)))
    }

    /// Seek to `offset / range` of the stream
    pub fn seek_to_position(&self, offset: u64, range: u64) -> Status {
        self.submit(Command::SeekToPosition { offset, range })
    }

    pub fn register_module(&self, name: &str) -> Status {
        self.submit(Command::RegisterModule {
            name: name.to_string(),
        })
    }

    pub fn add_node(&self, name: &str) -> Status {
        self.submit(Command::AddNode {
            name: name.to_string(),
        })
    }

    pub fn set_property(
        &self,
        scope: PropertyScope,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Status {
        self.submit(Command::SetProperty {
            scope,
            name: name.to_string(),
            value: value.into(),
        })
    }

    pub fn load_plugin(&self, name: &str, search_flags: u32) -> Status {
        self.submit(Command::LoadPlugin {
            name: name.to_string(),
            search_flags,
        })
    }

    pub fn load_plugins(&self, directory: &str, file_filter: Option<&str>) -> Status {
        self.submit(Command::LoadPlugins {
            directory: directory.to_string(),
            file_filter: file_filter.map(str::to_string),
        })
    }

    pub fn is_active(&self) -> bool {
        self.pump.state() == PumpState::Active
    }

    pub fn pump_state(&self) -> PumpState {
        self.pump.state()
    }

    /// Status that ended the pump, once it has ended
    pub fn exit_status(&self) -> Option<Status> {
        self.pump.exit_status()
    }

    pub fn pump_stats(&self) -> PumpStats {
        self.pump.stats()
    }

    /// Terminate the engine and wait for the pump to stop.
    ///
    /// Safe to call more than once and from a listener callback.
    pub fn close(&self) -> Result<()> {
        if self.session.terminate() {
            info!("Closing player");
        }
        self.pump.join()?;
        Ok(())
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Error while closing player: {}", e);
        }
    }
}
