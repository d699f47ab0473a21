//! Commands sent from the application to the engine

use crate::input::Input;
use crate::property::{PropertyScope, PropertyValue};
use crate::types::TimeCode;
use std::fmt;

/// Command category. The engine correlates Ack/Nack messages by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    SetInput,
    SetOutput,
    SetVolume,
    Play,
    Stop,
    Pause,
    Ping,
    SeekToTime,
    SeekToPosition,
    RegisterModule,
    AddNode,
    SetProperty,
    LoadPlugin,
    LoadPlugins,
}

impl CommandKind {
    /// Every kind in wire order
    pub const ALL: [CommandKind; 14] = [
        CommandKind::SetInput,
        CommandKind::SetOutput,
        CommandKind::SetVolume,
        CommandKind::Play,
        CommandKind::Stop,
        CommandKind::Pause,
        CommandKind::Ping,
        CommandKind::SeekToTime,
        CommandKind::SeekToPosition,
        CommandKind::RegisterModule,
        CommandKind::AddNode,
        CommandKind::SetProperty,
        CommandKind::LoadPlugin,
        CommandKind::LoadPlugins,
    ];

    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::SetInput => "set-input",
            CommandKind::SetOutput => "set-output",
            CommandKind::SetVolume => "set-volume",
            CommandKind::Play => "play",
            CommandKind::Stop => "stop",
            CommandKind::Pause => "pause",
            CommandKind::Ping => "ping",
            CommandKind::SeekToTime => "seek-to-time",
            CommandKind::SeekToPosition => "seek-to-position",
            CommandKind::RegisterModule => "register-module",
            CommandKind::AddNode => "add-node",
            CommandKind::SetProperty => "set-property",
            CommandKind::LoadPlugin => "load-plugin",
            CommandKind::LoadPlugins => "load-plugins",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the engine reads media from
pub enum InputSource {
    /// Name or URI resolved by the engine
    Name(String),
    /// Byte source owned by the caller
    Stream(Box<dyn Input>),
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Name(name) => f.debug_tuple("Name").field(name).finish(),
            InputSource::Stream(input) => f
                .debug_struct("Stream")
                .field("size", &input.size())
                .field("position", &input.tell())
                .finish(),
        }
    }
}

impl From<&str> for InputSource {
    fn from(name: &str) -> Self {
        InputSource::Name(name.to_string())
    }
}

impl From<String> for InputSource {
    fn from(name: String) -> Self {
        InputSource::Name(name)
    }
}

/// A request for the engine. Fire-and-forget: the outcome arrives later as
/// an Ack or Nack carrying [`Command::kind`].
#[derive(Debug)]
pub enum Command {
    SetInput {
        source: InputSource,
        mime_type: Option<String>,
    },
    SetOutput {
        name: String,
        mime_type: Option<String>,
    },
    /// Level in [0.0, 1.0]
    SetVolume(f32),
    Play,
    Stop,
    Pause,
    Ping {
        cookie: i32,
    },
    SeekToTime {
        millis: u64,
    },
    SeekToTimeStamp(TimeCode),
    SeekToPosition {
        offset: u64,
        range: u64,
    },
    RegisterModule {
        name: String,
    },
    AddNode {
        name: String,
    },
    SetProperty {
        scope: PropertyScope,
        name: String,
        value: PropertyValue,
    },
    LoadPlugin {
        name: String,
        search_flags: u32,
    },
    LoadPlugins {
        directory: String,
        file_filter: Option<String>,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::SetInput { .. } => CommandKind::SetInput,
            Command::SetOutput { .. } => CommandKind::SetOutput,
            Command::SetVolume(_) => CommandKind::SetVolume,
            Command::Play => CommandKind::Play,
            Command::Stop => CommandKind::Stop,
            Command::Pause => CommandKind::Pause,
            Command::Ping { .. } => CommandKind::Ping,
            Command::SeekToTime { .. } | Command::SeekToTimeStamp(_) => CommandKind::SeekToTime,
            Command::SeekToPosition { .. } => CommandKind::SeekToPosition,
            Command::RegisterModule { .. } => CommandKind::RegisterModule,
            Command::AddNode { .. } => CommandKind::AddNode,
            Command::SetProperty { .. } => CommandKind::SetProperty,
            Command::LoadPlugin { .. } => CommandKind::LoadPlugin,
            Command::LoadPlugins { .. } => CommandKind::LoadPlugins,
        }
    }
}
