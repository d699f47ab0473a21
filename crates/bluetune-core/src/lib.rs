//! BlueTune Core - protocol data model
//!
//! Types shared by everything that talks to a BlueTune playback engine:
//! - **Commands**: requests sent to the engine, correlated by [`CommandKind`]
//! - **Messages**: raw engine frames and their typed [`Message`] form
//! - **Stream info**: stream attributes with change masks and wide-word fields
//! - **Properties**: scoped, typed engine properties
//! - **Input**: the [`Input`] trait for caller-owned byte sources
//!
//! ## Quick Start
//!
//! ```rust
//! use bluetune_core::{Message, MessageKind, RawMessage};
//!
//! let raw = RawMessage::new(MessageKind::Volume).int(50);
//! assert_eq!(Message::decode(&raw).unwrap(), Some(Message::Volume(0.5)));
//! ```

/// Outbound commands
pub mod command;
/// Error types
pub mod error;
/// Caller-owned byte sources
pub mod input;
/// Logging configuration
pub mod logging;
/// Engine frames and notifications
pub mod message;
/// Scoped engine properties
pub mod property;
pub mod stream_info;
/// Status codes, decoder states, time codes
pub mod types;

pub use command::{Command, CommandKind, InputSource};
pub use error::{ProtocolError, Result};
pub use input::{Input, InputError, MemoryInput};
pub use logging::LogConfig;
pub use message::{Message, MessageKind, RawMessage};
pub use property::{PropertyNotification, PropertyScope, PropertyValue, PropertyValueType};
pub use stream_info::{decode_wide, encode_wide, StreamFlags, StreamInfo, StreamInfoMask};
pub use types::{
    normalize_slider, position_from_raw, position_to_raw, volume_from_raw, volume_to_raw,
    DecoderState, Status, TimeCode,
};
