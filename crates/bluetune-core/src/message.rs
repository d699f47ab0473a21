//! Engine notifications and their raw frame form
//!
//! Engines hand out [`RawMessage`] frames: a kind id plus positional integer
//! and object arguments. [`Message::decode`] turns a frame into the typed
//! tagged union delivered to listeners.

use crate::command::CommandKind;
use crate::error::{ProtocolError, Result};
use crate::property::{PropertyNotification, PropertyScope, PropertyValue, PropertyValueType};
use crate::stream_info::{StreamInfo, StreamInfoMask};
use crate::types::{
    position_from_raw, position_to_raw, volume_from_raw, volume_to_raw, DecoderState, Status,
    TimeCode,
};
use std::fmt;

/// Decoder event type reported when the decoder failed to initialize
pub const DECODER_EVENT_INIT_ERROR: i32 = 0;
/// Decoder event type reported on a decoding error
pub const DECODER_EVENT_DECODER_ERROR: i32 = 1;

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Ack,
    Nack,
    Pong,
    DecoderState,
    DecoderEvent,
    Volume,
    StreamTimeCode,
    StreamPosition,
    StreamInfo,
    Property,
}

impl MessageKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(MessageKind::Ack),
            1 => Some(MessageKind::Nack),
            2 => Some(MessageKind::Pong),
            3 => Some(MessageKind::DecoderState),
            4 => Some(MessageKind::DecoderEvent),
            5 => Some(MessageKind::Volume),
            6 => Some(MessageKind::StreamTimeCode),
            7 => Some(MessageKind::StreamPosition),
            8 => Some(MessageKind::StreamInfo),
            9 => Some(MessageKind::Property),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

/// Undecoded engine frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMessage {
    pub kind: i32,
    pub int_args: Vec<i32>,
    pub obj_args: Vec<Option<String>>,
}

impl RawMessage {
    pub fn new(kind: MessageKind) -> Self {
        Self::with_raw_kind(kind.as_raw())
    }

    /// Frame with an arbitrary kind id, including ids no [`MessageKind`] names
    pub fn with_raw_kind(kind: i32) -> Self {
        Self {
            kind,
            int_args: Vec::new(),
            obj_args: Vec::new(),
        }
    }

    pub fn int(mut self, value: i32) -> Self {
        self.int_args.push(value);
        self
    }

    pub fn ints(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.int_args.extend(values);
        self
    }

    pub fn obj(mut self, value: impl Into<String>) -> Self {
        self.obj_args.push(Some(value.into()));
        self
    }

    pub fn null_obj(mut self) -> Self {
        self.obj_args.push(None);
        self
    }

    fn int_arg(&self, kind: MessageKind, index: usize) -> Result<i32> {
        self.int_args
            .get(index)
            .copied()
            .ok_or(ProtocolError::MissingArgument {
                kind,
                what: "integer",
                index,
            })
    }

    fn obj_arg(&self, index: usize) -> Option<&str> {
        self.obj_args.get(index).and_then(|arg| arg.as_deref())
    }
}

/// Typed engine notification
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Ack(CommandKind),
    Nack { command: CommandKind, code: Status },
    Pong(i32),
    DecoderState(DecoderState),
    /// Carries the event type when the engine sends one; listeners do not
    /// interpret it.
    DecoderEvent { event_type: Option<i32> },
    /// Level in [0.0, 1.0]
    Volume(f32),
    StreamTimeCode(TimeCode),
    /// Fraction of the stream in [0.0, 1.0]
    StreamPosition(f32),
    StreamInfo {
        changed: StreamInfoMask,
        info: StreamInfo,
    },
    Property(PropertyNotification),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Ack(_) => MessageKind::Ack,
            Message::Nack { .. } => MessageKind::Nack,
            Message::Pong(_) => MessageKind::Pong,
            Message::DecoderState(_) => MessageKind::DecoderState,
            Message::DecoderEvent { .. } => MessageKind::DecoderEvent,
            Message::Volume(_) => MessageKind::Volume,
            Message::StreamTimeCode(_) => MessageKind::StreamTimeCode,
            Message::StreamPosition(_) => MessageKind::StreamPosition,
            Message::StreamInfo { .. } => MessageKind::StreamInfo,
            Message::Property(_) => MessageKind::Property,
        }
    }

    /// Decode a raw frame.
    ///
    /// `Ok(None)` means the frame is well formed but carries nothing to
    /// deliver (a property with an unrecognized value type). `Err` means the
    /// frame is malformed.
    pub fn decode(raw: &RawMessage) -> Result<Option<Message>> {
        let kind =
            MessageKind::from_raw(raw.kind).ok_or(ProtocolError::UnknownMessageKind(raw.kind))?;

        let message = match kind {
            MessageKind::Ack => Message::Ack(command_kind(raw.int_arg(kind, 0)?)?),
            MessageKind::Nack => Message::Nack {
                command: command_kind(raw.int_arg(kind, 0)?)?,
                code: Status(raw.int_arg(kind, 1)?),
            },
            MessageKind::Pong => Message::Pong(raw.int_arg(kind, 0)?),
            MessageKind::DecoderState => {
                let state = raw.int_arg(kind, 0)?;
                Message::DecoderState(
                    DecoderState::from_raw(state)
                        .ok_or(ProtocolError::UnknownDecoderState(state))?,
                )
            }
            MessageKind::DecoderEvent => Message::DecoderEvent {
                event_type: raw.int_args.first().copied(),
            },
            MessageKind::Volume => Message::Volume(volume_from_raw(raw.int_arg(kind, 0)?)),
            MessageKind::StreamTimeCode => {
                let mut parts = [0u8; 4];
                for (index, part) in parts.iter_mut().enumerate() {
                    let value = raw.int_arg(kind, index)?;
                    *part = u8::try_from(value).map_err(|_| ProtocolError::OutOfRange {
                        field: "timecode",
                        value: value as i64,
                    })?;
                }
                Message::StreamTimeCode(TimeCode::new(parts[0], parts[1], parts[2], parts[3]))
            }
            MessageKind::StreamPosition => {
                Message::StreamPosition(position_from_raw(raw.int_arg(kind, 0)?))
            }
            MessageKind::StreamInfo => {
                let (changed, info) = StreamInfo::from_frame(&raw.int_args, &raw.obj_args)?;
                Message::StreamInfo { changed, info }
            }
            MessageKind::Property => match decode_property(raw)? {
                Some(notification) => Message::Property(notification),
                None => return Ok(None),
            },
        };

        Ok(Some(message))
    }

    /// Encode into a raw frame, the inverse of [`Message::decode`]
    pub fn encode(&self) -> Result<RawMessage> {
        let raw = RawMessage::new(self.kind());
        let raw = match self {
            Message::Ack(command) => raw.int(command.as_raw()),
            Message::Nack { command, code } => raw.int(command.as_raw()).int(code.code()),
            Message::Pong(cookie) => raw.int(*cookie),
            Message::DecoderState(state) => raw.int(state.as_raw()),
            Message::DecoderEvent { event_type } => raw.ints(*event_type),
            Message::Volume(level) => raw.int(volume_to_raw(*level)),
            Message::StreamTimeCode(tc) => {
                raw.ints([tc.h as i32, tc.m as i32, tc.s as i32, tc.f as i32])
            }
            Message::StreamPosition(fraction) => raw.int(position_to_raw(*fraction)),
            Message::StreamInfo { changed, info } => {
                let (ints, objs) = info.to_frame(*changed)?;
                RawMessage {
                    int_args: ints,
                    obj_args: objs,
                    ..raw
                }
            }
            Message::Property(notification) => encode_property(raw, notification)?,
        };
        Ok(raw)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn command_kind(raw: i32) -> Result<CommandKind> {
    CommandKind::from_raw(raw).ok_or(ProtocolError::UnknownCommand(raw))
}

fn decode_property(raw: &RawMessage) -> Result<Option<PropertyNotification>> {
    let kind = MessageKind::Property;
    let scope = raw.int_arg(kind, 0)?;
    let scope = PropertyScope::from_raw(scope).ok_or(ProtocolError::UnknownPropertyScope(scope))?;
    let value_type = raw.int_arg(kind, 1)?;

    let value = if value_type == PropertyValueType::NONE {
        None
    } else {
        let Some(value_type) = PropertyValueType::from_raw(value_type) else {
            return Ok(None);
        };
        Some(match value_type {
            PropertyValueType::Integer => PropertyValue::Integer(raw.int_arg(kind, 2)?),
            // engines never send float values; the frame is dropped
            PropertyValueType::Float => return Ok(None),
            PropertyValueType::Boolean => PropertyValue::Boolean(raw.int_arg(kind, 2)? != 0),
            PropertyValueType::String => {
                PropertyValue::String(raw.obj_arg(2).unwrap_or_default().to_string())
            }
        })
    };

    Ok(Some(PropertyNotification {
        scope,
        source: raw.obj_arg(0).unwrap_or_default().to_string(),
        name: raw.obj_arg(1).unwrap_or_default().to_string(),
        value,
    }))
}

fn encode_property(raw: RawMessage, notification: &PropertyNotification) -> Result<RawMessage> {
    let raw = raw.int(notification.scope.as_raw());
    let raw = match &notification.value {
        None => raw.int(PropertyValueType::NONE).int(0),
        Some(value) => {
            let raw_value = match value {
                PropertyValue::Integer(v) => *v,
                PropertyValue::Float(_) => {
                    return Err(ProtocolError::UnsupportedValueType(PropertyValueType::Float))
                }
                PropertyValue::Boolean(v) => *v as i32,
                PropertyValue::String(_) => 0,
            };
            raw.int(value.value_type().as_raw()).int(raw_value)
        }
    };
    let raw = raw
        .obj(notification.source.as_str())
        .obj(notification.name.as_str());
    Ok(match &notification.value {
        Some(PropertyValue::String(text)) => raw.obj(text.as_str()),
        _ => raw.null_obj(),
    })
}
