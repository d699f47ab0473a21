//! Error types for protocol decoding
use thiserror::Error;

use crate::message::MessageKind;
use crate::property::PropertyValueType;

/// Errors raised while decoding engine frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame carries a message kind this protocol does not know
    #[error("Unknown message kind: {0}")]
    UnknownMessageKind(i32),

    /// An Ack/Nack refers to a command id outside the command table
    #[error("Unknown command id: {0}")]
    UnknownCommand(i32),

    /// A decoder state outside the state table
    #[error("Unknown decoder state: {0}")]
    UnknownDecoderState(i32),

    /// A property scope outside the scope table
    #[error("Unknown property scope: {0}")]
    UnknownPropertyScope(i32),

    /// The frame is shorter than its kind requires
    #[error("{kind:?} frame is missing {what} argument #{index}")]
    MissingArgument {
        /// Kind of the truncated frame
        kind: MessageKind,
        /// "integer" or "object"
        what: &'static str,
        /// Index of the missing argument
        index: usize,
    },

    /// A numeric field does not fit its target type
    #[error("Value out of range for {field}: {value}")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Offending raw value
        value: i64,
    },

    /// Property values of this type are not carried by engine frames
    #[error("{0:?} property values cannot be sent in a frame")]
    UnsupportedValueType(PropertyValueType),
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
