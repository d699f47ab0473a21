//! Abstract input sources
//!
//! Callers that hold media bytes in-process hand an [`Input`] to the engine
//! instead of a named locator.

use thiserror::Error;

/// Failure of an input operation. Each variant has a fixed wire code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("end of stream")]
    Eos,

    #[error("operation not supported")]
    NotSupported,

    #[error("offset out of range")]
    OutOfRange,
}

impl InputError {
    pub fn code(self) -> i32 {
        match self {
            InputError::Eos => -1,
            InputError::NotSupported => -2,
            InputError::OutOfRange => -3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(InputError::Eos),
            -2 => Some(InputError::NotSupported),
            -3 => Some(InputError::OutOfRange),
            _ => None,
        }
    }
}

/// Readable, seekable byte source
pub trait Input: Send {
    /// Read up to `buffer.len()` bytes. Returns [`InputError::Eos`] once the
    /// source is exhausted, never `Ok(0)` for a non-empty buffer.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, InputError>;

    /// Move to an absolute offset
    fn seek(&mut self, offset: u64) -> Result<(), InputError>;

    /// Current offset
    fn tell(&self) -> u64;

    /// Total size in bytes
    fn size(&self) -> u64;

    /// Bytes left between the current offset and the end
    fn available(&self) -> u64 {
        self.size().saturating_sub(self.tell())
    }
}

/// Input backed by an owned byte buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
    data: Vec<u8>,
    position: usize,
}

impl MemoryInput {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }
}

impl Input for MemoryInput {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, InputError> {
        if buffer.is_empty() {
            return Ok(0);
        }
        let remaining = &self.data[self.position..];
        if remaining.is_empty() {
            return Err(InputError::Eos);
        }
        let count = remaining.len().min(buffer.len());
        buffer[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        Ok(count)
    }

    fn seek(&mut self, offset: u64) -> Result<(), InputError> {
        let offset = usize::try_from(offset).map_err(|_| InputError::OutOfRange)?;
        if offset > self.data.len() {
            return Err(InputError::OutOfRange);
        }
        self.position = offset;
        Ok(())
    }

    fn tell(&self) -> u64 {
        self.position as u64
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
