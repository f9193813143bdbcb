//! Binary encode/decode of a channel's persisted state.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! [mode u8 ordinal] [delay i32] [offset i32]
//! ```
//!
//! Nine bytes, no header. The endpoint cache is never persisted; it is
//! rebuilt from the live topology on the first active tick.

use std::error::Error;
use std::fmt;
use std::io::{self, Read, Write};

use crate::config::ChannelMode;

/// Encoded size of a [`ChannelState`].
pub const STATE_LEN: usize = 1 + 4 + 4;

/// Persisted channel fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// Distribution policy.
    pub mode: ChannelMode,
    /// Delay counter.
    pub delay: i32,
    /// Round-robin offset.
    pub offset: i32,
}

/// Errors from decoding or encoding [`ChannelState`].
#[derive(Debug)]
pub enum CodecError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The mode byte does not name a known mode.
    UnknownMode {
        /// The unrecognized ordinal.
        ordinal: u8,
    },
    /// The stored round-robin offset is negative.
    NegativeOffset {
        /// The stored value.
        offset: i32,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnknownMode { ordinal } => write!(f, "unknown channel mode ordinal {ordinal}"),
            Self::NegativeOffset { offset } => {
                write!(f, "round-robin offset {offset} is negative")
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), CodecError> {
    w.write_all(&[v])?;
    Ok(())
}

fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn read_u8(r: &mut dyn Read) -> Result<u8, CodecError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_i32_le(r: &mut dyn Read) -> Result<i32, CodecError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Write `state` in the persisted layout.
pub fn encode_state(w: &mut dyn Write, state: &ChannelState) -> Result<(), CodecError> {
    write_u8(w, state.mode.ordinal())?;
    write_i32_le(w, state.delay)?;
    write_i32_le(w, state.offset)?;
    Ok(())
}

/// Read a state written by [`encode_state`].
pub fn decode_state(r: &mut dyn Read) -> Result<ChannelState, CodecError> {
    let ordinal = read_u8(r)?;
    let mode = ChannelMode::from_ordinal(ordinal).ok_or(CodecError::UnknownMode { ordinal })?;
    let delay = read_i32_le(r)?;
    let offset = read_i32_le(r)?;
    if offset < 0 {
        return Err(CodecError::NegativeOffset { offset });
    }
    Ok(ChannelState {
        mode,
        delay,
        offset,
    })
}
