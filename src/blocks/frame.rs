use super::checksum::checksum;
use super::command::{Command, PAYLOAD_LEN};
use std::error::Error;
use std::fmt;

/// SysEx start, ROLI manufacturer id, BLOCKS message type, broadcast selector
pub const HEADER: [u8; 6] = [0xF0, 0x00, 0x21, 0x10, 0x77, 0x00];
/// End of exclusive
pub const SYSEX_END: u8 = 0xF7;
/// Total length of a framed command
pub const FRAME_LEN: usize = HEADER.len() + PAYLOAD_LEN + 2;

const CHECKSUM_OFFSET: usize = HEADER.len() + PAYLOAD_LEN;

/// A complete SysEx message carrying one BLOCKS command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

/// Wrap a command in the broadcast SysEx header, checksum and terminator.
pub fn frame(command: &Command) -> Frame {
    let payload = command.bytes();
    let mut bytes = [0u8; FRAME_LEN];
    bytes[..HEADER.len()].copy_from_slice(&HEADER);
    bytes[HEADER.len()..CHECKSUM_OFFSET].copy_from_slice(payload);
    bytes[CHECKSUM_OFFSET] = checksum(payload);
    bytes[FRAME_LEN - 1] = SYSEX_END;
    Frame(bytes)
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn command(&self) -> Command {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload.copy_from_slice(&self.0[HEADER.len()..CHECKSUM_OFFSET]);
        Command::new(payload)
    }

    pub fn checksum(&self) -> u8 {
        self.0[CHECKSUM_OFFSET]
    }

    /// Parse raw bytes back into a frame, validating every fixed field.
    pub fn decode(bytes: &[u8]) -> Result<Frame, FrameError> {
        if bytes.len() != FRAME_LEN {
            return Err(FrameError::Length(bytes.len()));
        }
        if bytes[..HEADER.len()] != HEADER {
            return Err(FrameError::Header);
        }
        if bytes[FRAME_LEN - 1] != SYSEX_END {
            return Err(FrameError::Terminator(bytes[FRAME_LEN - 1]));
        }

        let expected = checksum(&bytes[HEADER.len()..CHECKSUM_OFFSET]);
        let found = bytes[CHECKSUM_OFFSET];
        if expected != found {
            return Err(FrameError::Checksum { expected, found });
        }

        let mut out = [0u8; FRAME_LEN];
        out.copy_from_slice(bytes);
        Ok(Frame(out))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// Reasons a byte sequence is not a valid BLOCKS frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    Length(usize),
    Header,
    Terminator(u8),
    Checksum { expected: u8, found: u8 },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Length(len) => {
                write!(f, "frame length {} (expected {})", len, FRAME_LEN)
            }
            FrameError::Header => write!(f, "frame header mismatch"),
            FrameError::Terminator(b) => write!(f, "bad frame terminator 0x{:02X}", b),
            FrameError::Checksum { expected, found } => write!(
                f,
                "checksum mismatch: expected 0x{:02X}, found 0x{:02X}",
                expected, found
            ),
        }
    }
}

impl Error for FrameError {}
