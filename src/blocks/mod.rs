//! BLOCKS protocol support for the LUMI keyboard
//!
//! This module provides everything needed to turn a scale or key into bytes
//! the keyboard understands:
//! - Command payloads and the scale lookup table
//! - The BLOCKS rolling checksum
//! - SysEx framing with the broadcast device selector
//!
//! The main components are:
//! - [`Command`] for 8-byte BLOCKS payloads
//! - [`scale_command`] and [`key_command`] for building payloads
//! - [`Frame`] for the complete 16-byte SysEx message
//!
mod checksum;
mod command;
mod frame;

pub use checksum::checksum;
pub use command::{
    key_command, scale_command, Command, CHROMATIC_SCALE, C_KEY, KEY_CATEGORY, PAYLOAD_LEN,
    SCALE_CATEGORY, SCALE_TABLE,
};
pub use frame::{frame, Frame, FrameError, FRAME_LEN, HEADER, SYSEX_END};
