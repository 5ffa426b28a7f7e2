use crate::blocks::Frame;
use log::{debug, error, info};
use midir::{MidiOutput, MidiOutputConnection};
use std::error::Error;
use std::fmt;

/// Custom error type for MIDI output operations
#[derive(Debug)]
pub enum MidiError {
    /// Error when sending a frame to the device
    SendError(String),
    /// Error when connecting to a MIDI device
    ConnectionError(String),
    /// No output port matched the requested name
    PortNotFound(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
            MidiError::PortNotFound(name) => {
                write!(f, "MIDI output device '{}' not found", name)
            }
        }
    }
}

impl Error for MidiError {}

impl From<midir::InitError> for MidiError {
    fn from(e: midir::InitError) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl From<midir::PortInfoError> for MidiError {
    fn from(e: midir::PortInfoError) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for MidiError {
    fn from(e: midir::ConnectError<T>) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl From<midir::SendError> for MidiError {
    fn from(e: midir::SendError) -> Self {
        MidiError::SendError(e.to_string())
    }
}

/// Result type for MIDI output operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Destination for framed BLOCKS commands. Sending is fire-and-forget.
pub trait FrameSink {
    fn send(&mut self, frame: &Frame) -> Result<()>;
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        (**self).send(frame)
    }
}

/// Sends frames to a MIDI output port through midir
pub struct MidiOutputManager {
    connection: Option<MidiOutputConnection>,
}

impl Default for MidiOutputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiOutputManager {
    pub fn new() -> Self {
        MidiOutputManager { connection: None }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Connect to the first output port whose name matches `wanted`.
    pub fn connect_to_device(&mut self, wanted: &str) -> Result<()> {
        let midi_out = MidiOutput::new("lumisyncrs-output")?;

        let port = midi_out
            .ports()
            .into_iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .map(|name| port_matches(&name, wanted))
                    .unwrap_or(false)
            })
            .ok_or_else(|| {
                error!(
                    "No MIDI output port matches '{}' (have {:?})",
                    wanted,
                    port_names(&midi_out)
                );
                MidiError::PortNotFound(wanted.to_string())
            })?;

        let port_name = midi_out.port_name(&port)?;
        info!("Connecting to MIDI output port: {}", port_name);

        let connection = midi_out.connect(&port, "lumisyncrs-sysex")?;
        self.connection = Some(connection);
        Ok(())
    }

    pub fn list_available_ports() -> Result<Vec<String>> {
        let midi_out = MidiOutput::new("lumisyncrs-port-lister")?;
        Ok(port_names(&midi_out))
    }
}

fn port_names(midi_out: &MidiOutput) -> Vec<String> {
    midi_out
        .ports()
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect()
}

/// Port names differ by OS ("LUMI Keys BLOCK", "LUMI Keys BLOCK MIDI 1"),
/// so ports are matched by case-insensitive substring.
pub fn port_matches(port_name: &str, wanted: &str) -> bool {
    port_name.to_lowercase().contains(&wanted.to_lowercase())
}

impl FrameSink for MidiOutputManager {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        let conn = self
            .connection
            .as_mut()
            .ok_or_else(|| MidiError::SendError("MIDI output not connected".to_string()))?;

        debug!("Sending SysEx: {}", frame);
        conn.send(frame.as_bytes())?;
        Ok(())
    }
}

/// Prints frames instead of sending them
#[derive(Debug, Default)]
pub struct DryRunSink;

impl DryRunSink {
    /// Parse raw SysEx bytes the way the keyboard would and describe them.
    pub fn describe(bytes: &[u8]) -> String {
        match Frame::decode(bytes) {
            Ok(frame) => {
                let command = frame.command();
                let kind = if command.is_scale() {
                    "scale"
                } else if command.is_key() {
                    "key"
                } else {
                    "unknown"
                };
                format!(
                    "{} command [{}] checksum 0x{:02X}",
                    kind,
                    command,
                    frame.checksum()
                )
            }
            Err(e) => format!("invalid frame: {}", e),
        }
    }
}

impl FrameSink for DryRunSink {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        let description = Self::describe(frame.as_bytes());
        info!("Dry run SysEx: {} ({})", frame, description);
        println!("{}  {}", frame, description);
        Ok(())
    }
}

/// Keeps every frame it is given, in order
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub frames: Vec<Frame>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.frames)
    }
}

impl FrameSink for RecordingSink {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}
