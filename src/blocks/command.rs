use std::fmt;

/// Length of every BLOCKS command payload in bytes
pub const PAYLOAD_LEN: usize = 8;

/// Category marker for scale commands
pub const SCALE_CATEGORY: [u8; 2] = [0x10, 0x60];
/// Category marker for key (root note) commands
pub const KEY_CATEGORY: [u8; 2] = [0x10, 0x30];

/// An 8-byte BLOCKS command payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command([u8; PAYLOAD_LEN]);

impl Command {
    pub const fn new(bytes: [u8; PAYLOAD_LEN]) -> Self {
        Command(bytes)
    }

    const fn scale(b2: u8, b3: u8) -> Self {
        Command([SCALE_CATEGORY[0], SCALE_CATEGORY[1], b2, b3, 0, 0, 0, 0])
    }

    pub fn bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }

    pub fn is_scale(&self) -> bool {
        self.0[..2] == SCALE_CATEGORY
    }

    pub fn is_key(&self) -> bool {
        self.0[..2] == KEY_CATEGORY
    }
}

impl fmt::Display for Command {
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

/// Scale names as Live reports them (lower-cased) and their BLOCKS payloads.
/// The first entry is the fallback for unknown names.
pub static SCALE_TABLE: [(&str, Command); 11] = [
    ("major", Command::scale(0x02, 0x00)),
    ("minor", Command::scale(0x22, 0x00)),
    ("harmonic minor", Command::scale(0x42, 0x00)),
    ("dorian", Command::scale(0x62, 0x01)),
    ("phrygian", Command::scale(0x02, 0x02)),
    ("lydian", Command::scale(0x22, 0x02)),
    ("mixolydian", Command::scale(0x42, 0x02)),
    ("blues", Command::scale(0x42, 0x01)),
    ("pentatonic major", Command::scale(0x02, 0x01)),
    ("pentatonic minor", Command::scale(0x22, 0x01)),
    ("chromatic", Command::scale(0x42, 0x04)),
];

/// Chromatic scale, every pad lit. Sent on drum rack entry.
pub const CHROMATIC_SCALE: Command = Command::scale(0x42, 0x04);

/// Key command with the root forced to C
pub const C_KEY: Command = Command::new([KEY_CATEGORY[0], KEY_CATEGORY[1], 0x03, 0, 0, 0, 0, 0]);

/// Look up the scale command for a scale name.
///
/// The name is trimmed and case-folded before lookup. Names not in
/// [`SCALE_TABLE`] fall back to major, so this never fails.
pub fn scale_command(name: &str) -> Command {
    let normalized = name.trim().to_lowercase();
    SCALE_TABLE
        .iter()
        .find(|(scale, _)| *scale == normalized)
        .unwrap_or(&SCALE_TABLE[0])
        .1
}

/// Build the key command for a root note (0 = C).
///
/// The key value is `3 + 32 * root`, sent as two 7-bit bytes, low first.
pub fn key_command(root: u8) -> Command {
    let val = 0x03 + 0x20 * u16::from(root);
    let lo = (val & 0x7F) as u8;
    let hi = ((val >> 7) & 0x7F) as u8;
    Command::new([KEY_CATEGORY[0], KEY_CATEGORY[1], lo, hi, 0, 0, 0, 0])
}
