use std::fmt;

/// An instruction word broken into every field any opcode might use.
///
/// All fields are extracted regardless of which ones the instruction needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub word: u16,
    pub op: u8,
    pub x: usize,
    pub y: usize,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

impl Opcode {
    pub fn decode(word: u16) -> Opcode {
        Opcode {
            word,
            op: ((word & 0xF000) >> 12) as u8,
            x: ((word & 0x0F00) >> 8) as usize,
            y: ((word & 0x00F0) >> 4) as usize,
            n: (word & 0x000F) as u8,
            nn: (word & 0x00FF) as u8,
            nnn: word & 0x0FFF,
        }
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Opcode::decode(word)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.word)
    }
}
