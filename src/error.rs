use std::error::Error;
use std::fmt;
use std::io;

/// Reasons a ROM could not be placed into memory.
#[derive(Debug)]
pub enum RomError {
    Io(io::Error),
    TooLarge { size: usize, max: usize },
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RomError::Io(e) => write!(f, "could not read rom: {}", e),
            RomError::TooLarge { size, max } => {
                write!(f, "rom is {} bytes, at most {} fit in memory", size, max)
            }
        }
    }
}

impl Error for RomError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RomError::Io(e) => Some(e),
            RomError::TooLarge { .. } => None,
        }
    }
}

impl From<io::Error> for RomError {
    fn from(e: io::Error) -> Self {
        RomError::Io(e)
    }
}

/// Return stack faults. CHIP-8 leaves these undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    Overflow,
    Underflow,
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackError::Overflow => write!(f, "call stack overflow"),
            StackError::Underflow => write!(f, "return with an empty call stack"),
        }
    }
}

impl Error for StackError {}
