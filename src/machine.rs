use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::error::{RomError, StackError};
use crate::fonts::FONT_SET;
use crate::{C8_HEIGHT, C8_WIDTH};

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_DEPTH: usize = 16;

pub type Framebuffer = [[bool; C8_WIDTH]; C8_HEIGHT];

/// Everything a CHIP-8 program can observe or change.
pub struct Machine {
    // Memory
    pub memory: [u8; MEMORY_SIZE],

    // Registers
    pub v: [u8; 16],
    pub i: u16,  // Index register
    pub pc: u16, // Program Counter

    // Stack and stack pointer, sp counts live entries
    pub stack: [u16; STACK_DEPTH],
    pub sp: usize,

    // Pixels, indexed [y][x]
    pub gfx: Framebuffer,

    // Hex keypad
    pub key: [bool; 16],

    // Some timers
    pub delay_timer: u8,
    pub sound_timer: u8,

    pub should_draw: bool,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Machine {
        let mut m = Machine {
            memory: [0; MEMORY_SIZE],
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            stack: [0; STACK_DEPTH],
            sp: 0,
            gfx: [[false; C8_WIDTH]; C8_HEIGHT],
            key: [false; 16],
            delay_timer: 0,
            sound_timer: 0,
            should_draw: false,
        };
        m.reset();
        m
    }

    /// Power-on state: everything zeroed, fonts loaded, pc at 0x200.
    pub fn reset(&mut self) {
        self.memory = [0; MEMORY_SIZE];
        self.memory[..FONT_SET.len()].copy_from_slice(&FONT_SET);

        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_START;

        self.stack = [0; STACK_DEPTH];
        self.sp = 0;

        self.gfx = [[false; C8_WIDTH]; C8_HEIGHT];
        self.key = [false; 16];

        self.delay_timer = 0;
        self.sound_timer = 0;
        self.should_draw = false;

        debug!("machine reset");
    }

    /// Read a rom file and place it at 0x200. Oversized files are rejected
    /// before any of their contents are read.
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, RomError> {
        let size = fs::metadata(path.as_ref())?.len();
        if size > MAX_ROM_SIZE as u64 {
            return Err(RomError::TooLarge {
                size: size as usize,
                max: MAX_ROM_SIZE,
            });
        }

        // The file may have grown since the size check, never buffer more
        // than one byte past the limit
        let mut rom = Vec::with_capacity(size as usize);
        File::open(path.as_ref())?
            .take(MAX_ROM_SIZE as u64 + 1)
            .read_to_end(&mut rom)?;
        debug!("read {} bytes from {}", rom.len(), path.as_ref().display());
        self.load_rom_bytes(&rom)
    }

    /// Copy program bytes verbatim to 0x200. Memory is untouched when the
    /// program does not fit.
    pub fn load_rom_bytes(&mut self, rom: &[u8]) -> Result<usize, RomError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(RomError::TooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} byte rom at {:#05X}", rom.len(), PROGRAM_START);
        Ok(rom.len())
    }

    // Memory is 4K, anything past 0xFFF wraps around
    pub fn read_byte(&self, addr: u16) -> u8 {
        self.memory[addr as usize & (MEMORY_SIZE - 1)]
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize & (MEMORY_SIZE - 1)] = value;
    }

    // Big-endian word at the program counter
    pub fn read_word(&self) -> u16 {
        (u16::from(self.read_byte(self.pc)) << 8) | u16::from(self.read_byte(self.pc.wrapping_add(1)))
    }

    pub fn push_return(&mut self, addr: u16) -> Result<(), StackError> {
        if self.sp >= STACK_DEPTH {
            return Err(StackError::Overflow);
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop_return(&mut self) -> Result<u16, StackError> {
        if self.sp == 0 {
            return Err(StackError::Underflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// Called once per frame, independent of how many instructions ran.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn set_key(&mut self, index: u8, pressed: bool) {
        self.key[(index & 0x0F) as usize] = pressed;
    }

    pub fn gfx(&self) -> &Framebuffer {
        &self.gfx
    }

    /// Returns whether the screen changed since the last call, and clears the flag.
    pub fn take_should_draw(&mut self) -> bool {
        let draw = self.should_draw;
        self.should_draw = false;
        draw
    }

    pub fn clear_screen(&mut self) {
        self.gfx = [[false; C8_WIDTH]; C8_HEIGHT];
        self.should_draw = true;
    }

    pub fn dump_regs(&self) {
        debug!("  v: {:02X?} i: {:#05X} pc: {:#05X} sp: {}", self.v, self.i, self.pc, self.sp);
    }
}
