mod config;
mod cpu;
mod display;
mod driver;
mod error;
mod fonts;
mod keypad;
mod machine;
mod opcode;

use std::error::Error;

use ggez::{conf, event, ContextBuilder};
use log::info;

pub use config::Opt;
pub use cpu::{Cpu, Quirks};
pub use display::DisplayDriver;
pub use driver::Driver;
pub use error::{RomError, StackError};
pub use fonts::FONT_SET;
pub use keypad::map_key;
pub use machine::{Framebuffer, Machine, MAX_ROM_SIZE, PROGRAM_START, STACK_DEPTH};
pub use opcode::Opcode;

pub const OPCODE_SIZE: u16 = 2;
pub const C8_WIDTH: usize = 64;
pub const C8_HEIGHT: usize = 32;

/// Load the rom named in `opt` and run it in a window until closed.
pub fn go(opt: Opt) -> Result<(), Box<dyn Error>> {
    let mut machine = Machine::new();
    let size = machine.load_rom(&opt.rom)?;
    info!("running {} ({} bytes)", opt.rom.display(), size);

    let cpu = match opt.seed {
        Some(seed) => Cpu::with_seed(seed),
        None => Cpu::new(),
    }
    .with_quirks(opt.quirks());

    let display = DisplayDriver::new(opt.scale);
    let (width, height) = display.window_size();

    let (mut ctx, mut event_loop) = ContextBuilder::new("rust-8", "sullivant")
        .window_setup(conf::WindowSetup::default().title("CHIP-8"))
        .window_mode(conf::WindowMode::default().dimensions(width, height))
        .build()?;

    let mut driver = Driver::new(machine, cpu, display, opt.cycles, opt.fps);
    event::run(&mut ctx, &mut event_loop, &mut driver)?;

    Ok(())
}
