use ggez::event::{self, EventHandler, KeyCode, KeyMods};
use ggez::{timer, Context, GameResult};
use log::debug;

use crate::cpu::Cpu;
use crate::display::DisplayDriver;
use crate::keypad::map_key;
use crate::machine::Machine;

/// Paces the machine: per frame, `cycles` instructions then one timer tick.
pub struct Driver {
    pub machine: Machine,
    pub cpu: Cpu,
    display: DisplayDriver,
    cycles: u32,
    fps: u32,
}

impl Driver {
    pub fn new(mut machine: Machine, cpu: Cpu, display: DisplayDriver, cycles: u32, fps: u32) -> Driver {
        // Present a cleared screen before the rom draws anything
        machine.should_draw = true;
        Driver {
            machine,
            cpu,
            display,
            cycles,
            fps,
        }
    }

    /// One frame worth of work, without any wall clock involved.
    pub fn run_frame(&mut self) {
        for _ in 0..self.cycles {
            self.cpu.step(&mut self.machine);
        }
        self.machine.tick_timers();
    }
}

impl EventHandler for Driver {
    fn update(&mut self, ctx: &mut Context) -> GameResult {
        while timer::check_update_time(ctx, self.fps) {
            self.run_frame();
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult {
        if self.machine.take_should_draw() {
            self.display.draw(ctx, self.machine.gfx())?;
        }
        timer::yield_now();
        Ok(())
    }

    fn key_down_event(&mut self, ctx: &mut Context, keycode: KeyCode, _keymods: KeyMods, _repeat: bool) {
        if keycode == KeyCode::Escape {
            debug!("escape pressed, quitting");
            event::quit(ctx);
            return;
        }
        if let Some(index) = map_key(keycode) {
            self.machine.set_key(index, true);
        }
    }

    fn key_up_event(&mut self, _ctx: &mut Context, keycode: KeyCode, _keymods: KeyMods) {
        if let Some(index) = map_key(keycode) {
            self.machine.set_key(index, false);
        }
    }
}
