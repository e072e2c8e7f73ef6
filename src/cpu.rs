use log::{error, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fonts::GLYPH_SIZE;
use crate::machine::Machine;
use crate::opcode::Opcode;
use crate::{C8_HEIGHT, C8_WIDTH, OPCODE_SIZE};

/// How an instruction moves the program counter once it has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramCounter {
    Next,
    Skip,
    Jump(u16),
    // Re-run this instruction on the next step (FX0A)
    Stay,
}

/// Behaviour that differs between historical interpreters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY6 / 8XYE copy Vy into Vx before shifting, as the COSMAC VIP did.
    pub shift_uses_vy: bool,
}

type Handler = fn(&mut Cpu, &mut Machine, &Opcode) -> ProgramCounter;

// Indexed by the top nibble of the instruction
const PRIMARY: [Handler; 16] = [
    Cpu::op_0xxx, // 00E0, 00EE
    Cpu::op_1nnn, // JP addr
    Cpu::op_2nnn, // CALL addr
    Cpu::op_3xnn, // SE Vx, byte
    Cpu::op_4xnn, // SNE Vx, byte
    Cpu::op_5xy0, // SE Vx, Vy
    Cpu::op_6xnn, // LD Vx, byte
    Cpu::op_7xnn, // ADD Vx, byte
    Cpu::op_8xyn, // ALU
    Cpu::op_9xy0, // SNE Vx, Vy
    Cpu::op_annn, // LD I, addr
    Cpu::op_bnnn, // JP V0, addr
    Cpu::op_cxnn, // RND Vx, byte
    Cpu::op_dxyn, // DRW Vx, Vy, nibble
    Cpu::op_exnn, // SKP / SKNP
    Cpu::op_fxnn, // timers, keys, memory
];

/// The fetch/decode/execute half of the machine.
///
/// Holds nothing a program can see, only the random source and the quirk
/// settings; all state lives in [`Machine`].
pub struct Cpu {
    rng: StdRng,
    quirks: Quirks,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            rng: StdRng::from_entropy(),
            quirks: Quirks::default(),
        }
    }

    /// Deterministic random source, for tests and replays.
    pub fn with_seed(seed: u64) -> Cpu {
        Cpu {
            rng: StdRng::seed_from_u64(seed),
            quirks: Quirks::default(),
        }
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Cpu {
        self.quirks = quirks;
        self
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Fetch the word at pc and execute it.
    pub fn step(&mut self, machine: &mut Machine) {
        let opcode = machine.read_word();
        self.run_opcode(machine, opcode);
    }

    pub fn run_opcode(&mut self, machine: &mut Machine, opcode: u16) {
        let op = Opcode::decode(opcode);
        trace!("{:#05X}: {}", machine.pc, op);

        let handler = PRIMARY[op.op as usize];
        match handler(self, machine, &op) {
            ProgramCounter::Next => machine.pc = machine.pc.wrapping_add(OPCODE_SIZE),
            ProgramCounter::Skip => machine.pc = machine.pc.wrapping_add(OPCODE_SIZE * 2),
            ProgramCounter::Jump(p) => machine.pc = p,
            ProgramCounter::Stay => {}
        }
    }

    fn unknown(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        warn!("unknown opcode {} at {:#05X}", op, m.pc);
        ProgramCounter::Next
    }

    fn op_0xxx(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        match op.nn {
            0xE0 => self.op_00e0(m, op),
            0xEE => self.op_00ee(m, op),
            // 0NNN machine code routines are not emulated
            _ => self.unknown(m, op),
        }
    }

    fn op_8xyn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        match op.n {
            0x0 => self.op_8xy0(m, op),
            0x1 => self.op_8xy1(m, op),
            0x2 => self.op_8xy2(m, op),
            0x3 => self.op_8xy3(m, op),
            0x4 => self.op_8xy4(m, op),
            0x5 => self.op_8xy5(m, op),
            0x6 => self.op_8xy6(m, op),
            0x7 => self.op_8xy7(m, op),
            0xE => self.op_8xye(m, op),
            _ => self.unknown(m, op),
        }
    }

    fn op_exnn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        match op.nn {
            0x9E => self.op_ex9e(m, op),
            0xA1 => self.op_exa1(m, op),
            _ => self.unknown(m, op),
        }
    }

    fn op_fxnn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        match op.nn {
            0x07 => self.op_fx07(m, op),
            0x0A => self.op_fx0a(m, op),
            0x15 => self.op_fx15(m, op),
            0x18 => self.op_fx18(m, op),
            0x1E => self.op_fx1e(m, op),
            0x29 => self.op_fx29(m, op),
            0x33 => self.op_fx33(m, op),
            0x55 => self.op_fx55(m, op),
            0x65 => self.op_fx65(m, op),
            _ => self.unknown(m, op),
        }
    }

    // Clear the screen
    fn op_00e0(&mut self, m: &mut Machine, _op: &Opcode) -> ProgramCounter {
        m.clear_screen();
        ProgramCounter::Next
    }

    // Return to the caller, skipping past the original CALL
    fn op_00ee(&mut self, m: &mut Machine, _op: &Opcode) -> ProgramCounter {
        match m.pop_return() {
            Ok(p) => ProgramCounter::Jump(p.wrapping_add(OPCODE_SIZE)),
            Err(e) => {
                error!("{} at {:#05X}, skipping", e, m.pc);
                m.dump_regs();
                ProgramCounter::Next
            }
        }
    }

    // PC Jumps to location NNN
    fn op_1nnn(&mut self, _m: &mut Machine, op: &Opcode) -> ProgramCounter {
        ProgramCounter::Jump(op.nnn)
    }

    // Call subroutine at NNN; the address of this instruction is saved
    fn op_2nnn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        match m.push_return(m.pc) {
            Ok(()) => ProgramCounter::Jump(op.nnn),
            Err(e) => {
                error!("{} calling {:#05X} from {:#05X}, skipping", e, op.nnn, m.pc);
                m.dump_regs();
                ProgramCounter::Next
            }
        }
    }

    // Skip next if Vx = nn
    fn op_3xnn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        if m.v[op.x] == op.nn {
            return ProgramCounter::Skip;
        }
        ProgramCounter::Next
    }

    // Skip next if Vx != nn
    fn op_4xnn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        if m.v[op.x] != op.nn {
            return ProgramCounter::Skip;
        }
        ProgramCounter::Next
    }

    // Skip next if Vx = Vy
    fn op_5xy0(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        if m.v[op.x] == m.v[op.y] {
            return ProgramCounter::Skip;
        }
        ProgramCounter::Next
    }

    // Set Vx = nn
    fn op_6xnn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.v[op.x] = op.nn;
        ProgramCounter::Next
    }

    // Set Vx = Vx + nn, VF untouched
    fn op_7xnn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.v[op.x] = m.v[op.x].wrapping_add(op.nn);
        ProgramCounter::Next
    }

    // Puts Vy into Vx
    fn op_8xy0(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.v[op.x] = m.v[op.y];
        ProgramCounter::Next
    }

    fn op_8xy1(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.v[op.x] |= m.v[op.y];
        ProgramCounter::Next
    }

    fn op_8xy2(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.v[op.x] &= m.v[op.y];
        ProgramCounter::Next
    }

    fn op_8xy3(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.v[op.x] ^= m.v[op.y];
        ProgramCounter::Next
    }

    // Vx = Vx + Vy; VF = carry
    fn op_8xy4(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        let sum = u16::from(m.v[op.x]) + u16::from(m.v[op.y]);
        m.v[op.x] = sum as u8;
        m.v[0xF] = (sum > 0xFF) as u8;
        ProgramCounter::Next
    }

    // Vx = Vx - Vy; VF = NOT borrow
    fn op_8xy5(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        let (vx, vy) = (m.v[op.x], m.v[op.y]);
        m.v[op.x] = vx.wrapping_sub(vy);
        m.v[0xF] = (vx >= vy) as u8;
        ProgramCounter::Next
    }

    // Vx = Vx SHR 1; VF = bit shifted out
    fn op_8xy6(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        let src = if self.quirks.shift_uses_vy { m.v[op.y] } else { m.v[op.x] };
        m.v[op.x] = src >> 1;
        // Flag written last: with X = F, VF ends up holding the shifted-out bit
        m.v[0xF] = src & 0x01;
        ProgramCounter::Next
    }

    // Vx = Vy - Vx; VF = NOT borrow
    fn op_8xy7(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        let (vx, vy) = (m.v[op.x], m.v[op.y]);
        m.v[op.x] = vy.wrapping_sub(vx);
        m.v[0xF] = (vy >= vx) as u8;
        ProgramCounter::Next
    }

    // Vx = Vx SHL 1; VF = bit shifted out
    fn op_8xye(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        let src = if self.quirks.shift_uses_vy { m.v[op.y] } else { m.v[op.x] };
        m.v[op.x] = src << 1;
        // Same ordering as 8XY6, the flag wins over the result
        m.v[0xF] = src >> 7;
        ProgramCounter::Next
    }

    // Skip next if Vx != Vy
    fn op_9xy0(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        if m.v[op.x] != m.v[op.y] {
            return ProgramCounter::Skip;
        }
        ProgramCounter::Next
    }

    fn op_annn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.i = op.nnn;
        ProgramCounter::Next
    }

    fn op_bnnn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        ProgramCounter::Jump(op.nnn + u16::from(m.v[0]))
    }

    // Vx = random byte AND nn
    fn op_cxnn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        let r: u8 = self.rng.gen();
        m.v[op.x] = r & op.nn;
        ProgramCounter::Next
    }

    // Draw an 8 x n sprite from memory[I..] at (Vx, Vy). Every pixel wraps
    // on its own; VF = 1 if any lit pixel was switched off.
    fn op_dxyn(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        let ox = m.v[op.x] as usize % C8_WIDTH;
        let oy = m.v[op.y] as usize % C8_HEIGHT;
        m.v[0xF] = 0;

        for row in 0..op.n as usize {
            let sprite = m.read_byte(m.i.wrapping_add(row as u16));
            let y = (oy + row) % C8_HEIGHT;
            for col in 0..8 {
                if sprite & (0x80 >> col) == 0 {
                    continue;
                }
                let x = (ox + col) % C8_WIDTH;
                if m.gfx[y][x] {
                    m.v[0xF] = 1;
                }
                m.gfx[y][x] ^= true;
            }
        }

        m.should_draw = true;
        ProgramCounter::Next
    }

    // Skip next if key Vx is down
    fn op_ex9e(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        if m.key[(m.v[op.x] & 0x0F) as usize] {
            return ProgramCounter::Skip;
        }
        ProgramCounter::Next
    }

    // Skip next if key Vx is up
    fn op_exa1(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        if !m.key[(m.v[op.x] & 0x0F) as usize] {
            return ProgramCounter::Skip;
        }
        ProgramCounter::Next
    }

    fn op_fx07(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.v[op.x] = m.delay_timer;
        ProgramCounter::Next
    }

    // Wait for a key. Lowest pressed index wins; with nothing pressed the
    // same instruction runs again next step.
    fn op_fx0a(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        match m.key.iter().position(|&pressed| pressed) {
            Some(k) => {
                m.v[op.x] = k as u8;
                ProgramCounter::Next
            }
            None => ProgramCounter::Stay,
        }
    }

    fn op_fx15(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.delay_timer = m.v[op.x];
        ProgramCounter::Next
    }

    fn op_fx18(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.sound_timer = m.v[op.x];
        ProgramCounter::Next
    }

    // I = I + Vx; VF = 1 when I leaves the 12 bit address space
    fn op_fx1e(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        let sum = u32::from(m.i) + u32::from(m.v[op.x]);
        m.i = sum as u16;
        m.v[0xF] = (sum > 0xFFF) as u8;
        ProgramCounter::Next
    }

    // I = address of the font glyph for digit Vx
    fn op_fx29(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        m.i = u16::from(m.v[op.x] & 0x0F) * GLYPH_SIZE;
        ProgramCounter::Next
    }

    // Hundreds, tens and ones of Vx at I, I+1, I+2
    fn op_fx33(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        let vx = m.v[op.x];
        let i = m.i;
        m.write_byte(i, vx / 100);
        m.write_byte(i.wrapping_add(1), (vx / 10) % 10);
        m.write_byte(i.wrapping_add(2), vx % 10);
        ProgramCounter::Next
    }

    // Store V0..=Vx at I, then I += x + 1
    fn op_fx55(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        for r in 0..=op.x {
            m.write_byte(m.i.wrapping_add(r as u16), m.v[r]);
        }
        m.i = m.i.wrapping_add(op.x as u16 + 1);
        ProgramCounter::Next
    }

    // Load V0..=Vx from I, then I += x + 1
    fn op_fx65(&mut self, m: &mut Machine, op: &Opcode) -> ProgramCounter {
        for r in 0..=op.x {
            m.v[r] = m.read_byte(m.i.wrapping_add(r as u16));
        }
        m.i = m.i.wrapping_add(op.x as u16 + 1);
        ProgramCounter::Next
    }
}
