use std::path::PathBuf;

use structopt::StructOpt;

use crate::cpu::Quirks;

#[derive(StructOpt, Debug)]
#[structopt(name = "r8", about = "A CHIP-8 interpreter")]
pub struct Opt {
    /// ROM file to run
    #[structopt(parse(from_os_str))]
    pub rom: PathBuf,

    /// Instructions executed per frame
    #[structopt(short, long, default_value = "10")]
    pub cycles: u32,

    /// Frames (and timer ticks) per second
    #[structopt(short, long, default_value = "60", parse(try_from_str = parse_fps))]
    pub fps: u32,

    /// Window pixels per CHIP-8 pixel
    #[structopt(short, long, default_value = "10", parse(try_from_str = parse_scale))]
    pub scale: f32,

    /// 8XY6 and 8XYE shift VY into VX, like the COSMAC VIP
    #[structopt(long)]
    pub shift_quirk: bool,

    /// Seed the random number generator for a repeatable run
    #[structopt(long)]
    pub seed: Option<u64>,
}

fn parse_fps(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) => Err("fps must be at least 1".to_string()),
        Ok(fps) => Ok(fps),
        Err(e) => Err(e.to_string()),
    }
}

// A zero, negative or NaN scale gives ggez an unusable window
fn parse_scale(s: &str) -> Result<f32, String> {
    let scale = s.parse::<f32>().map_err(|e| e.to_string())?;
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(format!("scale must be a positive number, got {}", s))
    }
}

impl Opt {
    pub fn quirks(&self) -> Quirks {
        Quirks {
            shift_uses_vy: self.shift_quirk,
        }
    }
}
