use clap::Parser;
use std::path::PathBuf;

/// Run a CHIP-8 ROM in the terminal.
///
/// Keypad:   1 2 3 4 / q w e r / a s d f / z x c v.   Quit: Esc or ctrl+c.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// ROM file to run. Read from stdin when omitted.
    pub rom: Option<PathBuf>,

    /// Instructions executed per frame.
    #[arg(short, long, default_value_t = 10)]
    pub cycles_per_frame: u32,

    /// Frames per second; the timers tick once per frame.
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Seed for the random number instruction.
    #[arg(short, long)]
    pub seed: Option<u64>,
}
