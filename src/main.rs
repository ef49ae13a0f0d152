mod config;
mod terminal_io;

use anyhow::{Context, Result};
use chip8_vm::Machine;
use clap::Parser;
use config::Config;
use std::{
    fs,
    io::{self, Read},
    path::Path,
};
use terminal_io::TerminalIo;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::parse();
    let rom = load_rom(config.rom.as_deref())?;

    let mut machine = match config.seed {
        Some(seed) => Machine::with_seed(&rom, seed),
        None => Machine::new(&rom),
    }
    .context("failed to load ROM")?;

    let result = TerminalIo::setup().and_then(|mut io| io.run(&mut machine, &config));

    // The terminal is restored by now, so the dump is readable.
    if machine.halted().is_some() {
        eprintln!("{machine:#?}");
    }

    result
}

fn load_rom(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut rom = vec![];
            io::stdin()
                .read_to_end(&mut rom)
                .context("failed to read ROM from stdin")?;
            Ok(rom)
        }
    }
}
