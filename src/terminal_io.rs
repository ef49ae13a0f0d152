mod keyboard;
mod screen;

use self::keyboard::Keyboard;
use self::screen::DisplayFrame;
use crate::config::Config;
use anyhow::Result;
use chip8_vm::{FrameBuffer, Machine, Renderer, StepStatus};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::{debug, info};
use std::{
    io::{self, Write},
    thread,
    time::{Duration, Instant},
};

/// A `crossterm`-based host: renders frames, reads the keypad, and paces the
/// machine one frame at a time.
#[derive(Debug)]
pub struct TerminalIo {
    keyboard: Keyboard,
    last_frame: Option<FrameBuffer>,
    enhanced: bool,
}

impl TerminalIo {
    pub fn setup() -> Result<Self> {
        terminal::enable_raw_mode()?;

        // Key release events need the kitty keyboard protocol.
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            io::stdout().execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }
        debug!("terminal reports key releases: {enhanced}");

        io::stdout()
            .execute(EnterAlternateScreen)?
            .execute(Hide)?
            .execute(Clear(ClearType::All))?;

        Ok(Self {
            keyboard: Keyboard::new(enhanced),
            last_frame: None,
            enhanced,
        })
    }

    /// Drive `machine` until the user quits or it halts.
    ///
    /// Per frame: read input, run `cycles_per_frame` steps and one timer
    /// tick, draw, then sleep until the next frame is due.
    pub fn run(&mut self, machine: &mut Machine, config: &Config) -> Result<()> {
        let frame_time = Duration::from_nanos(1_000_000_000 / config.fps as u64);
        let mut next_frame = Instant::now();

        loop {
            self.keyboard.update()?;
            if self.keyboard.quit_requested() {
                info!("quit requested");
                return Ok(());
            }

            let status = machine.run_frame(config.cycles_per_frame, &mut self.keyboard)?;

            self.render(machine.frame_buffer())?;
            self.render_status(status, machine.timers().sound_active())?;

            next_frame += frame_time;
            sleep_until(next_frame);
        }
    }

    fn render_status(&self, status: StepStatus, sound: bool) -> io::Result<()> {
        let waiting = if status == StepStatus::WaitingForKey {
            "waiting for key"
        } else {
            ""
        };
        let sound = if sound { "♪" } else { "" };

        io::stdout()
            .execute(MoveTo(0, FrameBuffer::HEIGHT as u16))?
            .execute(Clear(ClearType::CurrentLine))?
            .execute(Print(format!("{sound:2}{waiting}")))?;
        Ok(())
    }
}

impl Renderer for TerminalIo {
    fn render(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        if self.last_frame.as_ref() == Some(frame) {
            return Ok(());
        }

        let mut stdout = io::stdout();
        stdout
            .execute(MoveTo(0, 0))?
            .execute(Print(DisplayFrame(frame)))?;
        stdout.flush()?;

        self.last_frame = Some(frame.clone());
        Ok(())
    }
}

impl Drop for TerminalIo {
    fn drop(&mut self) {
        fn try_drop(this: &mut TerminalIo) -> Result<()> {
            // Reset the terminal mode. Otherwise it gets all wonky, and you
            // have to close it and open a new one.
            if this.enhanced {
                io::stdout().execute(PopKeyboardEnhancementFlags)?;
            }
            io::stdout().execute(Show)?.execute(LeaveAlternateScreen)?;
            terminal::disable_raw_mode()?;

            // After leaving the Alternate Screen in the terminal, the text goes away,
            // so we print it again here. This lets us see the last state the screen was
            // in when the emulator exited.
            if let Some(frame) = &this.last_frame {
                print!("{frame:?}");
            }
            Ok(())
        }

        // Ignore errors.
        try_drop(self).ok();
    }
}

fn sleep_until(deadline: Instant) {
    thread::sleep(deadline.saturating_duration_since(Instant::now()));
}
