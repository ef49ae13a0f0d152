use anyhow::Result;
use chip8_vm::InputDevice;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Without release events, a press counts as held for this many frames.
const HOLD_FRAMES: u8 = 6;

#[derive(Debug)]
pub struct Keyboard {
    pressed: [bool; 16],
    held_frames: [u8; 16],
    latest_press: Option<u8>,
    reports_releases: bool,
    quit: bool,
}

impl Keyboard {
    pub fn new(reports_releases: bool) -> Self {
        Self {
            pressed: [false; 16],
            held_frames: [0; 16],
            latest_press: None,
            reports_releases,
            quit: false,
        }
    }

    /// Consume pending input events; update state. Call once per frame.
    pub fn update(&mut self) -> Result<()> {
        self.start_frame();

        while event::poll(Duration::from_secs(0))? {
            match filter_event(&event::read()?) {
                Some(KeyInput::Quit) => self.quit = true,
                Some(KeyInput::Key(k, pressed)) => self.set(k, pressed),
                None => (),
            }
        }
        Ok(())
    }

    /// Only presses from the current frame can satisfy `FX0A`.
    fn start_frame(&mut self) {
        self.latest_press = None;

        if !self.reports_releases {
            for k in 0..16 {
                self.held_frames[k] = self.held_frames[k].saturating_sub(1);
                self.pressed[k] = self.held_frames[k] > 0;
            }
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn set(&mut self, k: u8, pressed: bool) {
        let k = k as usize;
        if pressed && !self.pressed[k] {
            self.latest_press = Some(k as u8);
        }
        self.pressed[k] = pressed;
        if pressed {
            self.held_frames[k] = HOLD_FRAMES;
        }
    }
}

impl InputDevice for Keyboard {
    fn is_key_down(&self, key: u8) -> bool {
        assert!(key <= 0x0f);
        self.pressed[key as usize]
    }

    fn take_key_press(&mut self) -> Option<u8> {
        self.latest_press.take()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyInput {
    /// `(chip8_keycode, pressed)`
    Key(u8, bool),
    Quit,
}

/// Translate a terminal event into keypad input, if it's relevant.
fn filter_event(terminal_event: &Event) -> Option<KeyInput> {
    let Event::Key(e) = terminal_event else {
        return None;
    };
    let pressed = match e.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => true,
        KeyEventKind::Release => false,
    };

    match e.code {
        KeyCode::Esc if pressed => Some(KeyInput::Quit),
        KeyCode::Char('c' | 'C') if pressed && e.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyInput::Quit)
        }
        KeyCode::Char(c) => keycode_to_chip8(c).map(|k| KeyInput::Key(k, pressed)),
        _ => None,
    }
}

/// Translate a key from the physical keyboard into one of the 16 virtual keys
/// on the CHIP-8.
///
/// The 4x4 block from `1` to `v` on a QWERTY keyboard stands in for the
/// original hex keypad:
///
/// ```text
/// 1 2 3 C      1 2 3 4
/// 4 5 6 D      q w e r
/// 7 8 9 E      a s d f
/// A 0 B F      z x c v
/// ```
fn keycode_to_chip8(c: char) -> Option<u8> {
    let key = match c.to_ascii_lowercase() {
        '1' => 0x1,
        '2' => 0x2,
        '3' => 0x3,
        '4' => 0xc,
        'q' => 0x4,
        'w' => 0x5,
        'e' => 0x6,
        'r' => 0xd,
        'a' => 0x7,
        's' => 0x8,
        'd' => 0x9,
        'f' => 0xe,
        'z' => 0xa,
        'x' => 0x0,
        'c' => 0xb,
        'v' => 0xf,
        _ => return None,
    };
    Some(key)
}
