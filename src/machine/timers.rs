/// The delay and sound timers. Both count down once per host frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Whether a buzzer should be sounding.
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}
