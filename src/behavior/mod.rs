pub mod interactive;
pub mod supervisor;
pub mod wander;

use crate::navigator::Position;
use crate::timer::{Millis, TimerId};

/// Side effect requested by a sub-machine.
///
/// Sub-machines never touch the window, the animation player or the
/// scheduler directly; they push commands into a buffer and the
/// `ModeController` applies them, tagging timers with the active mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(&'static str),
    ShowCaption(String),
    HideCaption,
    MoveTo(Position),
    StartOnce { id: TimerId, after: Millis },
    StartPeriodic { id: TimerId, every: Millis },
    Cancel(TimerId),
}

/// Reusable command buffer.
pub struct Commands {
    buf: Vec<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    pub fn push(&mut self, cmd: Command) {
        self.buf.push(cmd);
    }

    pub fn play(&mut self, name: &'static str) {
        self.push(Command::Play(name));
    }

    pub fn once(&mut self, id: TimerId, after: Millis) {
        self.push(Command::StartOnce { id, after });
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.push(Command::Cancel(id));
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Command> {
        self.buf.drain(..)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[cfg(test)]
    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.buf)
    }
}
