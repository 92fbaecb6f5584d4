//! Capabilities the behavior engine drives. Implemented by the windowed
//! shell in `app.rs` and by recording fakes in tests.

use crate::navigator::Position;

/// Plays named animations. Setting the animation already playing is a no-op.
pub trait AnimationSink {
    fn set_animation(&mut self, name: &str);
}

/// The pet's on-screen window.
pub trait WindowControl {
    fn move_to(&mut self, pos: Position);
    /// Source of truth for where the pet currently is.
    fn current_position(&self) -> Position;
    fn show_caption(&mut self, text: &str);
    fn hide_caption(&mut self);
}
