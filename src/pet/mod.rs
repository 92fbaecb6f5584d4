pub mod animation;

use crate::shell::AnimationSink;

/// What the pet is currently showing. Owned by the shell side; the
/// behavior engine only ever talks to it through `AnimationSink`.
#[derive(Debug, Clone)]
pub struct Puppet {
    current: &'static str,
    /// Bumped on every animation change so the renderer can restart frames.
    pub generation: u32,
}

impl Puppet {
    pub fn new() -> Self {
        Self {
            current: animation::IDLE,
            generation: 0,
        }
    }

    pub fn current(&self) -> &'static str {
        self.current
    }

    /// Switch animation. Returns false if `name` was already playing.
    pub fn play(&mut self, name: &str) -> bool {
        let resolved = animation::resolve(name);
        if resolved == self.current {
            return false;
        }
        log::debug!("animation: {} -> {}", self.current, resolved);
        self.current = resolved;
        self.generation = self.generation.wrapping_add(1);
        true
    }
}

impl AnimationSink for Puppet {
    fn set_animation(&mut self, name: &str) {
        self.play(name);
    }
}
