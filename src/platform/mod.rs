#[cfg(windows)]
pub mod win32;

#[cfg(not(windows))]
use crate::behavior::supervisor::{LookupFailure, TitleSource};

/// Foreground-window title lookup for the current OS.
#[cfg(windows)]
pub type SystemTitleSource = win32::ForegroundTitle;

#[cfg(not(windows))]
pub type SystemTitleSource = Unsupported;

/// Platforms without a foreground-window API. Every poll reads as "no
/// window", so Supervisor mode just idles.
#[cfg(not(windows))]
#[derive(Debug, Default)]
pub struct Unsupported;

#[cfg(not(windows))]
impl Unsupported {
    pub fn new(_window: &winit::window::Window) -> Self {
        log::warn!("foreground window lookup unavailable; supervisor will idle");
        Self
    }
}

#[cfg(not(windows))]
impl TitleSource for Unsupported {
    fn foreground_title(&mut self) -> Result<String, LookupFailure> {
        Err(LookupFailure::Unsupported)
    }
}

/// OS-specific window styling once the pet window exists.
pub fn setup_pet_window(window: &winit::window::Window) {
    #[cfg(windows)]
    win32::setup_overlay(window);
    #[cfg(not(windows))]
    let _ = window;
}

