use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWINDOWATTRIBUTE};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowLongPtrW, GetWindowTextW, SetWindowLongPtrW, SetWindowPos,
    GWL_EXSTYLE, SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER,
    WS_EX_TOOLWINDOW,
};

use crate::behavior::supervisor::{LookupFailure, TitleSource};

/// Longest title read back, in UTF-16 units.
const TITLE_CAPACITY: usize = 512;

/// Extract the Win32 HWND from a winit window.
pub fn get_hwnd(window: &winit::window::Window) -> Option<HWND> {
    let handle = window.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => Some(HWND(h.hwnd.get() as *mut core::ffi::c_void)),
        _ => None,
    }
}

/// Reads the title of whatever window has focus.
///
/// While the pet itself has focus (after a click or a hotkey) the last
/// title seen is reported again, so poking the pet doesn't read as an
/// application switch.
pub struct ForegroundTitle {
    own_hwnd: Option<HWND>,
    last: String,
}

impl ForegroundTitle {
    pub fn new(window: &winit::window::Window) -> Self {
        Self {
            own_hwnd: get_hwnd(window),
            last: String::new(),
        }
    }
}

impl TitleSource for ForegroundTitle {
    fn foreground_title(&mut self) -> Result<String, LookupFailure> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            return Err(LookupFailure::NoForegroundWindow);
        }
        if Some(hwnd) == self.own_hwnd {
            return Ok(self.last.clone());
        }

        let mut buf = [0u16; TITLE_CAPACITY];
        let len = unsafe { GetWindowTextW(hwnd, &mut buf) };
        if len < 0 {
            return Err(LookupFailure::Os(format!("GetWindowTextW returned {len}")));
        }
        let title = String::from_utf16_lossy(&buf[..len as usize]);
        self.last.clone_from(&title);
        Ok(title)
    }
}

/// Apply overlay window styles: no taskbar entry, no DWM frame, and
/// transparency through the DirectComposition visual wgpu creates.
pub unsafe fn make_overlay(hwnd: HWND) {
    let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    log::debug!("Window ex-style before: 0x{:08X}", style);

    // WS_EX_LAYERED would give DWM a GDI surface that fights DxgiFromVisual.
    const WS_EX_LAYERED: isize = 0x00080000;
    const WS_EX_NOREDIRECTIONBITMAP: isize = 0x00200000;

    let new_style =
        (style & !WS_EX_LAYERED) | WS_EX_TOOLWINDOW.0 as isize | WS_EX_NOREDIRECTIONBITMAP;
    SetWindowLongPtrW(hwnd, GWL_EXSTYLE, new_style);
    log::debug!("Window ex-style after:  0x{:08X}", new_style);

    // Force DWM to recalculate the frame with the new styles.
    if let Err(e) = SetWindowPos(
        hwnd,
        HWND::default(),
        0,
        0,
        0,
        0,
        SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
    ) {
        log::warn!("SetWindowPos failed: {e}");
    }

    let attributes: [(i32, u32, &str); 4] = [
        // DWMWA_NCRENDERING_POLICY = DWMNCRP_DISABLED
        (2, 2, "ncrendering policy"),
        // DWMWA_WINDOW_CORNER_PREFERENCE = DWMWCP_DONOTROUND
        (33, 1, "corner preference"),
        // DWMWA_BORDER_COLOR = DWMWA_COLOR_NONE
        (34, 0xFFFFFFFE, "border color"),
        // DWMWA_SYSTEMBACKDROP_TYPE = DWMSBT_NONE
        (38, 1, "backdrop"),
    ];
    for (attr, value, what) in attributes {
        if let Err(e) = DwmSetWindowAttribute(
            hwnd,
            DWMWINDOWATTRIBUTE(attr),
            &value as *const u32 as *const core::ffi::c_void,
            4,
        ) {
            // Older Windows builds lack some attributes.
            log::debug!("DwmSetWindowAttribute({what}) failed: {e}");
        }
    }
}

/// Style the pet window as a borderless, transparent, always-on-top overlay.
pub fn setup_overlay(window: &winit::window::Window) {
    let Some(hwnd) = get_hwnd(window) else {
        log::warn!("no Win32 handle for pet window; skipping overlay styling");
        return;
    };
    unsafe {
        make_overlay(hwnd);
    }
    log::info!("Win32 overlay setup complete (DirectComposition + toolwindow)");
}
