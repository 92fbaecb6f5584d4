use std::sync::Arc;
use std::time::Duration;

use glam::{DVec2, IVec2};
use instant::Instant;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::behavior::interactive::Action;
use crate::behavior::supervisor::ForegroundWatcher;
use crate::config::{Config, Layout};
use crate::mode::{Mode, ModeController};
use crate::navigator::{Corner, Position};
use crate::pet::Puppet;
use crate::platform::{self, SystemTitleSource};
use crate::render::instance::{PetFrame, SpriteInstance};
use crate::render::GpuState;
use crate::shell::WindowControl;

/// Redraw cadence for the placeholder's looping motion.
const REDRAW_MS: u64 = 33;
const TITLE: &str = "deskpet";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create pet window: {0}")]
    Window(#[from] winit::error::OsError),
}

// ---------------------------------------------------------------------------
// Window capability
// ---------------------------------------------------------------------------

/// The pet's winit window as seen by the behavior engine. Captions are
/// mirrored into the window title and drawn as a marker by the renderer.
pub struct WinitShell {
    window: Arc<Window>,
    /// Last position requested. Some platforms can't report outer
    /// position, so this is what the engine reads back.
    position: Position,
    caption: Option<String>,
}

impl WinitShell {
    fn new(window: Arc<Window>) -> Self {
        let position = window
            .outer_position()
            .map(|p| IVec2::new(p.x, p.y))
            .unwrap_or(IVec2::ZERO);
        Self {
            window,
            position,
            caption: None,
        }
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }
}

impl WindowControl for WinitShell {
    fn move_to(&mut self, pos: Position) {
        if pos == self.position {
            return;
        }
        self.position = pos;
        self.window
            .set_outer_position(PhysicalPosition::new(pos.x, pos.y));
    }

    fn current_position(&self) -> Position {
        self.position
    }

    fn show_caption(&mut self, text: &str) {
        log::info!("caption: {text}");
        self.caption = Some(text.to_string());
    }

    fn hide_caption(&mut self) {
        self.caption = None;
    }
}

type Pet = ModeController<Puppet, WinitShell, ForegroundWatcher<SystemTitleSource>>;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Left-button drag in progress.
struct Drag {
    /// Cursor position inside the window when the button went down.
    grab: DVec2,
}

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    pet: Option<Pet>,
    layout: Layout,

    /// Engine clock origin; engine time is milliseconds since this.
    started: Instant,

    cursor: Option<DVec2>,
    drag: Option<Drag>,

    // Renderer bookkeeping
    last_generation: u32,
    changed_at: Instant,
    title: String,
    instance_buf: Vec<SpriteInstance>,

    /// Startup failure to surface from `run` once the loop exits.
    fatal: Option<AppError>,
}

impl App {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            window: None,
            gpu: None,
            pet: None,
            layout: Layout::default(),
            started: now,
            cursor: None,
            drag: None,
            last_generation: 0,
            changed_at: now,
            title: String::new(),
            instance_buf: Vec::with_capacity(2),
            fatal: None,
        }
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn create_pet(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        match event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
        {
            Some(monitor) => {
                let size = monitor.size();
                self.layout = Layout::new(IVec2::new(size.width as i32, size.height as i32));
                log::info!(
                    "Screen {}x{} on {:?}",
                    size.width,
                    size.height,
                    monitor.name().unwrap_or_default()
                );
            }
            None => log::warn!("no monitor reported, assuming {:?}", self.layout.screen),
        }

        // Start hidden so DWM doesn't cache stale frame state before the
        // overlay styles take effect.
        let attrs = WindowAttributes::default()
            .with_title(TITLE)
            .with_decorations(false)
            .with_resizable(false)
            .with_visible(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(PhysicalSize::new(
                self.layout.window.x as u32,
                self.layout.window.y as u32,
            ));
        // On Windows transparency comes from DxgiFromVisual; with_transparent
        // would set WS_EX_LAYERED and break it.
        #[cfg(not(windows))]
        let attrs = attrs.with_transparent(true);

        let window = Arc::new(event_loop.create_window(attrs)?);
        platform::setup_pet_window(&window);

        match GpuState::new(window.clone()) {
            Ok(gpu) => {
                log::info!("wgpu + sprite pipeline initialized");
                self.gpu = Some(gpu);
            }
            Err(e) => log::error!("rendering disabled: {e}"),
        }

        let cfg = Config::default();
        let watcher = ForegroundWatcher::new(SystemTitleSource::new(&window), cfg.reactions.clone());
        let mut pet = ModeController::new(
            cfg,
            self.layout,
            Puppet::new(),
            WinitShell::new(window.clone()),
            watcher,
            fastrand::Rng::new(),
        );

        // Supervisor sits in the bottom-right corner until told otherwise.
        let home = pet.wanderer().navigator().corner(Corner::BottomRight);
        pet.window_mut().move_to(home);

        window.set_visible(true);
        self.window = Some(window);
        self.pet = Some(pet);
        self.started = Instant::now();
        let modes: Vec<&str> = Mode::all().iter().map(|m| m.label()).collect();
        log::info!(
            "pet ready. F1-F3 select {} (F11 cycles), S/E/P slap/feed/pet, F float, F12 status, Esc quits",
            modes.join("/")
        );
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        let Some(pet) = self.pet.as_mut() else {
            return;
        };
        match code {
            KeyCode::Escape => {
                log::info!("ESC pressed, exiting");
                event_loop.exit();
            }
            KeyCode::F1 => pet.switch_mode(Mode::Supervisor),
            KeyCode::F2 => pet.switch_mode(Mode::Wanderer),
            KeyCode::F3 => pet.switch_mode(Mode::Interactive),
            KeyCode::F11 => pet.cycle_mode(),
            KeyCode::F12 => log::info!(
                "{} mode | wander: {} | interactive: {:?} | {} timers pending | t={}ms",
                pet.mode().label(),
                pet.wander_state().label(),
                pet.interactive_state(),
                pet.timers().pending_count(),
                pet.now()
            ),
            KeyCode::KeyS => act(pet, |p| p.trigger(Action::Slap)),
            KeyCode::KeyE => act(pet, |p| p.trigger(Action::Feed)),
            KeyCode::KeyP => act(pet, |p| p.trigger(Action::Pet)),
            KeyCode::KeyF => act(pet, Pet::toggle_float),
            _ => {}
        }
    }

    fn handle_button(&mut self, state: ElementState) {
        let Some(pet) = self.pet.as_mut() else {
            return;
        };
        match state {
            ElementState::Pressed => {
                let Some(cursor) = self.cursor else {
                    return;
                };
                let min = self.layout.sprite_offset().as_dvec2();
                let max = min + self.layout.sprite.as_dvec2();
                let on_sprite = cursor.cmpge(min).all() && cursor.cmplt(max).all();
                if on_sprite && self.drag.is_none() {
                    self.drag = Some(Drag { grab: cursor });
                    pet.on_drag_start();
                }
            }
            ElementState::Released => {
                if self.drag.take().is_some() {
                    let release = pet.window().current_position();
                    pet.on_drag_end(release);
                }
            }
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        let cursor = DVec2::new(position.x, position.y);
        self.cursor = Some(cursor);
        if let (Some(drag), Some(pet)) = (&self.drag, self.pet.as_mut()) {
            let delta = (cursor - drag.grab).round().as_ivec2();
            if delta != IVec2::ZERO {
                let pos = pet.window().current_position() + delta;
                pet.window_mut().move_to(pos);
            }
        }
    }

    /// Run due timers and schedule the next wake-up.
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.now_ms();
        let Some(pet) = self.pet.as_mut() else {
            return;
        };
        pet.advance_to(now);

        let wake = pet
            .next_deadline()
            .map_or(now + REDRAW_MS, |due| due.min(now + REDRAW_MS));
        event_loop.set_control_flow(ControlFlow::WaitUntil(
            self.started + Duration::from_millis(wake),
        ));

        self.refresh_title();
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn refresh_title(&mut self) {
        let (Some(pet), Some(window)) = (&self.pet, &self.window) else {
            return;
        };
        let title = match pet.window().caption() {
            Some(caption) => format!("{TITLE} [{}] {caption}", pet.mode().label()),
            None => format!("{TITLE} [{}]", pet.mode().label()),
        };
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }
    }

    fn redraw(&mut self) {
        let Some(pet) = &self.pet else {
            return;
        };
        let puppet = pet.animation();
        if puppet.generation != self.last_generation {
            self.last_generation = puppet.generation;
            self.changed_at = Instant::now();
        }

        let frame = PetFrame {
            animation: puppet.current(),
            caption_visible: pet.window().caption().is_some(),
            since_change: self.changed_at.elapsed().as_secs_f32(),
            time: self.started.elapsed().as_secs_f32(),
        };
        SpriteInstance::build(&frame, &self.layout, &mut self.instance_buf);

        if let Some(gpu) = &mut self.gpu {
            gpu.update_instances(&self.instance_buf);
            gpu.render_frame();
        }
    }
}

/// Actions only mean something in Interactive mode; a hotkey switches there
/// first.
fn act(pet: &mut Pet, f: impl FnOnce(&mut Pet)) {
    if pet.mode() != Mode::Interactive {
        pet.switch_mode(Mode::Interactive);
    }
    f(pet);
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_pet(event_loop) {
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.tick(event_loop);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(code, event_loop);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor(position),
            WindowEvent::CursorLeft { .. } => {
                if self.drag.is_none() {
                    self.cursor = None;
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.handle_button(state),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

/// Entry point: create event loop and run.
pub fn run() -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
