use crate::behavior::interactive::{Action, InteractiveEngine, InteractiveState};
use crate::behavior::supervisor::{Poll, SupervisorWatcher};
use crate::behavior::wander::{WanderState, Wanderer};
use crate::behavior::{Command, Commands};
use crate::config::{Config, Layout};
use crate::navigator::{EdgeNavigator, Position};
use crate::pet::animation;
use crate::shell::{AnimationSink, WindowControl};
use crate::timer::{Fired, Millis, TimerId, TimerScheduler};

/// Top-level behavior. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Sit still and react to the foreground application.
    Supervisor,
    /// Walk the screen perimeter clockwise.
    Wanderer,
    /// Respond to slap / feed / pet / float.
    Interactive,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Supervisor => "Supervisor",
            Mode::Wanderer => "Wanderer",
            Mode::Interactive => "Interactive",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Mode::Supervisor => Mode::Wanderer,
            Mode::Wanderer => Mode::Interactive,
            Mode::Interactive => Mode::Supervisor,
        }
    }

    pub fn all() -> &'static [Mode] {
        &ALL_MODES
    }
}

const ALL_MODES: [Mode; 3] = [Mode::Supervisor, Mode::Wanderer, Mode::Interactive];

/// Root of the behavior engine.
///
/// Owns the active mode, the scheduler and both sub-machines, and is the
/// only thing that talks to the animation player and the window. Every
/// timer is tagged with the mode that armed it; a firing whose owner is no
/// longer the active mode is discarded even if cancellation missed it.
pub struct ModeController<A, W, S> {
    mode: Mode,
    timers: TimerScheduler,
    wanderer: Wanderer,
    interactive: InteractiveEngine,
    watcher: S,
    animation: A,
    window: W,
    cmds: Commands,
    /// The user is holding the pet, whichever mode the drag began in.
    held: bool,
    poll_interval_ms: Millis,
    caption_ms: Millis,
}

impl<A, W, S> ModeController<A, W, S>
where
    A: AnimationSink,
    W: WindowControl,
    S: SupervisorWatcher,
{
    pub fn new(
        cfg: Config,
        layout: Layout,
        animation: A,
        window: W,
        watcher: S,
        rng: fastrand::Rng,
    ) -> Self {
        let cfg = cfg.validated();
        let nav = EdgeNavigator::new(layout, cfg.edge_margin);
        let mut ctl = Self {
            mode: Mode::Supervisor,
            timers: TimerScheduler::new(),
            wanderer: Wanderer::new(nav, &cfg, rng),
            interactive: InteractiveEngine::new(&cfg),
            watcher,
            animation,
            window,
            cmds: Commands::new(),
            held: false,
            poll_interval_ms: cfg.poll_interval_ms,
            caption_ms: cfg.caption_ms,
        };
        ctl.window.hide_caption();
        ctl.animation.set_animation(animation::IDLE);
        ctl.enter_mode();
        ctl
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn wander_state(&self) -> WanderState {
        self.wanderer.state()
    }

    pub fn interactive_state(&self) -> InteractiveState {
        self.interactive.state()
    }

    pub fn wanderer(&self) -> &Wanderer {
        &self.wanderer
    }

    pub fn interactive(&self) -> &InteractiveEngine {
        &self.interactive
    }

    pub fn animation(&self) -> &A {
        &self.animation
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// Direct window access for the shell (drag moves the window itself).
    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn timers(&self) -> &TimerScheduler {
        &self.timers
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    /// When the event loop should wake up next.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    /// Cancel everything the current mode owns, then enter `target` fresh.
    /// Only the active mode keeps a live sub-state.
    pub fn switch_mode(&mut self, target: Mode) {
        if target == self.mode {
            log::debug!("already in {} mode", target.label());
            return;
        }

        let dropped = self.timers.cancel_owned_by(self.mode);
        log::info!(
            "mode: {} -> {} ({} timers cancelled)",
            self.mode.label(),
            target.label(),
            dropped
        );
        self.cmds.drain();

        self.mode = target;
        self.wanderer.reset();
        self.interactive.reset();
        self.window.hide_caption();
        self.animation.set_animation(animation::IDLE);
        self.enter_mode();

        // A drag that began in another mode carries over.
        if self.held && target == Mode::Wanderer {
            self.wanderer.drag_start(&mut self.cmds);
            self.apply();
        }
    }

    pub fn cycle_mode(&mut self) {
        self.switch_mode(self.mode.next());
    }

    pub fn on_drag_start(&mut self) {
        self.held = true;
        if self.mode != Mode::Wanderer {
            log::debug!("drag start ignored in {} mode", self.mode.label());
            return;
        }
        self.wanderer.drag_start(&mut self.cmds);
        self.apply();
    }

    pub fn on_drag_end(&mut self, release: Position) {
        self.held = false;
        if self.mode != Mode::Wanderer {
            log::debug!("drag end ignored in {} mode", self.mode.label());
            return;
        }
        self.wanderer.drag_end(release, &mut self.cmds);
        self.apply();
    }

    /// Periodic foreground check. Only acts in Supervisor mode.
    pub fn on_supervisor_tick(&mut self) {
        if self.mode != Mode::Supervisor {
            return;
        }
        let reaction = match self.watcher.poll() {
            Poll::Unchanged => return,
            Poll::Changed(reaction) => reaction,
        };

        let anim = if reaction.animation.is_empty() {
            animation::IDLE
        } else {
            animation::resolve(&reaction.animation)
        };
        self.animation.set_animation(anim);

        match reaction.caption.filter(|text| !text.is_empty()) {
            Some(text) => {
                self.window.show_caption(&text);
                self.timers
                    .start_once(TimerId::CaptionHide, self.caption_ms, Mode::Supervisor);
            }
            None => {
                self.timers.cancel(TimerId::CaptionHide);
                self.window.hide_caption();
            }
        }
    }

    pub fn trigger(&mut self, action: Action) {
        if self.guard_interactive("trigger") {
            self.interactive.trigger(action, &mut self.cmds);
            self.apply();
        }
    }

    pub fn trigger_float(&mut self) {
        if self.guard_interactive("float") {
            self.interactive.float(&mut self.cmds);
            self.apply();
        }
    }

    pub fn trigger_unfloat(&mut self) {
        if self.guard_interactive("unfloat") {
            self.interactive.unfloat(&mut self.cmds);
            self.apply();
        }
    }

    pub fn toggle_float(&mut self) {
        if self.guard_interactive("float toggle") {
            self.interactive.toggle_float(&mut self.cmds);
            self.apply();
        }
    }

    /// Run every timer due up to `now`, one callback at a time, in
    /// deadline order.
    pub fn advance_to(&mut self, now: Millis) {
        while let Some(fired) = self.timers.pop_due(now) {
            self.dispatch(fired);
        }
        self.timers.advance_clock(now);
    }

    fn dispatch(&mut self, fired: Fired) {
        if fired.owner != self.mode {
            log::debug!(
                "discarding stale {:?} from {} mode (now {})",
                fired.id,
                fired.owner.label(),
                self.mode.label()
            );
            return;
        }
        if fired.id != TimerId::MoveTick {
            log::debug!("{:?} fired at {}ms", fired.id, fired.at);
        }

        match fired.id {
            TimerId::SupervisorPoll => self.on_supervisor_tick(),
            TimerId::CaptionHide => self.on_caption_expired(),
            TimerId::Settle => self.wanderer.on_settled(&mut self.cmds),
            TimerId::MoveTick => {
                let current = self.window.current_position();
                self.wanderer.on_move_tick(current, &mut self.cmds);
            }
            TimerId::Pose => self.wanderer.on_pose_done(&mut self.cmds),
            TimerId::EarTouch => self.wanderer.on_ears_done(&mut self.cmds),
            TimerId::ActionDone => self.interactive.on_action_done(&mut self.cmds),
            TimerId::FloatCycle => self.interactive.on_float_cycle(&mut self.cmds),
            TimerId::UnfloatCaption => self.interactive.on_unfloat_caption_done(&mut self.cmds),
        }
        self.apply();
    }

    fn on_caption_expired(&mut self) {
        if self.mode != Mode::Supervisor {
            return;
        }
        self.window.hide_caption();
        self.animation.set_animation(animation::IDLE);
    }

    fn enter_mode(&mut self) {
        match self.mode {
            Mode::Supervisor => {
                self.timers.start_periodic(
                    TimerId::SupervisorPoll,
                    self.poll_interval_ms,
                    Mode::Supervisor,
                );
            }
            Mode::Wanderer => {
                self.wanderer.enter(&mut self.cmds);
                self.apply();
            }
            // Nothing runs until the first trigger.
            Mode::Interactive => {}
        }
    }

    fn guard_interactive(&self, what: &str) -> bool {
        if self.mode == Mode::Interactive {
            return true;
        }
        log::debug!("{what} ignored in {} mode", self.mode.label());
        false
    }

    /// Apply buffered sub-machine commands. Timers inherit the active mode.
    fn apply(&mut self) {
        let owner = self.mode;
        for cmd in self.cmds.drain() {
            match cmd {
                Command::Play(name) => self.animation.set_animation(name),
                Command::ShowCaption(text) => self.window.show_caption(&text),
                Command::HideCaption => self.window.hide_caption(),
                Command::MoveTo(pos) => self.window.move_to(pos),
                Command::StartOnce { id, after } => self.timers.start_once(id, after, owner),
                Command::StartPeriodic { id, every } => {
                    self.timers.start_periodic(id, every, owner)
                }
                Command::Cancel(id) => {
                    self.timers.cancel(id);
                }
            }
        }
    }

    #[cfg(test)]
    fn watcher_mut(&mut self) -> &mut S {
        &mut self.watcher
    }
}
