use crate::behavior::{Command, Commands};
use crate::config::Config;
use crate::pet::animation;
use crate::timer::{Millis, TimerId};

const CAPTION_SLAP: &str = "Ow! What was that for?!";
const CAPTION_SLAP_FLOATING: &str = "Hey! I was flying!";
const CAPTION_FEED: &str = "Nom nom nom...";
const CAPTION_FEED_FLOATING: &str = "Snacks in the sky!";
const CAPTION_SATISFIED: &str = "Yum, thank you!";
const CAPTION_SATISFIED_FLOATING: &str = "Full and floaty.";
const CAPTION_PET: &str = "Purrr...";
const CAPTION_PET_FLOATING: &str = "Purr... from up here!";
const CAPTION_UNFLOAT: &str = "Back on solid ground.";

/// User-triggered one-shot reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Slap,
    Feed,
    Pet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatPhase {
    Active,
    Calm,
}

impl FloatPhase {
    fn toggled(self) -> Self {
        match self {
            FloatPhase::Active => FloatPhase::Calm,
            FloatPhase::Calm => FloatPhase::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveState {
    Idle,
    Slapping,
    Floating(FloatPhase),
    Eating,
    Satisfied,
    Petting,
}

/// Timed reaction chains that remember whether the pet was floating.
pub struct InteractiveEngine {
    state: InteractiveState,
    /// Pet was floating when the current chain began; completion returns
    /// to Floating(Calm) instead of Idle.
    was_elevated: bool,
    /// The "back on the ground" caption is up and waiting to be hidden.
    unfloat_caption_up: bool,
    slap_ms: Millis,
    eat_ms: Millis,
    satisfied_ms: Millis,
    pet_ms: Millis,
    float_active_ms: Millis,
    float_calm_ms: Millis,
    unfloat_caption_ms: Millis,
}

impl InteractiveEngine {
    pub fn new(cfg: &Config) -> Self {
        Self {
            state: InteractiveState::Idle,
            was_elevated: false,
            unfloat_caption_up: false,
            slap_ms: cfg.slap_ms,
            eat_ms: cfg.eat_ms,
            satisfied_ms: cfg.satisfied_ms,
            pet_ms: cfg.pet_ms,
            float_active_ms: cfg.float_active_ms,
            float_calm_ms: cfg.float_calm_ms,
            unfloat_caption_ms: cfg.unfloat_caption_ms,
        }
    }

    pub fn state(&self) -> InteractiveState {
        self.state
    }

    pub fn was_elevated(&self) -> bool {
        self.was_elevated
    }

    pub fn reset(&mut self) {
        self.state = InteractiveState::Idle;
        self.was_elevated = false;
        self.unfloat_caption_up = false;
    }

    pub fn trigger(&mut self, action: Action, out: &mut Commands) {
        self.cancel_all(out);
        self.was_elevated =
            self.was_elevated || matches!(self.state, InteractiveState::Floating(_));
        let up = self.was_elevated;

        let (state, anim, caption, duration) = match action {
            Action::Slap => (
                InteractiveState::Slapping,
                pick(up, animation::SLAPPED_FLOATING, animation::SLAPPED),
                pick(up, CAPTION_SLAP_FLOATING, CAPTION_SLAP),
                self.slap_ms,
            ),
            Action::Feed => (
                InteractiveState::Eating,
                pick(up, animation::EATING_FLOATING, animation::EATING),
                pick(up, CAPTION_FEED_FLOATING, CAPTION_FEED),
                self.eat_ms,
            ),
            Action::Pet => (
                InteractiveState::Petting,
                pick(up, animation::PETTED_FLOATING, animation::PETTED),
                pick(up, CAPTION_PET_FLOATING, CAPTION_PET),
                self.pet_ms,
            ),
        };
        log::debug!("interactive: {:?} -> {:?} (elevated: {up})", self.state, state);

        self.state = state;
        out.play(anim);
        out.push(Command::ShowCaption(caption.to_string()));
        out.once(TimerId::ActionDone, duration);
    }

    pub fn float(&mut self, out: &mut Commands) {
        self.cancel_all(out);
        log::debug!("interactive: {:?} -> floating", self.state);
        self.state = InteractiveState::Floating(FloatPhase::Active);
        self.was_elevated = true;
        out.push(Command::HideCaption);
        out.play(animation::FLOAT_ACTIVE);
        out.once(TimerId::FloatCycle, self.float_active_ms);
    }

    pub fn unfloat(&mut self, out: &mut Commands) {
        self.cancel_all(out);
        log::debug!("interactive: {:?} -> idle (unfloat)", self.state);
        self.state = InteractiveState::Idle;
        self.was_elevated = false;
        self.unfloat_caption_up = true;
        out.play(animation::IDLE);
        out.push(Command::ShowCaption(CAPTION_UNFLOAT.to_string()));
        out.once(TimerId::UnfloatCaption, self.unfloat_caption_ms);
    }

    /// Float toggle used by the shell's single hotkey.
    pub fn toggle_float(&mut self, out: &mut Commands) {
        match self.state {
            InteractiveState::Floating(_) => self.unfloat(out),
            _ => self.float(out),
        }
    }

    /// Alternation timer: flip the phase and re-arm with the new phase's duration.
    pub fn on_float_cycle(&mut self, out: &mut Commands) {
        let InteractiveState::Floating(phase) = self.state else {
            log::debug!("interactive: stale float timer in {:?}", self.state);
            return;
        };
        let next = phase.toggled();
        self.state = InteractiveState::Floating(next);
        let (anim, duration) = self.float_phase(next);
        out.play(anim);
        out.once(TimerId::FloatCycle, duration);
    }

    pub fn on_action_done(&mut self, out: &mut Commands) {
        match self.state {
            InteractiveState::Slapping | InteractiveState::Petting | InteractiveState::Satisfied => {
                self.finish(out)
            }
            InteractiveState::Eating => {
                let up = self.was_elevated;
                self.state = InteractiveState::Satisfied;
                out.play(pick(up, animation::SATISFIED_FLOATING, animation::SATISFIED));
                out.push(Command::ShowCaption(
                    pick(up, CAPTION_SATISFIED_FLOATING, CAPTION_SATISFIED).to_string(),
                ));
                out.once(TimerId::ActionDone, self.satisfied_ms);
            }
            other => log::debug!("interactive: stale action timer in {other:?}"),
        }
    }

    pub fn on_unfloat_caption_done(&mut self, out: &mut Commands) {
        if !self.unfloat_caption_up {
            log::debug!("interactive: stale unfloat caption timer in {:?}", self.state);
            return;
        }
        self.unfloat_caption_up = false;
        out.push(Command::HideCaption);
    }

    fn finish(&mut self, out: &mut Commands) {
        out.push(Command::HideCaption);
        if self.was_elevated {
            self.state = InteractiveState::Floating(FloatPhase::Calm);
            let (anim, duration) = self.float_phase(FloatPhase::Calm);
            out.play(anim);
            out.once(TimerId::FloatCycle, duration);
        } else {
            self.state = InteractiveState::Idle;
            out.play(animation::IDLE);
        }
        log::debug!("interactive: chain finished in {:?}", self.state);
    }

    fn float_phase(&self, phase: FloatPhase) -> (&'static str, Millis) {
        match phase {
            FloatPhase::Active => (animation::FLOAT_ACTIVE, self.float_active_ms),
            FloatPhase::Calm => (animation::FLOAT_CALM, self.float_calm_ms),
        }
    }

    fn cancel_all(&mut self, out: &mut Commands) {
        self.unfloat_caption_up = false;
        out.cancel(TimerId::ActionDone);
        out.cancel(TimerId::FloatCycle);
        out.cancel(TimerId::UnfloatCaption);
    }
}

fn pick<T>(elevated: bool, up: T, down: T) -> T {
    if elevated {
        up
    } else {
        down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> InteractiveEngine {
        InteractiveEngine::new(&Config::default())
    }

    fn timer_after(cmds: &[Command], want: TimerId) -> Option<Millis> {
        cmds.iter().find_map(|c| match *c {
            Command::StartOnce { id, after } if id == want => Some(after),
            _ => None,
        })
    }

    #[test]
    fn slap_from_idle_returns_to_idle() {
        let mut e = engine();
        let mut out = Commands::new();
        e.trigger(Action::Slap, &mut out);
        let cmds = out.take();
        assert_eq!(e.state(), InteractiveState::Slapping);
        assert!(cmds.contains(&Command::Play(animation::SLAPPED)));
        assert!(cmds.contains(&Command::ShowCaption(CAPTION_SLAP.to_string())));
        assert_eq!(timer_after(&cmds, TimerId::ActionDone), Some(Config::default().slap_ms));

        e.on_action_done(&mut out);
        let cmds = out.take();
        assert_eq!(e.state(), InteractiveState::Idle);
        assert!(cmds.contains(&Command::HideCaption));
        assert!(timer_after(&cmds, TimerId::FloatCycle).is_none());
    }

    #[test]
    fn pet_while_floating_returns_to_calm_float() {
        let mut e = engine();
        let mut out = Commands::new();
        e.float(&mut out);
        e.trigger(Action::Pet, &mut out);
        assert!(out.take().contains(&Command::Play(animation::PETTED_FLOATING)));

        e.on_action_done(&mut out);
        let cmds = out.take();
        assert_eq!(e.state(), InteractiveState::Floating(FloatPhase::Calm));
        assert_eq!(
            timer_after(&cmds, TimerId::FloatCycle),
            Some(Config::default().float_calm_ms)
        );
    }

    #[test]
    fn float_alternates_until_unfloated() {
        let mut e = engine();
        let mut out = Commands::new();
        e.float(&mut out);
        out.take();

        let mut phase = FloatPhase::Active;
        for _ in 0..7 {
            e.on_float_cycle(&mut out);
            phase = phase.toggled();
            assert_eq!(e.state(), InteractiveState::Floating(phase));
            let cfg = Config::default();
            let expect = match phase {
                FloatPhase::Active => cfg.float_active_ms,
                FloatPhase::Calm => cfg.float_calm_ms,
            };
            assert_eq!(timer_after(&out.take(), TimerId::FloatCycle), Some(expect));
        }
        // Seven toggles from Active ends in Calm.
        assert_eq!(e.state(), InteractiveState::Floating(FloatPhase::Calm));
    }

    #[test]
    fn feed_while_calm_float_ends_floating_calm() {
        let mut e = engine();
        let mut out = Commands::new();
        e.float(&mut out);
        e.on_float_cycle(&mut out);
        assert_eq!(e.state(), InteractiveState::Floating(FloatPhase::Calm));

        e.trigger(Action::Feed, &mut out);
        assert_eq!(e.state(), InteractiveState::Eating);
        out.take();
        e.on_action_done(&mut out);
        assert_eq!(e.state(), InteractiveState::Satisfied);
        let cmds = out.take();
        assert!(cmds.contains(&Command::Play(animation::SATISFIED_FLOATING)));
        assert_eq!(
            timer_after(&cmds, TimerId::ActionDone),
            Some(Config::default().satisfied_ms)
        );

        e.on_action_done(&mut out);
        assert_eq!(e.state(), InteractiveState::Floating(FloatPhase::Calm));
        assert!(e.was_elevated());
    }

    #[test]
    fn feed_while_idle_ends_idle() {
        let mut e = engine();
        let mut out = Commands::new();
        e.trigger(Action::Feed, &mut out);
        e.on_action_done(&mut out);
        e.on_action_done(&mut out);
        assert_eq!(e.state(), InteractiveState::Idle);
        assert!(!e.was_elevated());
    }

    #[test]
    fn elevated_flag_survives_chained_actions() {
        let mut e = engine();
        let mut out = Commands::new();
        e.float(&mut out);
        e.trigger(Action::Slap, &mut out);
        // Slap interrupted by a pet: no longer Floating, but still elevated.
        e.trigger(Action::Pet, &mut out);
        assert!(e.was_elevated());
        assert!(out.take().contains(&Command::Play(animation::PETTED_FLOATING)));
        e.on_action_done(&mut out);
        assert_eq!(e.state(), InteractiveState::Floating(FloatPhase::Calm));
    }

    #[test]
    fn unfloat_clears_elevation_and_shows_caption() {
        let mut e = engine();
        let mut out = Commands::new();
        e.float(&mut out);
        out.take();
        e.unfloat(&mut out);
        let cmds = out.take();
        assert_eq!(e.state(), InteractiveState::Idle);
        assert!(!e.was_elevated());
        assert!(cmds.contains(&Command::Cancel(TimerId::FloatCycle)));
        assert!(cmds.contains(&Command::ShowCaption(CAPTION_UNFLOAT.to_string())));
        assert_eq!(
            timer_after(&cmds, TimerId::UnfloatCaption),
            Some(Config::default().unfloat_caption_ms)
        );

        // Late alternation firing after unfloat does nothing.
        e.on_float_cycle(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn unfloat_caption_timer_hides_only_its_own_caption() {
        let mut e = engine();
        let mut out = Commands::new();
        e.float(&mut out);
        e.unfloat(&mut out);
        out.take();
        e.on_unfloat_caption_done(&mut out);
        assert_eq!(out.take(), vec![Command::HideCaption]);

        // A second firing has nothing left to hide.
        e.on_unfloat_caption_done(&mut out);
        assert!(out.is_empty());

        // Superseded by a slap: a late firing must not hide the slap caption.
        e.unfloat(&mut out);
        e.trigger(Action::Slap, &mut out);
        out.take();
        e.on_unfloat_caption_done(&mut out);
        assert!(out.is_empty());
        assert_eq!(e.state(), InteractiveState::Slapping);
    }

    #[test]
    fn stale_action_timer_is_ignored() {
        let mut e = engine();
        let mut out = Commands::new();
        e.on_action_done(&mut out);
        assert!(out.is_empty());
        assert_eq!(e.state(), InteractiveState::Idle);
    }

    #[test]
    fn toggle_float_flips_between_float_and_ground() {
        let mut e = engine();
        let mut out = Commands::new();
        e.toggle_float(&mut out);
        assert_eq!(e.state(), InteractiveState::Floating(FloatPhase::Active));
        e.toggle_float(&mut out);
        assert_eq!(e.state(), InteractiveState::Idle);
    }
}
