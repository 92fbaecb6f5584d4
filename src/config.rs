use glam::IVec2;

use crate::behavior::supervisor::ReactionRule;
use crate::pet::animation;
use crate::timer::Millis;

/// How often the foreground window is checked in Supervisor mode.
const POLL_INTERVAL_MS: Millis = 500;
/// How long a caption stays up before the pet goes back to idle.
const CAPTION_MS: Millis = 4000;
/// Pixels moved per movement tick.
const MOVE_SPEED: i32 = 3;
/// Movement tick interval (~60 Hz).
const MOVE_TICK_MS: Millis = 16;
/// Inward inset from the screen border for corners and edge returns.
const EDGE_MARGIN: i32 = 0;
/// Pause after entering Wanderer mode before the first walk.
const SETTLE_MS: Millis = 1000;
/// Ear-touch pause after returning to an edge.
const EAR_TOUCH_MS: Millis = 1500;
const POSE_MIN_MS: Millis = 2000;
const POSE_MAX_MS: Millis = 5000;

const SLAP_MS: Millis = 1200;
const EAT_MS: Millis = 2000;
const SATISFIED_MS: Millis = 1500;
const PET_MS: Millis = 1800;
const FLOAT_ACTIVE_MS: Millis = 2500;
const FLOAT_CALM_MS: Millis = 4000;
const UNFLOAT_CAPTION_MS: Millis = 2000;

/// Default window/sprite geometry. The window is larger than the sprite so
/// the speech caption has room; the sprite sits in its center.
const WINDOW_SIZE: i32 = 900;
const SPRITE_SIZE: i32 = 200;
/// Fallback screen size when no monitor is reported.
const FALLBACK_SCREEN: IVec2 = IVec2::new(1920, 1080);

/// Keyword (case-insensitive substring of the foreground title) to reaction.
/// First match wins.
const REACTIONS: &[(&str, &str, Option<&str>)] = &[
    ("netflix", animation::JUDGING, Some("Really? Netflix again?")),
    ("youtube", animation::JUDGING, Some("Is this... research?")),
    ("visual studio code", animation::TYPING, Some("Ooh, coding! Carry on.")),
    ("terminal", animation::TYPING, None),
    ("excel", animation::SLEEPY, Some("Spreadsheets... zzz")),
    ("spotify", animation::DANCING, Some("Turn it up!")),
    ("steam", animation::EXCITED, Some("Game time?!")),
];

/// Screen and window geometry, captured once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub screen: IVec2,
    pub window: IVec2,
    pub sprite: IVec2,
}

impl Layout {
    pub fn new(screen: IVec2) -> Self {
        Self {
            screen: screen.max(IVec2::ONE),
            window: IVec2::splat(WINDOW_SIZE),
            sprite: IVec2::splat(SPRITE_SIZE),
        }
    }

    /// Top-left of the sprite inside the window.
    pub fn sprite_offset(&self) -> IVec2 {
        (self.window - self.sprite) / 2
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(FALLBACK_SCREEN)
    }
}

/// Read-only tuning consumed at construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub poll_interval_ms: Millis,
    pub caption_ms: Millis,
    pub move_speed: i32,
    pub move_tick_ms: Millis,
    pub edge_margin: i32,
    pub settle_ms: Millis,
    pub ear_touch_ms: Millis,
    /// Inclusive pose duration range.
    pub pose_ms: (Millis, Millis),
    pub poses: Vec<String>,
    pub slap_ms: Millis,
    pub eat_ms: Millis,
    pub satisfied_ms: Millis,
    pub pet_ms: Millis,
    pub float_active_ms: Millis,
    pub float_calm_ms: Millis,
    pub unfloat_caption_ms: Millis,
    pub reactions: Vec<ReactionRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MS,
            caption_ms: CAPTION_MS,
            move_speed: MOVE_SPEED,
            move_tick_ms: MOVE_TICK_MS,
            edge_margin: EDGE_MARGIN,
            settle_ms: SETTLE_MS,
            ear_touch_ms: EAR_TOUCH_MS,
            pose_ms: (POSE_MIN_MS, POSE_MAX_MS),
            poses: animation::POSES.iter().map(|p| p.to_string()).collect(),
            slap_ms: SLAP_MS,
            eat_ms: EAT_MS,
            satisfied_ms: SATISFIED_MS,
            pet_ms: PET_MS,
            float_active_ms: FLOAT_ACTIVE_MS,
            float_calm_ms: FLOAT_CALM_MS,
            unfloat_caption_ms: UNFLOAT_CAPTION_MS,
            reactions: REACTIONS
                .iter()
                .map(|&(keyword, anim, caption)| ReactionRule::new(keyword, anim, caption))
                .collect(),
        }
    }
}

impl Config {
    /// Clamp degenerate values so the engine never stalls or divides by zero.
    pub fn validated(mut self) -> Self {
        if self.move_speed < 1 {
            log::warn!("move_speed {} < 1, using 1", self.move_speed);
            self.move_speed = 1;
        }
        for interval in [
            &mut self.poll_interval_ms,
            &mut self.move_tick_ms,
            &mut self.float_active_ms,
            &mut self.float_calm_ms,
        ] {
            *interval = (*interval).max(1);
        }
        if self.pose_ms.0 > self.pose_ms.1 {
            self.pose_ms = (self.pose_ms.1, self.pose_ms.0);
        }
        if self.poses.is_empty() {
            log::warn!("empty pose set, falling back to idle");
            self.poses.push(animation::IDLE.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_is_centered_in_window() {
        let layout = Layout::new(IVec2::new(1920, 1080));
        assert_eq!(layout.sprite_offset(), IVec2::splat(350));
    }

    #[test]
    fn validated_repairs_degenerate_values() {
        let cfg = Config {
            move_speed: 0,
            move_tick_ms: 0,
            pose_ms: (900, 100),
            poses: Vec::new(),
            ..Config::default()
        }
        .validated();

        assert_eq!(cfg.move_speed, 1);
        assert_eq!(cfg.move_tick_ms, 1);
        assert_eq!(cfg.pose_ms, (100, 900));
        assert_eq!(cfg.poses, vec![animation::IDLE.to_string()]);
    }
}
