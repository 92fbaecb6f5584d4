use crate::behavior::{Command, Commands};
use crate::config::Config;
use crate::navigator::{self, Direction, Edge, EdgeNavigator, Position};
use crate::pet::animation;
use crate::timer::{Millis, TimerId};

/// Every timer Wanderer mode can have armed.
const WANDER_TIMERS: [TimerId; 4] = [
    TimerId::Settle,
    TimerId::MoveTick,
    TimerId::Pose,
    TimerId::EarTouch,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WanderState {
    Idle,
    Walking { target: Position },
    Posing,
    ReturningToEdge { target: Position },
    TouchingEars,
    BeingDragged,
}

impl WanderState {
    pub fn label(self) -> &'static str {
        match self {
            WanderState::Idle => "idle",
            WanderState::Walking { .. } => "walking",
            WanderState::Posing => "posing",
            WanderState::ReturningToEdge { .. } => "returning",
            WanderState::TouchingEars => "touching-ears",
            WanderState::BeingDragged => "dragged",
        }
    }
}

/// Clockwise perimeter walk with corner poses and drag recovery.
pub struct Wanderer {
    state: WanderState,
    /// Edge just departed onto; the next leg walks along it.
    edge: Edge,
    /// State that was active when the current drag began.
    interrupted: Option<WanderState>,
    nav: EdgeNavigator,
    rng: fastrand::Rng,
    speed: i32,
    move_tick_ms: Millis,
    settle_ms: Millis,
    ear_touch_ms: Millis,
    pose_ms: (Millis, Millis),
    poses: Vec<&'static str>,
}

impl Wanderer {
    pub fn new(nav: EdgeNavigator, cfg: &Config, rng: fastrand::Rng) -> Self {
        let mut poses: Vec<&'static str> = cfg.poses.iter().map(|p| animation::resolve(p)).collect();
        if poses.is_empty() {
            poses.push(animation::IDLE);
        }
        Self {
            state: WanderState::Idle,
            edge: Edge::Bottom,
            interrupted: None,
            nav,
            rng,
            speed: cfg.move_speed,
            move_tick_ms: cfg.move_tick_ms,
            settle_ms: cfg.settle_ms,
            ear_touch_ms: cfg.ear_touch_ms,
            pose_ms: cfg.pose_ms,
            poses,
        }
    }

    pub fn state(&self) -> WanderState {
        self.state
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn navigator(&self) -> &EdgeNavigator {
        &self.nav
    }

    /// Back to the initial sub-state. Timers are the controller's to cancel.
    pub fn reset(&mut self) {
        self.state = WanderState::Idle;
        self.edge = Edge::Bottom;
        self.interrupted = None;
    }

    /// Mode entry: jump to the bottom-left corner and wait to settle.
    pub fn enter(&mut self, out: &mut Commands) {
        self.reset();
        let start = self.nav.start_position();
        log::debug!("wander: start at ({}, {})", start.x, start.y);
        out.push(Command::MoveTo(start));
        out.once(TimerId::Settle, self.settle_ms);
    }

    pub fn on_settled(&mut self, out: &mut Commands) {
        if self.state != WanderState::Idle {
            log::debug!("wander: stale settle in {}", self.state.label());
            return;
        }
        self.begin_walk(out);
    }

    pub fn on_pose_done(&mut self, out: &mut Commands) {
        if self.state != WanderState::Posing {
            log::debug!("wander: stale pose timer in {}", self.state.label());
            return;
        }
        self.begin_walk(out);
    }

    /// Resume the clockwise cycle from the edge just returned to.
    pub fn on_ears_done(&mut self, out: &mut Commands) {
        if self.state != WanderState::TouchingEars {
            log::debug!("wander: stale ear-touch timer in {}", self.state.label());
            return;
        }
        self.begin_walk(out);
    }

    /// One movement step. Only Walking and ReturningToEdge move; in every
    /// other state (notably BeingDragged) the tick is dropped.
    pub fn on_move_tick(&mut self, current: Position, out: &mut Commands) {
        let target = match self.state {
            WanderState::Walking { target } | WanderState::ReturningToEdge { target } => target,
            other => {
                log::debug!("wander: stale move tick in {}", other.label());
                out.cancel(TimerId::MoveTick);
                return;
            }
        };

        let (next, reached) = navigator::advance(current, target, self.speed);
        out.push(Command::MoveTo(next));
        if !reached {
            return;
        }

        out.cancel(TimerId::MoveTick);
        match self.state {
            WanderState::Walking { .. } => self.begin_pose(out),
            _ => {
                log::debug!("wander: back on {} edge", self.edge.label());
                self.state = WanderState::TouchingEars;
                out.play(animation::TOUCH_EARS);
                out.once(TimerId::EarTouch, self.ear_touch_ms);
            }
        }
    }

    pub fn drag_start(&mut self, out: &mut Commands) {
        if self.state == WanderState::BeingDragged {
            return;
        }
        log::debug!("wander: picked up while {}", self.state.label());
        self.interrupted = Some(self.state);
        self.state = WanderState::BeingDragged;
        for id in WANDER_TIMERS {
            out.cancel(id);
        }
        out.play(animation::DRAGGED);
    }

    /// Always resolves to ReturningToEdge, whatever the drag interrupted.
    pub fn drag_end(&mut self, release: Position, out: &mut Commands) {
        if self.state != WanderState::BeingDragged {
            for id in WANDER_TIMERS {
                out.cancel(id);
            }
        }
        let interrupted = self.interrupted.take().unwrap_or(self.state);
        let (target, edge) = self.nav.nearest_edge_return(release);
        log::debug!(
            "wander: dropped (was {}), returning to {} edge",
            interrupted.label(),
            edge.label()
        );

        self.edge = edge;
        self.state = WanderState::ReturningToEdge { target };
        out.play(if target.x < release.x {
            animation::SAD_WALK_LEFT
        } else {
            animation::SAD_WALK_RIGHT
        });
        out.push(Command::StartPeriodic {
            id: TimerId::MoveTick,
            every: self.move_tick_ms,
        });
    }

    fn begin_walk(&mut self, out: &mut Commands) {
        let leg = self.nav.walk_to_next_corner(self.edge);
        log::debug!(
            "wander: walking {} edge toward ({}, {})",
            self.edge.label(),
            leg.target.x,
            leg.target.y
        );
        self.edge = leg.edge;
        self.state = WanderState::Walking { target: leg.target };
        out.play(match leg.direction {
            Direction::Left => animation::WALK_LEFT,
            Direction::Right => animation::WALK_RIGHT,
        });
        out.push(Command::StartPeriodic {
            id: TimerId::MoveTick,
            every: self.move_tick_ms,
        });
    }

    fn begin_pose(&mut self, out: &mut Commands) {
        let pose = self.poses[self.rng.usize(0..self.poses.len())];
        let (min, max) = self.pose_ms;
        let duration = self.rng.u64(min..=max);
        log::debug!("wander: corner reached, {pose} for {duration}ms");
        self.state = WanderState::Posing;
        out.play(pose);
        out.once(TimerId::Pose, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use glam::IVec2;

    fn wanderer() -> Wanderer {
        let cfg = Config::default();
        let nav = EdgeNavigator::new(Layout::new(IVec2::new(1920, 1080)), 0);
        Wanderer::new(nav, &cfg, fastrand::Rng::with_seed(7))
    }

    /// Step until the current leg completes, returning the final position.
    fn walk_out(w: &mut Wanderer, mut pos: Position) -> Position {
        let mut out = Commands::new();
        for _ in 0..10_000 {
            w.on_move_tick(pos, &mut out);
            for cmd in out.take() {
                if let Command::MoveTo(p) = cmd {
                    pos = p;
                }
            }
            if !matches!(
                w.state(),
                WanderState::Walking { .. } | WanderState::ReturningToEdge { .. }
            ) {
                break;
            }
        }
        pos
    }

    #[test]
    fn enter_moves_to_bottom_left_and_waits() {
        let mut w = wanderer();
        let mut out = Commands::new();
        w.enter(&mut out);
        let start = w.navigator().start_position();
        assert_eq!(
            out.take(),
            vec![
                Command::MoveTo(start),
                Command::StartOnce {
                    id: TimerId::Settle,
                    after: Config::default().settle_ms
                },
            ]
        );
        assert_eq!(w.state(), WanderState::Idle);
    }

    #[test]
    fn first_walk_heads_right_along_bottom() {
        let mut w = wanderer();
        let mut out = Commands::new();
        w.enter(&mut out);
        out.take();
        w.on_settled(&mut out);

        let target = w.navigator().corner_for(Edge::Bottom);
        assert_eq!(w.state(), WanderState::Walking { target });
        assert_eq!(w.edge(), Edge::Right);
        assert!(out.take().contains(&Command::Play(animation::WALK_RIGHT)));
    }

    #[test]
    fn corner_arrival_poses_within_range() {
        let mut w = wanderer();
        let mut out = Commands::new();
        w.enter(&mut out);
        w.on_settled(&mut out);
        out.take();

        let start = w.navigator().start_position();
        let end = walk_out(&mut w, start);
        assert_eq!(end, w.navigator().corner_for(Edge::Bottom));
        assert_eq!(w.state(), WanderState::Posing);

        // Re-run the arrival step to inspect the commands it produced.
        let mut w2 = wanderer();
        w2.on_settled(&mut out);
        out.take();
        let corner = w2.navigator().corner_for(Edge::Bottom);
        w2.on_move_tick(corner, &mut out);
        let cmds = out.take();
        let pose_ms = cmds.iter().find_map(|c| match c {
            Command::StartOnce {
                id: TimerId::Pose,
                after,
            } => Some(*after),
            _ => None,
        });
        let (min, max) = Config::default().pose_ms;
        assert!(matches!(pose_ms, Some(ms) if (min..=max).contains(&ms)));
        assert!(cmds.iter().any(|c| matches!(c, Command::Play(p) if animation::POSES.contains(p))));
    }

    #[test]
    fn stale_timers_are_ignored() {
        let mut w = wanderer();
        let mut out = Commands::new();
        w.on_settled(&mut out);
        let walking = w.state();
        out.take();

        w.on_pose_done(&mut out);
        w.on_ears_done(&mut out);
        w.on_settled(&mut out);
        assert_eq!(w.state(), walking);
        assert!(out.is_empty());
    }

    #[test]
    fn move_tick_while_dragged_does_not_move() {
        let mut w = wanderer();
        let mut out = Commands::new();
        w.on_settled(&mut out);
        w.drag_start(&mut out);
        out.take();

        w.on_move_tick(IVec2::new(100, 100), &mut out);
        let cmds = out.take();
        assert!(!cmds.iter().any(|c| matches!(c, Command::MoveTo(_))));
        assert_eq!(cmds, vec![Command::Cancel(TimerId::MoveTick)]);
    }

    #[test]
    fn drag_cancels_every_wander_timer() {
        let mut w = wanderer();
        let mut out = Commands::new();
        w.on_settled(&mut out);
        out.take();
        w.drag_start(&mut out);
        let cmds = out.take();
        for id in WANDER_TIMERS {
            assert!(cmds.contains(&Command::Cancel(id)));
        }
        assert!(cmds.contains(&Command::Play(animation::DRAGGED)));
        assert_eq!(w.state(), WanderState::BeingDragged);
    }

    #[test]
    fn drop_returns_to_edge_then_resumes_from_that_edge() {
        let mut w = wanderer();
        let mut out = Commands::new();
        w.on_settled(&mut out);
        w.drag_start(&mut out);
        out.take();

        // Sprite center at (1500, 60): closest to the top edge.
        let release = IVec2::new(1500 - 450, 60 - 450);
        w.drag_end(release, &mut out);
        let (target, edge) = w.navigator().nearest_edge_return(release);
        assert_eq!(edge, Edge::Top);
        assert_eq!(w.state(), WanderState::ReturningToEdge { target });
        assert_eq!(w.edge(), Edge::Top);
        // Straight up: dx == 0 faces right.
        assert!(out.take().contains(&Command::Play(animation::SAD_WALK_RIGHT)));

        let end = walk_out(&mut w, release);
        assert_eq!(end, target);
        assert_eq!(w.state(), WanderState::TouchingEars);

        w.on_ears_done(&mut out);
        let top_left = w.navigator().corner_for(Edge::Top);
        assert_eq!(w.state(), WanderState::Walking { target: top_left });
        assert_eq!(w.edge(), Edge::Left);
        assert!(out.take().contains(&Command::Play(animation::WALK_LEFT)));
    }

    #[test]
    fn sad_walk_faces_toward_target() {
        let mut w = wanderer();
        let mut out = Commands::new();
        w.drag_start(&mut out);
        // Center at (150, 500): left edge, sprite slides left to touch it.
        w.drag_end(IVec2::new(150 - 450, 500 - 450), &mut out);
        assert!(out.take().contains(&Command::Play(animation::SAD_WALK_LEFT)));

        w.drag_start(&mut out);
        // Center at (1800, 500): right edge, sprite slides right.
        w.drag_end(IVec2::new(1800 - 450, 500 - 450), &mut out);
        let cmds = out.take();
        assert!(cmds.contains(&Command::Play(animation::SAD_WALK_RIGHT)));
    }

    #[test]
    fn drop_from_any_state_returns_to_edge() {
        for setup in 0..4 {
            let mut w = wanderer();
            let mut out = Commands::new();
            match setup {
                0 => {}
                1 => w.on_settled(&mut out),
                2 => {
                    w.on_settled(&mut out);
                    let corner = w.navigator().corner_for(Edge::Bottom);
                    w.on_move_tick(corner, &mut out);
                }
                _ => {
                    w.drag_start(&mut out);
                    w.drag_end(IVec2::new(-420, 0), &mut out);
                    walk_out(&mut w, IVec2::new(-420, 0));
                }
            }
            w.drag_start(&mut out);
            w.drag_end(IVec2::new(500, 200), &mut out);
            assert!(matches!(w.state(), WanderState::ReturningToEdge { .. }));
        }
    }
}
