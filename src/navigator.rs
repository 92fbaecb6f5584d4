use glam::IVec2;

use crate::config::Layout;

/// Window top-left in screen pixels.
pub type Position = IVec2;

/// Screen border the pet walks along. Clockwise order on screen
/// (y grows downward): Bottom -> Right -> Top -> Left -> Bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Bottom,
    Right,
    Top,
    Left,
}

impl Edge {
    pub fn next(self) -> Self {
        match self {
            Edge::Bottom => Edge::Right,
            Edge::Right => Edge::Top,
            Edge::Top => Edge::Left,
            Edge::Left => Edge::Bottom,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Edge::Bottom => "bottom",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Left => "left",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    BottomLeft,
    BottomRight,
    TopRight,
    TopLeft,
}

/// Which way the sprite faces while moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// One corner-to-corner walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub target: Position,
    /// Edge the pet will be on once it arrives.
    pub edge: Edge,
    pub direction: Direction,
}

/// Perimeter-walk geometry. Corners are window positions chosen so the
/// sprite's own corner (not the larger window's) sits on the screen corner.
#[derive(Debug, Clone)]
pub struct EdgeNavigator {
    layout: Layout,
    margin: i32,
    /// Indexed by `Corner as usize`.
    corners: [Position; 4],
}

impl EdgeNavigator {
    pub fn new(layout: Layout, margin: i32) -> Self {
        let offset = layout.sprite_offset();
        let far = layout.screen - (offset + layout.sprite) - IVec2::splat(margin);
        let near = -offset + IVec2::splat(margin);

        let corners = [
            IVec2::new(near.x, far.y), // bottom-left
            IVec2::new(far.x, far.y),  // bottom-right
            IVec2::new(far.x, near.y), // top-right
            IVec2::new(near.x, near.y), // top-left
        ];

        log::debug!(
            "navigator: screen {}x{}, window {}x{}, sprite offset ({}, {})",
            layout.screen.x,
            layout.screen.y,
            layout.window.x,
            layout.window.y,
            offset.x,
            offset.y,
        );

        Self {
            layout,
            margin,
            corners,
        }
    }

    pub fn corner(&self, corner: Corner) -> Position {
        self.corners[corner as usize]
    }

    /// The corner that ends `edge` when walking clockwise.
    pub fn corner_for(&self, edge: Edge) -> Position {
        self.corner(match edge {
            Edge::Bottom => Corner::BottomRight,
            Edge::Right => Corner::TopRight,
            Edge::Top => Corner::TopLeft,
            Edge::Left => Corner::BottomLeft,
        })
    }

    /// Where Wanderer mode begins.
    pub fn start_position(&self) -> Position {
        self.corner(Corner::BottomLeft)
    }

    /// Walk along `current` to its clockwise end. The facing follows how the
    /// sprite travels along the edge, not the sign of dx.
    pub fn walk_to_next_corner(&self, current: Edge) -> Leg {
        let direction = match current {
            Edge::Bottom | Edge::Right => Direction::Right,
            Edge::Top | Edge::Left => Direction::Left,
        };
        Leg {
            target: self.corner_for(current),
            edge: current.next(),
            direction,
        }
    }

    /// Returns the nearest edge to the dropped sprite and the window
    /// position that puts the sprite flush against it.
    ///
    /// Ties resolve in the order Left, Right, Top, Bottom. The coordinate
    /// along the edge is kept, clamped to the edge's corner span.
    pub fn nearest_edge_return(&self, drop: Position) -> (Position, Edge) {
        let center = drop + self.layout.sprite_offset() + self.layout.sprite / 2;
        let screen = self.layout.screen;

        let candidates = [
            (Edge::Left, center.x),
            (Edge::Right, screen.x - center.x),
            (Edge::Top, center.y),
            (Edge::Bottom, screen.y - center.y),
        ];
        let mut best = candidates[0];
        for &candidate in &candidates[1..] {
            if candidate.1 < best.1 {
                best = candidate;
            }
        }
        let edge = best.0;

        let top_left = self.corner(Corner::TopLeft);
        let bottom_right = self.corner(Corner::BottomRight);
        // On a screen smaller than the sprite plus margins the corners cross.
        let lo = top_left.min(bottom_right);
        let hi = top_left.max(bottom_right);
        let span_y = |y: i32| y.clamp(lo.y, hi.y);
        let span_x = |x: i32| x.clamp(lo.x, hi.x);

        let target = match edge {
            Edge::Left => IVec2::new(top_left.x, span_y(drop.y)),
            Edge::Right => IVec2::new(bottom_right.x, span_y(drop.y)),
            Edge::Top => IVec2::new(span_x(drop.x), top_left.y),
            Edge::Bottom => IVec2::new(span_x(drop.x), bottom_right.y),
        };

        log::debug!(
            "nearest edge {} at {}px, margin {}, return to ({}, {})",
            edge.label(),
            best.1,
            self.margin,
            target.x,
            target.y
        );
        (target, edge)
    }
}

/// One movement step of at most `speed` pixels toward `target`.
/// Arrives (snapping onto the target) once closer than one step.
pub fn advance(current: Position, target: Position, speed: i32) -> (Position, bool) {
    let delta = (target - current).as_vec2();
    let distance = delta.length();
    if distance < speed as f32 {
        return (target, true);
    }
    // Rounded rather than truncated so slow diagonal steps never stall at zero.
    let step = (delta / distance * speed as f32).round().as_ivec2();
    (current + step, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator(w: i32, h: i32) -> EdgeNavigator {
        EdgeNavigator::new(Layout::new(IVec2::new(w, h)), 0)
    }

    #[test]
    fn corners_put_sprite_corner_on_screen_corner() {
        let nav = navigator(1920, 1080);
        // Sprite is 200x200 at (350, 350) inside a 900x900 window.
        assert_eq!(nav.corner(Corner::TopLeft), IVec2::new(-350, -350));
        assert_eq!(nav.corner(Corner::BottomLeft), IVec2::new(-350, 1080 - 550));
        assert_eq!(nav.corner(Corner::BottomRight), IVec2::new(1920 - 550, 1080 - 550));
        assert_eq!(nav.corner(Corner::TopRight), IVec2::new(1920 - 550, -350));
    }

    #[test]
    fn margin_insets_corners() {
        let nav = EdgeNavigator::new(Layout::new(IVec2::new(1920, 1080)), 10);
        assert_eq!(nav.corner(Corner::TopLeft), IVec2::new(-340, -340));
        assert_eq!(nav.corner(Corner::BottomRight), IVec2::new(1360, 520));
    }

    #[test]
    fn clockwise_order_cycles_forever() {
        let nav = navigator(1920, 1080);
        let mut edge = Edge::Bottom;
        let mut visited = Vec::new();
        for _ in 0..9 {
            let leg = nav.walk_to_next_corner(edge);
            assert_eq!(leg.edge, edge.next());
            visited.push(leg.edge);
            edge = leg.edge;
        }
        assert_eq!(
            visited,
            vec![
                Edge::Right,
                Edge::Top,
                Edge::Left,
                Edge::Bottom,
                Edge::Right,
                Edge::Top,
                Edge::Left,
                Edge::Bottom,
                Edge::Right,
            ]
        );
    }

    #[test]
    fn facing_follows_edge_not_dx() {
        let nav = navigator(1920, 1080);
        let right_edge = nav.walk_to_next_corner(Edge::Right);
        // Moving straight up the right edge still faces right.
        assert_eq!(right_edge.direction, Direction::Right);
        assert_eq!(right_edge.target, nav.corner(Corner::TopRight));

        let left_edge = nav.walk_to_next_corner(Edge::Left);
        assert_eq!(left_edge.direction, Direction::Left);
        assert_eq!(left_edge.target, nav.corner(Corner::BottomLeft));
    }

    #[test]
    fn advance_steps_then_snaps() {
        let (next, reached) = advance(IVec2::ZERO, IVec2::new(10, 0), 3);
        assert_eq!(next, IVec2::new(3, 0));
        assert!(!reached);

        let (next, reached) = advance(IVec2::new(8, 0), IVec2::new(10, 0), 3);
        assert_eq!(next, IVec2::new(10, 0));
        assert!(reached);
    }

    #[test]
    fn advance_diagonal_at_speed_one_makes_progress() {
        let target = IVec2::new(5, 5);
        let mut pos = IVec2::ZERO;
        for _ in 0..20 {
            let (next, reached) = advance(pos, target, 1);
            pos = next;
            if reached {
                break;
            }
        }
        assert_eq!(pos, target);
    }

    #[test]
    fn nearest_edge_left_keeps_vertical_coordinate() {
        let nav = navigator(980, 600);
        // Sprite center at (50, 400): left=50, right=930, top=400, bottom=200.
        let drop = IVec2::new(50 - 450, 400 - 450);
        let (target, edge) = nav.nearest_edge_return(drop);
        assert_eq!(edge, Edge::Left);
        assert_eq!(target, IVec2::new(-350, drop.y));
    }

    #[test]
    fn nearest_edge_top_keeps_horizontal_coordinate() {
        let nav = navigator(1920, 1080);
        // Center (900, 40).
        let drop = IVec2::new(900 - 450, 40 - 450);
        let (target, edge) = nav.nearest_edge_return(drop);
        assert_eq!(edge, Edge::Top);
        assert_eq!(target, IVec2::new(drop.x, -350));
    }

    #[test]
    fn nearest_edge_right_and_bottom() {
        let nav = navigator(1000, 800);
        let (target, edge) = nav.nearest_edge_return(IVec2::new(970 - 450, 300 - 450));
        assert_eq!(edge, Edge::Right);
        assert_eq!(target, IVec2::new(1000 - 550, -150));

        let (target, edge) = nav.nearest_edge_return(IVec2::new(400 - 450, 790 - 450));
        assert_eq!(edge, Edge::Bottom);
        assert_eq!(target, IVec2::new(-50, 800 - 550));
    }

    #[test]
    fn nearest_edge_ties_prefer_left_right_top_bottom() {
        let nav = navigator(1000, 1000);
        // Dead center: all four distances are 500.
        let (_, edge) = nav.nearest_edge_return(IVec2::new(50, 50));
        assert_eq!(edge, Edge::Left);

        // Right == Top == 100.
        let (_, edge) = nav.nearest_edge_return(IVec2::new(900 - 450, 100 - 450));
        assert_eq!(edge, Edge::Right);

        // Top == Bottom on a short screen, left/right far away.
        let nav = navigator(2000, 200);
        let (_, edge) = nav.nearest_edge_return(IVec2::new(1000 - 450, 100 - 450));
        assert_eq!(edge, Edge::Top);
    }

    #[test]
    fn drop_off_screen_lands_on_edge_span() {
        let nav = navigator(1920, 1080);
        // Dragged far past the top-left corner.
        let (target, edge) = nav.nearest_edge_return(IVec2::new(-900, -2000));
        assert_eq!(edge, Edge::Top);
        assert_eq!(target, IVec2::new(-350, -350));
    }

    #[test]
    fn screen_smaller_than_sprite_still_returns_a_target() {
        let nav = navigator(0, 0);
        for drop in [IVec2::ZERO, IVec2::new(-5000, 300), IVec2::new(40, -40)] {
            let (target, _) = nav.nearest_edge_return(drop);
            let lo = nav.corner(Corner::TopLeft).min(nav.corner(Corner::BottomRight));
            let hi = nav.corner(Corner::TopLeft).max(nav.corner(Corner::BottomRight));
            assert!(target.cmpge(lo).all() && target.cmple(hi).all());
        }

        // Margin wider than the screen.
        let nav = EdgeNavigator::new(Layout::new(IVec2::new(300, 300)), 400);
        let _ = nav.nearest_edge_return(IVec2::new(10, 10));
    }
}
