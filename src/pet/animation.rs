//! Animation names shared by the behavior engine and the renderer.

pub const IDLE: &str = "idle";
pub const WALK_LEFT: &str = "walk_left";
pub const WALK_RIGHT: &str = "walk_right";
pub const SAD_WALK_LEFT: &str = "sad_walk_left";
pub const SAD_WALK_RIGHT: &str = "sad_walk_right";
pub const DRAGGED: &str = "dragged_by_ear";
pub const TOUCH_EARS: &str = "touch_ears";

pub const POSE_STRETCH: &str = "pose_stretch";
pub const POSE_WAVE: &str = "pose_wave";
pub const POSE_SIT: &str = "pose_sit";
pub const POSES: [&str; 3] = [POSE_STRETCH, POSE_WAVE, POSE_SIT];

pub const SLAPPED: &str = "slapped";
pub const SLAPPED_FLOATING: &str = "slapped_floating";
pub const EATING: &str = "eating";
pub const EATING_FLOATING: &str = "eating_floating";
pub const SATISFIED: &str = "satisfied";
pub const SATISFIED_FLOATING: &str = "satisfied_floating";
pub const PETTED: &str = "petted";
pub const PETTED_FLOATING: &str = "petted_floating";
pub const FLOAT_ACTIVE: &str = "float_active";
pub const FLOAT_CALM: &str = "float_calm";

pub const JUDGING: &str = "judging";
pub const TYPING: &str = "typing";
pub const SLEEPY: &str = "sleepy";
pub const DANCING: &str = "dancing";
pub const EXCITED: &str = "excited";

/// Every animation the renderer knows how to draw.
const CATALOG: &[&str] = &[
    IDLE,
    WALK_LEFT,
    WALK_RIGHT,
    SAD_WALK_LEFT,
    SAD_WALK_RIGHT,
    DRAGGED,
    TOUCH_EARS,
    POSE_STRETCH,
    POSE_WAVE,
    POSE_SIT,
    SLAPPED,
    SLAPPED_FLOATING,
    EATING,
    EATING_FLOATING,
    SATISFIED,
    SATISFIED_FLOATING,
    PETTED,
    PETTED_FLOATING,
    FLOAT_ACTIVE,
    FLOAT_CALM,
    JUDGING,
    TYPING,
    SLEEPY,
    DANCING,
    EXCITED,
];

/// Map a requested name onto a known animation, falling back to idle.
pub fn resolve(name: &str) -> &'static str {
    match CATALOG.iter().find(|&&known| known == name) {
        Some(&known) => known,
        None => {
            log::warn!("unknown animation '{name}', playing idle");
            IDLE
        }
    }
}

/// Placeholder tint used until real sprites exist. RGBA packed as u32.
pub fn placeholder_color(name: &str) -> u32 {
    let palette: &[[u8; 3]] = &[
        [100, 149, 237], // cornflower (idle)
        [255, 165, 50],  // orange
        [120, 200, 120], // mint
        [230, 90, 110],  // rose
        [180, 130, 220], // lavender
        [250, 210, 80],  // butter
        [90, 190, 200],  // teal
        [200, 100, 50],  // ginger
    ];
    if name == IDLE {
        let [r, g, b] = palette[0];
        return pack(r, g, b);
    }
    // FNV-1a so each animation keeps a stable colour between runs.
    let hash = name
        .bytes()
        .fold(0x811c9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x01000193));
    let [r, g, b] = palette[1 + hash as usize % (palette.len() - 1)];
    pack(r, g, b)
}

fn pack(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | 0xFF
}
