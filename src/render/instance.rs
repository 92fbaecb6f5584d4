use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::config::Layout;
use crate::pet::animation;

/// Shader kind: the pet body.
pub const KIND_BODY: u32 = 0;
/// Shader kind: the caption marker above the pet.
pub const KIND_BUBBLE: u32 = 1;

/// Length of the "pop" when the animation changes (seconds).
const POP_SECS: f32 = 0.25;
const POP_SCALE: f32 = 0.15;
/// Hover amplitude while floating (pixels).
const BOB_PX: f32 = 12.0;
/// Sideways shake after a slap (pixels).
const SHAKE_PX: f32 = 10.0;

/// One quad of the placeholder pet, uploaded per frame. Stride = 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Center in window pixels.
    pub position: [f32; 2],
    /// Width, height in pixels.
    pub size: [f32; 2],
    /// RGBA color packed as u32.
    pub color: u32,
    /// `KIND_BODY` or `KIND_BUBBLE`.
    pub kind: u32,
}

/// Everything the placeholder needs to know about the pet this frame.
pub struct PetFrame<'a> {
    pub animation: &'a str,
    pub caption_visible: bool,
    /// Seconds since the animation last changed.
    pub since_change: f32,
    /// Seconds since startup, for looping motion.
    pub time: f32,
}

impl SpriteInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // size
        2 => Uint32,    // color
        3 => Uint32,    // kind
    ];

    /// Instance-rate buffer layout matching the field order above.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    /// Build the placeholder instances for one frame into `out`.
    pub fn build(frame: &PetFrame, layout: &Layout, out: &mut Vec<SpriteInstance>) {
        out.clear();

        let sprite = layout.sprite.as_vec2();
        let mut center = layout.sprite_offset().as_vec2() + sprite * 0.5;

        let floating = frame.animation.ends_with("_floating")
            || frame.animation == animation::FLOAT_ACTIVE
            || frame.animation == animation::FLOAT_CALM;
        if floating {
            let speed = if frame.animation == animation::FLOAT_ACTIVE {
                4.0
            } else {
                1.5
            };
            center.y -= BOB_PX * (frame.time * speed).sin().abs();
        }

        let pop = (1.0 - frame.since_change / POP_SECS).clamp(0.0, 1.0);
        let scale = 1.0 + POP_SCALE * pop;

        if frame.animation == animation::SLAPPED || frame.animation == animation::SLAPPED_FLOATING {
            center.x += SHAKE_PX * (frame.time * 20.0).sin() * pop.max(0.2);
        }

        out.push(SpriteInstance {
            position: center.into(),
            size: (sprite * scale).into(),
            color: animation::placeholder_color(frame.animation),
            kind: KIND_BODY,
        });

        if frame.caption_visible {
            let bubble = Vec2::new(sprite.x * 0.9, sprite.y * 0.35);
            let above = center - Vec2::new(0.0, sprite.y * 0.5 + bubble.y * 0.5 + 16.0);
            out.push(SpriteInstance {
                position: above.into(),
                size: bubble.into(),
                color: 0xF5F5F0FF,
                kind: KIND_BUBBLE,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(animation: &str, caption_visible: bool) -> PetFrame<'_> {
        PetFrame {
            animation,
            caption_visible,
            since_change: 10.0,
            time: 0.0,
        }
    }

    #[test]
    fn body_sits_in_window_center() {
        let layout = Layout::default();
        let mut out = Vec::new();
        SpriteInstance::build(&frame(animation::IDLE, false), &layout, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].position, [450.0, 450.0]);
        assert_eq!(out[0].size, [200.0, 200.0]);
        assert_eq!(out[0].kind, KIND_BODY);
    }

    #[test]
    fn caption_adds_bubble_above_body() {
        let layout = Layout::default();
        let mut out = Vec::new();
        SpriteInstance::build(&frame(animation::JUDGING, true), &layout, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].kind, KIND_BUBBLE);
        assert!(out[1].position[1] < out[0].position[1]);
    }

    #[test]
    fn instance_stride_matches_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 24);
        assert_eq!(SpriteInstance::layout().array_stride, 24);
    }

    #[test]
    fn fresh_animation_pops() {
        let layout = Layout::default();
        let mut out = Vec::new();
        let mut f = frame(animation::EATING, false);
        f.since_change = 0.0;
        SpriteInstance::build(&f, &layout, &mut out);
        assert!(out[0].size[0] > 200.0);
    }
}
