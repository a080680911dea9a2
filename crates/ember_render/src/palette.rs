//! Flat colors for every visual handle.
//!
//! The renderer draws untextured quads, so each handle resolves to one RGBA
//! value. Inputs are 8-bit sRGB (how content authors pick colors); outputs
//! are linear floats because the surface is an sRGB format and the GPU
//! re-encodes on write.

use ember_core::draw::{Facing, PlayerPose, Plumage, Visual, WingColor};

const ORANGE: [u8; 4] = [255, 140, 0, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

pub fn visual_rgba(visual: &Visual) -> [u8; 4] {
    match *visual {
        Visual::Sky => [135, 206, 235, 255],
        Visual::Tile { color, .. } => color,
        Visual::Player { pose, facing } => {
            let base = match pose {
                PlayerPose::Walk(frame) => [58 + frame * 6, 58, 140, 255],
                PlayerPose::Jump => [72, 72, 168, 255],
                PlayerPose::Shoot => [196, 82, 44, 255],
                PlayerPose::Roll(frame) => [92 + frame * 8, 92, 184, 255],
            };
            shade_for_facing(base, facing)
        }
        Visual::Fireball { .. } => [255, 122, 20, 255],
        Visual::Bird { plumage, facing } => {
            let base = match plumage {
                Plumage::Blue => [52, 92, 220, 255],
                Plumage::Red => [210, 40, 40, 255],
                Plumage::Yellow => [235, 200, 40, 255],
            };
            shade_for_facing(base, facing)
        }
        Visual::Butterfly { wings, frame } => {
            let mut base = match wings {
                WingColor::Red => [230, 60, 80, 255],
                WingColor::Blue => [70, 120, 240, 255],
                WingColor::Green => [60, 200, 90, 255],
            };
            // Closed-wing frames read darker.
            if frame % 2 == 1 {
                base = [base[0] / 2, base[1] / 2, base[2] / 2, 255];
            }
            base
        }
        Visual::Cloud => [245, 245, 245, 255],
        Visual::Fire { green } => [255, green, 15, 255],
        Visual::Dust => [114, 68, 70, 255],
        Visual::MenuOption { selected } => {
            if selected {
                ORANGE
            } else {
                BLACK
            }
        }
    }
}

fn shade_for_facing(rgba: [u8; 4], facing: Facing) -> [u8; 4] {
    match facing {
        Facing::Right => rgba,
        Facing::Left => [
            rgba[0].saturating_sub(12),
            rgba[1].saturating_sub(12),
            rgba[2].saturating_sub(12),
            rgba[3],
        ],
    }
}

pub fn srgb_to_linear(channel: u8) -> f32 {
    let c = f32::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear RGBA with `opacity` folded into alpha.
pub fn to_linear(rgba: [u8; 4], opacity: f32) -> [f32; 4] {
    [
        srgb_to_linear(rgba[0]),
        srgb_to_linear(rgba[1]),
        srgb_to_linear(rgba[2]),
        f32::from(rgba[3]) / 255.0 * opacity.clamp(0.0, 1.0),
    ]
}
