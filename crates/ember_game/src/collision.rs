//! Collision resolver: axis-separated overlap resolution against static walls.
//!
//! Movers integrate one axis, ask the resolver what they now overlap, and let
//! it push them back out; only then do they integrate the other axis. Doing
//! the two axes separately means a contact is always attributable to exactly
//! one direction of travel, so corners never snap to the wrong edge.
//!
//! Walls flagged `top_solid` are platforms. They never block sideways motion
//! or rising motion, and they only catch a falling mover whose feet are still
//! within the landing tolerance of the platform's top edge.

use ember_core::draw::Facing;
use ember_core::geometry::Rect;
use glam::Vec2;

use crate::entity::Wall;

/// What the vertical pass decided about the mover this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalContact {
    /// Feet snapped onto `wall`; `impact_speed` is the fall speed before the snap.
    Landed { wall: usize, impact_speed: f32 },
    /// Head snapped under `wall`.
    Ceiling { wall: usize },
    Airborne,
}

/// Indices of every wall `rect` overlaps, in wall order.
pub fn contacts(rect: &Rect, statics: &[Wall]) -> Vec<usize> {
    statics
        .iter()
        .enumerate()
        .filter(|(_, wall)| wall.rect.overlaps(rect))
        .map(|(index, _)| index)
        .collect()
}

pub fn any_contact(rect: &Rect, statics: &[Wall]) -> bool {
    statics.iter().any(|wall| wall.rect.overlaps(rect))
}

/// Horizontal pass. The mover has already applied its x velocity.
///
/// Every overlapping wall that is not a platform pushes the mover's leading
/// edge (per `facing`) back to the wall's near edge, and the x velocity is
/// reset to `rebound` in the facing direction. Returns the blocking walls.
pub fn resolve_horizontal(
    rect: &mut Rect,
    velocity: &mut Vec2,
    facing: Facing,
    statics: &[Wall],
    rebound: f32,
) -> Vec<usize> {
    let mut blocked = Vec::new();
    for index in contacts(rect, statics) {
        let wall = &statics[index];
        if wall.top_solid {
            continue;
        }
        match facing {
            Facing::Right => rect.set_right(wall.rect.left()),
            Facing::Left => rect.set_left(wall.rect.right()),
        }
        // Resting against a wall keeps a small impulse instead of zero so the
        // held direction does not have to re-accelerate from scratch.
        velocity.x = rebound * facing.sign();
        blocked.push(index);
    }
    blocked
}

/// Vertical pass. The mover has already applied its y velocity.
///
/// Walls are examined in order and the first one that qualifies decides the
/// outcome. Landing leaves `y_velocity == gravity` so the next tick's gravity
/// step re-touches the floor and keeps the mover grounded.
pub fn resolve_vertical(
    rect: &mut Rect,
    velocity: &mut Vec2,
    statics: &[Wall],
    landing_tolerance: f32,
    gravity: f32,
) -> VerticalContact {
    for index in contacts(rect, statics) {
        let wall = &statics[index];
        if velocity.y > 0.0 {
            let catches = !wall.top_solid
                || (rect.bottom() - wall.rect.top()).abs() < landing_tolerance;
            if catches {
                let impact_speed = velocity.y;
                rect.set_bottom(wall.rect.top());
                velocity.y = gravity;
                return VerticalContact::Landed {
                    wall: index,
                    impact_speed,
                };
            }
        } else if velocity.y < 0.0 && !wall.top_solid {
            rect.set_top(wall.rect.bottom());
            velocity.y = 0.0;
            return VerticalContact::Ceiling { wall: index };
        }
    }
    VerticalContact::Airborne
}
