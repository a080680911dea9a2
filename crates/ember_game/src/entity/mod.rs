//! Simulation entities and the small capability traits they share.
//!
//! Each entity kind is a plain struct owned by a `Vec` in the world. Behavior
//! that several kinds need (gravity, fading, removal) lives in free functions
//! here instead of a base type. Removal is always mark-then-compact: updates
//! only ever set a `dead` flag, and [`cull`] runs at one fixed point of the
//! tick.

pub mod animals;
pub mod cloud;
pub mod fireball;
pub mod particles;
pub mod player;
pub mod wall;

use ember_core::draw::Visual;
use ember_core::geometry::Rect;
use glam::Vec2;

pub use animals::{Animal, Bird, Butterfly};
pub use cloud::Cloud;
pub use fireball::Fireball;
pub use particles::{Dust, Fire};
pub use player::{LandingDust, Motion, Player, PlayerInput};
pub use wall::Wall;

/// Has a bounding box that takes part in overlap queries.
pub trait Collidable {
    fn rect(&self) -> &Rect;
}

/// Moves under its own velocity.
pub trait Movable {
    fn velocity(&self) -> Vec2;
}

/// Can be drawn; the handle may change frame to frame.
pub trait Animated {
    fn visual(&self) -> Visual;

    /// 0.0 ..= 1.0
    fn opacity(&self) -> f32 {
        1.0
    }
}

/// Flags itself for removal instead of being removed in place.
pub trait Expirable {
    fn is_dead(&self) -> bool;
}

/// Add one step of gravity without exceeding the fall cap.
pub fn apply_gravity(y_velocity: f32, gravity: f32, y_top_speed: f32) -> f32 {
    let next = if y_velocity < y_top_speed {
        y_velocity + gravity
    } else {
        y_velocity
    };
    next.min(y_top_speed)
}

/// Opacity counters run from roughly 350..650 down past zero; anything above
/// 255 draws fully opaque.
pub fn alpha_to_opacity(alpha: i32) -> f32 {
    alpha.clamp(0, 255) as f32 / 255.0
}

/// Remove every entity flagged dead. Returns how many were removed.
pub fn cull<T: Expirable>(items: &mut Vec<T>) -> usize {
    let before = items.len();
    items.retain(|item| !item.is_dead());
    before - items.len()
}

/// Mutable access to every item overlapping `rect`.
pub fn overlapping_mut<'a, T: Collidable>(
    rect: &'a Rect,
    items: &'a mut [T],
) -> impl Iterator<Item = &'a mut T> + 'a {
    items.iter_mut().filter(move |item| item.rect().overlaps(rect))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(bool);

    impl Expirable for Marker {
        fn is_dead(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn gravity_never_exceeds_cap() {
        assert_eq!(apply_gravity(0.0, 1.0, 30.0), 1.0);
        assert_eq!(apply_gravity(29.5, 1.0, 30.0), 30.0);
        assert_eq!(apply_gravity(30.0, 1.0, 30.0), 30.0);
        assert_eq!(apply_gravity(-15.0, 1.0, 30.0), -14.0);
    }

    #[test]
    fn cull_is_idempotent() {
        let mut items = vec![Marker(false), Marker(true), Marker(true), Marker(false)];
        assert_eq!(cull(&mut items), 2);
        assert_eq!(cull(&mut items), 0);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn opacity_clamps_counter() {
        assert_eq!(alpha_to_opacity(600), 1.0);
        assert_eq!(alpha_to_opacity(-5), 0.0);
        assert!((alpha_to_opacity(51) - 0.2).abs() < 1e-6);
    }
}
