//! Short-lived fading particles. Neither kind affects gameplay.

use ember_core::draw::Visual;
use ember_core::geometry::Rect;
use glam::Vec2;
use rand::Rng;

use super::{alpha_to_opacity, Animated, Collidable, Expirable, Movable};
use crate::collision::any_contact;
use crate::entity::Wall;

pub const DEFAULT_FADE: i32 = 25;
pub const BURST_FADE: i32 = 35;
const START_ALPHA: i32 = 500;
const START_ALPHA_JITTER: i32 = 150;

fn starting_alpha<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    START_ALPHA + rng.gen_range(-START_ALPHA_JITTER..=START_ALPHA_JITTER)
}

/// Ember flame. Snuffed by touching a wall sideways.
#[derive(Debug, Clone)]
pub struct Fire {
    pub rect: Rect,
    pub velocity: Vec2,
    pub alpha: i32,
    pub fade: i32,
    pub green: u8,
    pub dead: bool,
}

impl Fire {
    /// `x` is the left edge, `bottom` the bottom edge.
    pub fn new<R: Rng + ?Sized>(
        x: f32,
        bottom: f32,
        size: Vec2,
        velocity: Vec2,
        fade: i32,
        rng: &mut R,
    ) -> Self {
        let mut rect = Rect::new(x, 0.0, size.x, size.y);
        rect.set_bottom(bottom);
        Self {
            rect,
            velocity,
            alpha: starting_alpha(rng),
            fade,
            green: rng.gen_range(15..=215),
            dead: false,
        }
    }

    pub fn update(&mut self, walls: &[Wall]) {
        self.rect.x += self.velocity.x;
        if any_contact(&self.rect, walls) {
            self.dead = true;
        }
        self.rect.y += self.velocity.y;
        self.alpha -= self.fade;
        if self.alpha < 0 {
            self.dead = true;
        }
    }
}

impl Collidable for Fire {
    fn rect(&self) -> &Rect {
        &self.rect
    }
}

impl Movable for Fire {
    fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

impl Expirable for Fire {
    fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Animated for Fire {
    fn visual(&self) -> Visual {
        Visual::Fire { green: self.green }
    }

    fn opacity(&self) -> f32 {
        alpha_to_opacity(self.alpha)
    }
}

/// Dust puff. Falls under gravity and passes through everything.
#[derive(Debug, Clone)]
pub struct Dust {
    pub rect: Rect,
    pub velocity: Vec2,
    pub alpha: i32,
    pub dead: bool,
}

impl Dust {
    /// `x` is the left edge, `bottom` the bottom edge.
    pub fn new<R: Rng + ?Sized>(
        x: f32,
        bottom: f32,
        size: f32,
        velocity: Vec2,
        rng: &mut R,
    ) -> Self {
        let mut rect = Rect::new(x, 0.0, size, size);
        rect.set_bottom(bottom);
        Self {
            rect,
            velocity,
            alpha: starting_alpha(rng),
            dead: false,
        }
    }

    pub fn update(&mut self, gravity: f32) {
        self.rect.translate(self.velocity.x, self.velocity.y);
        self.velocity.y += gravity;
        self.alpha -= DEFAULT_FADE;
        if self.alpha < 0 {
            self.dead = true;
        }
    }
}

impl Movable for Dust {
    fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

impl Expirable for Dust {
    fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Animated for Dust {
    fn visual(&self) -> Visual {
        Visual::Dust
    }

    fn opacity(&self) -> f32 {
        alpha_to_opacity(self.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fire_dies_on_wall_contact() {
        let mut rng = StdRng::seed_from_u64(3);
        let walls = vec![Wall::solid(Rect::new(20.0, 0.0, 32.0, 100.0))];
        let mut fire = Fire::new(
            0.0,
            50.0,
            Vec2::new(8.0, 8.0),
            Vec2::new(15.0, 0.0),
            DEFAULT_FADE,
            &mut rng,
        );
        fire.update(&walls);
        assert!(fire.dead);
    }

    #[test]
    fn fire_fades_out_and_starts_opaque() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut fire = Fire::new(
            0.0,
            50.0,
            Vec2::new(8.0, 16.0),
            Vec2::new(0.0, -2.0),
            BURST_FADE,
            &mut rng,
        );
        assert!((350..=650).contains(&fire.alpha));
        assert_eq!(fire.opacity(), 1.0);
        assert_eq!(fire.rect.bottom(), 50.0);

        let mut ticks = 0;
        while !fire.dead {
            fire.update(&[]);
            ticks += 1;
        }
        assert!((10..=19).contains(&ticks), "ticks = {ticks}");
        assert_eq!(fire.opacity(), 0.0);
    }

    #[test]
    fn dust_falls_and_fades() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut dust = Dust::new(100.0, 200.0, 8.0, Vec2::new(2.0, -3.0), &mut rng);
        assert_eq!(dust.rect.bottom(), 200.0);
        let alpha = dust.alpha;
        dust.update(1.0);
        assert_eq!(dust.rect.x, 102.0);
        assert_eq!(dust.rect.bottom(), 197.0);
        assert_eq!(dust.velocity.y, -2.0);
        assert_eq!(dust.alpha, alpha - DEFAULT_FADE);
        for _ in 0..30 {
            dust.update(1.0);
        }
        assert!(dust.dead);
    }
}
