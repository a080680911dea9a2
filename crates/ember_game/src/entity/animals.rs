//! Ambient wildlife. Animals wander on their own; a fireball strike makes
//! them frantic, and a frantic animal eventually expires.

use ember_core::draw::{Facing, Plumage, Visual, WingColor};
use ember_core::geometry::Rect;
use glam::Vec2;
use rand::Rng;

use super::{apply_gravity, Animated, Collidable, Expirable, Movable};
use crate::collision::contacts;
use crate::config::GameConfig;
use crate::entity::Wall;
use crate::rng::{either_sign, one_in};

pub const BIRD_SIZE: [f32; 2] = [32.0, 24.0];
pub const BUTTERFLY_SIZE: [f32; 2] = [16.0, 16.0];

const BIRD_HOP_ODDS: u32 = 61;
const BIRD_HOP_SPEED: f32 = 10.0;
const BIRD_FRANTIC_ODDS: u32 = 6;
const BIRD_FRANTIC_SPEED: f32 = 20.0;
/// Sideways wall contact pushes a bird back by this much per wall.
const BIRD_BOUNCE: f32 = 10.0;

const BUTTERFLY_DRIFT_ODDS: u32 = 4;
const BUTTERFLY_DRIFT: i32 = 10;
const BUTTERFLY_FRANTIC_ODDS: u32 = 3;
const BUTTERFLY_FRANTIC_DRIFT: i32 = 20;
const BUTTERFLY_LEASH: f32 = 50.0;
const BUTTERFLY_LEASH_PULL: f32 = 20.0;
const BUTTERFLY_FRAMES: u8 = 4;

/// Per-tick chance that a struck animal expires.
const EXPIRE_ODDS: u32 = 121;

#[derive(Debug, Clone)]
pub struct Bird {
    pub rect: Rect,
    pub velocity: Vec2,
    pub plumage: Plumage,
    pub facing: Facing,
    pub hit: bool,
    pub dead: bool,
}

impl Bird {
    pub fn new(position: Vec2, plumage: Plumage) -> Self {
        Self {
            rect: Rect::new(position.x, position.y, BIRD_SIZE[0], BIRD_SIZE[1]),
            velocity: Vec2::ZERO,
            plumage,
            facing: Facing::Right,
            hit: false,
            dead: false,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, walls: &[Wall], config: &GameConfig, rng: &mut R) {
        if self.velocity.x > 0.0 {
            self.facing = Facing::Right;
        } else if self.velocity.x < 0.0 {
            self.facing = Facing::Left;
        }

        self.rect.x += self.velocity.x;
        let pushback = if self.velocity.x > 0.0 {
            -BIRD_BOUNCE
        } else {
            BIRD_BOUNCE
        };
        let blocked = contacts(&self.rect, walls).len();
        self.rect.x += pushback * blocked as f32;

        self.velocity.y = apply_gravity(self.velocity.y, config.gravity, config.y_top_speed);
        self.rect.y += self.velocity.y;
        for index in contacts(&self.rect, walls) {
            if self.velocity.y > 0.0 {
                self.rect.set_bottom(walls[index].rect.top());
                self.velocity.y = config.gravity;
            }
        }

        if !self.hit {
            self.velocity.x = if one_in(rng, BIRD_HOP_ODDS) {
                either_sign(rng, BIRD_HOP_SPEED)
            } else {
                0.0
            };
        } else {
            self.velocity.x = if one_in(rng, BIRD_FRANTIC_ODDS) {
                either_sign(rng, BIRD_FRANTIC_SPEED)
            } else {
                0.0
            };
            if one_in(rng, EXPIRE_ODDS) {
                self.dead = true;
            }
        }

        if self.rect.y > config.display_height as f32 {
            self.dead = true;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Butterfly {
    pub rect: Rect,
    /// Spawn position; wandering is leashed to it.
    pub home: Vec2,
    pub wings: WingColor,
    pub frame: u8,
    pub hit: bool,
    pub dead: bool,
    frame_counter: u8,
}

impl Butterfly {
    pub fn new(position: Vec2, wings: WingColor) -> Self {
        Self {
            rect: Rect::new(position.x, position.y, BUTTERFLY_SIZE[0], BUTTERFLY_SIZE[1]),
            home: position,
            wings,
            frame: 0,
            hit: false,
            dead: false,
            frame_counter: 0,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.frame_counter = (self.frame_counter + 1) % BUTTERFLY_FRAMES;
        if self.frame_counter == BUTTERFLY_FRAMES - 1 {
            self.frame = (self.frame + 1) % BUTTERFLY_FRAMES;
        }

        let (odds, drift) = if self.hit {
            (BUTTERFLY_FRANTIC_ODDS, BUTTERFLY_FRANTIC_DRIFT)
        } else {
            (BUTTERFLY_DRIFT_ODDS, BUTTERFLY_DRIFT)
        };
        if one_in(rng, odds) {
            self.rect.x += rng.gen_range(-drift..=drift) as f32;
        }
        if one_in(rng, odds) {
            self.rect.y += rng.gen_range(-drift..=drift) as f32;
        }
        if self.hit && one_in(rng, EXPIRE_ODDS) {
            self.dead = true;
        }

        self.rect.x = leash(self.rect.x, self.home.x);
        self.rect.y = leash(self.rect.y, self.home.y);
    }
}

fn leash(value: f32, home: f32) -> f32 {
    if value < home - BUTTERFLY_LEASH {
        value + BUTTERFLY_LEASH_PULL
    } else if value > home + BUTTERFLY_LEASH {
        value - BUTTERFLY_LEASH_PULL
    } else {
        value
    }
}

/// The wildlife collection holds both kinds side by side.
#[derive(Debug, Clone)]
pub enum Animal {
    Bird(Bird),
    Butterfly(Butterfly),
}

impl Animal {
    pub fn update<R: Rng + ?Sized>(&mut self, walls: &[Wall], config: &GameConfig, rng: &mut R) {
        match self {
            Self::Bird(bird) => bird.update(walls, config, rng),
            Self::Butterfly(butterfly) => butterfly.update(rng),
        }
    }

    /// Mark as struck by a fireball.
    pub fn strike(&mut self) {
        match self {
            Self::Bird(bird) => bird.hit = true,
            Self::Butterfly(butterfly) => butterfly.hit = true,
        }
    }

    pub fn is_hit(&self) -> bool {
        match self {
            Self::Bird(bird) => bird.hit,
            Self::Butterfly(butterfly) => butterfly.hit,
        }
    }
}

impl Collidable for Animal {
    fn rect(&self) -> &Rect {
        match self {
            Self::Bird(bird) => &bird.rect,
            Self::Butterfly(butterfly) => &butterfly.rect,
        }
    }
}

impl Movable for Animal {
    fn velocity(&self) -> Vec2 {
        match self {
            Self::Bird(bird) => bird.velocity,
            Self::Butterfly(_) => Vec2::ZERO,
        }
    }
}

impl Expirable for Animal {
    fn is_dead(&self) -> bool {
        match self {
            Self::Bird(bird) => bird.dead,
            Self::Butterfly(butterfly) => butterfly.dead,
        }
    }
}

impl Animated for Animal {
    fn visual(&self) -> Visual {
        match self {
            Self::Bird(bird) => Visual::Bird {
                plumage: bird.plumage,
                facing: bird.facing,
            },
            Self::Butterfly(butterfly) => Visual::Butterfly {
                wings: butterfly.wings,
                frame: butterfly.frame,
            },
        }
    }
}
