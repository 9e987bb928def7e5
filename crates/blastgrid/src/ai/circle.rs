//! # Circle Shooting — Rings and Spirals of Free Bullets
//!
//! A [`CircleShooting`] fires `bullets_per_shot` free bullets evenly spread
//! around its owner's center, then turns its shoot axis by
//! `rotation_per_shot` before the next shot:
//!
//! ```text
//!  bullets_per_shot = 4       bullets_per_shot = 1, rotating
//!
//!          o                          o
//!      o   +   o                        +
//!          o                        o  +  o ...
//! ```
//!
//! Angles are measured from the upward vertical, clockwise. The first shot
//! leaves on the first update after [`CircleShooting::activate`], later ones
//! every `time_between_shots`. With `consecutive_shots` set, the pattern
//! switches itself off after that many shots.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::time::Duration;

use crate::collision::Collider;
use crate::components::{Killable, Position};
use crate::ecs::Entity;
use crate::entities::bullet::{bullet_info, free_bullet};
use crate::error::{Result, SimError};
use crate::math::Vec2;
use crate::rng::DeterministicRng;
use crate::time::Clock;
use crate::world::World;

#[derive(Debug, Clone)]
pub struct CircleShooting {
    bullet_id: u32,
    pub time_between_shots: Duration,
    /// `None` keeps shooting until deactivated.
    pub consecutive_shots: Option<u32>,
    pub bullets_per_shot: u32,
    /// Radians.
    pub rotation_per_shot: f32,
    /// Radians from the upward vertical, clockwise, of the first bullet.
    pub shoot_angle: f32,
    /// Pick a new `shoot_angle` at every activation.
    pub randomize_shoot_angle: bool,
    active: bool,
    shots_fired: u32,
    clock: Clock,
}

impl CircleShooting {
    /// An inactive pattern firing one `bullet_id` per second straight up.
    ///
    /// Fails unless `bullet_id` names a free bullet.
    pub fn new(bullet_id: u32) -> Result<Self> {
        if !bullet_info(bullet_id)?.free {
            return Err(SimError::InvalidEntityConfiguration(format!(
                "circle shooting needs a free bullet, {bullet_id} flies along the axes"
            )));
        }
        Ok(Self {
            bullet_id,
            time_between_shots: Duration::from_secs(1),
            consecutive_shots: None,
            bullets_per_shot: 1,
            rotation_per_shot: 0.0,
            shoot_angle: 0.0,
            randomize_shoot_angle: false,
            active: false,
            shots_fired: 0,
            clock: Clock::new(),
        })
    }

    pub fn bullet_id(&self) -> u32 {
        self.bullet_id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Shots since the last activation.
    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    /// Start over: count from zero and shoot on the next update.
    pub fn activate(&mut self, rng: &mut DeterministicRng) {
        self.active = true;
        self.shots_fired = 0;
        self.clock.restart();
        if self.randomize_shoot_angle {
            self.shoot_angle = rng.range_f32(0.0, TAU);
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Flight angles of the next shot's bullets, in the convention of
    /// [`FreeMoving`](crate::components::FreeMoving): 0 right, clockwise.
    pub fn bullet_angles(&self) -> Vec<f32> {
        let n = self.bullets_per_shot;
        (0..n)
            .map(|k| self.shoot_angle + k as f32 * TAU / n as f32 - FRAC_PI_2)
            .collect()
    }

    /// Advance by `dt`. Returns the flight angles of a shot if one is due.
    pub fn update(&mut self, dt: Duration) -> Option<Vec<f32>> {
        if !self.active {
            return None;
        }
        self.clock.tick(dt);
        if self.shots_fired > 0 {
            if self.clock.elapsed() < self.time_between_shots {
                return None;
            }
            let over = self.clock.restart() - self.time_between_shots;
            self.clock.tick(over);
        } else {
            self.clock.restart();
        }

        let angles = self.bullet_angles();
        self.shoot_angle = (self.shoot_angle + self.rotation_per_shot).rem_euclid(TAU);
        self.shots_fired += 1;
        if self.consecutive_shots.is_some_and(|n| self.shots_fired >= n) {
            self.active = false;
        }
        Some(angles)
    }
}

/// Fire every active pattern from its owner's center.
pub fn circle_shooting(world: &mut World) {
    let dt = world.time.delta();
    let mut volleys: Vec<(Entity, Vec2, u32, Vec<f32>)> = Vec::new();
    world.entities.query::<(
        &mut CircleShooting,
        &Position,
        &Collider,
        Option<&Killable>,
    )>(|entity, (pattern, pos, collider, killable)| {
        if killable.is_some_and(Killable::is_killed) {
            pattern.deactivate();
            return;
        }
        if let Some(angles) = pattern.update(dt) {
            volleys.push((entity, collider.rect(pos.0).center(), pattern.bullet_id, angles));
        }
    });

    for (source, center, id, angles) in volleys {
        for angle in angles {
            match free_bullet(id, center, angle, Some(source), &world.ctx.config) {
                Ok(bullet) => world.spawn_deferred(bullet),
                Err(e) => log::warn!("{source} can't shoot bullet {id}: {e}"),
            }
        }
        world.ctx.play_sound("shot");
    }
}
