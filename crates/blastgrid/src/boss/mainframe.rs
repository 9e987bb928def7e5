//! # Mainframe — The Stationary Boss
//!
//! A 5×5-tile machine that never moves. It idles for `idle_ms`, then picks
//! one of four attacks at random and runs it on a [`TimedPhase`]:
//!
//! ```text
//!            idle_ms
//!   Idle ─────────────▶ Attacking(surge | lightning | stars | spirits)
//!    ▲                     Entering → Windup → Damage → Recover → Exiting
//!    └─────────────────────────────────────────────────────────────┘
//!
//!   any state ── life reaches 0 ──▶ Dying
//! ```
//!
//! - **Surge**: a beam `surge_spanned_deg` wide leaves the center at an
//!   angle chosen when the windup starts, and sweeps clockwise at
//!   `surge_deg_per_sec` for the whole `Damage` phase. Every player it
//!   crosses is hurt once.
//! - **Lightning**: `lightning_shots` bolts (bullet `lightning_bullet`) in
//!   random directions, one every `lightning_shot_ms` of `Damage`.
//! - **Stars**: rings of eight star bullets, turning a little between rings.
//! - **Spirits**: a fast two-armed spiral of spirit bullets starting at a
//!   random angle.
//!
//! Stars and spirits are [`CircleShooting`] patterns switched on when
//! `Damage` starts; their `Damage` lasts exactly as long as their shots.

use std::collections::HashSet;
use std::f32::consts::{PI, TAU};
use std::time::Duration;

use crate::ai::circle::CircleShooting;
use crate::collision::{Collider, Layer};
use crate::combat::deal_damage;
use crate::components::{Fixed, Killable, Lifed, Lifetime, Position, Scored, Temporary};
use crate::config::{MainframeConfig, SimConfig};
use crate::ecs::{Components, Entity};
use crate::entities::bullet::free_bullet;
use crate::entities::player::Player;
use crate::error::Result;
use crate::math::{IVec2, TILE_SIZE, Vec2, tile_origin};
use crate::phase::{Phase, PhaseDurations, TimedPhase};
use crate::time::Timer;
use crate::world::World;

use super::Boss;

/// Side of the Mainframe's body, in tiles.
pub const MAINFRAME_TILES: i32 = 5;

/// Distance from the center at which lightning bolts appear, in pixels.
const BOLT_OFFSET: f32 = 40.0;

const STAR_BULLETS: u32 = 8;
const STAR_SHOTS: u32 = 3;
const STAR_INTERVAL: Duration = Duration::from_millis(500);

const SPIRIT_BULLETS: u32 = 2;
const SPIRIT_SHOTS: u32 = 16;
const SPIRIT_INTERVAL: Duration = Duration::from_millis(125);
const SPIRIT_TURN_DEG: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MainframeAttack {
    Surge,
    Lightning,
    Stars,
    Spirits,
}

impl MainframeAttack {
    pub const ALL: [MainframeAttack; 4] = [
        MainframeAttack::Surge,
        MainframeAttack::Lightning,
        MainframeAttack::Stars,
        MainframeAttack::Spirits,
    ];

    fn durations(self, cfg: &MainframeConfig) -> PhaseDurations {
        let ms = Duration::from_millis;
        let (windup, damage, recover) = match self {
            MainframeAttack::Surge => (
                ms(cfg.surge_windup_ms),
                ms(cfg.surge_damage_ms),
                ms(cfg.surge_recover_ms),
            ),
            MainframeAttack::Lightning => (
                ms(cfg.lightning_windup_ms),
                ms(cfg.lightning_shot_ms) * cfg.lightning_shots,
                ms(cfg.lightning_recover_ms),
            ),
            MainframeAttack::Stars => (
                ms(cfg.ring_windup_ms),
                STAR_INTERVAL * STAR_SHOTS,
                ms(cfg.ring_recover_ms),
            ),
            MainframeAttack::Spirits => (
                ms(cfg.ring_windup_ms),
                SPIRIT_INTERVAL * SPIRIT_SHOTS,
                ms(cfg.ring_recover_ms),
            ),
        };
        PhaseDurations {
            windup,
            damage,
            recover,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainframeState {
    Idle,
    Attacking(MainframeAttack),
    Dying,
}

#[derive(Debug, Clone)]
pub struct Mainframe {
    state: MainframeState,
    idle: Timer,
    phase: TimedPhase,
    /// Where the next surge starts, radians (0 right, clockwise).
    surge_angle: f32,
    bolts_shot: u32,
}

impl Mainframe {
    pub fn new(cfg: &MainframeConfig) -> Self {
        Self {
            state: MainframeState::Idle,
            idle: Timer::new(Duration::from_millis(cfg.idle_ms)),
            phase: TimedPhase::default(),
            surge_angle: 0.0,
            bolts_shot: 0,
        }
    }

    pub fn state(&self) -> MainframeState {
        self.state
    }

    /// The running attack's phase. Meaningless outside `Attacking`.
    pub fn phase(&self) -> Phase {
        self.phase.phase()
    }

    pub fn surge_angle(&self) -> f32 {
        self.surge_angle
    }

    /// Switch to `attack` from its first phase.
    pub fn start_attack(&mut self, attack: MainframeAttack, cfg: &MainframeConfig) {
        self.state = MainframeState::Attacking(attack);
        self.phase.restart_with(attack.durations(cfg));
        self.bolts_shot = 0;
    }
}

/// The Mainframe with its top-left tile on `tile`.
pub fn mainframe(tile: IVec2, config: &SimConfig) -> Result<Components> {
    let cfg = &config.mainframe;
    Ok(Components::new()
        .with(Position(tile_origin(tile)))
        .with(Collider::new(
            Layer::Bosses,
            Vec2::splat(MAINFRAME_TILES as f32 * TILE_SIZE),
        ))
        .with(Fixed)
        .with(Lifed::new(cfg.life)?)
        .with(Killable::new(config.death_time()))
        .with(Scored::new(cfg.value))
        .with(Boss)
        .with(Mainframe::new(cfg)))
}

/// Spawn the Mainframe. Not from inside a system.
pub fn spawn_mainframe(world: &mut World, tile: IVec2) -> Result<Entity> {
    let body = mainframe(tile, &world.ctx.config)?;
    let e = world.spawn(body);
    log::info!("mainframe boots at {tile}");
    Ok(e)
}

// ── Surge ────────────────────────────────────────────────────────────

/// A sweeping beam centered on its boss.
#[derive(Debug, Clone)]
pub struct Surge {
    center: Vec2,
    /// Leading edge is `angle + spanned`, radians.
    angle: f32,
    spanned: f32,
    /// Radians per second, clockwise.
    speed: f32,
    damage: i32,
    source: Entity,
    damaged: HashSet<Entity>,
    orphaned: bool,
}

impl Surge {
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Is `point` inside the beam's sector?
    pub fn covers(&self, point: Vec2) -> bool {
        let d = point - self.center;
        if d.length_squared() == 0.0 {
            return true;
        }
        let rel = (d.y.atan2(d.x) - self.angle).rem_euclid(TAU);
        rel <= self.spanned
    }
}

fn surge(
    source: Entity,
    center: Vec2,
    angle: f32,
    cfg: &MainframeConfig,
    lasts: Duration,
) -> Components {
    Components::new()
        .with(Position(center))
        .with(Surge {
            center,
            angle,
            spanned: cfg.surge_spanned_deg.to_radians(),
            speed: cfg.surge_deg_per_sec.to_radians(),
            damage: cfg.surge_damage,
            source,
            damaged: HashSet::new(),
            orphaned: false,
        })
        .with(Lifetime::new(lasts))
        .with(Temporary::new(|c| {
            c.get::<Surge>().is_none_or(|s| s.orphaned)
                || c.get::<Lifetime>().is_none_or(Lifetime::is_over)
        }))
}

/// Hurt the players under each surge, then sweep it on.
pub fn surges(world: &mut World) {
    let dt = world.time.delta().as_secs_f32();
    let mut players = Vec::new();
    world.entities.query::<(&Player, &Position, &Collider, Option<&Killable>)>(
        |e, (_, pos, collider, killable)| {
            if !killable.is_some_and(Killable::is_killed) {
                players.push((e, collider.rect(pos.0).center()));
            }
        },
    );

    let dead: HashSet<Entity> = world
        .entities
        .iter::<Surge>()
        .map(|(_, s)| s.source)
        .filter(|&b| {
            world
                .entities
                .get::<Killable>(b)
                .is_none_or(Killable::is_killed)
        })
        .collect();

    let mut hits = Vec::new();
    world.entities.query::<&mut Surge>(|_, s| {
        if dead.contains(&s.source) {
            s.orphaned = true;
            return;
        }
        for &(p, center) in &players {
            if s.covers(center) && s.damaged.insert(p) {
                hits.push((p, s.damage, s.source));
            }
        }
        s.angle = (s.angle + s.speed * dt).rem_euclid(TAU);
    });

    let shield = world.ctx.config.damage_shield_time();
    for (target, damage, source) in hits {
        let outcome =
            deal_damage(&mut world.entities, target, damage, Some(source), shield);
        log::trace!("surge hits {target}: {outcome:?}");
    }
}

// ── Frame ────────────────────────────────────────────────────────────

fn ring(attack: MainframeAttack, cfg: &MainframeConfig) -> Result<Option<CircleShooting>> {
    let pattern = match attack {
        MainframeAttack::Stars => {
            let mut p = CircleShooting::new(cfg.star_bullet)?;
            p.bullets_per_shot = STAR_BULLETS;
            p.consecutive_shots = Some(STAR_SHOTS);
            p.time_between_shots = STAR_INTERVAL;
            p.rotation_per_shot = PI / STAR_BULLETS as f32;
            p
        }
        MainframeAttack::Spirits => {
            let mut p = CircleShooting::new(cfg.spirit_bullet)?;
            p.bullets_per_shot = SPIRIT_BULLETS;
            p.consecutive_shots = Some(SPIRIT_SHOTS);
            p.time_between_shots = SPIRIT_INTERVAL;
            p.rotation_per_shot = SPIRIT_TURN_DEG.to_radians();
            p.randomize_shoot_angle = true;
            p
        }
        MainframeAttack::Surge | MainframeAttack::Lightning => return Ok(None),
    };
    Ok(Some(pattern))
}

fn center_of(world: &World, e: Entity) -> Option<Vec2> {
    let pos = world.entities.get::<Position>(e)?;
    let collider = world.entities.get::<Collider>(e)?;
    Some(collider.rect(pos.0).center())
}

fn shoot_bolts(
    m: &mut Mainframe,
    world: &mut World,
    e: Entity,
    center: Vec2,
    since_damage: Duration,
) {
    let cfg = &world.ctx.config.mainframe;
    let every = Duration::from_millis(cfg.lightning_shot_ms);
    let due = if every.is_zero() {
        cfg.lightning_shots
    } else {
        ((since_damage.as_nanos() / every.as_nanos()) as u32).min(cfg.lightning_shots)
    };
    let id = cfg.lightning_bullet;
    while m.bolts_shot < due {
        m.bolts_shot += 1;
        let angle = world.ctx.rng.range_f32(0.0, TAU);
        let from = center + Vec2::from_angle(angle) * BOLT_OFFSET;
        match free_bullet(id, from, angle, Some(e), &world.ctx.config) {
            Ok(bolt) => {
                world.spawn_deferred(bolt);
                world.ctx.play_sound("lightning");
            }
            Err(err) => log::warn!("mainframe {e} can't fire lightning: {err}"),
        }
    }
}

fn attacking(
    m: &mut Mainframe,
    world: &mut World,
    e: Entity,
    attack: MainframeAttack,
    dt: Duration,
) {
    let Some(center) = center_of(world, e) else {
        return;
    };
    let before = m.phase.phase();
    if let Some(p) = m.phase.update(dt) {
        log::trace!("mainframe {e}: {attack:?} {p:?}");
    }
    let after = m.phase.phase();
    let entered_damage = before < Phase::Damage && after >= Phase::Damage;
    let left_damage = before <= Phase::Damage && after > Phase::Damage;

    match attack {
        MainframeAttack::Surge => {
            if before == Phase::Entering {
                m.surge_angle = world.ctx.rng.range_f32(0.0, TAU);
                let degrees = m.surge_angle.to_degrees();
                log::debug!("mainframe {e}: surge winding up at {degrees:.0}°");
            }
            if entered_damage && after == Phase::Damage {
                let lasts = m.phase.durations().damage.saturating_sub(m.phase.elapsed());
                let beam = surge(e, center, m.surge_angle, &world.ctx.config.mainframe, lasts);
                world.spawn_deferred(beam);
                world.ctx.play_sound("surge");
            }
        }
        MainframeAttack::Lightning => {
            let since_damage = match after {
                Phase::Damage => m.phase.elapsed(),
                Phase::Recover | Phase::Exiting => m.phase.durations().damage,
                Phase::Entering | Phase::Windup => Duration::ZERO,
            };
            shoot_bolts(m, world, e, center, since_damage);
        }
        MainframeAttack::Stars | MainframeAttack::Spirits => {
            if entered_damage && after == Phase::Damage {
                match ring(attack, &world.ctx.config.mainframe) {
                    Ok(Some(mut pattern)) => {
                        pattern.activate(&mut world.ctx.rng);
                        world.entities.insert(e, pattern);
                    }
                    Ok(None) => {}
                    Err(err) => log::warn!("mainframe {e} can't shoot {attack:?}: {err}"),
                }
            }
            if left_damage {
                if let Some(p) = world.entities.get_mut::<CircleShooting>(e) {
                    p.deactivate();
                }
            }
        }
    }

    if m.phase.is_over() {
        m.state = MainframeState::Idle;
        m.idle.reset(Duration::from_millis(world.ctx.config.mainframe.idle_ms));
    }
}

fn step(m: &mut Mainframe, world: &mut World, e: Entity, dt: Duration) {
    let killed = world
        .entities
        .get::<Killable>(e)
        .is_some_and(Killable::is_killed);
    if killed {
        if m.state != MainframeState::Dying {
            m.state = MainframeState::Dying;
            if let Some(p) = world.entities.get_mut::<CircleShooting>(e) {
                p.deactivate();
            }
            world.ctx.play_sound("mainframe_death");
            log::info!("mainframe {e} is shutting down");
        }
        return;
    }
    match m.state {
        MainframeState::Idle => {
            m.idle.tick(dt);
            if m.idle.finished() {
                let attack = *world
                    .ctx
                    .rng
                    .pick(&MainframeAttack::ALL)
                    .unwrap_or(&MainframeAttack::Lightning);
                log::debug!("mainframe {e} attacks: {attack:?}");
                m.start_attack(attack, &world.ctx.config.mainframe);
            }
        }
        MainframeState::Attacking(attack) => attacking(m, world, e, attack, dt),
        MainframeState::Dying => {}
    }
}

/// Run every Mainframe.
pub fn update_mainframe(world: &mut World) {
    let dt = world.time.delta();
    for e in world.entities.entities_with::<Mainframe>() {
        let Some(mut m) = world.entities.remove::<Mainframe>(e) else {
            continue;
        };
        step(&mut m, world, e, dt);
        world.entities.insert(e, m);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::circle::circle_shooting;
    use crate::context::GameContext;
    use crate::ecs::Schedule;
    use crate::entities::bullet::Bullet;
    use crate::entities::player::player;
    use crate::systems::tick_clocks;

    const FRAME: Duration = Duration::from_millis(100);

    fn world() -> World {
        let mut schedule = Schedule::new();
        schedule
            .add_system(tick_clocks)
            .add_system(update_mainframe)
            .add_system(surges)
            .add_system(circle_shooting);
        World::with_schedule(GameContext::default(), schedule)
    }

    fn run(w: &mut World, frames: usize) {
        for _ in 0..frames {
            w.update(FRAME);
        }
    }

    fn mf(w: &World, e: Entity) -> &Mainframe {
        w.entities.get::<Mainframe>(e).unwrap()
    }

    fn attack(w: &mut World, e: Entity, a: MainframeAttack) {
        let cfg = w.ctx.config.mainframe.clone();
        w.entities.get_mut::<Mainframe>(e).unwrap().start_attack(a, &cfg);
    }

    fn fired(w: &World, e: Entity, id: u32) -> usize {
        w.entities
            .iter::<Bullet>()
            .filter(|(_, b)| b.source() == Some(e) && b.info().id == id)
            .count()
    }

    #[test]
    fn idles_then_attacks() {
        let mut w = world();
        let e = spawn_mainframe(&mut w, IVec2::new(5, 4)).unwrap();
        assert_eq!(super::super::bosses_left(&w), 1);
        run(&mut w, 19);
        assert_eq!(mf(&w, e).state(), MainframeState::Idle);
        run(&mut w, 1);
        assert!(matches!(mf(&w, e).state(), MainframeState::Attacking(_)));
    }

    #[test]
    fn surge_sweeps_and_hurts_once() {
        let mut w = world();
        let cfg = w.ctx.config.clone();
        let e = spawn_mainframe(&mut w, IVec2::new(5, 4)).unwrap();
        // Straight right of the body.
        let hit = w.entities.spawn_unowned(player(1, IVec2::new(12, 6), &cfg).unwrap());
        // Straight up: the beam never gets there.
        let safe = w.entities.spawn_unowned(player(2, IVec2::new(7, 0), &cfg).unwrap());
        attack(&mut w, e, MainframeAttack::Surge);

        run(&mut w, 1);
        assert_eq!(mf(&w, e).phase(), Phase::Windup);
        // Aim the beam so its leading edge is just short of the right side.
        let spanned = cfg.mainframe.surge_spanned_deg.to_radians();
        w.entities.get_mut::<Mainframe>(e).unwrap().surge_angle = -spanned - 0.05;

        run(&mut w, 15);
        assert_eq!(mf(&w, e).phase(), Phase::Damage);
        let beam = w.entities.entities_with::<Surge>();
        assert_eq!(beam.len(), 1);

        run(&mut w, 30);
        assert_eq!(mf(&w, e).phase(), Phase::Recover);
        let life = |p| w.entities.get::<Lifed>(p).unwrap().life();
        assert_eq!(life(hit), cfg.player_max_life - cfg.mainframe.surge_damage);
        assert_eq!(life(safe), cfg.player_max_life);
        assert!(!w.entities.is_alive(beam[0]));

        run(&mut w, 10);
        assert_eq!(mf(&w, e).state(), MainframeState::Idle);
    }

    #[test]
    fn surge_sector_wraps_around() {
        let s = Surge {
            center: Vec2::ZERO,
            angle: 350f32.to_radians(),
            spanned: 30f32.to_radians(),
            speed: 0.0,
            damage: 1,
            source: crate::ecs::EntityGroup::new().spawn((0u8,)),
            damaged: HashSet::new(),
            orphaned: false,
        };
        assert!(s.covers(Vec2::new(10.0, 0.0)));
        assert!(s.covers(Vec2::new(10.0, 2.0)));
        assert!(!s.covers(Vec2::new(0.0, 10.0)));
        assert!(!s.covers(Vec2::new(-10.0, 0.0)));
    }

    #[test]
    fn lightning_bolts_are_spread_over_the_damage_phase() {
        let mut w = world();
        let cfg = w.ctx.config.mainframe.clone();
        let e = spawn_mainframe(&mut w, IVec2::new(5, 4)).unwrap();
        attack(&mut w, e, MainframeAttack::Lightning);

        // Entering, then 1000 ms of windup.
        run(&mut w, 1 + 10);
        assert_eq!(mf(&w, e).phase(), Phase::Damage);
        assert_eq!(fired(&w, e, 104), 0);
        run(&mut w, 10);
        assert_eq!(fired(&w, e, 104), cfg.lightning_shots as usize / 2);
        run(&mut w, 10);
        assert_eq!(mf(&w, e).phase(), Phase::Recover);
        assert_eq!(fired(&w, e, 104), cfg.lightning_shots as usize);
    }

    #[test]
    fn stars_fire_rings_of_star_bullets() {
        let mut w = world();
        let e = spawn_mainframe(&mut w, IVec2::new(5, 4)).unwrap();
        attack(&mut w, e, MainframeAttack::Stars);

        // Entering, then 600 ms of windup: the first ring leaves at once.
        run(&mut w, 1 + 6);
        assert_eq!(mf(&w, e).phase(), Phase::Damage);
        assert_eq!(fired(&w, e, 101), STAR_BULLETS as usize);
        run(&mut w, 15);
        assert_eq!(fired(&w, e, 101), (STAR_BULLETS * STAR_SHOTS) as usize);
        assert!(!w.entities.get::<CircleShooting>(e).unwrap().is_active());
    }

    #[test]
    fn spirits_spiral_out_of_spirit_bullets() {
        let mut w = world();
        let e = spawn_mainframe(&mut w, IVec2::new(5, 4)).unwrap();
        attack(&mut w, e, MainframeAttack::Spirits);
        run(&mut w, 1 + 6 + 20);
        assert_eq!(mf(&w, e).phase(), Phase::Recover);
        assert_eq!(fired(&w, e, 102), (SPIRIT_BULLETS * SPIRIT_SHOTS) as usize);
        assert_eq!(fired(&w, e, 101), 0);
    }

    #[test]
    fn shutdown_stops_the_attack() {
        let mut w = world();
        let e = spawn_mainframe(&mut w, IVec2::new(5, 4)).unwrap();
        attack(&mut w, e, MainframeAttack::Spirits);
        run(&mut w, 1 + 6);
        w.entities.get_mut::<Killable>(e).unwrap().kill();
        run(&mut w, 1);
        assert_eq!(mf(&w, e).state(), MainframeState::Dying);
        assert!(!w.entities.get::<CircleShooting>(e).unwrap().is_active());
        assert_eq!(super::super::bosses_left(&w), 0);
    }
}
