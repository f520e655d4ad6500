//! Boss behaviour: one small state machine per variant on top of the shared
//! chase-and-fire base.
//!
//! | Boss | Movement | Firing | Extra state |
//! |---|---|---|---|
//! | 1 | chase | homing shot | 36-shot burst on death |
//! | 2 | wall-to-wall ping-pong | spawns Enemy2 | direction |
//! | 3 | chase | starts a 10-shot volley | fade / visibility cycle |
//! | 4 | chase, periodic rush | spinning shard | contact damage, rush counter |
//! | 5 | chase | radial volley or Enemy5, by counter | fire counter |

use glam::Vec2;
use rand::Rng;

use crate::config::CombatConfig;
use crate::enemies::{above_arena, chase, fire_due};
use crate::entities::{
    Boss, BossKind, BossPattern, EnemyKind, Health, Intent, Player, Projectile, ProjectileKind,
    Side, BOSS4_RUSH_SPEED,
};
use crate::projectiles;

pub const BOSS1_BURST_COUNT: u32 = 36;
pub const BOSS5_BURST_COUNT: u32 = 18;
/// Boss3 fade cycle period.
pub const PHANTOM_TOGGLE_MS: u64 = 2500;
const PHANTOM_VOLLEY_TICKS: u32 = 100;
const SPINNER_SPIN: f32 = 6.0;
const SPINNER_CYCLE: u32 = 250;
const SPINNER_RUSH_AFTER: u32 = 150;
const SPINNER_CONTACT_DAMAGE: f32 = 1.0;

/// Instantiate `kind` for an encounter that is at `now_ms`.
pub fn spawn_boss(kind: BossKind, config: &CombatConfig, now_ms: u64, rng: &mut impl Rng) -> Boss {
    let size = kind.size();
    let (pos, pattern) = match kind {
        BossKind::Boss1 => (above_arena(size, config, rng), BossPattern::Homing),
        BossKind::Boss2 => (
            // Top edge two units below the arena top, horizontally centred.
            Vec2::new(config.arena_width / 2.0, 2.0 + size.y / 2.0),
            BossPattern::PingPong { direction: 1.0 },
        ),
        BossKind::Boss3 => (
            above_arena(size, config, rng),
            BossPattern::Phantom {
                fire_counter: 0,
                visible: true,
                faded: false,
                // First toggle lands two periods after arrival.
                last_toggle_ms: now_ms + PHANTOM_TOGGLE_MS,
            },
        ),
        BossKind::Boss4 => (
            above_arena(size, config, rng),
            BossPattern::Spinner { rush_counter: 0 },
        ),
        BossKind::Boss5 => (
            above_arena(size, config, rng),
            BossPattern::Carousel { fire_counter: 0 },
        ),
    };

    let health = Health::full(kind.base_health());
    Boss {
        kind,
        pos,
        speed: kind.base_speed(),
        health,
        health_fraction: health.fraction(),
        last_fire_ms: 0,
        angle_deg: 0.0,
        pattern,
    }
}

/// Whether player projectiles can currently hit the boss.
pub fn is_collidable(boss: &Boss) -> bool {
    match boss.pattern {
        BossPattern::Phantom { visible, .. } => visible,
        _ => true,
    }
}

/// Whether `boss` is cosmetically faded.
pub fn is_faded(boss: &Boss) -> bool {
    matches!(boss.pattern, BossPattern::Phantom { faded: true, .. })
}

/// Override Boss3's collision flag without touching its fade flag.
pub fn set_visible(boss: &mut Boss, value: bool) {
    if let BossPattern::Phantom { visible, .. } = &mut boss.pattern {
        *visible = value;
    }
}

/// One tick of boss behaviour: move, fire if due, then the variant's own
/// per-tick state.
pub fn update_boss(
    boss: &mut Boss,
    player: &Player,
    now_ms: u64,
    config: &CombatConfig,
) -> Vec<Intent> {
    let mut intents = Vec::new();

    move_boss(boss, player.pos, config);

    if fire_due(&mut boss.last_fire_ms, boss.kind.fire_interval_ms(), now_ms) {
        fire(boss, player.pos, &mut intents);
    }

    let pos = boss.pos;
    let base_speed = boss.kind.base_speed();
    let touching = boss.bounds().overlaps(&player.bounds());
    match &mut boss.pattern {
        BossPattern::Phantom {
            fire_counter,
            visible,
            faded,
            last_toggle_ms,
        } => {
            if *fire_counter > 0 {
                if *fire_counter % 10 == 0 {
                    intents.push(Intent::Fire {
                        kind: ProjectileKind::EnemyBullet3,
                        from: pos,
                        to: player.pos,
                        speed_scale: 1.0,
                        faded: *faded,
                    });
                }
                *fire_counter += 1;
                if *fire_counter > PHANTOM_VOLLEY_TICKS {
                    *fire_counter = 0;
                }
            }

            if now_ms.saturating_sub(*last_toggle_ms) >= PHANTOM_TOGGLE_MS {
                *last_toggle_ms = now_ms;
                *visible = !*visible;
                *faded = !*faded;
            }
        }
        BossPattern::Spinner { rush_counter } => {
            boss.angle_deg = (boss.angle_deg + SPINNER_SPIN) % 360.0;

            if touching {
                intents.push(Intent::ContactDamage {
                    amount: SPINNER_CONTACT_DAMAGE,
                });
            }

            // The new speed takes effect on the next tick's move.
            *rush_counter += 1;
            boss.speed = if *rush_counter % SPINNER_CYCLE > SPINNER_RUSH_AFTER {
                BOSS4_RUSH_SPEED
            } else {
                base_speed
            };
        }
        BossPattern::Homing | BossPattern::PingPong { .. } | BossPattern::Carousel { .. } => {}
    }

    intents
}

fn move_boss(boss: &mut Boss, target: Vec2, config: &CombatConfig) {
    let half_width = boss.kind.size().x / 2.0;
    match &mut boss.pattern {
        BossPattern::PingPong { direction } => {
            boss.pos.x += *direction * boss.speed;
            let left = boss.pos.x - half_width;
            let right = boss.pos.x + half_width;
            if right >= config.arena_width || left <= 0.0 {
                *direction = -*direction;
            }
        }
        _ => chase(&mut boss.pos, target, boss.speed),
    }
}

fn fire(boss: &mut Boss, player_pos: Vec2, intents: &mut Vec<Intent>) {
    let pos = boss.pos;
    match &mut boss.pattern {
        BossPattern::Homing => intents.push(Intent::Fire {
            kind: ProjectileKind::BossBullet1,
            from: pos,
            to: player_pos,
            speed_scale: 1.0,
            faded: false,
        }),
        BossPattern::PingPong { .. } => intents.push(Intent::SpawnEnemy {
            kind: EnemyKind::Enemy2,
            at: pos,
        }),
        BossPattern::Phantom { fire_counter, .. } => *fire_counter = 1,
        BossPattern::Spinner { .. } => intents.push(Intent::Fire {
            kind: ProjectileKind::EnemyBullet4,
            from: pos,
            to: player_pos,
            speed_scale: 1.0,
            faded: false,
        }),
        BossPattern::Carousel { fire_counter } => {
            let v = *fire_counter % 100;
            if 40 < v && v < 50 {
                let offset = (*fire_counter as f32 * 7.0) % 360.0;
                for dir in radial(BOSS5_BURST_COUNT, offset) {
                    intents.push(Intent::Fire {
                        kind: ProjectileKind::EnemyBullet5,
                        from: pos,
                        to: pos + dir,
                        speed_scale: 2.0,
                        faded: false,
                    });
                }
            } else if 95 < v && v < 100 {
                intents.push(Intent::SpawnEnemy {
                    kind: EnemyKind::Enemy5,
                    at: pos,
                });
            }
            *fire_counter += 1;
        }
    }
}

/// `count` unit vectors evenly spaced around the circle, rotated by
/// `offset_deg`.
pub fn radial(count: u32, offset_deg: f32) -> impl Iterator<Item = Vec2> {
    let step = 360.0 / count as f32;
    (0..count).map(move |i| {
        let angle = (step * i as f32 + offset_deg).to_radians();
        Vec2::new(angle.cos(), angle.sin())
    })
}

/// Projectiles released when `boss` dies.  Only Boss1 has a burst.
pub fn death_burst(boss: &Boss) -> Vec<Projectile> {
    match boss.kind {
        BossKind::Boss1 => radial(BOSS1_BURST_COUNT, 0.0)
            .map(|dir| {
                projectiles::spawn_scaled(
                    boss.pos,
                    boss.pos + dir,
                    ProjectileKind::EnemyBullet1,
                    Side::Enemy,
                    2.0,
                )
            })
            .collect(),
        _ => Vec::new(),
    }
}
