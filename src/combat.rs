//! Collision resolution: turns projectile overlaps into damage.
//!
//! Player projectiles check the active boss first, then common enemies in
//! tracked order, and stop at the first hit. Enemy projectiles only check the
//! player. A projectile resolves at most once.

use rand::Rng;
use tracing::debug;

use crate::boss;
use crate::entities::{Encounter, HitEffect, Side};
use crate::events::{Notification, SoundCue};
use crate::health::{self, DamageOutcome};
use crate::projectiles;

/// What a player projectile struck.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Boss,
    Enemy(usize),
}

/// First thing projectile `index` overlaps, in resolution order.
pub fn find_target(enc: &Encounter, index: usize) -> Option<Target> {
    let p = &enc.projectiles[index];
    if let Some(b) = &enc.boss {
        if boss::is_collidable(b) && projectiles::test_collision(p, &b.bounds()) {
            return Some(Target::Boss);
        }
    }
    enc.enemies
        .iter()
        .position(|e| e.alive && projectiles::test_collision(p, &e.bounds()))
        .map(Target::Enemy)
}

/// Resolve every live projectile against its candidate targets.
pub fn resolve_collisions(enc: &mut Encounter, rng: &mut impl Rng) {
    for index in 0..enc.projectiles.len() {
        if !enc.projectiles[index].alive {
            continue;
        }
        match enc.projectiles[index].side {
            Side::Player => {
                if let Some(target) = find_target(enc, index) {
                    resolve_player_hit(enc, index, target, rng);
                }
            }
            Side::Enemy => {
                let hit = projectiles::test_collision(&enc.projectiles[index], &enc.player.bounds());
                if hit {
                    resolve_enemy_hit(enc, index, rng);
                }
            }
        }
    }
}

/// Player projectile `index` hits `target`: roll the critical, report the
/// number, consume the projectile, apply the damage.
pub fn resolve_player_hit(
    enc: &mut Encounter,
    index: usize,
    target: Target,
    rng: &mut impl Rng,
) -> DamageOutcome {
    let p = &mut enc.projectiles[index];
    let critical = enc.player.critical_hit > 0.0 && rng.gen::<f64>() < enc.player.critical_hit;
    let amount = if critical { p.damage * 2.0 } else { p.damage };
    let pos = p.pos;
    projectiles::destroy(p);

    enc.notifications.push(Notification::DamageNumber {
        amount,
        pos,
        critical,
    });
    enc.notifications.push(Notification::Sound(SoundCue::Hit));
    debug!(?target, amount, critical, "player hit");

    match target {
        Target::Boss => health::damage_boss(enc, amount, rng),
        Target::Enemy(i) => health::damage_enemy(enc, i, amount, rng),
    }
}

/// Enemy projectile `index` hits the player.
pub fn resolve_enemy_hit(enc: &mut Encounter, index: usize, rng: &mut impl Rng) -> DamageOutcome {
    let p = &mut enc.projectiles[index];
    let effect = p.kind.hit_effect();
    let damage = p.damage;
    let pos = p.pos;
    projectiles::destroy(p);

    match effect {
        HitEffect::FixedPenalty(amount) => health::damage_player(enc, amount, rng),
        HitEffect::Damage => {
            let outcome = health::damage_player(enc, damage, rng);
            if outcome.landed() {
                enc.notifications.push(Notification::DamageNumber {
                    amount: damage,
                    pos,
                    critical: false,
                });
            }
            outcome
        }
    }
}

/// Damage from touching an enemy body directly, bypassing projectiles.
pub fn contact_damage(enc: &mut Encounter, amount: f32, rng: &mut impl Rng) -> DamageOutcome {
    health::damage_player(enc, amount, rng)
}
