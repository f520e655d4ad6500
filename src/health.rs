//! Health and damage bookkeeping for the player, common enemies and bosses.
//!
//! Every entity shares one rule (`roll_damage`): non-positive amounts heal up
//! to the maximum, positive amounts are negated outright with probability
//! `defense_rate` and otherwise subtract, clamped at zero. The entity-specific
//! wrappers layer death handling on top.

use rand::Rng;
use tracing::{debug, info};

use crate::boss;
use crate::entities::{BossLifecycle, Encounter, Health, Outcome};
use crate::events::{Notification, SoundCue};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    /// Health rose by the contained amount (after clamping).
    Healed(f32),
    /// The defense roll negated the hit.
    Missed,
    /// Health dropped and the entity survived.
    Wounded(f32),
    Killed,
    /// The target no longer takes damage (dead, or the encounter is over).
    Ignored,
}

impl DamageOutcome {
    pub fn landed(self) -> bool {
        matches!(self, DamageOutcome::Wounded(_) | DamageOutcome::Killed)
    }
}

/// Apply `amount` to `health`.  All-or-nothing: defense never scales damage.
pub fn roll_damage(
    health: &mut Health,
    defense_rate: f64,
    amount: f32,
    rng: &mut impl Rng,
) -> DamageOutcome {
    if amount <= 0.0 {
        let before = health.current;
        health.current = (health.current - amount).min(health.max);
        debug_assert_in_range(health);
        return DamageOutcome::Healed(health.current - before);
    }

    if defense_rate > 0.0 && rng.gen::<f64>() < defense_rate {
        return DamageOutcome::Missed;
    }

    health.current = (health.current - amount).max(0.0);
    debug_assert_in_range(health);
    if health.is_depleted() {
        DamageOutcome::Killed
    } else {
        DamageOutcome::Wounded(amount)
    }
}

fn debug_assert_in_range(health: &Health) {
    debug_assert!(
        (0.0..=health.max).contains(&health.current),
        "health {} outside [0, {}]",
        health.current,
        health.max
    );
}

// ── Player ────────────────────────────────────────────────────────────────────

/// Damage (or heal, for non-positive `amount`) the player.
///
/// Death ends the encounter in defeat exactly once; after the outcome is
/// final every call is a no-op.
pub fn damage_player(enc: &mut Encounter, amount: f32, rng: &mut impl Rng) -> DamageOutcome {
    if enc.state.outcome != Outcome::InProgress {
        return DamageOutcome::Ignored;
    }

    let pos = enc.player.pos;
    let outcome = roll_damage(
        &mut enc.player.health,
        enc.player.defense_rate,
        amount,
        rng,
    );
    match outcome {
        DamageOutcome::Missed => enc.notifications.push(Notification::Miss { pos }),
        DamageOutcome::Wounded(_) => enc.notifications.push(Notification::Sound(SoundCue::Hit)),
        DamageOutcome::Killed => {
            enc.notifications.push(Notification::Sound(SoundCue::Hit));
            enc.notifications.push(Notification::Sound(SoundCue::Lose));
            enc.notifications.push(Notification::Defeat { pos });
            enc.state.outcome = Outcome::Lost;
            info!(level = enc.state.level, frame = enc.frame, "player defeated");
        }
        DamageOutcome::Healed(_) | DamageOutcome::Ignored => {}
    }
    outcome
}

// ── Common enemies ────────────────────────────────────────────────────────────

/// Damage the enemy at `index`.  A kill bumps the death counter and, with
/// vampire active, heals the player by `floor(vampire * max health)`.
pub fn damage_enemy(
    enc: &mut Encounter,
    index: usize,
    amount: f32,
    rng: &mut impl Rng,
) -> DamageOutcome {
    let Some(enemy) = enc.enemies.get_mut(index) else {
        return DamageOutcome::Ignored;
    };
    if !enemy.alive {
        return DamageOutcome::Ignored;
    }

    let outcome = roll_damage(&mut enemy.health, 0.0, amount, rng);
    if outcome != DamageOutcome::Killed {
        return outcome;
    }

    enemy.alive = false;
    enc.state.death += 1;
    enc.notifications.push(Notification::Sound(SoundCue::Death));
    debug!(kind = ?enemy.kind, death = enc.state.death, "enemy killed");

    if enc.player.vampire > 0.0 {
        let heal = (enc.player.health.max * enc.player.vampire).floor();
        if damage_player(enc, -heal, rng) != DamageOutcome::Ignored {
            enc.notifications.push(Notification::Heal {
                amount: heal,
                pos: enc.player.pos,
            });
        }
    }
    outcome
}

// ── Bosses ────────────────────────────────────────────────────────────────────

/// Damage the active boss.  Bosses have no miss chance.
pub fn damage_boss(enc: &mut Encounter, amount: f32, rng: &mut impl Rng) -> DamageOutcome {
    let Some(boss) = enc.boss.as_mut() else {
        return DamageOutcome::Ignored;
    };

    let outcome = roll_damage(&mut boss.health, 0.0, amount, rng);
    boss.health_fraction = boss.health.fraction();
    if outcome == DamageOutcome::Killed {
        defeat_boss(enc);
    }
    outcome
}

/// Boss death: burst, wipe the remaining common enemies, win the encounter.
///
/// Force-killed enemies do not count toward `death` and do not trigger
/// vampire healing.
pub fn defeat_boss(enc: &mut Encounter) {
    let Some(boss) = enc.boss.take() else {
        return;
    };

    let burst = boss::death_burst(&boss);
    enc.pending_projectiles.extend(burst);

    for enemy in enc.enemies.iter_mut().filter(|e| e.alive) {
        enemy.health.current = 0.0;
        enemy.alive = false;
    }

    enc.state.boss = BossLifecycle::Defeated;
    if enc.state.outcome == Outcome::InProgress {
        enc.state.outcome = Outcome::Won;
    }
    enc.notifications.push(Notification::Sound(SoundCue::Death));
    enc.notifications.push(Notification::VictoryBanner {
        text: "Victory!".to_string(),
        pos: enc.config.center(),
    });
    info!(kind = ?boss.kind, level = enc.state.level, frame = enc.frame, "boss defeated");
}
