//! Time-driven enemy waves and the kill threshold that summons the boss.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::boss;
use crate::enemies;
use crate::entities::{BossKind, BossLifecycle, Encounter, EnemyKind, Outcome, SpawnTimer};
use crate::events::{Notification, SoundCue};

pub const BOSS_WARNING_TEXT: &str = "The Boss is coming!";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("boss already scheduled ({0:?})")]
    BossAlreadyScheduled(BossLifecycle),

    #[error("boss activation requested without a pending warning")]
    BossNotPending,

    #[error("level {0} has no boss")]
    NoBossForLevel(u32),
}

/// `base * 0.8^level`.
pub fn spawn_interval_ms(base_ms: f64, level: u32) -> f64 {
    base_ms * 0.8f64.powi(level as i32)
}

/// Chance of a second enemy in the same spawn event, capped at certainty.
pub fn bonus_spawn_chance(level: u32) -> f64 {
    (level as f64 / 10.0 + 0.1).min(1.0)
}

/// Kills needed before the boss can be summoned (the count must exceed it).
pub fn max_death(level: u32) -> u32 {
    10 + 5 * level
}

impl SpawnTimer {
    pub fn new(base_ms: f64, level: u32, now_ms: u64) -> Self {
        Self {
            interval_ms: spawn_interval_ms(base_ms, level),
            last_spawn_ms: now_ms,
        }
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_spawn_ms) as f64 >= self.interval_ms
    }
}

/// Whether ordinary waves may spawn right now.
pub fn spawning_allowed(enc: &Encounter) -> bool {
    enc.state.boss == BossLifecycle::None && enc.state.outcome != Outcome::Won
}

/// Once per tick: boss activation check, pending boss arrival, then ordinary
/// spawning.
pub fn update(enc: &mut Encounter, now_ms: u64, rng: &mut impl Rng) {
    if enc.state.death > enc.state.max_death
        && enc.state.boss == BossLifecycle::None
        && enc.state.outcome == Outcome::InProgress
    {
        // Guarded above, so this cannot be rejected.
        let _ = begin_boss_warning(enc, now_ms);
    }

    if let BossLifecycle::Pending { since_ms } = enc.state.boss {
        if now_ms.saturating_sub(since_ms) >= enc.config.boss_warning_delay_ms {
            if let Err(e) = activate_boss(enc, now_ms, rng) {
                error!(error = %e, "boss activation failed");
            }
        }
    }

    if spawning_allowed(enc) && enc.spawner.is_due(now_ms) {
        spawn_wave(enc, now_ms, rng);
    }
}

/// Spawn one enemy of the level's type, maybe a second, and reset the timer.
pub fn spawn_wave(enc: &mut Encounter, now_ms: u64, rng: &mut impl Rng) {
    let Some(kind) = EnemyKind::for_level(enc.state.level) else {
        return;
    };
    enc.spawner.last_spawn_ms = now_ms;

    let first = enemies::spawn_enemy(kind, None, &enc.config, rng);
    enc.enemies.push(first);
    if rng.gen::<f64>() < bonus_spawn_chance(enc.state.level) {
        let second = enemies::spawn_enemy(kind, None, &enc.config, rng);
        enc.enemies.push(second);
    }
    debug!(?kind, enemies = enc.enemies.len(), "wave spawned");
}

/// None → Pending: show the warning and start the arrival delay.
pub fn begin_boss_warning(enc: &mut Encounter, now_ms: u64) -> Result<(), SpawnError> {
    if enc.state.boss != BossLifecycle::None {
        return Err(SpawnError::BossAlreadyScheduled(enc.state.boss));
    }
    enc.state.boss = BossLifecycle::Pending { since_ms: now_ms };
    enc.notifications.push(Notification::WarningBanner {
        text: BOSS_WARNING_TEXT.to_string(),
        pos: enc.config.center(),
    });
    enc.notifications.push(Notification::Sound(SoundCue::Warning));
    info!(level = enc.state.level, death = enc.state.death, "boss warning");
    Ok(())
}

/// Pending → Active: instantiate the level's boss.
pub fn activate_boss(enc: &mut Encounter, now_ms: u64, rng: &mut impl Rng) -> Result<(), SpawnError> {
    if !matches!(enc.state.boss, BossLifecycle::Pending { .. }) {
        return Err(SpawnError::BossNotPending);
    }
    let kind = BossKind::for_level(enc.state.level)
        .ok_or(SpawnError::NoBossForLevel(enc.state.level))?;
    enc.boss = Some(boss::spawn_boss(kind, &enc.config, now_ms, rng));
    enc.state.boss = BossLifecycle::Active;
    info!(?kind, level = enc.state.level, "boss arrived");
    Ok(())
}
