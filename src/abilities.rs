//! Stacking upgrades that permanently alter player combat stats.
//!
//! The ledger records how many times each ability was picked. At encounter
//! start every ability's effect runs once per stack against a fresh player.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::entities::Player;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbilityError {
    #[error("requested {requested} upgrades but only {available} are eligible")]
    Exhausted { requested: usize, available: usize },

    #[error("{0:?} is already at its stack cap")]
    AtCap(Ability),

    #[error("{ability:?} has {count} stacks, above its cap")]
    OverCap { ability: Ability, count: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "speed up")]
    SpeedUp,
    #[serde(rename = "get stronger")]
    GetStronger,
    #[serde(rename = "strong defense")]
    StrongDefense,
    #[serde(rename = "energy boost")]
    EnergyBoost,
    #[serde(rename = "rush attack")]
    RushAttack,
    #[serde(rename = "vampire")]
    Vampire,
    #[serde(rename = "critical hit")]
    CriticalHit,
}

impl Ability {
    pub const ALL: [Ability; 7] = [
        Ability::SpeedUp,
        Ability::GetStronger,
        Ability::StrongDefense,
        Ability::EnergyBoost,
        Ability::RushAttack,
        Ability::Vampire,
        Ability::CriticalHit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Ability::SpeedUp => "speed up",
            Ability::GetStronger => "get stronger",
            Ability::StrongDefense => "strong defense",
            Ability::EnergyBoost => "energy boost",
            Ability::RushAttack => "rush attack",
            Ability::Vampire => "vampire",
            Ability::CriticalHit => "critical hit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Ability::SpeedUp => "Speed + 30%",
            Ability::GetStronger => "Attack + 40%",
            Ability::StrongDefense => "15% chance of immune damage",
            Ability::EnergyBoost => "Health Upper Limit + 25%",
            Ability::RushAttack => "Attack Cooldown - 30%",
            Ability::Vampire => "Restore 2% health after killing a common alien",
            Ability::CriticalHit => "20% chance of doubling damage",
        }
    }

    /// Stack cap; `None` means unlimited.
    pub fn max_stacks(self) -> Option<u32> {
        match self {
            Ability::SpeedUp => Some(2),
            Ability::GetStronger => None,
            Ability::StrongDefense => Some(1),
            Ability::EnergyBoost => Some(4),
            Ability::RushAttack => Some(3),
            Ability::Vampire | Ability::CriticalHit => Some(1),
        }
    }

    fn allows(self, count: u32) -> bool {
        self.max_stacks().map_or(true, |cap| count <= cap)
    }
}

// ── Effects ───────────────────────────────────────────────────────────────────

type Effect = fn(&mut Player);

const EFFECTS: [(Ability, Effect); 7] = [
    (Ability::SpeedUp, speed_up),
    (Ability::GetStronger, get_stronger),
    (Ability::StrongDefense, strong_defense),
    (Ability::EnergyBoost, energy_boost),
    (Ability::RushAttack, rush_attack),
    (Ability::Vampire, vampire),
    (Ability::CriticalHit, critical_hit),
];

fn speed_up(player: &mut Player) {
    player.speed = (player.speed * 1.3 * 10.0).round() / 10.0;
}

fn get_stronger(player: &mut Player) {
    player.gun.damage *= 1.4;
}

fn strong_defense(player: &mut Player) {
    player.defense_rate = 0.15;
}

fn energy_boost(player: &mut Player) {
    let bonus = (player.health.max * 0.25).floor();
    player.health.max += bonus;
    player.health.current += bonus;
}

fn rush_attack(player: &mut Player) {
    player.gun.cooldown_ms = (player.gun.cooldown_ms as f64 * 0.7).floor() as u64;
}

fn vampire(player: &mut Player) {
    player.vampire = 0.02;
}

fn critical_hit(player: &mut Player) {
    player.critical_hit = 0.2;
}

/// Run one stack of `ability` against `player`.
pub fn apply(player: &mut Player, ability: Ability) {
    if let Some((_, effect)) = EFFECTS.iter().find(|(a, _)| *a == ability) {
        effect(player);
    }
}

/// Run every ledger entry `count` times.
pub fn apply_all(player: &mut Player, ledger: &AbilityLedger) {
    for (ability, count) in ledger.iter() {
        for _ in 0..count {
            apply(player, ability);
        }
        debug!(ability = ability.name(), count, "applied ability");
    }
}

// ── Ledger ────────────────────────────────────────────────────────────────────

/// Ability → stack count.  Serialised as a plain name-keyed map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityLedger(BTreeMap<Ability, u32>);

impl AbilityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, ability: Ability) -> u32 {
        self.0.get(&ability).copied().unwrap_or(0)
    }

    /// Add one stack.  Returns the new count, or `AtCap` without changing the
    /// ledger.
    pub fn add(&mut self, ability: Ability) -> Result<u32, AbilityError> {
        let next = self.count(ability) + 1;
        if !ability.allows(next) {
            return Err(AbilityError::AtCap(ability));
        }
        self.0.insert(ability, next);
        Ok(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ability, u32)> + '_ {
        self.0.iter().map(|(a, c)| (*a, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|c| *c == 0)
    }

    /// Reject ledgers (typically loaded from disk) that exceed a cap.
    pub fn validate(&self) -> Result<(), AbilityError> {
        match self.iter().find(|(a, c)| !a.allows(*c)) {
            Some((ability, count)) => Err(AbilityError::OverCap { ability, count }),
            None => Ok(()),
        }
    }
}

impl FromIterator<(Ability, u32)> for AbilityLedger {
    fn from_iter<I: IntoIterator<Item = (Ability, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Abilities that can still take another stack, in `Ability::ALL` order.
pub fn eligible(ledger: &AbilityLedger) -> Vec<Ability> {
    Ability::ALL
        .into_iter()
        .filter(|a| a.allows(ledger.count(*a) + 1))
        .collect()
}

/// `n` distinct eligible abilities, uniformly at random.
///
/// Fails with `Exhausted` instead of returning a short list.
pub fn select_upgrades(
    ledger: &AbilityLedger,
    n: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Ability>, AbilityError> {
    let pool = eligible(ledger);
    if pool.len() < n {
        return Err(AbilityError::Exhausted {
            requested: n,
            available: pool.len(),
        });
    }
    Ok(pool.choose_multiple(rng, n).copied().collect())
}
