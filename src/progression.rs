//! Campaign progression: the unlocked level, the ability ledger and total
//! playtime, persisted between runs.
//!
//! The on-disk record is a three-element JSON array
//! `[level, {"ability name": stacks, ...}, total_time_ms]`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::abilities::{Ability, AbilityError, AbilityLedger};

/// Number of worlds in the campaign.
pub const MAX_LEVEL: u32 = 5;

#[derive(Debug, Error)]
pub enum ProgressionError {
    #[error("no saved progression at {0}")]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed progression record: {0}")]
    Format(#[from] serde_json::Error),

    #[error("saved ability ledger rejected: {0}")]
    Ledger(#[from] AbilityError),
}

// ── Levels ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelInfo {
    pub name: &'static str,
    pub description: &'static str,
    /// Relative size the planet is drawn at on the level screen.
    pub planet_scale: f32,
}

pub const LEVELS: [LevelInfo; MAX_LEVEL as usize] = [
    LevelInfo {
        name: "Watery World",
        description: "There are only a few weak aliens up there that can be easily defeated.",
        planet_scale: 1.0,
    },
    LevelInfo {
        name: "Icy World",
        description: "The aliens up there appear to be moving faster because of the extreme weather.",
        planet_scale: 1.3,
    },
    LevelInfo {
        name: "Mysterious World",
        description: "No trace of aliens seems to have been found on this planet.",
        planet_scale: 1.5,
    },
    LevelInfo {
        name: "Lava World",
        description: "The aliens up here are very aggressive.",
        planet_scale: 1.7,
    },
    LevelInfo {
        name: "The Sun",
        description: "Aliens on this planet have no weaknesses and are hard to defeat.",
        planet_scale: 1.8,
    },
];

/// 1-based lookup.
pub fn level_info(level: u32) -> Option<&'static LevelInfo> {
    let index = level.checked_sub(1)?;
    LEVELS.get(index as usize)
}

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Record", into = "Record")]
pub struct ProgressionState {
    pub level: u32,
    pub abilities: AbilityLedger,
    pub total_time_ms: u64,
}

#[derive(Serialize, Deserialize)]
struct Record(u32, AbilityLedger, u64);

impl From<Record> for ProgressionState {
    fn from(Record(level, abilities, total_time_ms): Record) -> Self {
        Self {
            level,
            abilities,
            total_time_ms,
        }
    }
}

impl From<ProgressionState> for Record {
    fn from(s: ProgressionState) -> Self {
        Record(s.level, s.abilities, s.total_time_ms)
    }
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::first_run()
    }
}

impl ProgressionState {
    /// Level 1, no abilities, no playtime.
    pub fn first_run() -> Self {
        Self {
            level: 1,
            abilities: AbilityLedger::new(),
            total_time_ms: 0,
        }
    }

    /// All worlds cleared.
    pub fn is_campaign_complete(&self) -> bool {
        self.level > MAX_LEVEL
    }

    /// Advance past the current level and bank the encounter's playtime.
    pub fn record_victory(&mut self, elapsed_ms: u64) {
        self.level += 1;
        self.total_time_ms += elapsed_ms;
    }

    /// Bank the playtime of a lost encounter.  The level does not change.
    pub fn record_defeat(&mut self, elapsed_ms: u64) {
        self.total_time_ms += elapsed_ms;
    }

    /// Add the upgrade picked after a victory.
    pub fn choose_ability(&mut self, ability: Ability) -> Result<u32, AbilityError> {
        self.abilities.add(ability)
    }

    /// Total playtime as whole minutes and leftover seconds.
    pub fn playtime(&self) -> (u64, u64) {
        let secs = self.total_time_ms / 1000;
        (secs / 60, secs % 60)
    }

    pub fn to_json(&self) -> Result<String, ProgressionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProgressionError> {
        let state: Self = serde_json::from_str(text)?;
        state.abilities.validate()?;
        Ok(state)
    }
}

// ── Storage ───────────────────────────────────────────────────────────────────

/// Where progression lives between runs.
pub trait ProgressionStore {
    /// Fails with `NotFound` when nothing has been saved yet.
    fn load(&self) -> Result<ProgressionState, ProgressionError>;

    fn save(&self, state: &ProgressionState) -> Result<(), ProgressionError>;
}

/// Load saved progression, treating a missing record as the first run.
pub fn load_or_first_run(store: &impl ProgressionStore) -> Result<ProgressionState, ProgressionError> {
    match store.load() {
        Ok(state) => Ok(state),
        Err(ProgressionError::NotFound(path)) => {
            info!(path = %path.display(), "no saved progression, starting fresh");
            Ok(ProgressionState::first_run())
        }
        Err(e) => Err(e),
    }
}

/// A JSON file on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.planet_raid.json`, or the working directory without `HOME`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".planet_raid.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressionStore for JsonFileStore {
    fn load(&self) -> Result<ProgressionState, ProgressionError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ProgressionError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let state = ProgressionState::from_json(&text)?;
        info!(path = %self.path.display(), level = state.level, "progression loaded");
        Ok(state)
    }

    fn save(&self, state: &ProgressionState) -> Result<(), ProgressionError> {
        let text = state.to_json()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                warn!(dir = %parent.display(), "creating progression directory");
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, text)?;
        info!(path = %self.path.display(), level = state.level, "progression saved");
        Ok(())
    }
}
