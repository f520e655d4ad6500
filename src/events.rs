/// Notifications the encounter hands to the UI layer each tick.
///
/// The core never draws or plays anything itself; it queues these and the
/// front-end renders floating text or triggers audio by cue name.

use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Hit,
    Death,
    Lose,
    Warning,
}

impl SoundCue {
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Hit => "hit.ogg",
            SoundCue::Death => "death.ogg",
            SoundCue::Lose => "lose.ogg",
            SoundCue::Warning => "warning.ogg",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// Floating damage number; critical hits render in red.
    DamageNumber { amount: f32, pos: Vec2, critical: bool },
    Miss { pos: Vec2 },
    Heal { amount: f32, pos: Vec2 },
    WarningBanner { text: String, pos: Vec2 },
    VictoryBanner { text: String, pos: Vec2 },
    Defeat { pos: Vec2 },
    Sound(SoundCue),
}
