//! Player progression: XP and levels, coins, answer streaks, achievements and
//! daily/weekly challenges, persisted as one document per installation.
//!
//! [`Progression`] is the entry point; the submodules hold the pieces it is
//! built from so they can be exercised on a bare [`PlayerState`].

pub mod achievement;
pub mod catalog;
pub mod challenge;
pub mod clock;
pub mod engine;
pub mod errors;
pub mod leveling;
pub mod report;
pub mod storage;
pub mod types;

pub use achievement::{achievement_statuses, check_achievements, unlocked_achievements};
pub use catalog::{
    achievement, category, category_for_game, daily_challenge_template, weekly_challenge_template,
    AchievementDef, CategoryDef, ACHIEVEMENTS, CATEGORIES,
};
pub use challenge::{advance, roll_over_day, ChallengeEvent, Rollover};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{coin_reward, Progression};
pub use errors::ProgressError;
pub use storage::{
    JsonFileBackend, MemoryBackend, SledBackend, StateBackend, StateStore, DEFAULT_STORAGE_KEY,
};
pub use types::*;
