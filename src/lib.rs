//! # WonderKids - Progression Store for Learning Games
//!
//! WonderKids tracks a child's progress across many small learning games: experience
//! points and levels, a coin balance, answer streaks, one-time achievements and
//! daily/weekly challenges. Games report events; the store applies the reward rules
//! and writes the whole player document back after every change.
//!
//! ## Features
//!
//! - **XP & Levels**: 10 XP per correct answer plus streak and game bonuses; levels
//!   every 100 XP up to level 100, with per-category sub-levels.
//! - **Coins & Daily Bonus**: coin rewards for finished games and a login bonus that
//!   grows on consecutive days.
//! - **Achievements**: a fixed, ordered table of 28 badges checked after each event.
//! - **Challenges**: daily goals that reset each calendar day, plus weekly goals.
//! - **Persistence**: one JSON document under a single key, in a locked JSON file or
//!   a sled database; missing or damaged state is replaced, never fatal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wonderkids::config::Config;
//! use wonderkids::progress::{GameResult, Progression};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut progress = Progression::from_config(&config)?;
//!
//!     progress.record_answer(Some("math"), 0, true)?;
//!     let game = GameResult::default().with_accuracy(95.0).perfect();
//!     let outcome = progress.record_game_play("rocket-math", Some("math"), &game)?;
//!     println!("+{} coins, level {}", outcome.coins_earned, outcome.level);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`progress`] - the progression store: state, rules, achievements, challenges, persistence
//! - [`config`] - configuration management and validation
//! - [`logutil`] - log-safe rendering of caller-supplied identifiers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Game / HUD     │ ← callers: record events, read queries
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Progression    │ ← rules: leveling, streaks, challenges, achievements
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  StateStore     │ ← one document, json file / sled / memory
//! └─────────────────┘
//! ```

pub mod config;
pub mod logutil;
pub mod progress;
