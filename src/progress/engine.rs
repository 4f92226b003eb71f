//! The progression store: one owned context object wrapping the player
//! document, its persistence and the reward rules.
//!
//! Every mutating entry point runs the calendar rollover first, applies its
//! changes in memory, then writes the whole document through to the store
//! before returning. A failed write is reported as
//! [`ProgressError::Unsaved`]; the in-memory state keeps the change and stays
//! authoritative for the rest of the session.

use log::{debug, info, warn};

use crate::config::{Config, RulesConfig};
use crate::logutil::{category_label, escape_log};
use crate::progress::achievement;
use crate::progress::catalog::{self, AchievementDef, CATEGORIES};
use crate::progress::challenge::{self, ChallengeEvent, Rollover};
use crate::progress::clock::{Clock, SystemClock};
use crate::progress::errors::ProgressError;
use crate::progress::leveling;
use crate::progress::storage::StateStore;
use crate::progress::types::{
    AchievementStatus, AnswerOutcome, CategoryOverview, CategoryProgress, Challenge, DailyBonus,
    GamePlayOutcome, GameResult, PlayerState,
};

/// Accuracy (percent) earning the top performance bonus.
const HIGH_ACCURACY: f64 = 90.0;
/// Accuracy (percent) earning the smaller performance bonus.
const GOOD_ACCURACY: f64 = 70.0;

/// `floor(value * factor)`, nudged so that products like `20 * 1.3` don't
/// land a hair under the integer.
fn floor_scaled(value: u64, factor: f64) -> u64 {
    let scaled = value as f64 * factor + 1e-9;
    if scaled <= 0.0 {
        0
    } else {
        scaled.floor() as u64
    }
}

/// Coins for a finished game: base, plus accuracy, perfect-game and streak bonuses.
pub fn coin_reward(rules: &RulesConfig, result: &GameResult, current_streak: u32) -> u64 {
    let mut coins = rules.coin_reward_base;

    let accuracy = result.accuracy_percent();
    if accuracy >= HIGH_ACCURACY {
        coins += 5;
    } else if accuracy >= GOOD_ACCURACY {
        coins += 3;
    }

    if result.perfect {
        coins += 10;
    }

    if current_streak >= 10 {
        coins += 5;
    } else if current_streak >= 5 {
        coins += 2;
    }

    coins
}

pub struct Progression {
    state: PlayerState,
    store: StateStore,
    rules: RulesConfig,
    clock: Box<dyn Clock>,
    /// In-memory state is ahead of the store
    unsaved: bool,
}

impl Progression {
    /// Load (or create) the player document, run the day rollover and an
    /// achievement pass, and write the result back.
    ///
    /// Never fails: unreadable state is replaced with a fresh document and a
    /// failed initial write only leaves [`Progression::is_saved`] false.
    pub fn open(store: StateStore, rules: RulesConfig, clock: Box<dyn Clock>) -> Self {
        let state = match store.load() {
            Some(mut state) => {
                if state.normalize(rules.xp_per_level, rules.max_level, rules.category_xp_per_level) {
                    warn!("saved progress had inconsistent fields; repaired on load");
                }
                state
            }
            None => {
                info!("starting new player progress in {}", store.describe());
                PlayerState::initial(clock.now(), rules.starting_coins)
            }
        };

        let mut progression = Self {
            state,
            store,
            rules,
            clock,
            unsaved: true,
        };
        progression.roll_over();
        progression.award_achievements();
        if let Err(e) = progression.save() {
            warn!("initial progress save failed: {}", e);
        }
        progression
    }

    /// Standard rules on the wall clock.
    pub fn with_store(store: StateStore) -> Self {
        Self::open(store, RulesConfig::default(), Box::new(SystemClock))
    }

    /// Build the configured backend and open it with the configured rules.
    pub fn from_config(config: &Config) -> Result<Self, ProgressError> {
        let store = StateStore::from_config(&config.store)?;
        Ok(Self::open(store, config.rules.clone(), Box::new(SystemClock)))
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Write the current state. Also the way to retry after an unsaved error.
    pub fn save(&mut self) -> Result<(), ProgressError> {
        match self.store.save(&self.state) {
            Ok(()) => {
                self.unsaved = false;
                Ok(())
            }
            Err(e) => {
                self.unsaved = true;
                Err(e)
            }
        }
    }

    /// Write-through at the end of a mutation.
    fn persist(&mut self) -> Result<(), ProgressError> {
        self.save().map_err(|e| {
            warn!("progress kept in memory only: {}", e);
            ProgressError::Unsaved(Box::new(e))
        })
    }

    /// True when everything in memory has been written to the store.
    pub fn is_saved(&self) -> bool {
        !self.unsaved
    }

    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    // ---------------------------------------------------------------------
    // Internal steps
    // ---------------------------------------------------------------------

    fn roll_over(&mut self) -> Rollover {
        challenge::roll_over_day(&mut self.state, self.clock.today())
    }

    fn recompute_level(&mut self) {
        let old = self.state.level;
        self.state.level =
            leveling::level_for_xp(self.state.xp, self.rules.xp_per_level, self.rules.max_level);
        if self.state.level > old {
            info!("level up: {} -> {}", old, self.state.level);
        }
    }

    /// One achievement pass, then the level catches up with any reward XP.
    /// Levels reached that way are only checked on the next pass.
    fn award_achievements(&mut self) -> Vec<&'static AchievementDef> {
        let unlocked = achievement::check_achievements(&mut self.state);
        if !unlocked.is_empty() {
            self.recompute_level();
        }
        unlocked
    }

    fn advance(&mut self, event: ChallengeEvent<'_>) {
        challenge::advance(&mut self.state, event, self.rules.track_weekly_challenges);
    }

    /// Weekly goals that look at the whole category map.
    fn advance_category_snapshot(&mut self) {
        if !self.rules.track_weekly_challenges {
            return;
        }
        for event in challenge::category_snapshot_events(&self.state) {
            self.advance(event);
        }
    }

    /// Progress entry for a known category, created on first use. Unknown keys
    /// get no entry.
    fn category_entry(&mut self, category: Option<&str>) -> Option<&mut CategoryProgress> {
        let key = category?;
        if !catalog::is_known_category(key) {
            debug!("ignoring unknown category {}", escape_log(key));
            return None;
        }
        Some(self.state.category_progress.entry(key.to_string()).or_default())
    }

    // ---------------------------------------------------------------------
    // Mutating entry points
    // ---------------------------------------------------------------------

    /// Run the calendar rollover now and persist if it changed anything.
    pub fn check_day_rollover(&mut self) -> Result<Rollover, ProgressError> {
        let rollover = self.roll_over();
        if rollover.new_day || rollover.streak_reset {
            self.persist()?;
        }
        Ok(rollover)
    }

    /// Run an achievement pass now and persist if anything unlocked.
    pub fn check_achievements(&mut self) -> Result<Vec<&'static AchievementDef>, ProgressError> {
        let unlocked = self.award_achievements();
        if !unlocked.is_empty() {
            self.persist()?;
        }
        Ok(unlocked)
    }

    /// Record one answer.
    ///
    /// A wrong answer only clears the streak and returns `None`. A correct one
    /// earns `xp_per_correct + xp_bonus`, plus a streak bonus once the streak
    /// (before this answer) has reached the threshold, and moves the
    /// category, challenges and achievements forward.
    pub fn record_answer(
        &mut self,
        category: Option<&str>,
        xp_bonus: u64,
        is_correct: bool,
    ) -> Result<Option<AnswerOutcome>, ProgressError> {
        self.roll_over();

        if !is_correct {
            debug!(
                "wrong answer in {}: streak {} cleared",
                category_label(category),
                self.state.current_streak
            );
            self.state.current_streak = 0;
            self.persist()?;
            return Ok(None);
        }

        self.state.total_correct_answers = self.state.total_correct_answers.saturating_add(1);

        let mut xp_earned = self.rules.xp_per_correct;
        if self.state.current_streak >= self.rules.streak_bonus_threshold {
            xp_earned += floor_scaled(self.state.current_streak as u64, self.rules.streak_multiplier);
        }
        xp_earned = xp_earned.saturating_add(xp_bonus);

        self.state.current_streak = self.state.current_streak.saturating_add(1);
        self.state.raise_best_streak();

        let category_xp_per_level = self.rules.category_xp_per_level;
        if let Some(progress) = self.category_entry(category) {
            progress.correct = progress.correct.saturating_add(1);
            progress.xp = progress.xp.saturating_add(xp_earned);
            progress.level = leveling::category_level_for_xp(progress.xp, category_xp_per_level);
        }

        self.state.xp = self.state.xp.saturating_add(xp_earned);
        self.recompute_level();

        self.advance(ChallengeEvent::Correct(1));
        self.advance(ChallengeEvent::Streak(self.state.current_streak));
        if let Some(category) = category {
            self.advance(ChallengeEvent::Category { category, amount: 1 });
        }
        self.advance_category_snapshot();

        let new_achievements = self.award_achievements();

        debug!(
            "correct answer in {}: +{} xp, streak {}",
            category_label(category),
            xp_earned,
            self.state.current_streak
        );

        let outcome = AnswerOutcome {
            xp_earned,
            new_streak: self.state.current_streak,
            level: self.state.level,
            new_achievements,
        };
        self.persist()?;
        Ok(Some(outcome))
    }

    /// Record a finished game session.
    ///
    /// When `category` is `None` the game id is looked up in the category
    /// registry. Achievements unlocked here are applied but not returned.
    pub fn record_game_play(
        &mut self,
        game_id: &str,
        category: Option<&str>,
        result: &GameResult,
    ) -> Result<GamePlayOutcome, ProgressError> {
        self.roll_over();

        let category = category.or_else(|| catalog::category_for_game(game_id).map(|c| c.key));

        self.state.total_games_played = self.state.total_games_played.saturating_add(1);

        if let Some(progress) = self.category_entry(category) {
            progress.games_played = progress.games_played.saturating_add(1);
        }

        let history = self.state.game_history.entry(game_id.to_string()).or_default();
        history.plays = history.plays.saturating_add(1);
        if let Some(score) = result.score {
            if score > history.best_score {
                history.best_score = score;
            }
        }
        if let Some(correct) = result.correct {
            history.total_correct = history.total_correct.saturating_add(correct);
        }
        if result.perfect {
            history.perfect = true;
        }

        let coins_earned = coin_reward(&self.rules, result, self.state.current_streak);
        self.state.coins = self.state.coins.saturating_add(coins_earned);

        let xp_earned = self.rules.play_xp;
        self.state.xp = self.state.xp.saturating_add(xp_earned);

        self.advance(ChallengeEvent::Games(1));
        if let Some(category) = category {
            self.advance(ChallengeEvent::Category { category, amount: 1 });
        }
        self.advance_category_snapshot();

        self.recompute_level();
        self.award_achievements();

        info!(
            "game {} ({}) recorded: +{} coins, +{} xp",
            escape_log(game_id),
            category_label(category),
            coins_earned,
            xp_earned
        );

        let outcome = GamePlayOutcome {
            coins_earned,
            xp_earned,
            level: self.state.level,
            category_level: category
                .and_then(|c| self.state.category_progress.get(c))
                .map(|p| p.level),
        };
        self.persist()?;
        Ok(outcome)
    }

    /// Claim today's login bonus. `None` if it was already claimed today.
    ///
    /// Claiming on consecutive days grows the streak and the multiplier
    /// (`1 + streak * 0.1`, capped); a gap restarts the streak at 1.
    pub fn claim_daily_bonus(&mut self) -> Result<Option<DailyBonus>, ProgressError> {
        let today = self.clock.today();
        if self.state.last_bonus_date == Some(today) {
            debug!("daily bonus already claimed for {}", today);
            return Ok(None);
        }

        self.roll_over();

        let yesterday = today.pred_opt();
        let multiplier = match self.state.last_bonus_date {
            Some(last) if Some(last) == yesterday => {
                self.state.current_streak = self.state.current_streak.saturating_add(1);
                let m = 1.0 + self.state.current_streak as f64 * self.rules.streak_multiplier;
                m.min(self.rules.daily_bonus_max_multiplier)
            }
            _ => {
                self.state.current_streak = 1;
                1.0
            }
        };
        self.state.raise_best_streak();

        let coins = floor_scaled(self.rules.daily_bonus_base, multiplier);
        self.state.coins = self.state.coins.saturating_add(coins);
        self.state.last_played_date = Some(today);
        self.state.last_bonus_date = Some(today);

        info!(
            "daily bonus claimed: +{} coins (streak {}, x{:.1})",
            coins, self.state.current_streak, multiplier
        );

        let bonus = DailyBonus {
            coins,
            streak: self.state.current_streak,
            multiplier,
        };
        self.persist()?;
        Ok(Some(bonus))
    }

    /// Wipe the stored document and start over with a fresh one. If the
    /// stored document cannot be removed nothing changes.
    pub fn reset(&mut self) -> Result<(), ProgressError> {
        self.store.clear().map_err(|e| {
            warn!("could not remove stored progress: {}", e);
            e
        })?;
        self.state = PlayerState::initial(self.clock.now(), self.rules.starting_coins);
        info!("player progress reset");
        self.persist()
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// The full state document.
    pub fn stats(&self) -> &PlayerState {
        &self.state
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn xp(&self) -> u64 {
        self.state.xp
    }

    pub fn xp_to_next_level(&self) -> u64 {
        leveling::xp_to_next_level(self.state.xp, self.rules.xp_per_level)
    }

    pub fn progress_percent(&self) -> f64 {
        leveling::progress_percent(self.state.xp, self.rules.xp_per_level)
    }

    pub fn coins(&self) -> u64 {
        self.state.coins
    }

    pub fn streak(&self) -> u32 {
        self.state.current_streak
    }

    pub fn best_streak(&self) -> u32 {
        self.state.best_streak
    }

    pub fn achievements_list(&self) -> Vec<AchievementStatus> {
        achievement::achievement_statuses(&self.state)
    }

    pub fn unlocked_achievements(&self) -> Vec<&'static AchievementDef> {
        achievement::unlocked_achievements(&self.state)
    }

    pub fn daily_challenges(&self) -> &[Challenge] {
        &self.state.daily_challenges
    }

    pub fn weekly_challenges(&self) -> &[Challenge] {
        &self.state.weekly_challenges
    }

    /// Progress in one category; a zeroed level-1 entry if never played.
    pub fn category_progress(&self, category: &str) -> CategoryProgress {
        self.state
            .category_progress
            .get(category)
            .cloned()
            .unwrap_or_default()
    }

    /// Every registered category merged with the player's progress in it.
    pub fn all_category_progress(&self) -> Vec<CategoryOverview> {
        CATEGORIES
            .iter()
            .map(|c| CategoryOverview {
                key: c.key,
                name: c.name,
                icon: c.icon,
                color: c.color,
                games: c.games,
                progress: self.category_progress(c.key),
            })
            .collect()
    }
}
