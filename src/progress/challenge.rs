//! Daily/weekly challenge progress and the calendar-day rollover.
//!
//! A challenge is only ever moved forward while `completed` is false. The call
//! that first brings progress to the target marks it complete and pays its
//! coin reward; nothing afterwards touches it again.
use chrono::NaiveDate;
use log::{debug, info};

use crate::progress::catalog::daily_challenge_template;
use crate::progress::types::{Challenge, ChallengeKind, PlayerState};

/// Something that happened which may count toward a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeEvent<'a> {
    /// `n` more correct answers
    Correct(u32),
    /// The answer streak is now this long
    Streak(u32),
    /// `amount` more activity in `category`
    Category { category: &'a str, amount: u32 },
    /// `n` more games played
    Games(u32),
    /// This many distinct categories have been played
    Categories(u32),
    /// The best category level is now this high
    CategoryLevel(u32),
}

impl ChallengeEvent<'_> {
    fn kind(&self) -> ChallengeKind {
        match self {
            ChallengeEvent::Correct(_) => ChallengeKind::Correct,
            ChallengeEvent::Streak(_) => ChallengeKind::Streak,
            ChallengeEvent::Category { .. } => ChallengeKind::Category,
            ChallengeEvent::Games(_) => ChallengeKind::Games,
            ChallengeEvent::Categories(_) => ChallengeKind::Categories,
            ChallengeEvent::CategoryLevel(_) => ChallengeKind::CategoryLevel,
        }
    }
}

/// Apply `event` to one challenge. Returns true if it matched.
fn apply_event(challenge: &mut Challenge, event: &ChallengeEvent<'_>) -> bool {
    if challenge.completed || challenge.kind != event.kind() {
        return false;
    }
    match *event {
        ChallengeEvent::Correct(n) | ChallengeEvent::Games(n) => {
            challenge.progress = challenge.progress.saturating_add(n);
        }
        ChallengeEvent::Category { category, amount } => {
            if challenge.category.as_deref() != Some(category) {
                return false;
            }
            challenge.progress = challenge.progress.saturating_add(amount);
        }
        ChallengeEvent::Streak(value)
        | ChallengeEvent::Categories(value)
        | ChallengeEvent::CategoryLevel(value) => {
            challenge.progress = value;
        }
    }
    true
}

fn advance_list(
    challenges: &mut [Challenge],
    event: &ChallengeEvent<'_>,
    coins: &mut u64,
    completed: &mut Vec<String>,
) {
    for challenge in challenges.iter_mut() {
        if !apply_event(challenge, event) {
            continue;
        }
        if challenge.progress >= challenge.target {
            challenge.completed = true;
            *coins = coins.saturating_add(challenge.reward);
            info!(
                "challenge complete: {} (+{} coins)",
                challenge.id, challenge.reward
            );
            completed.push(challenge.id.clone());
        }
    }
}

/// Move every matching open challenge forward. Weekly challenges are only
/// considered when `include_weekly` is set. Returns the ids completed by this
/// call.
pub fn advance(state: &mut PlayerState, event: ChallengeEvent<'_>, include_weekly: bool) -> Vec<String> {
    let mut completed = Vec::new();
    advance_list(&mut state.daily_challenges, &event, &mut state.coins, &mut completed);
    if include_weekly {
        advance_list(&mut state.weekly_challenges, &event, &mut state.coins, &mut completed);
    }
    completed
}

/// Events derived from the category map: distinct categories played and the
/// best category level.
pub fn category_snapshot_events(state: &PlayerState) -> [ChallengeEvent<'static>; 2] {
    let played = state.category_progress.len().min(u32::MAX as usize) as u32;
    let best_level = state
        .category_progress
        .values()
        .map(|p| p.level)
        .max()
        .unwrap_or(0);
    [
        ChallengeEvent::Categories(played),
        ChallengeEvent::CategoryLevel(best_level),
    ]
}

/// What a rollover check did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rollover {
    /// Daily challenges were regenerated and `last_played_date` moved to today
    pub new_day: bool,
    /// The answer streak decayed because more than one day passed
    pub streak_reset: bool,
}

/// Calendar-day rollover. Safe to run any number of times per day.
///
/// Regenerates the daily challenges when the last activity was on another
/// day, and independently resets the streak when more than one whole day has
/// passed since then. Coming back the next day keeps the streak.
pub fn roll_over_day(state: &mut PlayerState, today: NaiveDate) -> Rollover {
    let mut rollover = Rollover::default();
    let previous = state.last_played_date;

    if let Some(last) = previous {
        let elapsed = today.signed_duration_since(last).num_days();
        if elapsed > 1 && state.current_streak > 0 {
            debug!(
                "streak of {} lapsed after {} days away",
                state.current_streak, elapsed
            );
            state.current_streak = 0;
            rollover.streak_reset = true;
        }
    }

    if previous != Some(today) {
        state.daily_challenges = daily_challenge_template();
        state.last_played_date = Some(today);
        rollover.new_day = true;
        debug!("new day {}: daily challenges regenerated", today);
    }

    rollover
}
