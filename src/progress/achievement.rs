//! Achievement evaluation and listing.
//!
//! Evaluation is a single ordered pass over [`ACHIEVEMENTS`]: every locked
//! row whose predicate holds is unlocked, its XP is added straight to the
//! player's total and it is returned. Reward XP never triggers a second pass;
//! the caller recomputes the level once the pass is done.
use log::info;

use crate::progress::catalog::{AchievementDef, ACHIEVEMENTS};
use crate::progress::types::{AchievementStatus, PlayerState};

/// Unlock every achievement whose condition is now met. Returns the newly
/// unlocked definitions in table order.
pub fn check_achievements(state: &mut PlayerState) -> Vec<&'static AchievementDef> {
    let mut awarded = Vec::new();

    for achievement in ACHIEVEMENTS {
        if state.has_achievement(achievement.id) {
            continue;
        }
        if !(achievement.unlocked_when)(state) {
            continue;
        }
        state.achievements.push(achievement.id.to_string());
        state.xp = state.xp.saturating_add(achievement.xp);
        info!(
            "achievement unlocked: {} (+{} xp, {})",
            achievement.id,
            achievement.xp,
            achievement.rarity.display_name()
        );
        awarded.push(achievement);
    }

    awarded
}

/// All achievements in table order, annotated with earned/locked.
pub fn achievement_statuses(state: &PlayerState) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|def| AchievementStatus {
            def,
            earned: state.has_achievement(def.id),
        })
        .collect()
}

/// Only the unlocked achievements, in table order.
pub fn unlocked_achievements(state: &PlayerState) -> Vec<&'static AchievementDef> {
    ACHIEVEMENTS
        .iter()
        .filter(|def| state.has_achievement(def.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::types::GameHistoryEntry;

    fn blank() -> PlayerState {
        let mut state = PlayerState::default();
        state.coins = 0;
        state
    }

    #[test]
    fn unlocks_once_and_awards_xp_once() {
        let mut state = blank();
        state.total_games_played = 1;

        let first = check_achievements(&mut state);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "first_game");
        assert_eq!(state.xp, 10);

        let second = check_achievements(&mut state);
        assert!(second.is_empty());
        assert_eq!(state.xp, 10);
        assert_eq!(state.achievements, vec!["first_game"]);
    }

    #[test]
    fn ties_resolve_in_table_order() {
        let mut state = blank();
        state.total_correct_answers = 100;
        state.total_games_played = 10;
        state.coins = 5;

        let ids: Vec<_> = check_achievements(&mut state).iter().map(|a| a.id).collect();
        assert_eq!(
            ids,
            vec!["first_game", "first_correct", "first_coin", "games_10", "correct_100"]
        );
        assert_eq!(state.achievements, ids);
        assert_eq!(state.xp, 10 + 10 + 10 + 30 + 50);
    }

    #[test]
    fn reward_xp_does_not_cascade_within_a_pass() {
        let mut state = blank();
        state.xp = 390;
        state.level = 4;
        state.total_correct_answers = 1;

        // +10 xp puts the player at 400 xp, but level is not recomputed here,
        // so level_5 stays locked until the next pass after a level update.
        let ids: Vec<_> = check_achievements(&mut state).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["first_correct"]);
        assert_eq!(state.xp, 400);
        assert!(!state.has_achievement("level_5"));
    }

    #[test]
    fn perfect_game_reads_history() {
        let mut state = blank();
        state.game_history.insert(
            "math-jump".into(),
            GameHistoryEntry {
                plays: 1,
                perfect: true,
                ..GameHistoryEntry::default()
            },
        );
        let ids: Vec<_> = check_achievements(&mut state).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["perfect_game"]);
    }

    #[test]
    fn statuses_cover_whole_table() {
        let mut state = blank();
        state.achievements.push("streak_5".into());
        let statuses = achievement_statuses(&state);
        assert_eq!(statuses.len(), ACHIEVEMENTS.len());
        assert_eq!(statuses.iter().filter(|s| s.earned).count(), 1);
        let unlocked = unlocked_achievements(&state);
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].id, "streak_5");
    }
}
