//! Static configuration: the category registry, the achievement table and the
//! daily/weekly challenge templates. Nothing here is persisted; only the
//! unlocked set and challenge progress live in [`PlayerState`].

use std::fmt;

use crate::progress::types::{Challenge, ChallengeKind, PlayerState, Rarity};

/// A topical group of mini-games with its own sub-progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDef {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub games: &'static [&'static str],
}

pub const CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        key: "math",
        name: "Math Wizard",
        icon: "fa-calculator",
        color: "#3498db",
        games: &[
            "magic-table",
            "math-racing",
            "multiplication-monster",
            "rocket-math",
            "division-bowling",
            "bridge-math",
            "number-fishing",
            "math-jump",
            "pizza-fractions",
            "money-shop",
        ],
    },
    CategoryDef {
        key: "language",
        name: "Word Master",
        icon: "fa-book",
        color: "#9b59b6",
        games: &[
            "word-builder",
            "sentence-builder",
            "opposite-battle",
            "grammar-ninja",
            "word-search",
            "alphabet-dance",
            "alphabet-game",
            "story-maker",
            "story-adventure",
            "emoji-match",
        ],
    },
    CategoryDef {
        key: "science",
        name: "Science Explorer",
        icon: "fa-flask",
        color: "#2ecc71",
        games: &[
            "science-lab",
            "solar-system",
            "weather-maker",
            "body-puzzle",
            "plant-simulator",
            "recycling-game",
            "puzzle-map-india",
            "flag-match",
        ],
    },
    CategoryDef {
        key: "memory",
        name: "Brain Champion",
        icon: "fa-brain",
        color: "#e74c3c",
        games: &[
            "memory-game",
            "brain-maze",
            "pattern-detective",
            "logic-escape",
            "robot-coding",
            "coding-robot",
            "treasure-hunt",
            "game-maker",
        ],
    },
    CategoryDef {
        key: "creative",
        name: "Creative Genius",
        icon: "fa-palette",
        color: "#f39c12",
        games: &[
            "color-fill",
            "garden-builder",
            "shape-builder",
            "city-builder",
            "ar-shapes",
        ],
    },
    CategoryDef {
        key: "social",
        name: "Life Skill Star",
        icon: "fa-users",
        color: "#1abc9c",
        games: &["food-sorter", "classroom-sim", "tutor-pet"],
    },
    CategoryDef {
        key: "action",
        name: "Action Hero",
        icon: "fa-bolt",
        color: "#e91e63",
        games: &["balloon-pop", "quiz-tournament", "count-stars"],
    },
];

pub fn category(key: &str) -> Option<&'static CategoryDef> {
    CATEGORIES.iter().find(|c| c.key == key)
}

pub fn is_known_category(key: &str) -> bool {
    category(key).is_some()
}

/// Resolve the category a game id belongs to.
pub fn category_for_game(game_id: &str) -> Option<&'static CategoryDef> {
    CATEGORIES.iter().find(|c| c.games.contains(&game_id))
}

/// One row of the achievement table.
///
/// `unlocked_when` is a pure function of the player state; the table is scanned
/// in order, so earlier rows win ties.
#[derive(Clone, Copy)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub xp: u64,
    pub rarity: Rarity,
    pub category: Option<&'static str>,
    pub unlocked_when: fn(&PlayerState) -> bool,
}

impl fmt::Debug for AchievementDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AchievementDef")
            .field("id", &self.id)
            .field("xp", &self.xp)
            .field("rarity", &self.rarity)
            .field("category", &self.category)
            .finish()
    }
}

impl PartialEq for AchievementDef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AchievementDef {}

/// Speed runs and multi-day challenge streaks are not tracked by the store,
/// so their rows can never unlock here.
fn never(_: &PlayerState) -> bool {
    false
}

macro_rules! achievement {
    ($id:expr, $title:expr, $desc:expr, $icon:expr, $xp:expr, $rarity:ident, $when:expr) => {
        AchievementDef {
            id: $id,
            title: $title,
            description: $desc,
            icon: $icon,
            xp: $xp,
            rarity: Rarity::$rarity,
            category: None,
            unlocked_when: $when,
        }
    };
    ($id:expr, $title:expr, $desc:expr, $icon:expr, $xp:expr, $rarity:ident, category = $cat:expr, $when:expr) => {
        AchievementDef {
            id: $id,
            title: $title,
            description: $desc,
            icon: $icon,
            xp: $xp,
            rarity: Rarity::$rarity,
            category: Some($cat),
            unlocked_when: $when,
        }
    };
}

pub static ACHIEVEMENTS: &[AchievementDef] = &[
    // Beginner
    achievement!("first_game", "First Steps", "Play your first game", "fa-star", 10, Common,
        |s| s.total_games_played >= 1),
    achievement!("first_correct", "Quick Thinker", "Get your first correct answer", "fa-brain", 10, Common,
        |s| s.total_correct_answers >= 1),
    achievement!("first_coin", "Coin Collector", "Earn your first coin", "fa-coins", 10, Common,
        |s| s.coins >= 1),
    // Streaks
    achievement!("streak_5", "On Fire!", "Get a 5 answer streak", "fa-fire", 25, Common,
        |s| s.best_streak >= 5),
    achievement!("streak_10", "Unstoppable", "Get a 10 answer streak", "fa-bolt", 50, Rare,
        |s| s.best_streak >= 10),
    achievement!("streak_25", "Legendary", "Get a 25 answer streak", "fa-crown", 100, Epic,
        |s| s.best_streak >= 25),
    achievement!("streak_50", "Math Master", "Get a 50 answer streak", "fa-trophy", 250, Legendary,
        |s| s.best_streak >= 50),
    // Games played
    achievement!("games_10", "Regular Player", "Play 10 games", "fa-gamepad", 30, Common,
        |s| s.total_games_played >= 10),
    achievement!("games_50", "Dedicated Learner", "Play 50 games", "fa-graduation-cap", 75, Rare,
        |s| s.total_games_played >= 50),
    achievement!("games_100", "Knowledge Seeker", "Play 100 games", "fa-book-open", 150, Epic,
        |s| s.total_games_played >= 100),
    achievement!("games_500", "WonderKid Expert", "Play 500 games", "fa-medal", 500, Legendary,
        |s| s.total_games_played >= 500),
    // Correct answers
    achievement!("correct_100", "Smart Cookie", "Get 100 correct answers", "fa-lightbulb", 50, Common,
        |s| s.total_correct_answers >= 100),
    achievement!("correct_500", "Brain Power", "Get 500 correct answers", "fa-rocket", 150, Rare,
        |s| s.total_correct_answers >= 500),
    achievement!("correct_1000", "Genius Level", "Get 1000 correct answers", "fa-gem", 300, Epic,
        |s| s.total_correct_answers >= 1000),
    achievement!("correct_5000", "Ultimate Scholar", "Get 5000 correct answers", "fa-crown", 1000, Legendary,
        |s| s.total_correct_answers >= 5000),
    // Levels
    achievement!("level_5", "Rising Star", "Reach level 5", "fa-arrow-up", 25, Common,
        |s| s.level >= 5),
    achievement!("level_10", "Quick Learner", "Reach level 10", "fa-star-half-stroke", 50, Common,
        |s| s.level >= 10),
    achievement!("level_25", "Knowledge Hunter", "Reach level 25", "fa-medal", 100, Rare,
        |s| s.level >= 25),
    achievement!("level_50", "Expert Explorer", "Reach level 50", "fa-award", 250, Epic,
        |s| s.level >= 50),
    achievement!("level_100", "WonderKid Legend", "Reach level 100", "fa-crown", 1000, Legendary,
        |s| s.level >= 100),
    // Categories
    achievement!("math_novice", "Math Novice", "Complete 10 math problems", "fa-calculator", 20, Common,
        category = "math", |s| s.category_correct("math") >= 10),
    achievement!("math_master", "Math Master", "Complete 100 math problems", "fa-square-root-variable", 100, Rare,
        category = "math", |s| s.category_correct("math") >= 100),
    achievement!("word_novice", "Word Novice", "Complete 10 word challenges", "fa-spell-check", 20, Common,
        category = "language", |s| s.category_correct("language") >= 10),
    achievement!("word_master", "Vocabulary Master", "Complete 100 word challenges", "fa-book", 100, Rare,
        category = "language", |s| s.category_correct("language") >= 100),
    // Special
    achievement!("all_categories", "Well Rounded", "Play all 7 categories", "fa-globe", 200, Epic,
        |s| s.category_progress.len() >= 7),
    achievement!("perfect_game", "Perfect!", "Get 100% in any game", "fa-check-circle", 50, Rare,
        |s| s.game_history.values().any(|g| g.perfect)),
    achievement!("speed_demon", "Speed Demon", "Complete a game in under 30 seconds", "fa-stopwatch", 75, Rare,
        never),
    achievement!("daily_7", "Daily Champion", "Complete daily challenges for 7 days", "fa-calendar-check", 150, Epic,
        never),
];

pub fn achievement(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Daily goals, regenerated with zero progress on every calendar rollover.
pub fn daily_challenge_template() -> Vec<Challenge> {
    vec![
        Challenge::new("daily_math", "Math Practice", "Play 3 math games", ChallengeKind::Category, 3, 30)
            .for_category("math"),
        Challenge::new("daily_language", "Word Warrior", "Play 2 language games", ChallengeKind::Category, 2, 25)
            .for_category("language"),
        Challenge::new("daily_correct", "Quick Learner", "Get 20 correct answers", ChallengeKind::Correct, 20, 20),
        Challenge::new("daily_streak", "On Fire!", "Get a streak of 5", ChallengeKind::Streak, 5, 15),
    ]
}

/// Weekly goals. Created with the player; never regenerated by the store.
pub fn weekly_challenge_template() -> Vec<Challenge> {
    vec![
        Challenge::new("weekly_explorer", "Explorer", "Try 5 different game categories", ChallengeKind::Categories, 5, 100),
        Challenge::new("weekly_master", "Category Master", "Reach level 5 in any category", ChallengeKind::CategoryLevel, 5, 150),
        Challenge::new("weekly_games", "Dedicated Learner", "Play 20 total games", ChallengeKind::Games, 20, 75),
        Challenge::new("weekly_streak", "Week Champion", "Maintain a 7-day streak", ChallengeKind::StreakTotal, 7, 200),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn achievement_ids_are_unique() {
        let ids: HashSet<_> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
        assert_eq!(ACHIEVEMENTS.len(), 28);
    }

    #[test]
    fn reserved_achievements_never_unlock() {
        let mut state = PlayerState::default();
        state.total_games_played = 10_000;
        state.total_correct_answers = 10_000;
        state.best_streak = 500;
        state.level = 100;
        for id in ["speed_demon", "daily_7"] {
            let def = achievement(id).expect("defined");
            assert!(!(def.unlocked_when)(&state), "{} must stay locked", id);
        }
    }

    #[test]
    fn category_lookup_by_game() {
        assert_eq!(category_for_game("rocket-math").map(|c| c.key), Some("math"));
        assert_eq!(category_for_game("tutor-pet").map(|c| c.key), Some("social"));
        assert!(category_for_game("not-a-game").is_none());
        assert!(is_known_category("creative"));
        assert!(!is_known_category("history"));
        assert_eq!(CATEGORIES.len(), 7);
    }

    #[test]
    fn category_achievements_read_category_correct() {
        let mut state = PlayerState::default();
        let novice = achievement("math_novice").unwrap();
        assert!(!(novice.unlocked_when)(&state));
        state.category_progress.entry("math".into()).or_default().correct = 10;
        assert!((novice.unlocked_when)(&state));
        assert_eq!(novice.category, Some("math"));
    }
}
