use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::progress::catalog::{daily_challenge_template, weekly_challenge_template, AchievementDef};
use crate::progress::leveling;

/// Coins granted to a brand new player.
pub const STARTING_COINS: u64 = 50;

/// Rarity tier of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const fn display_name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// What kind of activity moves a challenge forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Answers in one specific category (`Challenge::category`)
    Category,
    /// Correct answers in any category
    Correct,
    /// Current answer streak (absolute)
    Streak,
    /// Number of distinct categories played (absolute)
    Categories,
    /// Highest level reached in any category (absolute)
    CategoryLevel,
    /// Games played
    Games,
    /// Consecutive days; not tracked by the store
    StreakTotal,
}

/// A daily or weekly goal with progress toward a target and a coin reward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::count_u32")]
    pub target: u32,
    #[serde(default, deserialize_with = "lenient::count_u32")]
    pub progress: u32,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient::count_u64")]
    pub reward: u64,
}

impl Challenge {
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        kind: ChallengeKind,
        target: u32,
        reward: u64,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            kind,
            category: None,
            target,
            progress: 0,
            completed: false,
            reward,
        }
    }

    pub fn for_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Progress as shown to players; internal progress may overshoot the target.
    pub fn display_progress(&self) -> u32 {
        self.progress.min(self.target)
    }
}

/// Per-category sub-progression, created the first time a category sees activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryProgress {
    #[serde(deserialize_with = "lenient::count_u64")]
    pub games_played: u64,
    #[serde(deserialize_with = "lenient::count_u64")]
    pub correct: u64,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub level: u32,
    #[serde(deserialize_with = "lenient::count_u64")]
    pub xp: u64,
}

impl Default for CategoryProgress {
    fn default() -> Self {
        Self {
            games_played: 0,
            correct: 0,
            level: 1,
            xp: 0,
        }
    }
}

/// Play history for a single game id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameHistoryEntry {
    #[serde(deserialize_with = "lenient::count_u64")]
    pub plays: u64,
    #[serde(deserialize_with = "lenient::count_u64")]
    pub best_score: u64,
    #[serde(deserialize_with = "lenient::count_u64")]
    pub total_correct: u64,
    /// Sticky: once a perfect game is recorded it stays true
    #[serde(deserialize_with = "lenient::flag")]
    pub perfect: bool,
}

/// The whole persisted player document. One per installation.
///
/// Every field has a default and decodes leniently, so documents written by
/// older builds or by the JavaScript games still load; see [`lenient`] and
/// [`PlayerState::normalize`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    #[serde(deserialize_with = "lenient::count_u64")]
    pub xp: u64,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub level: u32,
    #[serde(deserialize_with = "lenient::count_u64")]
    pub coins: u64,
    #[serde(deserialize_with = "lenient::count_u64")]
    pub total_games_played: u64,
    #[serde(deserialize_with = "lenient::count_u64")]
    pub total_correct_answers: u64,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub current_streak: u32,
    #[serde(deserialize_with = "lenient::count_u32")]
    pub best_streak: u32,
    #[serde(with = "day_format")]
    pub last_played_date: Option<NaiveDate>,
    /// Day of the last successful daily bonus claim
    #[serde(with = "day_format")]
    pub last_bonus_date: Option<NaiveDate>,
    /// Unlocked achievement ids in unlock order
    #[serde(deserialize_with = "lenient::ids")]
    pub achievements: Vec<String>,
    #[serde(deserialize_with = "lenient::keyed")]
    pub category_progress: BTreeMap<String, CategoryProgress>,
    #[serde(deserialize_with = "lenient::records")]
    pub daily_challenges: Vec<Challenge>,
    #[serde(deserialize_with = "lenient::records")]
    pub weekly_challenges: Vec<Challenge>,
    #[serde(deserialize_with = "lenient::keyed")]
    pub game_history: BTreeMap<String, GameHistoryEntry>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl PlayerState {
    /// Fresh first-run state.
    pub fn initial(created_at: DateTime<Utc>, starting_coins: u64) -> Self {
        Self {
            xp: 0,
            level: 1,
            coins: starting_coins,
            total_games_played: 0,
            total_correct_answers: 0,
            current_streak: 0,
            best_streak: 0,
            last_played_date: None,
            last_bonus_date: None,
            achievements: Vec::new(),
            category_progress: BTreeMap::new(),
            daily_challenges: daily_challenge_template(),
            weekly_challenges: weekly_challenge_template(),
            game_history: BTreeMap::new(),
            created_at,
        }
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }

    /// Correct answers recorded in `category`, zero if never played.
    pub fn category_correct(&self, category: &str) -> u64 {
        self.category_progress
            .get(category)
            .map(|p| p.correct)
            .unwrap_or(0)
    }

    pub fn raise_best_streak(&mut self) {
        if self.current_streak > self.best_streak {
            self.best_streak = self.current_streak;
        }
    }

    /// Repair a freshly decoded document so the derived fields agree with the
    /// raw counters. Returns true if anything changed.
    pub fn normalize(&mut self, xp_per_level: u64, max_level: u32, category_xp_per_level: u64) -> bool {
        let before = self.clone();

        let mut seen = std::collections::HashSet::new();
        self.achievements.retain(|id| seen.insert(id.clone()));

        self.level = leveling::level_for_xp(self.xp, xp_per_level, max_level);
        for progress in self.category_progress.values_mut() {
            progress.level = leveling::category_level_for_xp(progress.xp, category_xp_per_level);
        }
        if self.best_streak < self.current_streak {
            self.best_streak = self.current_streak;
        }
        repair_challenges(&mut self.daily_challenges, daily_challenge_template());
        repair_challenges(&mut self.weekly_challenges, weekly_challenge_template());

        *self != before
    }
}

/// Fill fields a stored challenge lost from the template entry with the same
/// id, drop challenges left without a target, and fall back to the full
/// template when nothing usable remains.
fn repair_challenges(list: &mut Vec<Challenge>, template: Vec<Challenge>) {
    for challenge in list.iter_mut() {
        let Some(known) = template.iter().find(|t| t.id == challenge.id) else {
            continue;
        };
        if challenge.title.is_empty() {
            challenge.title = known.title.clone();
        }
        if challenge.description.is_empty() {
            challenge.description = known.description.clone();
        }
        if challenge.category.is_none() {
            challenge.category = known.category.clone();
        }
        if challenge.target == 0 {
            challenge.target = known.target;
        }
        if challenge.reward == 0 {
            challenge.reward = known.reward;
        }
    }
    list.retain(|c| c.target > 0);
    if list.is_empty() {
        *list = template;
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::initial(Utc::now(), STARTING_COINS)
    }
}

/// Result reported by a mini-game at the end of a session. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameResult {
    pub score: Option<u64>,
    pub correct: Option<u64>,
    /// Percentage in [0, 100]
    pub accuracy: Option<f64>,
    pub perfect: bool,
}

impl GameResult {
    pub fn with_score(mut self, score: u64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_correct(mut self, correct: u64) -> Self {
        self.correct = Some(correct);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn perfect(mut self) -> Self {
        self.perfect = true;
        self
    }

    /// Accuracy clamped into [0, 100]; missing, NaN or negative values count as 0.
    pub fn accuracy_percent(&self) -> f64 {
        match self.accuracy {
            Some(a) if a.is_finite() => a.clamp(0.0, 100.0),
            Some(a) if a == f64::INFINITY => 100.0,
            _ => 0.0,
        }
    }
}

/// Returned by a correct answer.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub xp_earned: u64,
    pub new_streak: u32,
    pub level: u32,
    pub new_achievements: Vec<&'static AchievementDef>,
}

impl AnswerOutcome {
    pub fn unlocked_ids(&self) -> Vec<&'static str> {
        self.new_achievements.iter().map(|a| a.id).collect()
    }
}

/// Returned by a recorded game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GamePlayOutcome {
    pub coins_earned: u64,
    pub xp_earned: u64,
    pub level: u32,
    /// Level in the game's category, when a known category was given
    pub category_level: Option<u32>,
}

/// Returned by a successful daily bonus claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBonus {
    pub coins: u64,
    pub streak: u32,
    pub multiplier: f64,
}

/// An achievement definition annotated with whether the player has it.
#[derive(Debug, Clone)]
pub struct AchievementStatus {
    pub def: &'static AchievementDef,
    pub earned: bool,
}

/// Category metadata merged with the player's progress in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOverview {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub games: &'static [&'static str],
    pub progress: CategoryProgress,
}

/// Forgiving decoders for stored documents.
///
/// The document is also written by browser games, so numbers may arrive as
/// floats or strings and lists may carry records this build does not know.
/// Counters are floored and clamped at zero, undecodable list and map entries
/// are dropped, and an unreadable timestamp becomes "now". None of these fail
/// the surrounding document.
pub mod lenient {
    use std::collections::BTreeMap;
    use std::fmt;

    use chrono::{DateTime, Utc};
    use log::debug;
    use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
    use serde::Deserialize;
    use serde_json::Value;

    struct CountVisitor;

    fn floor_count(v: f64) -> u64 {
        if v.is_finite() && v > 0.0 {
            v.floor() as u64
        } else {
            0
        }
    }

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative count")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            Ok(v.max(0) as u64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            Ok(floor_count(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            Ok(v.trim().parse::<f64>().map(floor_count).unwrap_or(0))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<u64, E> {
            Ok(u64::from(v))
        }

        fn visit_unit<E: de::Error>(self) -> Result<u64, E> {
            Ok(0)
        }

        fn visit_none<E: de::Error>(self) -> Result<u64, E> {
            Ok(0)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<u64, D::Error> {
            d.deserialize_any(CountVisitor)
        }
    }

    pub fn count_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        d.deserialize_any(CountVisitor)
    }

    pub fn count_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        count_u64(d).map(|v| v.min(u32::MAX as u64) as u32)
    }

    /// `true`, a non-zero number or the string "true".
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
            Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        })
    }

    /// String ids; anything else in the array is skipped.
    pub fn ids<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    /// An array of records, keeping the ones that decode.
    pub fn records<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|v| match serde_json::from_value(v) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!("dropping unreadable stored record: {}", e);
                    None
                }
            })
            .collect())
    }

    /// An object of records keyed by id, keeping the entries that decode.
    pub fn keyed<'de, D, T>(d: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Object(entries) = Value::deserialize(d)? else {
            return Ok(BTreeMap::new());
        };
        Ok(entries
            .into_iter()
            .filter_map(|(key, v)| match serde_json::from_value(v) {
                Ok(record) => Some((key, record)),
                Err(e) => {
                    debug!("dropping unreadable stored entry {}: {}", key, e);
                    None
                }
            })
            .collect())
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let parsed = match Value::deserialize(d)? {
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
            _ => None,
        };
        Ok(parsed.unwrap_or_else(Utc::now))
    }
}

/// Calendar days stored as `YYYY-MM-DD`.
///
/// Reading is lenient: the legacy `Thu Oct 15 2026` day-string and full
/// RFC 3339 timestamps are accepted as well, and anything unparseable decodes
/// as "no date" rather than failing the whole document.
pub mod day_format {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const ISO_DAY: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_some(&d.format(ISO_DAY).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_day))
    }

    pub fn parse_day(raw: &str) -> Option<NaiveDate> {
        let s = raw.trim();
        NaiveDate::parse_from_str(s, ISO_DAY)
            .ok()
            .or_else(|| NaiveDate::parse_from_str(s, "%a %b %d %Y").ok())
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_matches_first_run_defaults() {
        let state = PlayerState::initial(Utc::now(), STARTING_COINS);
        assert_eq!(state.xp, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.coins, 50);
        assert_eq!(state.current_streak, 0);
        assert!(state.achievements.is_empty());
        assert_eq!(state.daily_challenges.len(), 4);
        assert_eq!(state.weekly_challenges.len(), 4);
        assert!(state.last_played_date.is_none());
    }

    #[test]
    fn parse_day_accepts_legacy_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(day_format::parse_day("2026-10-15"), Some(expected));
        assert_eq!(day_format::parse_day("Thu Oct 15 2026"), Some(expected));
        assert_eq!(
            day_format::parse_day("2026-10-15T08:30:00.000Z"),
            Some(expected)
        );
        assert_eq!(day_format::parse_day("yesterday-ish"), None);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let json = r#"{"xp": 250, "coins": 7, "lastPlayedDate": "Thu Oct 15 2026"}"#;
        let state: PlayerState = serde_json::from_str(json).unwrap();
        assert_eq!(state.xp, 250);
        assert_eq!(state.coins, 7);
        assert_eq!(
            state.last_played_date,
            NaiveDate::from_ymd_opt(2026, 10, 15)
        );
        assert_eq!(state.daily_challenges.len(), 4);
    }

    #[test]
    fn normalize_repairs_derived_fields() {
        let mut state = PlayerState::default();
        state.xp = 350;
        state.level = 1;
        state.current_streak = 9;
        state.best_streak = 3;
        state.achievements = vec!["first_game".into(), "first_game".into(), "streak_5".into()];
        state.category_progress.insert(
            "math".into(),
            CategoryProgress {
                xp: 450,
                level: 1,
                ..CategoryProgress::default()
            },
        );

        assert!(state.normalize(100, 100, 200));
        assert_eq!(state.level, 4);
        assert_eq!(state.best_streak, 9);
        assert_eq!(state.achievements, vec!["first_game", "streak_5"]);
        assert_eq!(state.category_progress["math"].level, 3);
        assert!(!state.normalize(100, 100, 200));
    }

    #[test]
    fn float_and_string_counters_are_floored() {
        let json = r#"{
            "xp": 4200.7,
            "coins": "900",
            "currentStreak": -3,
            "gameHistory": {
                "math-jump": {"plays": 2, "bestScore": 87.5, "totalCorrect": 9.0, "perfect": 1},
                "broken": "not an entry"
            },
            "categoryProgress": {"math": {"correct": 12.2, "xp": 450.9}}
        }"#;
        let state: PlayerState = serde_json::from_str(json).unwrap();
        assert_eq!(state.xp, 4200);
        assert_eq!(state.coins, 900);
        assert_eq!(state.current_streak, 0);
        let entry = &state.game_history["math-jump"];
        assert_eq!(entry.best_score, 87);
        assert_eq!(entry.total_correct, 9);
        assert!(entry.perfect);
        assert!(!state.game_history.contains_key("broken"));
        assert_eq!(state.category_progress["math"].correct, 12);
        assert_eq!(state.category_progress["math"].xp, 450);
    }

    #[test]
    fn unreadable_challenges_are_dropped_and_repaired() {
        let json = r#"{
            "dailyChallenges": [
                {"id": "daily_math", "type": "category", "progress": 2},
                {"id": "daily_dance", "title": "Dance", "type": "dance", "target": 3, "reward": 5},
                {"title": "no id", "type": "correct", "target": 3, "reward": 5}
            ],
            "weeklyChallenges": "oops",
            "achievements": ["first_game", 7, null, "first_coin"],
            "createdAt": "last tuesday"
        }"#;
        let mut state: PlayerState = serde_json::from_str(json).unwrap();
        assert_eq!(state.daily_challenges.len(), 1);
        assert!(state.weekly_challenges.is_empty());
        assert_eq!(state.achievements, vec!["first_game", "first_coin"]);

        assert!(state.normalize(100, 100, 200));
        let math = &state.daily_challenges[0];
        assert_eq!(math.title, "Math Practice");
        assert_eq!(math.category.as_deref(), Some("math"));
        assert_eq!(math.target, 3);
        assert_eq!(math.reward, 30);
        assert_eq!(math.progress, 2);
        assert_eq!(state.weekly_challenges, weekly_challenge_template());
    }

    #[test]
    fn challenge_without_target_or_template_is_discarded() {
        let mut state = PlayerState::default();
        state.daily_challenges = vec![Challenge::new("mystery", "?", "?", ChallengeKind::Games, 0, 0)];
        state.normalize(100, 100, 200);
        assert_eq!(state.daily_challenges, daily_challenge_template());
    }

    #[test]
    fn accuracy_is_clamped() {
        assert_eq!(GameResult::default().accuracy_percent(), 0.0);
        assert_eq!(GameResult::default().with_accuracy(f64::NAN).accuracy_percent(), 0.0);
        assert_eq!(GameResult::default().with_accuracy(-12.0).accuracy_percent(), 0.0);
        assert_eq!(GameResult::default().with_accuracy(140.0).accuracy_percent(), 100.0);
        assert_eq!(GameResult::default().with_accuracy(72.5).accuracy_percent(), 72.5);
    }

    #[test]
    fn display_progress_caps_at_target() {
        let mut c = Challenge::new("x", "X", "x", ChallengeKind::Correct, 3, 10);
        c.progress = 7;
        assert_eq!(c.display_progress(), 3);
    }
}
