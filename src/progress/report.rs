//! Compact plain-text renderings of the store's query surface, used by the CLI.
use crate::progress::engine::Progression;
use crate::progress::types::{
    AchievementStatus, AnswerOutcome, CategoryOverview, Challenge, DailyBonus, GamePlayOutcome,
};

/// One-screen summary: level bar, coins, streaks, counters.
pub fn format_status(progression: &Progression) -> String {
    let stats = progression.stats();
    let mut out = String::new();
    out.push_str(&format!(
        "Level {} | {} XP ({} to next, {:.0}%)\n",
        stats.level,
        stats.xp,
        progression.xp_to_next_level(),
        progression.progress_percent()
    ));
    out.push_str(&format!("{}\n", progress_bar(progression.progress_percent(), 20)));
    out.push_str(&format!(
        "Coins: {} | Streak: {} (best {})\n",
        stats.coins, stats.current_streak, stats.best_streak
    ));
    out.push_str(&format!(
        "Games: {} | Correct: {} | Badges: {}\n",
        stats.total_games_played,
        stats.total_correct_answers,
        stats.achievements.len()
    ));
    match stats.last_played_date {
        Some(day) => out.push_str(&format!("Last played: {}\n", day.format("%Y-%m-%d"))),
        None => out.push_str("Last played: never\n"),
    }
    out
}

fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).floor() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled.min(width)))
}

pub fn format_answer_outcome(outcome: Option<&AnswerOutcome>) -> String {
    let Some(outcome) = outcome else {
        return "Not quite! Streak reset.\n".to_string();
    };
    let mut out = format!(
        "Correct! +{} XP | Streak {} | Level {}\n",
        outcome.xp_earned, outcome.new_streak, outcome.level
    );
    for a in &outcome.new_achievements {
        out.push_str(&format!("Achievement unlocked: {} (+{} XP)\n", a.title, a.xp));
    }
    out
}

pub fn format_game_outcome(outcome: &GamePlayOutcome) -> String {
    let mut out = format!(
        "Game recorded: +{} coins, +{} XP | Level {}",
        outcome.coins_earned, outcome.xp_earned, outcome.level
    );
    if let Some(level) = outcome.category_level {
        out.push_str(&format!(" | Category level {}", level));
    }
    out.push('\n');
    out
}

pub fn format_daily_bonus(bonus: Option<&DailyBonus>) -> String {
    match bonus {
        Some(b) => format!(
            "Daily bonus: +{} coins (day streak {}, x{:.1})\n",
            b.coins, b.streak, b.multiplier
        ),
        None => "Daily bonus already claimed today.\n".to_string(),
    }
}

pub fn format_achievements(statuses: &[AchievementStatus]) -> String {
    let earned = statuses.iter().filter(|s| s.earned).count();
    let mut out = format!("Achievements ({}/{}):\n", earned, statuses.len());
    for s in statuses {
        let mark = if s.earned { "*" } else { " " };
        out.push_str(&format!(
            "[{}] {:<18} {:<9} +{:<4} {}\n",
            mark,
            s.def.title,
            s.def.rarity.display_name(),
            s.def.xp,
            s.def.description
        ));
    }
    out
}

pub fn format_challenges(title: &str, challenges: &[Challenge]) -> String {
    if challenges.is_empty() {
        return format!("{}: none\n", title);
    }
    let mut out = format!("{}:\n", title);
    for c in challenges {
        let state = if c.completed { "done" } else { "    " };
        out.push_str(&format!(
            "[{}] {} {}/{} - {} (+{} coins)\n",
            state,
            c.title,
            c.display_progress(),
            c.target,
            c.description,
            c.reward
        ));
    }
    out
}

pub fn format_categories(categories: &[CategoryOverview]) -> String {
    let mut out = String::from("Categories:\n");
    for c in categories {
        out.push_str(&format!(
            "{:<9} {:<17} Lv {:>2} | {} XP | {} correct | {} games\n",
            c.key, c.name, c.progress.level, c.progress.xp, c.progress.correct, c.progress.games_played
        ));
    }
    out
}
