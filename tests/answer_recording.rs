//! Answer recording: XP, streaks, category progress and the achievements and
//! challenges it drives.
mod common;

use common::Harness;
use wonderkids::progress::AnswerOutcome;

fn correct(p: &mut wonderkids::progress::Progression, category: Option<&str>) -> AnswerOutcome {
    p.record_answer(category, 0, true).unwrap().expect("correct answer outcome")
}

#[test]
fn test_five_correct_answers_in_a_row() {
    let h = Harness::new();
    let mut p = h.open();
    // Opening a fresh document unlocks the coin badge from the starting balance
    assert!(p.stats().has_achievement("first_coin"));
    assert_eq!(p.xp(), 10);

    let outcomes: Vec<AnswerOutcome> = (0..5).map(|_| correct(&mut p, Some("math"))).collect();

    assert_eq!(p.streak(), 5);
    assert_eq!(p.best_streak(), 5);
    assert_eq!(p.stats().total_correct_answers, 5);
    assert_eq!(outcomes.iter().map(|o| o.xp_earned).sum::<u64>(), 50);
    assert!(outcomes.iter().all(|o| o.xp_earned == 10));

    assert_eq!(outcomes[0].unlocked_ids(), vec!["first_correct"]);
    for o in &outcomes[1..4] {
        assert!(o.new_achievements.is_empty());
    }
    assert_eq!(outcomes[4].unlocked_ids(), vec!["streak_5"]);
    assert_eq!(outcomes[4].new_streak, 5);

    // 10 (first_coin) + 50 answers + 10 (first_correct) + 25 (streak_5)
    assert_eq!(p.xp(), 95);
    assert_eq!(p.level(), 1);

    let math = p.category_progress("math");
    assert_eq!(math.correct, 5);
    assert_eq!(math.xp, 50);
    assert_eq!(math.level, 1);

    // daily_math (30) and daily_streak (15) paid out
    assert_eq!(p.coins(), 50 + 30 + 15);

    let stored = h.stored();
    assert_eq!(stored["currentStreak"], 5);
    assert_eq!(stored["totalCorrectAnswers"], 5);
}

#[test]
fn test_wrong_answer_only_clears_streak() {
    let h = Harness::new();
    let mut p = h.open();
    for _ in 0..3 {
        correct(&mut p, Some("science"));
    }
    let xp = p.xp();
    let achievements = p.stats().achievements.clone();

    let outcome = p.record_answer(Some("science"), 50, false).unwrap();
    assert!(outcome.is_none());
    assert_eq!(p.streak(), 0);
    assert_eq!(p.best_streak(), 3);
    assert_eq!(p.xp(), xp);
    assert_eq!(p.stats().total_correct_answers, 3);
    assert_eq!(p.stats().achievements, achievements);
    assert_eq!(p.category_progress("science").correct, 3);
    assert_eq!(h.stored()["currentStreak"], 0);
}

#[test]
fn test_streak_counts_since_last_wrong_answer() {
    let h = Harness::new();
    let mut p = h.open();
    for _ in 0..4 {
        correct(&mut p, None);
    }
    p.record_answer(None, 0, false).unwrap();
    for _ in 0..2 {
        correct(&mut p, None);
    }
    assert_eq!(p.streak(), 2);
    assert_eq!(p.best_streak(), 4);
    assert_eq!(p.stats().total_correct_answers, 6);
}

#[test]
fn test_streak_bonus_uses_streak_before_the_answer() {
    let h = Harness::new();
    let mut p = h.open();
    for _ in 0..10 {
        assert_eq!(correct(&mut p, None).xp_earned, 10);
    }
    // streak 10 before this answer: floor(10 * 0.1) = 1
    assert_eq!(correct(&mut p, None).xp_earned, 11);
    assert_eq!(p.streak(), 11);
    assert!(p.stats().has_achievement("streak_10"));
}

#[test]
fn test_xp_bonus_is_added() {
    let h = Harness::new();
    let mut p = h.open();
    let outcome = p.record_answer(Some("language"), 7, true).unwrap().unwrap();
    assert_eq!(outcome.xp_earned, 17);
    assert_eq!(p.category_progress("language").xp, 17);
}

#[test]
fn test_unknown_category_is_ignored() {
    let h = Harness::new();
    let mut p = h.open();
    correct(&mut p, Some("cooking"));
    assert_eq!(p.stats().total_correct_answers, 1);
    assert!(p.stats().category_progress.is_empty());
    let all = p.all_category_progress();
    assert_eq!(all.len(), 7);
    assert!(all.iter().all(|c| c.progress.correct == 0 && c.progress.level == 1));
}

#[test]
fn test_level_follows_total_xp() {
    let h = Harness::new();
    let mut p = h.open();
    let outcome = p.record_answer(Some("math"), 200, true).unwrap().unwrap();
    assert_eq!(outcome.xp_earned, 210);
    assert_eq!(outcome.level, 3);
    // 10 (first_coin) + 210 + 10 (first_correct)
    assert_eq!(p.xp(), 230);
    assert_eq!(p.level(), 3);
    assert_eq!(p.xp_to_next_level(), 70);
    assert!((p.progress_percent() - 30.0).abs() < 1e-9);
    assert_eq!(p.category_progress("math").level, 2);
}

#[test]
fn test_level_catches_up_with_achievement_xp() {
    let h = Harness::new();
    let mut p = h.open();
    // 10 (first_coin) + 85 puts xp at 95; first_correct's +10 crosses into level 2
    let outcome = p.record_answer(None, 75, true).unwrap().unwrap();
    assert_eq!(outcome.unlocked_ids(), vec!["first_correct"]);
    assert_eq!(p.xp(), 105);
    assert_eq!(p.level(), 2);
    assert_eq!(outcome.level, 2);
    assert_eq!(p.level() as u64, p.xp() / 100 + 1);
    assert_eq!(h.stored()["level"], 2);
}

#[test]
fn test_level_exact_after_every_call() {
    let h = Harness::new();
    let mut p = h.open();
    let expected = |p: &wonderkids::progress::Progression| (p.xp() / 100 + 1).min(100) as u32;
    assert_eq!(p.level(), expected(&p));
    for i in 0..40u64 {
        p.record_answer(Some("math"), i * 3, i % 7 != 6).unwrap();
        assert_eq!(p.level(), expected(&p), "after answer {}", i);
        if i % 5 == 0 {
            p.record_game_play("rocket-math", None, &wonderkids::progress::GameResult::default())
                .unwrap();
            assert_eq!(p.level(), expected(&p), "after game {}", i);
        }
    }
    assert!(p.stats().has_achievement("level_5"));
}

#[test]
fn test_level_is_capped() {
    let h = Harness::new();
    let mut p = h.open();
    p.record_answer(None, 50_000, true).unwrap();
    assert_eq!(p.level(), 100);
    assert!(p.stats().has_achievement("level_100"));
    assert!(p.stats().has_achievement("level_5"));
}

#[test]
fn test_math_novice_after_ten_math_answers() {
    let h = Harness::new();
    let mut p = h.open();
    for _ in 0..9 {
        correct(&mut p, Some("math"));
    }
    assert!(!p.stats().has_achievement("math_novice"));
    let outcome = correct(&mut p, Some("math"));
    assert!(outcome.unlocked_ids().contains(&"math_novice"));
    assert!(outcome.unlocked_ids().contains(&"streak_10"));
    // definition order: streak badges come before category badges
    let ids = p.stats().achievements.clone();
    let streak = ids.iter().position(|a| a == "streak_10").unwrap();
    let novice = ids.iter().position(|a| a == "math_novice").unwrap();
    assert!(streak < novice);
}
