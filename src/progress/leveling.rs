//! Level math. Levels are always recomputed from total XP, never incremented.

/// XP needed per global level.
pub const XP_PER_LEVEL: u64 = 100;
/// Global level cap. XP keeps accumulating past it.
pub const MAX_LEVEL: u32 = 100;
/// XP needed per category level.
pub const CATEGORY_XP_PER_LEVEL: u64 = 200;

pub fn level_for_xp(xp: u64, xp_per_level: u64, max_level: u32) -> u32 {
    let per = xp_per_level.max(1);
    let raw = xp / per + 1;
    raw.min(max_level.max(1) as u64) as u32
}

/// Category levels are uncapped.
pub fn category_level_for_xp(xp: u64, category_xp_per_level: u64) -> u32 {
    let raw = xp / category_xp_per_level.max(1) + 1;
    raw.min(u32::MAX as u64) as u32
}

/// XP still missing to the next level boundary. At the cap this keeps counting
/// toward a level that will never be reached.
pub fn xp_to_next_level(xp: u64, xp_per_level: u64) -> u64 {
    let per = xp_per_level.max(1);
    per - xp % per
}

/// Position within the current level, in [0, 100).
pub fn progress_percent(xp: u64, xp_per_level: u64) -> f64 {
    let per = xp_per_level.max(1);
    (xp % per) as f64 / per as f64 * 100.0
}
