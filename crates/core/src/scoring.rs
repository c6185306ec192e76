//! Scoring module - line clear, T-spin, combo, back-to-back and perfect clear rules
//!
//! Every bonus is an additive component of [`ScoreResult`]:
//! - T-Spin clears use the T-Spin tables instead of the classic line-clear points.
//! - B2B adds half of the base clear points (the 3/2 multiplier's extra half).
//! - Buff multipliers (Zone, Frenzy, Overdrive) scale the base clear and its B2B bonus only.
//! - Combo bonus is `combo_base * combo_index` with no level multiplier.
//! - Perfect clear adds its own table, plus a flat bonus when the clear is also B2B.

use serde::{Deserialize, Serialize};

use crate::types::{
    TSpinKind, B2B_DENOMINATOR, B2B_NUMERATOR, COMBO_BASE, DROP_INTERVALS, DROP_INTERVAL_FLOOR_MS,
    LINE_SCORES, LINES_PER_LEVEL, PERFECT_CLEAR_B2B_BONUS, PERFECT_CLEAR_SCORES,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Base points for the clear after buff multipliers, excluding every bonus.
    pub line_clear_score: u32,
    /// Back-to-back bonus after buff multipliers.
    pub b2b_bonus: u32,
    pub combo_bonus: u32,
    pub perfect_clear_bonus: u32,
    pub total: u32,
    pub qualifies_for_b2b: bool,
    /// Whether this clear continued a back-to-back chain.
    pub b2b_applied: bool,
}

/// No shape is taller than four rows, so a lock clears at most four.
fn table_index(lines: u32) -> usize {
    lines.min(4) as usize
}

/// Calculate line clear score (Classic rules)
/// lines: number of lines cleared
/// level: current level (0-based)
pub fn calculate_line_score(lines: u32, level: u32) -> u32 {
    LINE_SCORES[table_index(lines)].saturating_mul(level + 1)
}

/// Calculate T-spin score (Modern rules)
pub fn calculate_tspin_score(tspin: TSpinKind, lines: u32, level: u32) -> u32 {
    let base = match (tspin, lines) {
        (TSpinKind::Full, 0) => 400,
        (TSpinKind::Full, 1) => 800,
        (TSpinKind::Full, 2) => 1200,
        (TSpinKind::Full, _) => 1600,
        (TSpinKind::Mini, 0) => 100,
        (TSpinKind::Mini, 1) => 200,
        (TSpinKind::Mini, _) => 400,
        (TSpinKind::None, _) => 0,
    };
    base * (level + 1)
}

/// Calculate combo bonus (modern rules).
///
/// - `-1`: no combo chain
/// - `0`: first clear in chain (no bonus)
/// - `1+`: bonus applies as `combo_base * combo_index`
pub fn calculate_combo_bonus(combo_index: i32) -> u32 {
    if combo_index <= 0 {
        return 0;
    }
    COMBO_BASE * (combo_index as u32)
}

/// A "difficult" clear: any T-spin that clears lines, or four or more lines
pub fn qualifies_for_b2b(tspin: TSpinKind, lines: u32) -> bool {
    lines > 0 && (lines >= 4 || tspin != TSpinKind::None)
}

/// Extra half of the 3/2 back-to-back multiplier
pub fn calculate_b2b_bonus(points: u32) -> u32 {
    points.saturating_mul(B2B_NUMERATOR) / B2B_DENOMINATOR - points
}

pub fn calculate_perfect_clear_bonus(lines: u32, level: u32, b2b_applied: bool) -> u32 {
    if lines == 0 {
        return 0;
    }
    let base = PERFECT_CLEAR_SCORES[table_index(lines)].saturating_mul(level + 1);
    if b2b_applied {
        base + PERFECT_CLEAR_B2B_BONUS
    } else {
        base
    }
}

/// Calculate the complete score for a lock.
///
/// `b2b_chain` is the chain length before this lock; `multiplier_percent`
/// is 100 plus any active buff bonuses.
pub fn calculate_score(
    lines: u32,
    level: u32,
    tspin: TSpinKind,
    combo_index: i32,
    b2b_chain: u32,
    perfect_clear: bool,
    multiplier_percent: u32,
) -> ScoreResult {
    let qualifies = qualifies_for_b2b(tspin, lines);
    let b2b_applied = qualifies && b2b_chain > 0;

    let base_points = match tspin {
        TSpinKind::Full | TSpinKind::Mini => calculate_tspin_score(tspin, lines, level),
        TSpinKind::None => calculate_line_score(lines, level),
    };
    let b2b_points = if b2b_applied {
        calculate_b2b_bonus(base_points)
    } else {
        0
    };

    let scale = |points: u32| points.saturating_mul(multiplier_percent) / 100;
    let line_clear_score = scale(base_points);
    let b2b_bonus = scale(b2b_points);

    let combo_bonus = if lines > 0 {
        calculate_combo_bonus(combo_index)
    } else {
        0
    };
    let perfect_clear_bonus = if perfect_clear {
        calculate_perfect_clear_bonus(lines, level, b2b_applied)
    } else {
        0
    };

    let total = line_clear_score
        .saturating_add(b2b_bonus)
        .saturating_add(combo_bonus)
        .saturating_add(perfect_clear_bonus);

    ScoreResult {
        line_clear_score,
        b2b_bonus,
        combo_bonus,
        perfect_clear_bonus,
        total,
        qualifies_for_b2b: qualifies,
        b2b_applied,
    }
}

/// Calculate drop score
/// soft_drop: +1 per cell
/// hard_drop: +2 per cell
pub fn calculate_drop_score(cells: u32, is_hard_drop: bool) -> u32 {
    if is_hard_drop {
        cells * 2
    } else {
        cells
    }
}

/// Level reached from a starting level after `total_lines` cleared.
pub fn calculate_level(start_level: u32, total_lines: u32) -> u32 {
    start_level + total_lines / LINES_PER_LEVEL
}

/// Get drop interval for a level (in milliseconds)
pub fn get_drop_interval_ms(level: u32) -> u32 {
    DROP_INTERVALS
        .get(level as usize)
        .copied()
        .unwrap_or(DROP_INTERVAL_FLOOR_MS)
}

/// Base interval divided by soft drop multiplier
pub fn get_soft_drop_interval_ms(base_interval: u32, multiplier: u32) -> u32 {
    (base_interval / multiplier.max(1)).max(1)
}

/// Garbage rows sent to an opponent for a clear.
pub fn calculate_attack(
    lines: u32,
    tspin: TSpinKind,
    b2b_applied: bool,
    combo_index: i32,
    perfect_clear: bool,
) -> u32 {
    const COMBO_ATTACK: [u32; 12] = [0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 4, 5];
    if lines == 0 {
        return 0;
    }
    let base = match tspin {
        TSpinKind::Full => lines * 2,
        TSpinKind::Mini => lines.saturating_sub(1),
        TSpinKind::None => [0, 0, 1, 2, 4][table_index(lines)],
    };
    let combo = if combo_index > 0 {
        COMBO_ATTACK[(combo_index as usize).min(COMBO_ATTACK.len() - 1)]
    } else {
        0
    };
    let mut attack = base + combo + u32::from(b2b_applied);
    if perfect_clear {
        attack += 10;
    }
    attack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_line_scores() {
        assert_eq!(calculate_line_score(1, 0), 40);
        assert_eq!(calculate_line_score(2, 0), 100);
        assert_eq!(calculate_line_score(3, 0), 300);
        assert_eq!(calculate_line_score(4, 0), 1200);

        assert_eq!(calculate_line_score(1, 5), 40 * 6);
        assert_eq!(calculate_line_score(4, 5), 1200 * 6);
        assert_eq!(calculate_line_score(5, 0), 1200);
    }

    #[test]
    fn test_tspin_scores() {
        assert_eq!(calculate_tspin_score(TSpinKind::Full, 0, 0), 400);
        assert_eq!(calculate_tspin_score(TSpinKind::Full, 1, 0), 800);
        assert_eq!(calculate_tspin_score(TSpinKind::Full, 2, 0), 1200);
        assert_eq!(calculate_tspin_score(TSpinKind::Full, 3, 0), 1600);

        assert_eq!(calculate_tspin_score(TSpinKind::Mini, 0, 0), 100);
        assert_eq!(calculate_tspin_score(TSpinKind::Mini, 1, 0), 200);

        assert_eq!(calculate_tspin_score(TSpinKind::Full, 1, 2), 800 * 3);
    }

    #[test]
    fn test_combo_bonus() {
        assert_eq!(calculate_combo_bonus(-1), 0);
        assert_eq!(calculate_combo_bonus(0), 0);
        assert_eq!(calculate_combo_bonus(1), 50);
        assert_eq!(calculate_combo_bonus(3), 150);
    }

    #[test]
    fn test_b2b_qualification() {
        assert!(qualifies_for_b2b(TSpinKind::None, 4));
        assert!(qualifies_for_b2b(TSpinKind::Full, 1));
        assert!(qualifies_for_b2b(TSpinKind::Mini, 1));
        assert!(!qualifies_for_b2b(TSpinKind::Full, 0));
        assert!(!qualifies_for_b2b(TSpinKind::None, 3));
    }

    #[test]
    fn test_b2b_tetris_adds_half() {
        let result = calculate_score(4, 0, TSpinKind::None, 0, 1, false, 100);
        assert!(result.b2b_applied);
        assert_eq!(result.line_clear_score, 1200);
        assert_eq!(result.b2b_bonus, 600);
        assert_eq!(result.total, 1800);
    }

    #[test]
    fn test_first_tetris_has_no_b2b_bonus() {
        let result = calculate_score(4, 0, TSpinKind::None, 0, 0, false, 100);
        assert!(result.qualifies_for_b2b);
        assert!(!result.b2b_applied);
        assert_eq!(result.total, 1200);
    }

    #[test]
    fn test_perfect_clear_and_b2b_are_additive() {
        let result = calculate_score(4, 0, TSpinKind::None, 0, 2, true, 100);
        assert_eq!(result.line_clear_score, 1200);
        assert_eq!(result.b2b_bonus, 600);
        assert_eq!(result.perfect_clear_bonus, 2000 + PERFECT_CLEAR_B2B_BONUS);
        assert_eq!(result.total, 1200 + 600 + 2000 + PERFECT_CLEAR_B2B_BONUS);
    }

    #[test]
    fn test_multiplier_scales_line_portion_only() {
        let result = calculate_score(1, 0, TSpinKind::None, 2, 0, false, 200);
        assert_eq!(result.line_clear_score, 80);
        assert_eq!(result.combo_bonus, 100);
        assert_eq!(result.total, 180);
    }

    #[test]
    fn test_no_clear_no_combo_bonus() {
        let result = calculate_score(0, 3, TSpinKind::None, 5, 0, false, 100);
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_drop_intervals() {
        assert_eq!(get_drop_interval_ms(0), 1000);
        assert_eq!(get_drop_interval_ms(8), 160);
        assert_eq!(get_drop_interval_ms(9), 120);
        assert_eq!(get_drop_interval_ms(40), 120);
        assert_eq!(get_soft_drop_interval_ms(1000, 10), 100);
        assert_eq!(get_soft_drop_interval_ms(5, 10), 1);
    }

    #[test]
    fn test_level_progression() {
        assert_eq!(calculate_level(0, 9), 0);
        assert_eq!(calculate_level(0, 10), 1);
        assert_eq!(calculate_level(3, 25), 5);
    }

    #[test]
    fn test_attack_table() {
        assert_eq!(calculate_attack(1, TSpinKind::None, false, 0, false), 0);
        assert_eq!(calculate_attack(4, TSpinKind::None, false, 0, false), 4);
        assert_eq!(calculate_attack(4, TSpinKind::None, true, 0, false), 5);
        assert_eq!(calculate_attack(2, TSpinKind::Full, false, 0, false), 4);
        assert_eq!(calculate_attack(1, TSpinKind::None, false, 0, true), 10);
    }
}
