//! Fan-out based sizing of internal driver stages.

use serde::{Deserialize, Serialize};

/// Smallest segment count of any derived stage.
pub const MIN_SEG: usize = 2;

/// What an internal stage drives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum StageRole {
    /// A stage driving the primary input load.
    Input,
    /// A feedback (keeper) stage.
    Feedback,
}

/// Fan-out ratio per stage role.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FanoutTable {
    pub input: usize,
    pub feedback: usize,
}

impl Default for FanoutTable {
    fn default() -> Self {
        Self {
            input: 4,
            feedback: 8,
        }
    }
}

impl FanoutTable {
    pub fn ratio(&self, role: StageRole) -> usize {
        match role {
            StageRole::Input => self.input,
            StageRole::Feedback => self.feedback,
        }
    }
}

/// Rounds `num / den` to the nearest integer, ties to even.
pub fn round_half_even(num: usize, den: usize) -> usize {
    let q = num / den;
    let r = num % den;
    match (2 * r).cmp(&den) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q % 2),
    }
}

/// Segment count of a stage sized from `reference` segments.
///
/// The result is `max(min_seg, round(reference / (2 * ratio)) * 2)`.
pub fn fanout_seg(reference: usize, role: StageRole, table: &FanoutTable, min_seg: usize) -> usize {
    let ratio = table.ratio(role).max(1);
    std::cmp::max(min_seg, round_half_even(reference, 2 * ratio) * 2)
}

/// [`fanout_seg`] with the default table and minimum.
#[inline]
pub fn stage_seg(reference: usize, role: StageRole) -> usize {
    fanout_seg(reference, role, &FanoutTable::default(), MIN_SEG)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! stage_seg_cases {
        ($($name:ident: $seg:expr, $role:ident => $expected:expr;)*) => {
            paste::paste! {
                $(
                    #[test]
                    fn [<test_stage_seg_ $name>]() {
                        assert_eq!(stage_seg($seg, StageRole::$role), $expected);
                    }
                )*
            }
        };
    }

    stage_seg_cases! {
        latch_input_16: 16, Input => 4;
        latch_feedback_16: 16, Feedback => 2;
        tie_rounds_to_even_4: 4, Input => 2;
        tie_rounds_to_even_12: 12, Input => 4;
        tie_rounds_down_to_even_20: 20, Input => 4;
        tiny_reference: 1, Feedback => 2;
        large_input_100: 100, Input => 24;
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(1, 2), 0);
        assert_eq!(round_half_even(3, 2), 2);
        assert_eq!(round_half_even(5, 2), 2);
        assert_eq!(round_half_even(7, 4), 2);
        assert_eq!(round_half_even(0, 3), 0);
    }

    #[test]
    fn test_monotonic_even_and_floored() {
        let table = FanoutTable::default();
        for role in [StageRole::Input, StageRole::Feedback] {
            let mut prev = 0;
            for seg in 0..200 {
                let s = fanout_seg(seg, role, &table, MIN_SEG);
                assert!(s >= prev, "seg {seg}: {s} < {prev}");
                assert!(s >= MIN_SEG);
                assert_eq!(s % 2, 0);
                prev = s;
            }
        }
    }

    #[test]
    fn test_custom_table() {
        let table = FanoutTable {
            input: 2,
            feedback: 16,
        };
        assert_eq!(fanout_seg(16, StageRole::Input, &table, 2), 8);
        assert_eq!(fanout_seg(16, StageRole::Feedback, &table, 4), 4);
    }
}
