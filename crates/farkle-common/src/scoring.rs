use serde::{Deserialize, Serialize};

use crate::dice::{is_die_value, NUM_DICE};

pub const SINGLE_ONE: u32 = 100;
pub const SINGLE_FIVE: u32 = 50;
pub const FULL_STRAIGHT: u32 = 1500;
pub const LOW_STRAIGHT: u32 = 500;
pub const HIGH_STRAIGHT: u32 = 750;

const FULL_RUN: [u8; 6] = [1, 2, 3, 4, 5, 6];
const LOW_RUN: [u8; 5] = [1, 2, 3, 4, 5];
const HIGH_RUN: [u8; 5] = [2, 3, 4, 5, 6];

/// The scoring part of a set of dice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidDice {
    pub dice: Vec<u8>,
    pub score: u32,
}

impl ValidDice {
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }
}

/// Best score for a multiset of dice. Order does not matter.
pub fn score(dice: &[u8]) -> u32 {
    extract_valid(dice).score
}

/// Splits out the dice that belong to a scoring group and scores them.
///
/// Groups are taken in a fixed order, each consuming its dice before the next
/// looks at the rest: six-dice straight, five-dice straight on the five lowest
/// values, every value showing three or more times, then single 1s and 5s.
/// Anything left over is dropped from the result.
pub fn extract_valid(dice: &[u8]) -> ValidDice {
    check_dice(dice);

    let mut sorted = dice.to_vec();
    sorted.sort_unstable();

    if sorted == FULL_RUN {
        return ValidDice {
            dice: dice.to_vec(),
            score: FULL_STRAIGHT,
        };
    }

    let mut valid = Vec::with_capacity(dice.len());
    let mut total = 0;
    let mut remaining = dice.to_vec();

    if let Some(bonus) = five_straight(&sorted) {
        total += bonus;
        valid.extend_from_slice(&sorted[..5]);
        remaining = sorted[5..].to_vec();
    }

    let counts = value_counts(&remaining);
    for value in 1..=6u8 {
        let count = counts[value as usize];
        if count >= 3 {
            total += kind_score(value, count);
            valid.extend(std::iter::repeat(value).take(count));
        }
    }
    remaining.retain(|&d| counts[d as usize] < 3);

    for die in remaining {
        match die {
            1 => {
                total += SINGLE_ONE;
                valid.push(die);
            }
            5 => {
                total += SINGLE_FIVE;
                valid.push(die);
            }
            _ => {}
        }
    }

    ValidDice {
        dice: valid,
        score: total,
    }
}

/// Whether any die in the set can score. Agrees with `score(dice) > 0`.
pub fn has_any_score(dice: &[u8]) -> bool {
    check_dice(dice);

    if dice.contains(&1) || dice.contains(&5) {
        return true;
    }
    if value_counts(dice).iter().any(|&c| c >= 3) {
        return true;
    }

    let mut sorted = dice.to_vec();
    sorted.sort_unstable();
    sorted == FULL_RUN || five_straight(&sorted).is_some()
}

/// Score for `count` dice all showing `value`; zero below three.
pub fn kind_score(value: u8, count: usize) -> u32 {
    let triple = if value == 1 { 1000 } else { value as u32 * 100 };
    match count {
        0..=2 => 0,
        3 => triple,
        4 => triple * 2,
        5 => triple * 3,
        _ => triple * 4,
    }
}

fn five_straight(sorted: &[u8]) -> Option<u32> {
    if sorted.len() < 5 {
        return None;
    }
    if sorted[..5] == LOW_RUN {
        Some(LOW_STRAIGHT)
    } else if sorted[..5] == HIGH_RUN {
        Some(HIGH_STRAIGHT)
    } else {
        None
    }
}

fn value_counts(dice: &[u8]) -> [usize; 7] {
    let mut counts = [0usize; 7]; // index 0 unused, 1..=6
    for &d in dice {
        counts[d as usize] += 1;
    }
    counts
}

fn check_dice(dice: &[u8]) {
    assert!(
        dice.len() <= NUM_DICE,
        "{} dice in play, at most {} exist",
        dice.len(),
        NUM_DICE
    );
    assert!(
        dice.iter().all(|&d| is_die_value(d)),
        "die value out of range: {:?}",
        dice
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut dice: Vec<u8>) -> Vec<u8> {
        dice.sort_unstable();
        dice
    }

    /// Every multiset of `len` dice, as non-decreasing sequences.
    fn multisets(len: usize) -> Vec<Vec<u8>> {
        fn fill(start: u8, left: usize, current: &mut Vec<u8>, out: &mut Vec<Vec<u8>>) {
            if left == 0 {
                out.push(current.clone());
                return;
            }
            for value in start..=6 {
                current.push(value);
                fill(value, left - 1, current, out);
                current.pop();
            }
        }
        let mut out = Vec::new();
        fill(1, len, &mut Vec::new(), &mut out);
        out
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(score(&[]), 0);
        assert!(!has_any_score(&[]));
        assert_eq!(extract_valid(&[]), ValidDice::default());
    }

    #[test]
    fn test_full_straight() {
        assert_eq!(score(&[1, 2, 3, 4, 5, 6]), 1500);
        assert_eq!(score(&[6, 4, 2, 1, 3, 5]), 1500);
        assert_eq!(score(&[3, 1, 6, 5, 2, 4]), 1500);
    }

    #[test]
    fn test_triples() {
        assert_eq!(score(&[1, 1, 1]), 1000);
        assert_eq!(score(&[2, 2, 2]), 200);
        assert_eq!(score(&[3, 3, 3]), 300);
        assert_eq!(score(&[4, 4, 4]), 400);
        assert_eq!(score(&[5, 5, 5]), 500);
        assert_eq!(score(&[6, 6, 6]), 600);
    }

    #[test]
    fn test_four_ones_is_not_triple_plus_single() {
        assert_eq!(score(&[1, 1, 1, 1]), 2000);
    }

    #[test]
    fn test_larger_kinds() {
        assert_eq!(score(&[4, 4, 4, 4]), 800);
        assert_eq!(score(&[6, 6, 6, 6, 6]), 1800);
        assert_eq!(score(&[1, 1, 1, 1, 1]), 3000);
        assert_eq!(score(&[2, 2, 2, 2, 2, 2]), 800);
        assert_eq!(score(&[1, 1, 1, 1, 1, 1]), 4000);
        assert_eq!(score(&[5, 5, 5, 5, 5, 5]), 2000);
    }

    #[test]
    fn test_pairs_score_as_singles() {
        assert_eq!(score(&[5, 5]), 100);
        assert_eq!(score(&[1, 1]), 200);
        assert_eq!(score(&[1, 5]), 150);
    }

    #[test]
    fn test_dead_dice_score_nothing() {
        assert_eq!(score(&[2, 3, 4, 6]), 0);
        assert_eq!(score(&[2, 2, 3, 3, 4, 6]), 0);
    }

    #[test]
    fn test_mixed_groups() {
        assert_eq!(score(&[1, 1, 1, 5, 5, 5]), 1500);
        assert_eq!(score(&[3, 3, 3, 3, 1, 5]), 750);
        assert_eq!(score(&[2, 2, 2, 1, 5]), 350);
        assert_eq!(score(&[6, 6, 6, 2, 2, 2]), 800);
    }

    #[test]
    fn test_five_straights() {
        assert_eq!(score(&[1, 2, 3, 4, 5]), 500);
        assert_eq!(score(&[2, 3, 4, 5, 6]), 750);
        assert_eq!(score(&[5, 4, 3, 2, 1]), 500);
    }

    #[test]
    fn test_five_straight_spare_die_scores_as_single() {
        assert_eq!(score(&[1, 2, 3, 4, 5, 5]), 550);
        assert_eq!(score(&[1, 2, 3, 4, 5, 1]), 250);
        assert_eq!(score(&[2, 3, 4, 5, 6, 6]), 750);
    }

    #[test]
    fn test_five_straight_only_on_lowest_five() {
        // 1,1,2,3,4,5: lowest five are 1,1,2,3,4, so only the singles count
        assert_eq!(score(&[1, 1, 2, 3, 4, 5]), 250);
        // 2,3,4,5,5,6: lowest five are 2,3,4,5,5
        assert_eq!(score(&[2, 3, 4, 5, 6, 5]), 100);
    }

    #[test]
    fn test_kind_score_table() {
        assert_eq!(kind_score(3, 2), 0);
        assert_eq!(kind_score(1, 3), 1000);
        assert_eq!(kind_score(1, 4), 2000);
        assert_eq!(kind_score(1, 5), 3000);
        assert_eq!(kind_score(1, 6), 4000);
        assert_eq!(kind_score(6, 4), 1200);
        assert_eq!(kind_score(3, 5), 900);
        assert_eq!(kind_score(4, 6), 1600);
    }

    #[test]
    fn test_detector_agrees_with_scorer() {
        for len in 0..=NUM_DICE {
            for dice in multisets(len) {
                assert_eq!(
                    has_any_score(&dice),
                    score(&dice) > 0,
                    "disagreement on {:?}",
                    dice
                );
            }
        }
    }

    #[test]
    fn test_detector_cases() {
        assert!(has_any_score(&[2, 3, 1]));
        assert!(has_any_score(&[6, 5]));
        assert!(has_any_score(&[2, 2, 2]));
        assert!(!has_any_score(&[2, 2, 3, 3, 4, 6]));
        assert!(!has_any_score(&[6]));
    }

    #[test]
    fn test_extract_drops_stray_dice() {
        let valid = extract_valid(&[3, 4, 1, 1, 1]);
        assert_eq!(valid.dice, vec![1, 1, 1]);
        assert_eq!(valid.score, 1000);
    }

    #[test]
    fn test_extract_nothing_valid() {
        let valid = extract_valid(&[2, 3, 4]);
        assert!(valid.is_empty());
        assert_eq!(valid.score, 0);
    }

    #[test]
    fn test_extract_full_straight_keeps_everything() {
        let valid = extract_valid(&[6, 5, 4, 3, 2, 1]);
        assert_eq!(valid.len(), 6);
        assert_eq!(valid.score, 1500);
    }

    #[test]
    fn test_extract_straight_with_spare() {
        let valid = extract_valid(&[5, 1, 2, 3, 4, 5]);
        assert_eq!(sorted(valid.dice), vec![1, 2, 3, 4, 5, 5]);
        assert_eq!(valid.score, 550);

        let valid = extract_valid(&[6, 2, 3, 4, 5, 6]);
        assert_eq!(sorted(valid.dice), vec![2, 3, 4, 5, 6]);
        assert_eq!(valid.score, 750);
    }

    #[test]
    fn test_extract_keeps_whole_run_of_a_kind() {
        let valid = extract_valid(&[4, 4, 4, 4, 2]);
        assert_eq!(valid.dice, vec![4, 4, 4, 4]);
        assert_eq!(valid.score, 800);
    }

    #[test]
    fn test_extract_singles_among_junk() {
        let valid = extract_valid(&[1, 2, 3, 3, 4, 5]);
        assert_eq!(sorted(valid.dice), vec![1, 5]);
        assert_eq!(valid.score, 150);
    }

    #[test]
    fn test_extract_score_matches_score() {
        for len in 0..=NUM_DICE {
            for dice in multisets(len) {
                let valid = extract_valid(&dice);
                assert_eq!(valid.score, score(&dice));
                assert!(valid.len() <= dice.len());
                assert_eq!(score(&valid.dice), valid.score, "subset of {:?}", dice);
            }
        }
    }

    #[test]
    #[should_panic(expected = "die value out of range")]
    fn test_rejects_bad_face() {
        score(&[0, 1]);
    }

    #[test]
    #[should_panic(expected = "at most 6 exist")]
    fn test_rejects_seven_dice() {
        score(&[1, 1, 1, 1, 1, 1, 1]);
    }
}
