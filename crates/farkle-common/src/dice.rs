use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const NUM_DICE: usize = 6;

/// Source of die faces for a roll.
pub trait DieSource {
    fn roll_die(&mut self) -> u8;

    fn roll(&mut self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.roll_die()).collect()
    }
}

/// Fair six-sided dice backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomDice<R> {
    rng: R,
}

impl<R: Rng> RandomDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

/// The generator hosts roll with.
pub type StdDice = RandomDice<StdRng>;

impl RandomDice<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DieSource for RandomDice<R> {
    fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}

pub fn is_die_value(value: u8) -> bool {
    (1..=6).contains(&value)
}

/// Unicode face for a die value, `?` for anything outside 1..=6.
pub fn die_face(value: u8) -> char {
    match value {
        1 => '⚀',
        2 => '⚁',
        3 => '⚂',
        4 => '⚃',
        5 => '⚄',
        6 => '⚅',
        _ => '?',
    }
}

/// Scripted dice, replayed in order. Panics when the script runs dry.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct LoadedDice {
    faces: std::collections::VecDeque<u8>,
}

#[cfg(test)]
impl LoadedDice {
    pub fn new(faces: &[u8]) -> Self {
        Self {
            faces: faces.iter().copied().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

#[cfg(test)]
impl DieSource for LoadedDice {
    fn roll_die(&mut self) -> u8 {
        self.faces.pop_front().expect("loaded dice exhausted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_dice_in_range() {
        let mut dice = RandomDice::seeded(42);
        let roll = dice.roll(600);
        assert_eq!(roll.len(), 600);
        assert!(roll.iter().all(|&d| is_die_value(d)));
    }

    #[test]
    fn test_random_dice_hits_every_face() {
        let mut dice = RandomDice::seeded(7);
        let roll = dice.roll(600);
        for face in 1..=6 {
            assert!(roll.contains(&face), "face {} never rolled", face);
        }
    }

    #[test]
    fn test_seeded_dice_are_deterministic() {
        let a = RandomDice::seeded(123).roll(NUM_DICE);
        let b = RandomDice::seeded(123).roll(NUM_DICE);
        assert_eq!(a, b);
    }

    #[test]
    fn test_roll_zero_dice() {
        let mut dice = RandomDice::seeded(1);
        assert!(dice.roll(0).is_empty());
    }

    #[test]
    fn test_loaded_dice_replay_in_order() {
        let mut dice = LoadedDice::new(&[1, 2, 3, 4]);
        assert_eq!(dice.roll(3), vec![1, 2, 3]);
        assert_eq!(dice.remaining(), 1);
        assert_eq!(dice.roll_die(), 4);
    }

    #[test]
    fn test_die_faces() {
        assert_eq!(die_face(1), '⚀');
        assert_eq!(die_face(6), '⚅');
        assert_eq!(die_face(0), '?');
        assert_eq!(die_face(7), '?');
    }
}
