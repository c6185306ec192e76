//! RNG module - bag-based piece generation
//!
//! Implements the bag randomizer: every refill pushes one copy of each shape
//! in the configured set, shuffled. With the standard set this is the classic
//! 7-bag, so every aligned window of seven draws is a permutation of the
//! seven tetrominoes.
//!
//! Also provides the LCG every other deterministic stream (garbage gaps,
//! opponents) is forked from.

use std::collections::VecDeque;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::types::{PieceKind, PREVIEW_LEN};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Independent stream derived from `seed`, so that consuming it never
    /// perturbs the piece sequence.
    pub fn fork(seed: u32, salt: u32) -> Self {
        let mut rng = Self::new(seed ^ salt);
        rng.next_u32();
        rng
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max). Returns 0 when `max` is 0.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // High bits of an LCG are far better distributed than the low ones.
        (self.next_u32() >> 8) % max
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Bag randomizer over a configurable shape set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizerBag {
    shapes: Vec<PieceKind>,
    upcoming: VecDeque<PieceKind>,
    rng: SimpleRng,
    seed: u32,
}

impl RandomizerBag {
    /// Standard 7-bag seeded with `seed`.
    pub fn new(seed: u32) -> Self {
        Self::with_shapes(seed, &PieceKind::STANDARD)
    }

    /// Bag over a custom shape set. Duplicates are ignored and an empty set
    /// falls back to the standard seven.
    pub fn with_shapes(seed: u32, shapes: &[PieceKind]) -> Self {
        let mut set: Vec<PieceKind> = Vec::with_capacity(shapes.len());
        for &kind in shapes {
            if !set.contains(&kind) {
                set.push(kind);
            }
        }
        if set.is_empty() {
            set.extend_from_slice(&PieceKind::STANDARD);
        }

        let mut bag = Self {
            shapes: set,
            upcoming: VecDeque::new(),
            rng: SimpleRng::new(seed),
            seed,
        };
        bag.fill_to(PREVIEW_LEN + 1);
        bag
    }

    fn refill(&mut self) {
        let mut next = self.shapes.clone();
        self.rng.shuffle(&mut next);
        self.upcoming.extend(next);
    }

    fn fill_to(&mut self, len: usize) {
        while self.upcoming.len() < len {
            self.refill();
        }
    }

    /// Draw the next piece, refilling as needed so the preview never runs dry.
    pub fn draw(&mut self) -> PieceKind {
        self.fill_to(PREVIEW_LEN + 1);
        let piece = match self.upcoming.pop_front() {
            Some(piece) => piece,
            None => self.shapes[0],
        };
        self.fill_to(PREVIEW_LEN);
        piece
    }

    /// Peek at the next piece without removing it
    pub fn peek(&self) -> PieceKind {
        self.upcoming.front().copied().unwrap_or(self.shapes[0])
    }

    /// The next `PREVIEW_LEN` pieces, in draw order.
    pub fn preview(&self) -> ArrayVec<PieceKind, PREVIEW_LEN> {
        self.upcoming.iter().copied().take(PREVIEW_LEN).collect()
    }

    /// Shapes each refill draws from.
    pub fn shapes(&self) -> &[PieceKind] {
        &self.shapes
    }

    /// Seed the bag was created with (for restarting with the same sequence)
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for RandomizerBag {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);
        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_next_range_stays_in_bounds() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_range(10) < 10);
        }
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_fork_does_not_share_state() {
        let mut base = SimpleRng::new(99);
        let mut forked = SimpleRng::fork(99, 0x9E37_79B9);
        assert_ne!(base.next_u32(), forked.next_u32());
    }

    #[test]
    fn test_bag_draws_all_seven() {
        let mut bag = RandomizerBag::new(1);

        let mut drawn: Vec<PieceKind> = (0..7).map(|_| bag.draw()).collect();
        drawn.sort_by_key(|k| k.color_code());
        assert_eq!(drawn, PieceKind::STANDARD.to_vec());
    }

    #[test]
    fn test_aligned_windows_are_permutations() {
        let mut bag = RandomizerBag::new(424242);
        for _ in 0..20 {
            let mut window: Vec<PieceKind> = (0..7).map(|_| bag.draw()).collect();
            window.sort_by_key(|k| k.color_code());
            assert_eq!(window, PieceKind::STANDARD.to_vec());
        }
    }

    #[test]
    fn test_peek_matches_draw() {
        let mut bag = RandomizerBag::new(1);
        for _ in 0..30 {
            let peeked = bag.peek();
            assert_eq!(peeked, bag.draw());
        }
    }

    #[test]
    fn test_preview_is_consistent_with_draws() {
        let mut bag = RandomizerBag::new(77);
        for _ in 0..5 {
            let _ = bag.draw();
        }
        let preview = bag.preview();
        assert_eq!(preview.len(), PREVIEW_LEN);
        for expected in preview {
            assert_eq!(bag.draw(), expected);
        }
    }

    #[test]
    fn test_custom_shape_set() {
        let shapes = [PieceKind::T, PieceKind::Plus, PieceKind::T];
        let mut bag = RandomizerBag::with_shapes(5, &shapes);
        assert_eq!(bag.shapes(), &[PieceKind::T, PieceKind::Plus]);
        for _ in 0..10 {
            assert!(matches!(bag.draw(), PieceKind::T | PieceKind::Plus));
        }
    }

    #[test]
    fn test_empty_shape_set_falls_back_to_standard() {
        let bag = RandomizerBag::with_shapes(5, &[]);
        assert_eq!(bag.shapes(), &PieceKind::STANDARD);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomizerBag::new(31337);
        let mut b = RandomizerBag::new(31337);
        for _ in 0..50 {
            assert_eq!(a.draw(), b.draw());
        }
    }
}
