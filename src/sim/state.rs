//! Floating card state
//!
//! The card collection is fixed for the lifetime of a field; cards are
//! addressed by position and keep their index across frames.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Geometry;
use crate::settings::Tuning;
use crate::{START_SLOTS, unit_from_angle};

/// One floating stat card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub index: usize,
    /// Top-left corner in container coordinates
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Card {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Rendered offset of one card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardOffset {
    pub index: usize,
    pub x: f32,
    pub y: f32,
}

/// Snapshot emitted once per simulated frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionFrame {
    pub offsets: Vec<CardOffset>,
}

impl MotionFrame {
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// All cards plus the RNG that drives their drift
#[derive(Debug, Clone)]
pub struct FloatingField {
    pub cards: Vec<Card>,
    pub tuning: Tuning,
    pub(crate) rng: Pcg32,
    /// Frames simulated so far
    pub frames: u64,
}

impl FloatingField {
    /// Create cards of the given sizes at shuffled start slots
    ///
    /// Start slots are picked without repetition until the list runs out, then
    /// reused. Each card heads off in a random direction at a random speed
    /// within the tuned bounds.
    pub fn new(sizes: &[Vec2], geometry: &Geometry, tuning: Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let mut slots: Vec<usize> = (0..START_SLOTS.len()).collect();
        slots.shuffle(&mut rng);

        let cards = sizes
            .iter()
            .enumerate()
            .map(|(index, &size)| {
                let (sx, sy) = START_SLOTS[slots[index % slots.len()]];
                let (lo, hi) = geometry.card_bounds(size, tuning.edge_pad);
                let pos = lo + (hi - lo) * Vec2::new(sx, sy);

                let heading = rng.random_range(0.0..std::f32::consts::TAU);
                let speed = if tuning.max_speed > tuning.min_speed {
                    rng.random_range(tuning.min_speed..tuning.max_speed)
                } else {
                    tuning.min_speed
                };

                Card {
                    index,
                    pos,
                    vel: unit_from_angle(heading) * speed,
                    size,
                }
            })
            .collect();

        log::info!("Floating field: {} cards, seed {}", sizes.len(), seed);

        Self {
            cards,
            tuning,
            rng,
            frames: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Current offsets without stepping
    pub fn snapshot(&self) -> MotionFrame {
        MotionFrame {
            offsets: self
                .cards
                .iter()
                .map(|c| CardOffset {
                    index: c.index,
                    x: c.pos.x,
                    y: c.pos.y,
                })
                .collect(),
        }
    }

    /// Re-fit cards into a new container after a resize
    pub fn refit(&mut self, geometry: &Geometry) {
        let pad = self.tuning.edge_pad;
        for card in &mut self.cards {
            let (lo, hi) = geometry.card_bounds(card.size, pad);
            card.pos = card.pos.clamp(lo, hi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Layout;

    fn geometry() -> Geometry {
        Geometry::from_layout(
            &Layout::full_viewport(Vec2::new(1000.0, 800.0)),
            &Tuning::default(),
        )
    }

    #[test]
    fn test_cards_start_in_bounds_with_bounded_speed() {
        let tuning = Tuning::default();
        let sizes = vec![Vec2::new(180.0, 90.0); 6];
        let field = FloatingField::new(&sizes, &geometry(), tuning.clone(), 7);

        assert_eq!(field.cards.len(), 6);
        for (i, card) in field.cards.iter().enumerate() {
            assert_eq!(card.index, i);
            let (lo, hi) = geometry().card_bounds(card.size, tuning.edge_pad);
            assert!(card.pos.cmpge(lo).all() && card.pos.cmple(hi).all());
            assert!(card.speed() >= tuning.min_speed - 1e-3);
            assert!(card.speed() <= tuning.max_speed + 1e-3);
        }
    }

    #[test]
    fn test_distinct_start_slots() {
        let sizes = vec![Vec2::new(100.0, 50.0); START_SLOTS.len()];
        let field = FloatingField::new(&sizes, &geometry(), Tuning::default(), 3);
        for (i, a) in field.cards.iter().enumerate() {
            for b in &field.cards[i + 1..] {
                assert_ne!(a.pos, b.pos);
            }
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let sizes = vec![Vec2::new(120.0, 60.0); 4];
        let a = FloatingField::new(&sizes, &geometry(), Tuning::default(), 99);
        let b = FloatingField::new(&sizes, &geometry(), Tuning::default(), 99);
        assert_eq!(a.cards, b.cards);
    }

    #[test]
    fn test_refit_after_shrink() {
        let sizes = vec![Vec2::new(120.0, 60.0); 4];
        let mut field = FloatingField::new(&sizes, &geometry(), Tuning::default(), 5);
        let small = Geometry::from_layout(
            &Layout::full_viewport(Vec2::new(400.0, 300.0)),
            &Tuning::default(),
        );
        field.refit(&small);
        for card in &field.cards {
            assert!(card.pos.x <= 400.0 - 120.0 - field.tuning.edge_pad);
            assert!(card.pos.y <= 300.0 - 60.0 - field.tuning.edge_pad);
        }
    }
}
