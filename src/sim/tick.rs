//! Per-frame motion step
//!
//! Advances every card once, in index order, and only then emits the frame
//! snapshot, so a renderer never sees a half-updated field.

use glam::Vec2;
use rand::Rng;

use super::geometry::Geometry;
use super::repulsion::{Contact, apply_ring, apply_walls, apply_zone, clamp_speed, hard_clamp};
use super::state::{FloatingField, MotionFrame};

/// Boundary contacts seen during one step (for logging and tests)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub wall_hits: u32,
    pub ring_hits: u32,
    pub zone_hits: u32,
}

/// Advance the field by `dt` seconds against `geometry`
///
/// `dt` is clamped to `[0, max_frame_dt]`; a non-finite `dt` counts as zero.
/// An empty field or a zero-area container is a no-op that returns an empty
/// frame.
pub fn step(field: &mut FloatingField, geometry: &Geometry, dt: f32) -> (MotionFrame, StepStats) {
    let mut stats = StepStats::default();
    if field.is_empty() || geometry.is_degenerate() {
        return (MotionFrame::default(), stats);
    }

    let dt = if dt.is_finite() {
        dt.max(0.0).min(field.tuning.max_frame_dt)
    } else {
        0.0
    };

    let FloatingField {
        cards, tuning, rng, ..
    } = field;

    for card in cards.iter_mut() {
        // Drift
        let jitter = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
        card.vel += jitter * tuning.drift * dt;

        card.vel = clamp_speed(card.vel, tuning);

        card.pos += card.vel * dt;

        if apply_walls(card, geometry, tuning, dt) == Contact::Hard {
            stats.wall_hits += 1;
        }

        if apply_ring(card, &geometry.ring, tuning, dt, rng) == Contact::Hard {
            stats.ring_hits += 1;
        }

        for zone in &geometry.zones {
            if apply_zone(card, zone, geometry, tuning, dt) == Contact::Hard {
                stats.zone_hits += 1;
            }
        }

        hard_clamp(card, geometry, tuning);
    }

    field.frames += 1;
    if stats != StepStats::default() {
        log::trace!("Frame {}: {:?}", field.frames, stats);
    }

    (field.snapshot(), stats)
}

impl FloatingField {
    /// Advance one frame and return the snapshot to render
    pub fn step(&mut self, geometry: &Geometry, dt: f32) -> MotionFrame {
        step(self, geometry, dt).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;
    use crate::sim::geometry::{Layout, Rect};
    use crate::sim::state::Card;
    use proptest::prelude::*;

    fn geometry(w: f32, h: f32) -> Geometry {
        Geometry::from_layout(&Layout::full_viewport(Vec2::new(w, h)), &Tuning::default())
    }

    fn field_with(cards: Vec<Card>, tuning: Tuning) -> FloatingField {
        let geo = geometry(1000.0, 800.0);
        let mut field = FloatingField::new(&[], &geo, tuning, 1);
        field.cards = cards;
        field
    }

    fn in_bounds(card: &Card, geo: &Geometry, pad: f32) -> bool {
        let (lo, hi) = geo.card_bounds(card.size, pad);
        card.pos.cmpge(lo - Vec2::splat(1e-3)).all() && card.pos.cmple(hi + Vec2::splat(1e-3)).all()
    }

    #[test]
    fn test_out_of_bounds_card_clamped_in_one_step() {
        let geo = geometry(1000.0, 800.0);
        let mut field = field_with(
            vec![Card {
                index: 0,
                pos: Vec2::new(-50.0, -50.0),
                vel: Vec2::new(-20.0, -10.0),
                size: Vec2::new(100.0, 50.0),
            }],
            Tuning::default(),
        );
        let frame = field.step(&geo, 0.016);
        assert_eq!(frame.offsets.len(), 1);
        assert!(in_bounds(&field.cards[0], &geo, field.tuning.edge_pad));
    }

    #[test]
    fn test_zero_dt_leaves_free_card_in_place() {
        let geo = geometry(1000.0, 800.0);
        let start = Card {
            index: 0,
            pos: Vec2::new(200.0, 300.0),
            vel: Vec2::new(20.0, 10.0),
            size: Vec2::new(100.0, 50.0),
        };
        let mut field = field_with(vec![start.clone()], Tuning::default());
        let (_, stats) = step(&mut field, &geo, 0.0);
        assert_eq!(stats, StepStats::default());
        assert_eq!(field.cards[0].pos, start.pos);
        assert!((field.cards[0].vel - start.vel).length() < 1e-5);
    }

    #[test]
    fn test_card_at_ring_centre_moves_away() {
        let geo = geometry(1000.0, 800.0);
        let size = Vec2::new(100.0, 50.0);
        let mut field = field_with(
            vec![Card {
                index: 0,
                pos: geo.ring.center - size * 0.5,
                vel: Vec2::ZERO,
                size,
            }],
            Tuning::default(),
        );
        field.step(&geo, 0.016);
        let d = (field.cards[0].center() - geo.ring.center).length();
        assert!(d.is_finite());
        assert!(d > 0.0);
    }

    #[test]
    fn test_zone_overlap_resolved_in_one_frame() {
        let geo = geometry(1000.0, 800.0);
        let nav: Rect = geo.zones[0];
        let mut field = field_with(
            vec![Card {
                index: 0,
                pos: Vec2::new(400.0, 12.0),
                vel: Vec2::new(0.0, -20.0),
                size: Vec2::new(100.0, 50.0),
            }],
            Tuning::default(),
        );
        let (_, stats) = step(&mut field, &geo, 0.016);
        assert!(stats.zone_hits >= 1);
        assert!(!nav.overlaps(field.cards[0].pos, field.cards[0].size));
    }

    #[test]
    fn test_fab_stack_overlap_resolved_every_frame() {
        let geo = geometry(1000.0, 800.0);
        let mut tuning = Tuning::default();
        tuning.drift = 0.0;
        let mut field = field_with(
            vec![Card {
                index: 0,
                pos: Vec2::new(888.0, 690.0),
                vel: Vec2::ZERO,
                size: Vec2::new(100.0, 50.0),
            }],
            tuning,
        );
        for frame in 0..120 {
            field.step(&geo, 1.0 / 60.0);
            let card = &field.cards[0];
            assert!(
                geo.zones.iter().all(|z| !z.overlaps(card.pos, card.size)),
                "frame {} ended inside a zone at {:?}",
                frame,
                card.pos
            );
        }
    }

    #[test]
    fn test_empty_field_and_degenerate_container_are_noops() {
        let mut empty = field_with(Vec::new(), Tuning::default());
        assert!(empty.step(&geometry(1000.0, 800.0), 0.016).is_empty());
        assert_eq!(empty.frames, 0);

        let card = Card {
            index: 0,
            pos: Vec2::new(200.0, 300.0),
            vel: Vec2::new(20.0, 0.0),
            size: Vec2::new(100.0, 50.0),
        };
        let mut field = field_with(vec![card.clone()], Tuning::default());
        assert!(field.step(&geometry(0.0, 0.0), 0.016).is_empty());
        assert_eq!(field.cards[0], card);
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let geo = geometry(1000.0, 800.0);
        let card = Card {
            index: 0,
            pos: Vec2::new(200.0, 300.0),
            vel: Vec2::new(20.0, 0.0),
            size: Vec2::new(100.0, 50.0),
        };
        let mut tuning = Tuning::default();
        tuning.drift = 0.0;
        let max_dt = tuning.max_frame_dt;
        let mut field = field_with(vec![card], tuning);
        field.step(&geo, 5.0);
        assert!((field.cards[0].pos.x - (200.0 + 20.0 * max_dt)).abs() < 1e-3);
    }

    #[test]
    fn test_identities_stable_across_frames() {
        let geo = geometry(1280.0, 720.0);
        let sizes = vec![Vec2::new(160.0, 80.0); 5];
        let mut field = FloatingField::new(&sizes, &geo, Tuning::default(), 42);
        for _ in 0..300 {
            let frame = field.step(&geo, 1.0 / 60.0);
            let indices: Vec<usize> = frame.offsets.iter().map(|o| o.index).collect();
            assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        }
    }

    proptest! {
        #[test]
        fn prop_cards_stay_in_bounds(
            w in 300.0f32..2000.0,
            h in 300.0f32..1400.0,
            px in -200.0f32..2200.0,
            py in -200.0f32..1600.0,
            vx in -200.0f32..200.0,
            vy in -200.0f32..200.0,
            cw in 40.0f32..220.0,
            ch in 30.0f32..140.0,
            dt in 0.0f32..0.5,
            seed in any::<u64>(),
        ) {
            let geo = geometry(w, h);
            let mut field = FloatingField::new(&[], &geo, Tuning::default(), seed);
            field.cards = vec![Card {
                index: 0,
                pos: Vec2::new(px, py),
                vel: Vec2::new(vx, vy),
                size: Vec2::new(cw, ch),
            }];
            for _ in 0..5 {
                field.step(&geo, dt);
                prop_assert!(in_bounds(&field.cards[0], &geo, field.tuning.edge_pad));
                prop_assert!(field.cards[0].vel.is_finite());
            }
        }

        #[test]
        fn prop_clamped_speed_within_bounds(vx in -500.0f32..500.0, vy in -500.0f32..500.0) {
            let tuning = Tuning::default();
            let v = clamp_speed(Vec2::new(vx, vy), &tuning);
            let speed = v.length();
            if Vec2::new(vx, vy).length() > crate::consts::SPEED_EPSILON {
                prop_assert!(speed >= tuning.min_speed - 1e-3);
                prop_assert!(speed <= tuning.max_speed + 1e-3);
            }
        }
    }
}
