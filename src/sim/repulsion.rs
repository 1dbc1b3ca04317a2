//! Boundary handling for floating cards
//!
//! Each boundary has two layers: a soft, penetration-proportional push that
//! bends a card away before contact, and a hard correction that guarantees
//! the card never ends up where it must not be.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::geometry::{Geometry, Rect, Ring};
use super::state::Card;
use crate::settings::Tuning;
use crate::unit_from_angle;

/// Which hard correction (if any) a boundary applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    Soft,
    Hard,
}

/// Rescale velocity into [min_speed, max_speed], keeping direction
///
/// Near-zero velocities have no usable direction and are left alone.
pub fn clamp_speed(vel: Vec2, tuning: &Tuning) -> Vec2 {
    let speed = vel.length();
    if speed <= crate::consts::SPEED_EPSILON {
        vel
    } else if speed < tuning.min_speed {
        vel * (tuning.min_speed / speed)
    } else if speed > tuning.max_speed {
        vel * (tuning.max_speed / speed)
    } else {
        vel
    }
}

/// Snap a card into [lo, hi] per axis, bouncing outward velocity
fn clamp_and_bounce(card: &mut Card, lo: Vec2, hi: Vec2, damping: f32) -> bool {
    let mut hit = false;
    if card.pos.x < lo.x {
        card.pos.x = lo.x;
        if card.vel.x < 0.0 {
            card.vel.x = -card.vel.x * damping;
        }
        hit = true;
    } else if card.pos.x > hi.x {
        card.pos.x = hi.x;
        if card.vel.x > 0.0 {
            card.vel.x = -card.vel.x * damping;
        }
        hit = true;
    }
    if card.pos.y < lo.y {
        card.pos.y = lo.y;
        if card.vel.y < 0.0 {
            card.vel.y = -card.vel.y * damping;
        }
        hit = true;
    } else if card.pos.y > hi.y {
        card.pos.y = hi.y;
        if card.vel.y > 0.0 {
            card.vel.y = -card.vel.y * damping;
        }
        hit = true;
    }
    hit
}

/// Soft push from all four walls, then hard clamp + bounce
pub fn apply_walls(card: &mut Card, geometry: &Geometry, tuning: &Tuning, dt: f32) -> Contact {
    let (lo, hi) = geometry.card_bounds(card.size, tuning.edge_pad);
    let fade = tuning.wall_fade;
    let k = tuning.wall_strength * dt;
    let mut contact = Contact::None;

    let left = lo.x + fade - card.pos.x;
    if left > 0.0 {
        card.vel.x += k * left.min(fade);
        contact = Contact::Soft;
    }
    let right = card.pos.x - (hi.x - fade);
    if right > 0.0 {
        card.vel.x -= k * right.min(fade);
        contact = Contact::Soft;
    }
    let top = lo.y + fade - card.pos.y;
    if top > 0.0 {
        card.vel.y += k * top.min(fade);
        contact = Contact::Soft;
    }
    let bottom = card.pos.y - (hi.y - fade);
    if bottom > 0.0 {
        card.vel.y -= k * bottom.min(fade);
        contact = Contact::Soft;
    }

    if clamp_and_bounce(card, lo, hi, tuning.bounce_damping) {
        Contact::Hard
    } else {
        contact
    }
}

/// Keep a card's centre out of the exclusion ring
///
/// A card sitting exactly on the ring centre has no outward direction, so it
/// is ejected along a random angle at base speed instead.
pub fn apply_ring(card: &mut Card, ring: &Ring, tuning: &Tuning, dt: f32, rng: &mut Pcg32) -> Contact {
    if ring.radius <= 0.0 {
        return Contact::None;
    }

    let offset = card.center() - ring.center;
    let dist = offset.length();

    if dist < 1e-3 {
        let dir = unit_from_angle(rng.random_range(0.0..std::f32::consts::TAU));
        let center = ring.center + dir * (ring.radius + tuning.ring_snap_offset);
        card.pos = center - card.size * 0.5;
        card.vel = dir * tuning.base_speed;
        log::debug!("Card {} ejected from ring centre", card.index);
        return Contact::Hard;
    }

    let outer = ring.radius + tuning.ring_margin;
    if dist >= outer {
        return Contact::None;
    }

    let normal = offset / dist;
    let accel = (tuning.ring_strength * (outer - dist)).min(tuning.ring_max_accel);
    card.vel += normal * accel * dt;

    if dist < ring.radius {
        let center = ring.center + normal * (ring.radius + tuning.ring_snap_offset);
        card.pos = center - card.size * 0.5;
        let inward = card.vel.dot(normal);
        if inward < 0.0 {
            card.vel -= normal * inward * tuning.ring_reflect;
        }
        return Contact::Hard;
    }

    Contact::Soft
}

/// Escape axis and displacement for a card overlapping `zone`
///
/// Candidates are tried in the order left, right, up, down. The smallest
/// displacement that keeps the card within [lo, hi] and clear of every zone in
/// `others` wins; failing that, the smallest that stays within [lo, hi]; failing
/// that, the smallest overall, and the final clamp sorts it out.
fn zone_escape(card: &Card, zone: &Rect, others: &[Rect], lo: Vec2, hi: Vec2) -> Vec2 {
    let candidates = [
        Vec2::new(zone.x - (card.pos.x + card.size.x), 0.0),
        Vec2::new(zone.x + zone.w - card.pos.x, 0.0),
        Vec2::new(0.0, zone.y - (card.pos.y + card.size.y)),
        Vec2::new(0.0, zone.y + zone.h - card.pos.y),
    ];

    let fits = |d: &Vec2| {
        let p = card.pos + *d;
        p.cmpge(lo).all() && p.cmple(hi).all()
    };
    let clear = |d: &Vec2| others.iter().all(|z| !z.overlaps(card.pos + *d, card.size));
    let smallest = |it: &mut dyn Iterator<Item = Vec2>| {
        it.fold(None, |best: Option<Vec2>, d| match best {
            Some(b) if b.length_squared() <= d.length_squared() => Some(b),
            _ => Some(d),
        })
    };

    smallest(&mut candidates.iter().copied().filter(|d| fits(d) && clear(d)))
        .or_else(|| smallest(&mut candidates.iter().copied().filter(fits)))
        .or_else(|| smallest(&mut candidates.iter().copied()))
        .unwrap_or(Vec2::ZERO)
}

/// Push a card away from one exclusion zone
pub fn apply_zone(card: &mut Card, zone: &Rect, geometry: &Geometry, tuning: &Tuning, dt: f32) -> Contact {
    let (lo, hi) = geometry.card_bounds(card.size, tuning.edge_pad);

    if zone.overlaps(card.pos, card.size) {
        let escape = zone_escape(card, zone, &geometry.zones, lo, hi);
        card.pos += escape;
        if escape.x != 0.0 && card.vel.x * escape.x < 0.0 {
            card.vel.x = -card.vel.x * tuning.bounce_damping;
        }
        if escape.y != 0.0 && card.vel.y * escape.y < 0.0 {
            card.vel.y = -card.vel.y * tuning.bounce_damping;
        }
        return Contact::Hard;
    }

    let margin = tuning.zone_margin_base + tuning.zone_margin_size_factor * card.size.max_element();
    let center = card.center();
    let closest = zone.closest_point(center);
    let away = center - closest;
    let dist = away.length();

    if dist >= margin {
        return Contact::None;
    }

    // Centre on the rect edge: push away from the rect centre
    let dir = if dist > 1e-3 {
        away / dist
    } else {
        (center - (zone.min() + zone.max()) * 0.5).normalize_or_zero()
    };
    card.vel += dir * tuning.zone_strength * (margin - dist) * dt;
    Contact::Soft
}

/// Final correction: card back inside the container, no velocity change
pub fn hard_clamp(card: &mut Card, geometry: &Geometry, tuning: &Tuning) {
    let (lo, hi) = geometry.card_bounds(card.size, tuning.edge_pad);
    card.pos = card.pos.clamp(lo, hi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Layout;
    use rand::SeedableRng;

    fn geometry() -> Geometry {
        Geometry::from_layout(
            &Layout::full_viewport(Vec2::new(1000.0, 800.0)),
            &Tuning::default(),
        )
    }

    fn card(pos: Vec2, vel: Vec2) -> Card {
        Card {
            index: 0,
            pos,
            vel,
            size: Vec2::new(100.0, 50.0),
        }
    }

    #[test]
    fn test_clamp_speed() {
        let t = Tuning::default();
        let slow = clamp_speed(Vec2::new(1.0, 0.0), &t);
        assert!((slow.length() - t.min_speed).abs() < 1e-4);
        assert!(slow.y.abs() < 1e-6);

        let fast = clamp_speed(Vec2::new(0.0, -500.0), &t);
        assert!((fast.length() - t.max_speed).abs() < 1e-3);
        assert!(fast.y < 0.0);

        let ok = Vec2::new(20.0, 0.0);
        assert_eq!(clamp_speed(ok, &t), ok);
        assert_eq!(clamp_speed(Vec2::ZERO, &t), Vec2::ZERO);
    }

    #[test]
    fn test_wall_soft_push_near_left_edge() {
        let t = Tuning::default();
        let mut c = card(Vec2::new(t.edge_pad + 10.0, 400.0), Vec2::new(-20.0, 0.0));
        let contact = apply_walls(&mut c, &geometry(), &t, 0.016);
        assert_eq!(contact, Contact::Soft);
        assert!(c.vel.x > -20.0);
    }

    #[test]
    fn test_wall_hard_bounce() {
        let t = Tuning::default();
        let mut c = card(Vec2::new(-5.0, 400.0), Vec2::new(-20.0, 3.0));
        let contact = apply_walls(&mut c, &geometry(), &t, 0.0);
        assert_eq!(contact, Contact::Hard);
        assert_eq!(c.pos.x, t.edge_pad);
        assert!((c.vel.x - 20.0 * t.bounce_damping).abs() < 1e-4);
        assert_eq!(c.vel.y, 3.0);
    }

    #[test]
    fn test_ring_hard_contact_snaps_and_reflects() {
        let t = Tuning::default();
        let geo = geometry();
        let mut rng = Pcg32::seed_from_u64(1);
        // Centre 10px right of ring centre, moving inward
        let center = geo.ring.center + Vec2::new(10.0, 0.0);
        let mut c = card(center - Vec2::new(50.0, 25.0), Vec2::new(-30.0, 0.0));
        let contact = apply_ring(&mut c, &geo.ring, &t, 0.016, &mut rng);
        assert_eq!(contact, Contact::Hard);
        let d = (c.center() - geo.ring.center).length();
        assert!((d - (geo.ring.radius + t.ring_snap_offset)).abs() < 1e-2);
        assert!(c.vel.x > 0.0);
    }

    #[test]
    fn test_ring_degenerate_centre() {
        let t = Tuning::default();
        let geo = geometry();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut c = card(geo.ring.center - Vec2::new(50.0, 25.0), Vec2::ZERO);
        apply_ring(&mut c, &geo.ring, &t, 0.016, &mut rng);
        let d = (c.center() - geo.ring.center).length();
        assert!(d.is_finite() && d > 0.0);
        assert!((c.speed() - t.base_speed).abs() < 1e-3);
    }

    #[test]
    fn test_ring_soft_band() {
        let t = Tuning::default();
        let geo = geometry();
        let mut rng = Pcg32::seed_from_u64(3);
        let center = geo.ring.center + Vec2::new(0.0, geo.ring.radius + t.ring_margin * 0.5);
        let mut c = card(center - Vec2::new(50.0, 25.0), Vec2::ZERO);
        let contact = apply_ring(&mut c, &geo.ring, &t, 0.016, &mut rng);
        assert_eq!(contact, Contact::Soft);
        assert!(c.vel.y > 0.0);
        assert_eq!(c.vel.x, 0.0);
    }

    #[test]
    fn test_zone_overlap_escapes_along_shortest_axis() {
        let t = Tuning::default();
        let geo = geometry();
        let zone = Rect::new(400.0, 300.0, 200.0, 200.0);
        // Card overlaps the zone's left edge by 20px
        let mut c = card(Vec2::new(320.0, 380.0), Vec2::new(10.0, 0.0));
        let contact = apply_zone(&mut c, &zone, &geo, &t, 0.016);
        assert_eq!(contact, Contact::Hard);
        assert_eq!(c.pos, Vec2::new(300.0, 380.0));
        assert!(c.vel.x < 0.0);
        assert!(!zone.overlaps(c.pos, c.size));
    }

    #[test]
    fn test_zone_escape_stays_inside_container() {
        let t = Tuning::default();
        let geo = geometry();
        let nav = geo.zones[0];
        // Fully inside the nav bar: escaping upward would leave the container
        let mut c = card(Vec2::new(300.0, t.edge_pad), Vec2::ZERO);
        apply_zone(&mut c, &nav, &geo, &t, 0.016);
        assert!(!nav.overlaps(c.pos, c.size));
        assert!(c.pos.y >= nav.max().y);
    }

    #[test]
    fn test_zone_escape_avoids_neighbouring_zone() {
        let t = Tuning::default();
        let geo = geometry();
        let (primary, secondary) = (geo.zones[1], geo.zones[2]);
        // Straddles both stacked FABs; escaping up or down lands in the other one
        let mut c = card(Vec2::new(888.0, 690.0), Vec2::ZERO);
        assert!(primary.overlaps(c.pos, c.size));
        assert_eq!(apply_zone(&mut c, &primary, &geo, &t, 0.016), Contact::Hard);
        assert!((c.pos - Vec2::new(820.0, 690.0)).length() < 1e-3);
        assert!(geo.zones.iter().all(|z| !z.overlaps(c.pos, c.size)));
        assert_eq!(apply_zone(&mut c, &secondary, &geo, &t, 0.016), Contact::Soft);
    }

    #[test]
    fn test_zone_soft_margin() {
        let t = Tuning::default();
        let geo = geometry();
        let zone = Rect::new(400.0, 300.0, 200.0, 200.0);
        // Card just left of the zone, not overlapping
        let mut c = card(Vec2::new(295.0, 380.0), Vec2::ZERO);
        let contact = apply_zone(&mut c, &zone, &geo, &t, 0.016);
        assert_eq!(contact, Contact::Soft);
        assert!(c.vel.x < 0.0);
    }
}
