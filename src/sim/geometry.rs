//! Container, ring and exclusion-zone geometry
//!
//! Everything here is in container coordinates (origin at the container's
//! top-left). Fixed page chrome is laid out in viewport coordinates and then
//! shifted by the container's offset, so it keeps acting as an obstacle no
//! matter where the container has scrolled to.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Tuning;

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    /// Closest point on (or in) the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// Strict overlap with a box at `pos` of `size` (touching edges don't count)
    pub fn overlaps(&self, pos: Vec2, size: Vec2) -> bool {
        pos.x < self.x + self.w
            && pos.x + size.x > self.x
            && pos.y < self.y + self.h
            && pos.y + size.y > self.y
    }

    pub fn translated(&self, by: Vec2) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.w, self.h)
    }
}

/// Circular exclusion region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub center: Vec2,
    pub radius: f32,
}

/// Layout inputs observed from the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Container size
    pub container: Vec2,
    /// Viewport size
    pub viewport: Vec2,
    /// Container top-left in viewport coordinates
    pub offset: Vec2,
}

impl Layout {
    /// Container that fills the viewport exactly
    pub fn full_viewport(size: Vec2) -> Self {
        Self {
            container: size,
            viewport: size,
            offset: Vec2::ZERO,
        }
    }
}

/// Number of fixed exclusion zones
pub const ZONE_COUNT: usize = 4;

/// Resolved geometry for one layout
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub container: Vec2,
    pub ring: Ring,
    /// Navigation bar, primary FAB, secondary FAB, help FAB
    pub zones: [Rect; ZONE_COUNT],
}

impl Geometry {
    pub fn from_layout(layout: &Layout, tuning: &Tuning) -> Self {
        let vp = layout.viewport;
        let to_container = -layout.offset;

        let ring = Ring {
            center: vp * 0.5 + to_container,
            radius: tuning.ring_radius_fraction * vp.x.min(vp.y),
        };

        let primary_fab = Rect::new(
            vp.x - FAB_INSET - FAB_SIZE,
            vp.y - FAB_INSET - FAB_SIZE,
            FAB_SIZE,
            FAB_SIZE,
        );
        let zones = [
            Rect::new(0.0, 0.0, vp.x, NAV_HEIGHT),
            primary_fab,
            Rect::new(primary_fab.x, primary_fab.y - FAB_GAP - FAB_SIZE, FAB_SIZE, FAB_SIZE),
            Rect::new(FAB_INSET, vp.y - FAB_INSET - FAB_SIZE, FAB_SIZE, FAB_SIZE),
        ]
        .map(|zone| zone.translated(to_container));

        Self {
            container: layout.container,
            ring,
            zones,
        }
    }

    /// Containers with no area have nothing to simulate in
    pub fn is_degenerate(&self) -> bool {
        !(self.container.x > 0.0 && self.container.y > 0.0)
    }

    /// Allowed top-left range for a card of `size`
    ///
    /// If the container is too small on an axis the range collapses onto the pad.
    pub fn card_bounds(&self, size: Vec2, pad: f32) -> (Vec2, Vec2) {
        let lo = Vec2::splat(pad);
        let hi = (self.container - size - Vec2::splat(pad)).max(lo);
        (lo, hi)
    }
}

/// Recomputes geometry only when the observed layout changes
#[derive(Debug, Default)]
pub struct GeometryCache {
    layout: Option<Layout>,
    geometry: Option<Geometry>,
    recomputes: u32,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a resize observation. Returns true if the geometry was rebuilt.
    pub fn observe(&mut self, layout: Layout, tuning: &Tuning) -> bool {
        if self.layout == Some(layout) {
            return false;
        }
        let geometry = Geometry::from_layout(&layout, tuning);
        log::info!(
            "Geometry: container={}x{}, ring r={:.1} at ({:.1}, {:.1})",
            layout.container.x,
            layout.container.y,
            geometry.ring.radius,
            geometry.ring.center.x,
            geometry.ring.center.y
        );
        self.layout = Some(layout);
        self.geometry = Some(geometry);
        self.recomputes += 1;
        true
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn layout(&self) -> Option<Layout> {
        self.layout
    }

    /// How many times geometry has been rebuilt
    pub fn recomputes(&self) -> u32 {
        self.recomputes
    }
}
