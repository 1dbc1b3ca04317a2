//! Hero Drift - animated widgets for a landing page hero
//!
//! Core modules:
//! - `sim`: Floating-card motion field (drift, speed clamp, wall/ring/zone repulsion)
//! - `hero`: Arc/color cycle state machine (draw → hold → fade → wait)
//! - `toast`: Timed, auto-expiring notifications
//! - `scheduler`: Single frame callback fan-out and one-shot timers
//! - `overlay`: Published arc slot values with an explicit observer list
//! - `platform`: Presentation sinks (DOM on wasm, recording elsewhere)
//! - `view`: Mount/unmount wiring for the whole hero section
//! - `settings`: Data-driven tuning

pub mod error;
pub mod hero;
pub mod overlay;
pub mod platform;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod toast;
pub mod view;

pub use error::HeroError;
pub use settings::{MotionPreset, Settings, Tuning};

use glam::Vec2;

/// Default tuning constants (pixels, seconds, milliseconds as noted)
pub mod consts {
    /// Largest frame step the simulator accepts (seconds). Longer gaps, e.g.
    /// after tab suspension, are clamped to this.
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Gap kept between a card and the container edge
    pub const EDGE_PAD: f32 = 12.0;

    /// Card speed bounds (pixels/s)
    pub const MIN_SPEED: f32 = 14.0;
    pub const MAX_SPEED: f32 = 42.0;
    /// Speed used when a card is ejected from the ring centre
    pub const BASE_SPEED: f32 = 24.0;
    /// Speeds at or below this are treated as "stopped" and not rescaled
    pub const SPEED_EPSILON: f32 = 1e-3;
    /// Random drift acceleration amplitude (pixels/s²)
    pub const DRIFT: f32 = 18.0;

    /// Distance from a wall where soft repulsion starts
    pub const WALL_FADE: f32 = 90.0;
    /// Wall repulsion (pixels/s² per pixel of penetration)
    pub const WALL_STRENGTH: f32 = 2.4;
    /// Velocity kept after a hard bounce
    pub const BOUNCE_DAMPING: f32 = 0.6;

    /// Ring radius as a fraction of the smaller viewport dimension
    pub const RING_RADIUS_FRACTION: f32 = 0.22;
    /// Soft band outside the ring radius
    pub const RING_MARGIN: f32 = 60.0;
    /// Ring repulsion (pixels/s² per pixel of penetration)
    pub const RING_STRENGTH: f32 = 3.0;
    /// Cap on ring repulsion acceleration (pixels/s²)
    pub const RING_MAX_ACCEL: f32 = 240.0;
    /// Distance outside the ring a card is snapped to on hard contact
    pub const RING_SNAP_OFFSET: f32 = 2.0;
    /// Multiplier on the inward velocity component removed on hard contact
    pub const RING_REFLECT: f32 = 1.6;

    /// Zone soft margin: base + factor × larger card side
    pub const ZONE_MARGIN_BASE: f32 = 24.0;
    pub const ZONE_MARGIN_SIZE_FACTOR: f32 = 0.75;
    /// Zone repulsion (pixels/s² per pixel of penetration)
    pub const ZONE_STRENGTH: f32 = 3.0;

    /// Fixed page chrome, in viewport pixels
    pub const NAV_HEIGHT: f32 = 72.0;
    pub const FAB_SIZE: f32 = 56.0;
    pub const FAB_INSET: f32 = 24.0;
    pub const FAB_GAP: f32 = 16.0;

    /// Arc cycle phase durations (milliseconds)
    pub const DRAW_MS: f64 = 1400.0;
    pub const HOLD_MS: f64 = 2200.0;
    pub const FADE_MS: f64 = 700.0;
    pub const WAIT_MS: f64 = 500.0;
    /// Degrees swept by each arc during the draw phase
    pub const ARC_SWEEP: f32 = 100.0;

    /// Toast lifetime when the caller gives none (milliseconds)
    pub const DEFAULT_TOAST_MS: f64 = 4000.0;
}

/// Starting slots as fractions of the free container area
pub const START_SLOTS: [(f32, f32); 8] = [
    (0.08, 0.18),
    (0.78, 0.14),
    (0.12, 0.62),
    (0.82, 0.58),
    (0.30, 0.84),
    (0.64, 0.86),
    (0.04, 0.40),
    (0.90, 0.36),
];

/// Cubic ease-out on `t` in [0, 1]
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Unit vector for an angle in radians
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Normalized angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        // Ease-out is ahead of linear in the first half
        assert!(ease_out_cubic(0.25) > 0.25);
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(370.0) - 10.0).abs() < 1e-4);
        assert!((normalize_degrees(-30.0) - 330.0).abs() < 1e-4);
    }
}
