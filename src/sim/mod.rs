//! Floating-card motion simulation
//!
//! Pure and reproducible: seeded RNG only, fixed card order, no rendering or
//! platform dependencies. The renderer gets a `MotionFrame` per step.

pub mod geometry;
pub mod repulsion;
pub mod state;
pub mod tick;

pub use geometry::{Geometry, GeometryCache, Layout, Rect, Ring, ZONE_COUNT};
pub use repulsion::{Contact, clamp_speed};
pub use state::{Card, CardOffset, FloatingField, MotionFrame};
pub use tick::{StepStats, step};
