//! Hero banner animation
//!
//! The arc/color cycle that drives the headline word, its gradient and the
//! arc slots consumed by the icon overlays.

pub mod cycle;

pub use cycle::{
    ArcCycle, ArcSlot, CycleUpdate, HeroFrame, PERMUTATIONS, Phase, SLOT_COUNT, SlotUpdate,
};
