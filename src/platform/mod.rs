//! Presentation layer
//!
//! Simulation code never touches the page. It emits plain snapshots into a
//! `PresentationSink`:
//! - `RecordingSink`: keeps the latest snapshots (native runs, tests)
//! - `dom::DomSink`: writes transforms, headline and toasts to the page (wasm)

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::hero::HeroFrame;
use crate::sim::MotionFrame;
use crate::toast::Toast;

/// Receives per-frame snapshots for display
pub trait PresentationSink {
    /// Card offsets, after every card has been updated
    fn apply_motion(&mut self, frame: &MotionFrame);
    /// New headline word and gradient
    fn apply_hero(&mut self, hero: &HeroFrame);
    /// Live toasts in display order
    fn apply_toasts(&mut self, toasts: &[Toast]);
}

/// Sink that remembers what it was given
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub motion: Option<MotionFrame>,
    pub motion_frames: u64,
    pub hero: Option<HeroFrame>,
    pub hero_changes: u64,
    pub toasts: Vec<Toast>,
    pub toast_updates: u64,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSink for RecordingSink {
    fn apply_motion(&mut self, frame: &MotionFrame) {
        self.motion = Some(frame.clone());
        self.motion_frames += 1;
    }

    fn apply_hero(&mut self, hero: &HeroFrame) {
        self.hero = Some(hero.clone());
        self.hero_changes += 1;
    }

    fn apply_toasts(&mut self, toasts: &[Toast]) {
        self.toasts = toasts.to_vec();
        self.toast_updates += 1;
    }
}
