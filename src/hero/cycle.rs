//! Arc/color cycle
//!
//! Three arcs are drawn around the hero, held, faded out and, after a short
//! pause, drawn again with a different color order and the next headline
//! word:
//!
//! ```text
//! Draw ──(eased, frame driven)──▶ Hold ──(timer)──▶ Fade ──(linear)──▶ Wait ──(timer)──▶ Draw
//! ```
//!
//! Draw and fade are animated from frame timestamps; hold and wait are plain
//! one-shot timers.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::scheduler::TimerQueue;
use crate::settings::CycleConfig;
use crate::{ease_out_cubic, normalize_degrees};

/// Number of arcs (and palette colors)
pub const SLOT_COUNT: usize = 3;

/// Every ordering of the three palette colors
pub const PERMUTATIONS: [[usize; SLOT_COUNT]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Cycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Arcs sweep in (ease-out cubic)
    Draw,
    /// Fully drawn, static
    Hold,
    /// Opacity decays linearly to zero
    Fade,
    /// Hidden pause before the next draw
    Wait,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Draw => "draw",
            Phase::Hold => "hold",
            Phase::Fade => "fade",
            Phase::Wait => "wait",
        }
    }
}

/// One arc as seen by the icon overlays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSlot {
    /// Tip angle in degrees [0, 360)
    pub angle: f32,
    /// 0 = hidden, 1 = fully visible
    pub opacity: f32,
    /// Palette index
    pub color: usize,
}

/// Headline text and gradient for the current cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeroFrame {
    pub label: String,
    /// Palette colors in gradient order
    pub gradient: [String; SLOT_COUNT],
}

/// What happened to the published slots during one advance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotUpdate {
    Publish([ArcSlot; SLOT_COUNT]),
    Unchanged,
    Clear,
}

/// Result of one `ArcCycle::advance`
#[derive(Debug, Clone, PartialEq)]
pub struct CycleUpdate {
    /// Phase entered during this advance, if any
    pub entered: Option<Phase>,
    /// New headline/gradient, set when a draw begins
    pub hero: Option<HeroFrame>,
    pub slots: SlotUpdate,
}

impl CycleUpdate {
    fn idle() -> Self {
        Self {
            entered: None,
            hero: None,
            slots: SlotUpdate::Unchanged,
        }
    }
}

/// Draw/hold/fade/wait state machine
#[derive(Debug)]
pub struct ArcCycle {
    config: CycleConfig,
    phase: Phase,
    phase_start_ms: f64,
    started: bool,
    stopped: bool,
    perm_index: usize,
    label_index: usize,
    /// Draw phases begun so far
    pub draws: u64,
    rng: Pcg32,
    timers: TimerQueue<Phase>,
}

impl ArcCycle {
    pub fn new(config: CycleConfig, seed: u64) -> Self {
        Self {
            config,
            phase: Phase::Draw,
            phase_start_ms: 0.0,
            started: false,
            stopped: false,
            perm_index: 0,
            label_index: 0,
            draws: 0,
            rng: Pcg32::seed_from_u64(seed),
            timers: TimerQueue::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current color order
    pub fn permutation(&self) -> [usize; SLOT_COUNT] {
        PERMUTATIONS[self.perm_index]
    }

    pub fn label_index(&self) -> usize {
        self.label_index
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Headline and gradient for the current permutation/label
    pub fn hero_frame(&self) -> HeroFrame {
        let perm = self.permutation();
        HeroFrame {
            label: self
                .config
                .labels
                .get(self.label_index)
                .cloned()
                .unwrap_or_default(),
            gradient: perm.map(|c| self.config.palette[c].clone()),
        }
    }

    /// Advance to `now_ms`. The first call starts the first draw.
    pub fn advance(&mut self, now_ms: f64) -> CycleUpdate {
        if self.stopped {
            return CycleUpdate::idle();
        }

        let mut update = CycleUpdate::idle();

        if !self.started {
            self.started = true;
            self.begin_draw(now_ms, true, &mut update);
        }

        for next in self.timers.fire_due(now_ms) {
            match next {
                Phase::Fade => self.enter(Phase::Fade, now_ms, &mut update),
                Phase::Draw => self.begin_draw(now_ms, false, &mut update),
                other => log::warn!("Unexpected timer for phase {}", other.as_str()),
            }
        }

        let t = self.progress(now_ms);
        match self.phase {
            Phase::Draw => {
                update.slots = SlotUpdate::Publish(self.slots(ease_out_cubic(t), 1.0));
                if t >= 1.0 {
                    self.enter(Phase::Hold, now_ms, &mut update);
                    self.timers.schedule(now_ms, self.config.hold_ms, Phase::Fade);
                }
            }
            Phase::Fade => {
                if t >= 1.0 {
                    update.slots = SlotUpdate::Clear;
                    self.enter(Phase::Wait, now_ms, &mut update);
                    self.timers.schedule(now_ms, self.config.wait_ms, Phase::Draw);
                } else {
                    update.slots = SlotUpdate::Publish(self.slots(1.0, 1.0 - t));
                }
            }
            Phase::Hold | Phase::Wait => {}
        }

        update
    }

    /// Stop the cycle and cancel pending timers
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.stopped = true;
    }

    fn progress(&self, now_ms: f64) -> f32 {
        let duration = match self.phase {
            Phase::Draw => self.config.draw_ms,
            Phase::Fade => self.config.fade_ms,
            Phase::Hold | Phase::Wait => return 0.0,
        };
        if duration <= 0.0 {
            return 1.0;
        }
        (((now_ms - self.phase_start_ms) / duration) as f32).clamp(0.0, 1.0)
    }

    fn slots(&self, drawn: f32, opacity: f32) -> [ArcSlot; SLOT_COUNT] {
        let perm = self.permutation();
        let spacing = 360.0 / SLOT_COUNT as f32;
        std::array::from_fn(|i| ArcSlot {
            angle: normalize_degrees(i as f32 * spacing + drawn * self.config.arc_sweep),
            opacity,
            color: perm[i],
        })
    }

    fn enter(&mut self, phase: Phase, now_ms: f64, update: &mut CycleUpdate) {
        log::debug!("Arc cycle: {} -> {}", self.phase.as_str(), phase.as_str());
        self.phase = phase;
        self.phase_start_ms = now_ms;
        update.entered = Some(phase);
    }

    fn begin_draw(&mut self, now_ms: f64, first: bool, update: &mut CycleUpdate) {
        if first {
            self.perm_index = self.rng.random_range(0..PERMUTATIONS.len());
        } else {
            // Offset of 1..=5 never lands on the previous permutation
            let offset = self.rng.random_range(1..PERMUTATIONS.len());
            self.perm_index = (self.perm_index + offset) % PERMUTATIONS.len();
            if !self.config.labels.is_empty() {
                self.label_index = (self.label_index + 1) % self.config.labels.len();
            }
        }
        self.draws += 1;
        self.enter(Phase::Draw, now_ms, update);
        update.hero = Some(self.hero_frame());
    }
}
