//! Hero settings and tuning
//!
//! Every number the motion field and the arc cycle use can be overridden
//! from JSON; missing fields fall back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::HeroError;

/// Motion intensity presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MotionPreset {
    Calm,
    #[default]
    Default,
    Lively,
}

impl MotionPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionPreset::Calm => "Calm",
            MotionPreset::Default => "Default",
            MotionPreset::Lively => "Lively",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "calm" => Some(MotionPreset::Calm),
            "default" | "normal" => Some(MotionPreset::Default),
            "lively" => Some(MotionPreset::Lively),
            _ => None,
        }
    }

    /// Multiplier on card speeds and drift
    pub fn speed_scale(&self) -> f32 {
        match self {
            MotionPreset::Calm => 0.6,
            MotionPreset::Default => 1.0,
            MotionPreset::Lively => 1.4,
        }
    }
}

/// Motion field tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub max_frame_dt: f32,
    pub edge_pad: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub base_speed: f32,
    pub drift: f32,

    // === Walls ===
    pub wall_fade: f32,
    pub wall_strength: f32,
    pub bounce_damping: f32,

    // === Ring ===
    pub ring_radius_fraction: f32,
    pub ring_margin: f32,
    pub ring_strength: f32,
    pub ring_max_accel: f32,
    pub ring_snap_offset: f32,
    pub ring_reflect: f32,

    // === Zones ===
    pub zone_margin_base: f32,
    pub zone_margin_size_factor: f32,
    pub zone_strength: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_frame_dt: MAX_FRAME_DT,
            edge_pad: EDGE_PAD,
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
            base_speed: BASE_SPEED,
            drift: DRIFT,

            wall_fade: WALL_FADE,
            wall_strength: WALL_STRENGTH,
            bounce_damping: BOUNCE_DAMPING,

            ring_radius_fraction: RING_RADIUS_FRACTION,
            ring_margin: RING_MARGIN,
            ring_strength: RING_STRENGTH,
            ring_max_accel: RING_MAX_ACCEL,
            ring_snap_offset: RING_SNAP_OFFSET,
            ring_reflect: RING_REFLECT,

            zone_margin_base: ZONE_MARGIN_BASE,
            zone_margin_size_factor: ZONE_MARGIN_SIZE_FACTOR,
            zone_strength: ZONE_STRENGTH,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> HeroError {
    HeroError::InvalidSetting {
        field,
        reason: reason.into(),
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), HeroError> {
    if !value.is_finite() {
        return Err(invalid(field, format!("{value} is not a finite number")));
    }
    if value < 0.0 {
        return Err(invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

impl Tuning {
    /// Reject values the motion step cannot run with
    pub fn validate(&self) -> Result<(), HeroError> {
        if !(self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0) {
            return Err(invalid(
                "max_frame_dt",
                format!("{} must be a positive number of seconds", self.max_frame_dt),
            ));
        }

        let fields = [
            ("edge_pad", self.edge_pad),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("base_speed", self.base_speed),
            ("drift", self.drift),
            ("wall_fade", self.wall_fade),
            ("wall_strength", self.wall_strength),
            ("bounce_damping", self.bounce_damping),
            ("ring_radius_fraction", self.ring_radius_fraction),
            ("ring_margin", self.ring_margin),
            ("ring_strength", self.ring_strength),
            ("ring_max_accel", self.ring_max_accel),
            ("ring_snap_offset", self.ring_snap_offset),
            ("ring_reflect", self.ring_reflect),
            ("zone_margin_base", self.zone_margin_base),
            ("zone_margin_size_factor", self.zone_margin_size_factor),
            ("zone_strength", self.zone_strength),
        ];
        for (field, value) in fields {
            non_negative(field, value as f64)?;
        }

        if self.min_speed > self.max_speed {
            return Err(invalid(
                "min_speed",
                format!("{} exceeds max_speed {}", self.min_speed, self.max_speed),
            ));
        }
        Ok(())
    }

    /// Scale speed-related values, keeping min <= base <= max
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            min_speed: self.min_speed * factor,
            max_speed: self.max_speed * factor,
            base_speed: self.base_speed * factor,
            drift: self.drift * factor,
            ..self.clone()
        }
    }
}

/// Arc/color cycle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub draw_ms: f64,
    pub hold_ms: f64,
    pub fade_ms: f64,
    pub wait_ms: f64,
    /// Degrees swept by each arc while drawing
    pub arc_sweep: f32,
    /// Rotating headline words
    pub labels: Vec<String>,
    /// Three gradient colors (CSS color strings)
    pub palette: [String; 3],
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            draw_ms: DRAW_MS,
            hold_ms: HOLD_MS,
            fade_ms: FADE_MS,
            wait_ms: WAIT_MS,
            arc_sweep: ARC_SWEEP,
            labels: vec![
                "faster".to_string(),
                "smarter".to_string(),
                "together".to_string(),
            ],
            palette: [
                "#7c3aed".to_string(),
                "#06b6d4".to_string(),
                "#f59e0b".to_string(),
            ],
        }
    }
}

impl CycleConfig {
    /// Reject negative or non-finite phase durations
    pub fn validate(&self) -> Result<(), HeroError> {
        non_negative("draw_ms", self.draw_ms)?;
        non_negative("hold_ms", self.hold_ms)?;
        non_negative("fade_ms", self.fade_ms)?;
        non_negative("wait_ms", self.wait_ms)?;
        if !self.arc_sweep.is_finite() {
            return Err(invalid("arc_sweep", "must be a finite angle"));
        }
        Ok(())
    }
}

/// Hero settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Motion intensity
    pub preset: MotionPreset,
    /// Reduced motion (slow cards right down, no drift)
    pub reduced_motion: bool,
    /// Motion field tuning before preset/accessibility scaling
    pub tuning: Tuning,
    /// Arc cycle timing, labels and palette
    pub cycle: CycleConfig,
}

impl Settings {
    /// Create settings from a preset
    pub fn from_preset(preset: MotionPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Parse settings from JSON; missing fields take defaults
    ///
    /// Well-formed JSON with unusable values is rejected with
    /// [`HeroError::InvalidSetting`].
    pub fn from_json(json: &str) -> Result<Self, HeroError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!(
            "Loaded settings: preset={}, reduced_motion={}",
            settings.preset.as_str(),
            settings.reduced_motion
        );
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), HeroError> {
        self.tuning.validate()?;
        self.cycle.validate()
    }

    pub fn to_json(&self) -> Result<String, HeroError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Tuning after preset and accessibility scaling
    pub fn effective_tuning(&self) -> Tuning {
        let mut tuning = self.tuning.scaled(self.preset.speed_scale());
        if self.reduced_motion {
            tuning = tuning.scaled(0.35);
            tuning.drift = 0.0;
        }
        tuning
    }
}
