//! Graphics quality mode
//!
//! The store keeps the mode as an int setting; a `QualityBackend` is what
//! actually reconfigures the renderer.

use std::fmt;

use crate::keys::{Setting, SettingKey};
use crate::value::{SettingType, SettingValue};

/// `GraphicsQualityMode` read as a preset rather than a raw level
pub const GRAPHICS_QUALITY: Setting<GraphicsQuality> =
    Setting::new(SettingKey::GraphicsQualityMode);

/// Graphics quality presets, persisted as 0..=2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphicsQuality {
    /// Favour frame rate
    Performance,
    #[default]
    Balanced,
    /// Favour visuals
    Quality,
}

impl GraphicsQuality {
    /// Out-of-range levels clamp to the nearest preset.
    pub fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=0 => GraphicsQuality::Performance,
            1 => GraphicsQuality::Balanced,
            _ => GraphicsQuality::Quality,
        }
    }

    pub fn level(self) -> i32 {
        match self {
            GraphicsQuality::Performance => 0,
            GraphicsQuality::Balanced => 1,
            GraphicsQuality::Quality => 2,
        }
    }
}

impl fmt::Display for GraphicsQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphicsQuality::Performance => "performance",
            GraphicsQuality::Balanced => "balanced",
            GraphicsQuality::Quality => "quality",
        };
        f.write_str(name)
    }
}

impl SettingType for GraphicsQuality {
    fn from_value(value: SettingValue) -> Self {
        GraphicsQuality::from_level(value.as_i32())
    }

    fn into_value(self) -> SettingValue {
        SettingValue::Int(self.level())
    }
}

/// Applies a quality level to the graphics backend.
pub trait QualityBackend {
    fn apply_quality_level(&mut self, quality: GraphicsQuality);
}

/// Backend for headless use: records the level in the log only.
#[derive(Debug, Default)]
pub struct LogQualityBackend;

impl QualityBackend for LogQualityBackend {
    fn apply_quality_level(&mut self, quality: GraphicsQuality) {
        log::debug!("Graphics quality set to {} (level {})", quality, quality.level());
    }
}
