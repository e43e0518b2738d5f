//! Setting values and kinds
//!
//! Every setting is a flat scalar. `SettingKind` carries the per-kind
//! constraint (bool, bounded float, bounded int) and `coerce` is the single
//! place where out-of-range or mistyped input is brought back into range.
//! Nothing here ever rejects a value, except `parse` for user-typed text.

use std::fmt;

use serde::Serialize;

use crate::error::SettingsError;

/// A setting value as stored in memory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Float(f32),
    Int(i32),
}

impl SettingValue {
    /// Boolean view. Numbers are true when positive.
    pub fn as_bool(self) -> bool {
        match self {
            SettingValue::Bool(b) => b,
            SettingValue::Float(f) => f > 0.0,
            SettingValue::Int(i) => i != 0,
        }
    }

    /// Float view. NaN reads as 0.
    pub fn as_f32(self) -> f32 {
        match self {
            SettingValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            SettingValue::Float(f) if f.is_nan() => 0.0,
            SettingValue::Float(f) => f,
            SettingValue::Int(i) => i as f32,
        }
    }

    /// Integer view. Floats are rounded, NaN reads as 0.
    pub fn as_i32(self) -> i32 {
        match self {
            SettingValue::Bool(b) => b as i32,
            SettingValue::Float(f) if f.is_nan() => 0,
            SettingValue::Float(f) => f.round() as i32,
            SettingValue::Int(i) => i,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Float(v) => write!(f, "{v}"),
            SettingValue::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f32> for SettingValue {
    fn from(value: f32) -> Self {
        SettingValue::Float(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Int(value)
    }
}

/// Shape and valid range of a setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingKind {
    /// On/off flag, persisted as 1/0
    Bool,
    /// Bounded float (volumes use 0..=1)
    Float { min: f32, max: f32 },
    /// Bounded integer enum (graphics quality uses 0..=2)
    Int { min: i32, max: i32 },
}

impl SettingKind {
    pub const VOLUME: SettingKind = SettingKind::Float { min: 0.0, max: 1.0 };

    /// Bring any value into this kind and range. Never fails.
    pub fn coerce(self, value: SettingValue) -> SettingValue {
        match self {
            SettingKind::Bool => SettingValue::Bool(value.as_bool()),
            SettingKind::Float { min, max } => SettingValue::Float(value.as_f32().clamp(min, max)),
            SettingKind::Int { min, max } => SettingValue::Int(value.as_i32().clamp(min, max)),
        }
    }

    /// Parse user-typed text into a value of this kind.
    ///
    /// Accepts `true/false/on/off/yes/no/1/0` for flags. The parsed number is
    /// clamped like any other input.
    pub fn parse(self, text: &str) -> Result<SettingValue, SettingsError> {
        let trimmed = text.trim();
        let invalid = || SettingsError::InvalidValue {
            value: trimmed.to_string(),
            expected: self.describe(),
        };

        let raw = match self {
            SettingKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => SettingValue::Bool(true),
                "false" | "off" | "no" | "0" => SettingValue::Bool(false),
                _ => return Err(invalid()),
            },
            SettingKind::Float { .. } => {
                let v: f32 = trimmed.parse().map_err(|_| invalid())?;
                if v.is_nan() {
                    return Err(invalid());
                }
                SettingValue::Float(v)
            }
            SettingKind::Int { .. } => SettingValue::Int(trimmed.parse().map_err(|_| invalid())?),
        };
        Ok(self.coerce(raw))
    }

    /// Human-readable description, used in error messages and `list` output
    pub fn describe(self) -> String {
        match self {
            SettingKind::Bool => "bool".to_string(),
            SettingKind::Float { min, max } => format!("float[{min}..{max}]"),
            SettingKind::Int { min, max } => format!("int[{min}..{max}]"),
        }
    }
}

/// Rust types a setting can be read and written as.
pub trait SettingType: Copy + PartialEq + fmt::Debug + 'static {
    fn from_value(value: SettingValue) -> Self;
    fn into_value(self) -> SettingValue;
}

impl SettingType for bool {
    fn from_value(value: SettingValue) -> Self {
        value.as_bool()
    }

    fn into_value(self) -> SettingValue {
        SettingValue::Bool(self)
    }
}

impl SettingType for f32 {
    fn from_value(value: SettingValue) -> Self {
        value.as_f32()
    }

    fn into_value(self) -> SettingValue {
        SettingValue::Float(self)
    }
}

impl SettingType for i32 {
    fn from_value(value: SettingValue) -> Self {
        value.as_i32()
    }

    fn into_value(self) -> SettingValue {
        SettingValue::Int(self)
    }
}
