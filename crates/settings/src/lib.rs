//! Client settings store.
//!
//! Owns every user preference of the game client (volumes, graphics quality,
//! push notification toggles), persists them eagerly through a
//! [`PreferenceBackend`], and notifies subscribers on change.
//!
//! Two pieces of coupled state live here:
//! - each [`AudioChannel`] keeps volume, mute flag and last audible volume in sync
//! - the push master toggle cascades onto its dependent toggles
//!
//! Everything else is a flat key/value setting described by [`SettingKey`].

pub mod channel;
pub mod error;
pub mod keys;
pub mod observer;
pub mod persistence;
pub mod push;
pub mod quality;
pub mod store;
pub mod value;

pub use channel::{AudioChannel, ChannelField, VolumeChannel};
pub use error::SettingsError;
pub use keys::{Setting, SettingKey};
pub use observer::{ObserverRegistry, SubscriptionId, Topic};
pub use persistence::{
    default_settings_path, JsonFileBackend, MemoryBackend, PreferenceBackend, StoredValue,
};
pub use push::{PushTopic, PUSH_DEPENDENTS, PUSH_MASTER};
pub use quality::{GraphicsQuality, GRAPHICS_QUALITY, LogQualityBackend, QualityBackend};
pub use store::{SettingsStore, SharedSettings};
pub use value::{SettingKind, SettingType, SettingValue};
