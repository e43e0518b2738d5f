//! Setting key table
//!
//! Every persisted setting is one row of `DEFINITIONS`: stable persistence
//! name, kind and default. The rest of the crate is driven from this table,
//! so adding a setting means adding a variant and a row.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::SettingsError;
use crate::value::{SettingKind, SettingType, SettingValue};

/// Identifier of a persisted setting.
///
/// Variant order matches `DEFINITIONS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    GraphicsQualityMode,

    BgmVolume,
    SfxVolume,
    EmoticonVolume,
    SquareVideoVolume,
    MyVoiceVolume,

    BgmMuted,
    SfxMuted,
    EmoticonMuted,
    SquareVideoMuted,
    MyVoiceMuted,

    LastBgmVolume,
    LastSfxVolume,
    LastEmoticonVolume,
    LastSquareVideoVolume,
    LastMyVoiceVolume,

    HapticEnabled,
    EmotionCameraFixed,
    AutoPlayVideo,

    MarketingInfoConsent,

    PushNotificationsEnabled,
    NightTimePushEnabled,
    NewFriendRequestPushEnabled,
    GatheringPushEnabled,
    EasterEggPushEnabled,
    RoomChatPushEnabled,
    FriendGiftPushEnabled,
    RoomInvitePushEnabled,
    LiveBroadcastPushEnabled,
}

/// One row of the settings table.
#[derive(Debug, Clone, Copy)]
pub struct SettingDef {
    pub key: SettingKey,
    /// Persistence identifier (never change once shipped)
    pub name: &'static str,
    pub kind: SettingKind,
    pub default: SettingValue,
}

const fn row(
    key: SettingKey,
    name: &'static str,
    kind: SettingKind,
    default: SettingValue,
) -> SettingDef {
    SettingDef { key, name, kind, default }
}

const QUALITY: SettingKind = SettingKind::Int { min: 0, max: 2 };
const VOLUME: SettingKind = SettingKind::VOLUME;
const FLAG: SettingKind = SettingKind::Bool;

const ON: SettingValue = SettingValue::Bool(true);
const OFF: SettingValue = SettingValue::Bool(false);
const FULL: SettingValue = SettingValue::Float(1.0);
const HALF: SettingValue = SettingValue::Float(0.5);

pub const SETTING_COUNT: usize = 29;

pub static DEFINITIONS: [SettingDef; SETTING_COUNT] = [
    row(SettingKey::GraphicsQualityMode, "GraphicsQualityMode", QUALITY, SettingValue::Int(1)),
    // Volumes
    row(SettingKey::BgmVolume, "BGMVolume", VOLUME, FULL),
    row(SettingKey::SfxVolume, "SFXVolume", VOLUME, FULL),
    row(SettingKey::EmoticonVolume, "EmoticonVolume", VOLUME, FULL),
    row(SettingKey::SquareVideoVolume, "SquareVideoVolume", VOLUME, FULL),
    row(SettingKey::MyVoiceVolume, "MyVoiceVolume", VOLUME, FULL),
    // Mute flags
    row(SettingKey::BgmMuted, "BGMMuted", FLAG, OFF),
    row(SettingKey::SfxMuted, "SFXMuted", FLAG, OFF),
    row(SettingKey::EmoticonMuted, "EmoticonMuted", FLAG, OFF),
    row(SettingKey::SquareVideoMuted, "SquareVideoMuted", FLAG, OFF),
    row(SettingKey::MyVoiceMuted, "MyVoiceMuted", FLAG, OFF),
    // Last audible volume, restored on unmute
    row(SettingKey::LastBgmVolume, "LastBGMVolume", VOLUME, HALF),
    row(SettingKey::LastSfxVolume, "LastSfxVolume", VOLUME, HALF),
    row(SettingKey::LastEmoticonVolume, "LastEmoticonVolume", VOLUME, HALF),
    row(SettingKey::LastSquareVideoVolume, "LastSquareVideoVolume", VOLUME, HALF),
    row(SettingKey::LastMyVoiceVolume, "LastMyVoiceVolume", VOLUME, HALF),
    // In-world
    row(SettingKey::HapticEnabled, "HapticEnabled", FLAG, ON),
    row(SettingKey::EmotionCameraFixed, "EmotionCameraFixed", FLAG, ON),
    row(SettingKey::AutoPlayVideo, "AutoPlayVideo", FLAG, ON),
    // Server
    row(SettingKey::MarketingInfoConsent, "MarketingInfoConsent", FLAG, OFF),
    // Push notifications
    row(SettingKey::PushNotificationsEnabled, "PushNotificationsEnabled", FLAG, ON),
    row(SettingKey::NightTimePushEnabled, "NightTimePushEnabled", FLAG, OFF),
    row(SettingKey::NewFriendRequestPushEnabled, "NewFriendRequestPushEnabled", FLAG, ON),
    row(SettingKey::GatheringPushEnabled, "GatheringPushEnabled", FLAG, ON),
    row(SettingKey::EasterEggPushEnabled, "EasterEggPushEnabled", FLAG, ON),
    row(SettingKey::RoomChatPushEnabled, "RoomChatPushEnabled", FLAG, ON),
    row(SettingKey::FriendGiftPushEnabled, "FriendGiftPushEnabled", FLAG, ON),
    row(SettingKey::RoomInvitePushEnabled, "RoomInvitePushEnabled", FLAG, ON),
    row(SettingKey::LiveBroadcastPushEnabled, "LiveBroadcastPushEnabled", FLAG, ON),
];

impl SettingKey {
    /// Table row for this key
    pub fn def(self) -> &'static SettingDef {
        &DEFINITIONS[self as usize]
    }

    /// Persistence identifier
    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn kind(self) -> SettingKind {
        self.def().kind
    }

    pub fn default_value(self) -> SettingValue {
        self.def().default
    }

    /// Every key, in table order
    pub fn all() -> impl Iterator<Item = SettingKey> {
        DEFINITIONS.iter().map(|d| d.key)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    /// Looks up a persistence name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DEFINITIONS
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(wanted))
            .map(|d| d.key)
            .ok_or_else(|| SettingsError::UnknownKey(wanted.to_string()))
    }
}

// ============================================================================
// Typed handles
// ============================================================================

/// A setting key with its Rust value type attached.
///
/// `Setting<T>` lets callers read and write a setting without matching on
/// `SettingValue`. The default comes from the key table.
pub struct Setting<T> {
    key: SettingKey,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Setting<T> {
    pub const fn new(key: SettingKey) -> Self {
        Self { key, _ty: PhantomData }
    }

    pub fn key(&self) -> SettingKey {
        self.key
    }
}

impl<T: SettingType> Setting<T> {
    pub fn default_value(&self) -> T {
        T::from_value(self.key.default_value())
    }
}

impl<T> Clone for Setting<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Setting<T> {}

impl<T> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Setting({})", self.key.name())
    }
}

pub const GRAPHICS_QUALITY_MODE: Setting<i32> = Setting::new(SettingKey::GraphicsQualityMode);
pub const HAPTIC_ENABLED: Setting<bool> = Setting::new(SettingKey::HapticEnabled);
pub const EMOTION_CAMERA_FIXED: Setting<bool> = Setting::new(SettingKey::EmotionCameraFixed);
pub const AUTO_PLAY_VIDEO: Setting<bool> = Setting::new(SettingKey::AutoPlayVideo);
pub const MARKETING_INFO_CONSENT: Setting<bool> = Setting::new(SettingKey::MarketingInfoConsent);
pub const PUSH_NOTIFICATIONS_ENABLED: Setting<bool> =
    Setting::new(SettingKey::PushNotificationsEnabled);
pub const NIGHT_TIME_PUSH_ENABLED: Setting<bool> = Setting::new(SettingKey::NightTimePushEnabled);
pub const NEW_FRIEND_REQUEST_PUSH_ENABLED: Setting<bool> =
    Setting::new(SettingKey::NewFriendRequestPushEnabled);
pub const GATHERING_PUSH_ENABLED: Setting<bool> = Setting::new(SettingKey::GatheringPushEnabled);
pub const EASTER_EGG_PUSH_ENABLED: Setting<bool> = Setting::new(SettingKey::EasterEggPushEnabled);
pub const ROOM_CHAT_PUSH_ENABLED: Setting<bool> = Setting::new(SettingKey::RoomChatPushEnabled);
pub const FRIEND_GIFT_PUSH_ENABLED: Setting<bool> = Setting::new(SettingKey::FriendGiftPushEnabled);
pub const ROOM_INVITE_PUSH_ENABLED: Setting<bool> = Setting::new(SettingKey::RoomInvitePushEnabled);
pub const LIVE_BROADCAST_PUSH_ENABLED: Setting<bool> =
    Setting::new(SettingKey::LiveBroadcastPushEnabled);
