//! Audio channels
//!
//! Each channel is backed by three settings (volume, mute flag, last audible
//! volume). The coupling rules live in `SettingsStore::set_volume` and
//! `SettingsStore::set_muted`; this module only maps channels to keys.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SettingsError;
use crate::keys::{Setting, SettingKey};

/// Volume restored on unmute when no audible volume was ever recorded
pub const FALLBACK_RESTORE_VOLUME: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AudioChannel {
    /// Background music
    Bgm,
    /// Sound effects
    Sfx,
    /// Emoticon sounds
    Emoticon,
    /// Video playing on the square screen
    SquareVideo,
    /// The player's own voice level
    MyVoice,
}

impl AudioChannel {
    pub const ALL: [AudioChannel; 5] = [
        AudioChannel::Bgm,
        AudioChannel::Sfx,
        AudioChannel::Emoticon,
        AudioChannel::SquareVideo,
        AudioChannel::MyVoice,
    ];

    pub fn volume_key(self) -> SettingKey {
        match self {
            AudioChannel::Bgm => SettingKey::BgmVolume,
            AudioChannel::Sfx => SettingKey::SfxVolume,
            AudioChannel::Emoticon => SettingKey::EmoticonVolume,
            AudioChannel::SquareVideo => SettingKey::SquareVideoVolume,
            AudioChannel::MyVoice => SettingKey::MyVoiceVolume,
        }
    }

    pub fn muted_key(self) -> SettingKey {
        match self {
            AudioChannel::Bgm => SettingKey::BgmMuted,
            AudioChannel::Sfx => SettingKey::SfxMuted,
            AudioChannel::Emoticon => SettingKey::EmoticonMuted,
            AudioChannel::SquareVideo => SettingKey::SquareVideoMuted,
            AudioChannel::MyVoice => SettingKey::MyVoiceMuted,
        }
    }

    pub fn last_volume_key(self) -> SettingKey {
        match self {
            AudioChannel::Bgm => SettingKey::LastBgmVolume,
            AudioChannel::Sfx => SettingKey::LastSfxVolume,
            AudioChannel::Emoticon => SettingKey::LastEmoticonVolume,
            AudioChannel::SquareVideo => SettingKey::LastSquareVideoVolume,
            AudioChannel::MyVoice => SettingKey::LastMyVoiceVolume,
        }
    }

    pub fn volume(self) -> Setting<f32> {
        Setting::new(self.volume_key())
    }

    pub fn muted(self) -> Setting<bool> {
        Setting::new(self.muted_key())
    }

    pub fn last_volume(self) -> Setting<f32> {
        Setting::new(self.last_volume_key())
    }

    /// Short name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            AudioChannel::Bgm => "bgm",
            AudioChannel::Sfx => "sfx",
            AudioChannel::Emoticon => "emoticon",
            AudioChannel::SquareVideo => "square-video",
            AudioChannel::MyVoice => "my-voice",
        }
    }

    /// Which channel (and which of its three fields) a key belongs to
    pub fn for_key(key: SettingKey) -> Option<(AudioChannel, ChannelField)> {
        Self::ALL.into_iter().find_map(|channel| {
            if key == channel.volume_key() {
                Some((channel, ChannelField::Volume))
            } else if key == channel.muted_key() {
                Some((channel, ChannelField::Muted))
            } else if key == channel.last_volume_key() {
                Some((channel, ChannelField::LastVolume))
            } else {
                None
            }
        })
    }
}

impl fmt::Display for AudioChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AudioChannel {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| SettingsError::UnknownChannel(s.trim().to_string()))
    }
}

/// The three settings behind a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelField {
    Volume,
    Muted,
    LastVolume,
}

/// Snapshot of one channel's coupled state.
///
/// When the store's invariants hold, `muted` implies `volume == 0` and
/// `!muted` implies `volume > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeChannel {
    pub volume: f32,
    pub muted: bool,
    pub last_volume: f32,
}

impl VolumeChannel {
    /// Volume the audio mixer should actually use
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Whether the coupling invariant holds for this snapshot
    pub fn is_consistent(&self) -> bool {
        if self.muted {
            self.volume <= 0.0
        } else {
            self.volume > 0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_channel_key_maps_back() {
        for channel in AudioChannel::ALL {
            assert_eq!(
                AudioChannel::for_key(channel.volume_key()),
                Some((channel, ChannelField::Volume))
            );
            assert_eq!(
                AudioChannel::for_key(channel.muted_key()),
                Some((channel, ChannelField::Muted))
            );
            assert_eq!(
                AudioChannel::for_key(channel.last_volume_key()),
                Some((channel, ChannelField::LastVolume))
            );
        }
        assert_eq!(AudioChannel::for_key(SettingKey::HapticEnabled), None);
    }

    #[test]
    fn parse_channel_names() {
        assert_eq!("BGM".parse::<AudioChannel>().unwrap(), AudioChannel::Bgm);
        assert_eq!("square_video".parse::<AudioChannel>().unwrap(), AudioChannel::SquareVideo);
        assert_eq!("my-voice".parse::<AudioChannel>().unwrap(), AudioChannel::MyVoice);
        assert!(matches!("radio".parse::<AudioChannel>(), Err(SettingsError::UnknownChannel(_))));
    }

    #[test]
    fn consistency_check() {
        let muted = VolumeChannel { volume: 0.0, muted: true, last_volume: 0.4 };
        assert!(muted.is_consistent());
        assert_eq!(muted.effective_volume(), 0.0);

        let broken = VolumeChannel { volume: 0.3, muted: true, last_volume: 0.4 };
        assert!(!broken.is_consistent());
        assert_eq!(broken.effective_volume(), 0.0);
    }
}
