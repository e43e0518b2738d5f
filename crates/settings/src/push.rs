//! Push notification toggle group
//!
//! One master toggle gates eight topic toggles and the marketing consent
//! flag. While the master is off every dependent is off and not interactive.

use crate::keys::{Setting, SettingKey};

pub const PUSH_MASTER: SettingKey = SettingKey::PushNotificationsEnabled;

/// Per-topic push notification toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushTopic {
    /// Pushes delivered during night hours
    NightTime,
    NewFriendRequest,
    Gathering,
    /// Someone hid an easter egg in the player's room
    EasterEgg,
    RoomChat,
    FriendGift,
    RoomInvite,
    /// A song or live broadcast started in the player's room
    LiveBroadcast,
}

impl PushTopic {
    pub const ALL: [PushTopic; 8] = [
        PushTopic::NightTime,
        PushTopic::NewFriendRequest,
        PushTopic::Gathering,
        PushTopic::EasterEgg,
        PushTopic::RoomChat,
        PushTopic::FriendGift,
        PushTopic::RoomInvite,
        PushTopic::LiveBroadcast,
    ];

    pub fn key(self) -> SettingKey {
        match self {
            PushTopic::NightTime => SettingKey::NightTimePushEnabled,
            PushTopic::NewFriendRequest => SettingKey::NewFriendRequestPushEnabled,
            PushTopic::Gathering => SettingKey::GatheringPushEnabled,
            PushTopic::EasterEgg => SettingKey::EasterEggPushEnabled,
            PushTopic::RoomChat => SettingKey::RoomChatPushEnabled,
            PushTopic::FriendGift => SettingKey::FriendGiftPushEnabled,
            PushTopic::RoomInvite => SettingKey::RoomInvitePushEnabled,
            PushTopic::LiveBroadcast => SettingKey::LiveBroadcastPushEnabled,
        }
    }

    pub fn setting(self) -> Setting<bool> {
        Setting::new(self.key())
    }
}

/// Keys forced by the master toggle: the eight topics plus marketing consent.
pub const PUSH_DEPENDENTS: [SettingKey; 9] = [
    SettingKey::NightTimePushEnabled,
    SettingKey::NewFriendRequestPushEnabled,
    SettingKey::GatheringPushEnabled,
    SettingKey::EasterEggPushEnabled,
    SettingKey::RoomChatPushEnabled,
    SettingKey::FriendGiftPushEnabled,
    SettingKey::RoomInvitePushEnabled,
    SettingKey::LiveBroadcastPushEnabled,
    SettingKey::MarketingInfoConsent,
];

pub fn is_push_dependent(key: SettingKey) -> bool {
    PUSH_DEPENDENTS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_topic_is_a_dependent() {
        for topic in PushTopic::ALL {
            assert!(is_push_dependent(topic.key()), "{:?}", topic);
        }
        assert!(is_push_dependent(SettingKey::MarketingInfoConsent));
        assert!(!is_push_dependent(PUSH_MASTER));
        assert!(!is_push_dependent(SettingKey::HapticEnabled));
    }
}
