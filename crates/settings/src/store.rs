//! Settings store
//!
//! The single source of truth for client settings. The composition root
//! creates one store per process, wraps it in `SharedSettings` and hands
//! clones of that handle to whoever needs it (UI binders, the audio mixer).
//!
//! Every mutation follows the same path: coerce the input, write the value
//! to the backend, notify `Topic::Changed` listeners if the value actually
//! changed, then save. Derived updates (mute coupling, push cascade) assign
//! their keys directly instead of re-entering the public setters, so each
//! key notifies at most once per call.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::channel::{AudioChannel, ChannelField, VolumeChannel, FALLBACK_RESTORE_VOLUME};
use crate::error::SettingsError;
use crate::keys::{Setting, SettingKey};
use crate::observer::{Listener, ObserverRegistry, SubscriptionId, Topic};
use crate::persistence::PreferenceBackend;
use crate::push::{is_push_dependent, PUSH_DEPENDENTS, PUSH_MASTER};
use crate::quality::{GraphicsQuality, LogQualityBackend, QualityBackend};
use crate::value::{SettingKind, SettingType, SettingValue};

/// Handle to the process-wide store.
///
/// Listeners run while the store is mutably borrowed and must not call back
/// into it.
pub type SharedSettings = Rc<RefCell<SettingsStore>>;

pub struct SettingsStore {
    backend: Box<dyn PreferenceBackend>,
    quality: Box<dyn QualityBackend>,
    values: BTreeMap<SettingKey, SettingValue>,
    /// Whether push dependents accept input. Mirrors the master toggle,
    /// never persisted.
    push_interactable: bool,
    observers: ObserverRegistry,
    /// Backend has writes that haven't been saved yet
    dirty: bool,
    save_error: Option<SettingsError>,
}

impl SettingsStore {
    /// Load settings from `backend`, using defaults for missing keys, then
    /// reconcile coupled state.
    pub fn open(backend: Box<dyn PreferenceBackend>) -> Self {
        Self::with_quality_backend(backend, Box::new(LogQualityBackend))
    }

    pub fn with_quality_backend(
        backend: Box<dyn PreferenceBackend>,
        quality: Box<dyn QualityBackend>,
    ) -> Self {
        let mut store = Self {
            backend,
            quality,
            values: BTreeMap::new(),
            push_interactable: true,
            observers: ObserverRegistry::new(),
            dirty: false,
            save_error: None,
        };
        store.load();
        store
    }

    /// Wrap into the shared handle
    pub fn into_shared(self) -> SharedSettings {
        Rc::new(RefCell::new(self))
    }

    // ========================================================================
    // Loading
    // ========================================================================

    fn load(&mut self) {
        let mut from_disk = 0;
        for key in SettingKey::all() {
            let stored = self.read_backend(key);
            if stored.is_some() {
                from_disk += 1;
            }
            let value = stored.map_or(key.default_value(), |v| key.kind().coerce(v));
            self.values.insert(key, value);
        }

        // A zero was never meant to be cached as the restore volume
        for channel in AudioChannel::ALL {
            let last = channel.last_volume_key();
            if self.get(channel.last_volume()) <= 0.0 {
                self.values.insert(last, last.default_value());
            }
        }

        self.reconcile();
        self.quality.apply_quality_level(self.graphics_quality());
        self.commit();

        log::info!("Loaded settings ({} of {} keys persisted)", from_disk, self.values.len());
    }

    fn read_backend(&self, key: SettingKey) -> Option<SettingValue> {
        let name = key.name();
        match key.kind() {
            SettingKind::Bool => self.backend.get_int(name).map(|i| SettingValue::Bool(i != 0)),
            SettingKind::Float { .. } => self.backend.get_float(name).map(SettingValue::Float),
            SettingKind::Int { .. } => self.backend.get_int(name).map(SettingValue::Int),
        }
    }

    /// Bring independently loaded values back in line with the invariants.
    fn reconcile(&mut self) {
        for channel in AudioChannel::ALL {
            let muted = self.is_muted(channel);
            let volume = self.volume(channel);
            if muted && volume > 0.0 {
                log::debug!("{channel}: muted with volume {volume}, zeroing volume");
                self.apply_volume(channel, 0.0);
            } else if !muted && volume <= 0.0 {
                log::debug!("{channel}: silent but not muted, muting");
                self.apply_muted(channel, true);
            }
        }

        let master = self.get_value(PUSH_MASTER).as_bool();
        self.push_interactable = master;
        if !master {
            self.force_push_dependents(false);
        }
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Current value of `key`. Never fails.
    pub fn get_value(&self, key: SettingKey) -> SettingValue {
        self.values.get(&key).copied().unwrap_or_else(|| key.default_value())
    }

    /// Typed read
    pub fn get<T: SettingType>(&self, setting: Setting<T>) -> T {
        T::from_value(self.get_value(setting.key()))
    }

    pub fn volume(&self, channel: AudioChannel) -> f32 {
        self.get(channel.volume())
    }

    pub fn is_muted(&self, channel: AudioChannel) -> bool {
        self.get(channel.muted())
    }

    pub fn last_volume(&self, channel: AudioChannel) -> f32 {
        self.get(channel.last_volume())
    }

    pub fn channel(&self, channel: AudioChannel) -> VolumeChannel {
        VolumeChannel {
            volume: self.volume(channel),
            muted: self.is_muted(channel),
            last_volume: self.last_volume(channel),
        }
    }

    pub fn graphics_quality(&self) -> GraphicsQuality {
        GraphicsQuality::from_level(self.get_value(SettingKey::GraphicsQualityMode).as_i32())
    }

    pub fn push_enabled(&self) -> bool {
        self.get_value(PUSH_MASTER).as_bool()
    }

    /// Whether the control for `key` should accept input.
    /// Only push dependents are ever non-interactive.
    pub fn is_interactable(&self, key: SettingKey) -> bool {
        !is_push_dependent(key) || self.push_interactable
    }

    /// Every key with its current value, in table order
    pub fn snapshot(&self) -> Vec<(SettingKey, SettingValue)> {
        SettingKey::all().map(|k| (k, self.get_value(k))).collect()
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Set any setting by key.
    ///
    /// The value is coerced to the key's kind and range, then routed through
    /// the matching derived setter (volume, mute, push master, ...), so the
    /// invariants hold no matter which entry point is used.
    pub fn set_value(&mut self, key: SettingKey, value: SettingValue) {
        let value = key.kind().coerce(value);

        if let Some((channel, field)) = AudioChannel::for_key(key) {
            match field {
                ChannelField::Volume => self.set_volume(channel, value.as_f32()),
                ChannelField::Muted => self.set_muted(channel, value.as_bool()),
                ChannelField::LastVolume => self.set_last_volume(channel, value.as_f32()),
            }
            return;
        }

        match key {
            SettingKey::GraphicsQualityMode => {
                self.set_graphics_quality(GraphicsQuality::from_level(value.as_i32()));
            }
            SettingKey::PushNotificationsEnabled => self.set_master_push(value.as_bool()),
            k if is_push_dependent(k) && !self.push_enabled() && value.as_bool() => {
                log::debug!("{k}: ignored while push notifications are off");
                self.assign(k, SettingValue::Bool(false));
                self.commit();
            }
            _ => {
                self.assign(key, value);
                self.commit();
            }
        }
    }

    /// Typed write
    pub fn set<T: SettingType>(&mut self, setting: Setting<T>, value: T) {
        self.set_value(setting.key(), value.into_value());
    }

    /// Set a channel's volume, muting at zero and unmuting above it.
    pub fn set_volume(&mut self, channel: AudioChannel, volume: f32) {
        let volume = SettingKind::VOLUME.coerce(SettingValue::Float(volume)).as_f32();
        self.apply_volume(channel, volume);
        self.commit();
    }

    /// Mute or unmute a channel.
    ///
    /// Muting caches the audible volume and drops it to zero; unmuting a
    /// silent channel restores the cached volume (or 0.5 if there is none).
    pub fn set_muted(&mut self, channel: AudioChannel, muted: bool) {
        self.apply_muted(channel, muted);
        self.commit();
    }

    /// Record the volume restored on unmute. Non-positive values are ignored.
    pub fn set_last_volume(&mut self, channel: AudioChannel, volume: f32) {
        if volume > 0.0 {
            let volume = SettingKind::VOLUME.coerce(SettingValue::Float(volume));
            self.assign(channel.last_volume_key(), volume);
            self.commit();
        } else {
            log::trace!("{channel}: ignoring non-positive last volume {volume}");
        }
    }

    pub fn set_graphics_quality(&mut self, quality: GraphicsQuality) {
        if self.assign(SettingKey::GraphicsQualityMode, SettingValue::Int(quality.level())) {
            self.quality.apply_quality_level(quality);
        }
        self.commit();
    }

    /// Turn push notifications on or off.
    ///
    /// Dependents follow the master's interactability. Turning the master
    /// off forces every dependent off; turning it on forces them on only when
    /// the master was off before, so a repeated "on" keeps per-topic choices.
    /// Each dependent that actually changes notifies once.
    pub fn set_master_push(&mut self, enabled: bool) {
        let changed = self.assign(PUSH_MASTER, SettingValue::Bool(enabled));
        self.set_push_interactable(enabled);
        if changed || !enabled {
            self.force_push_dependents(enabled);
        }
        self.commit();
    }

    /// Drive every setting back to its default through the regular setters.
    pub fn reset_to_defaults(&mut self) {
        log::info!("Resetting settings to defaults");
        // Master first so dependents are writable again
        self.set_master_push(PUSH_MASTER.default_value().as_bool());
        for key in SettingKey::all() {
            if key == PUSH_MASTER {
                continue;
            }
            if AudioChannel::for_key(key).is_some_and(|(_, f)| f == ChannelField::Muted) {
                // Follows from the volume default
                continue;
            }
            self.set_value(key, key.default_value());
        }
    }

    /// Write every value to the backend and save, regardless of what
    /// changed. Returns the save error instead of logging it.
    pub fn save_all(&mut self) -> Result<(), SettingsError> {
        for key in SettingKey::all() {
            self.write_backend(key, self.get_value(key));
        }
        self.dirty = false;
        self.save_error = None;
        self.backend.save()?;
        log::info!("Saved all settings");
        Ok(())
    }

    /// The last eager-save failure, if any. Cleared by the next successful
    /// save.
    pub fn take_save_error(&mut self) -> Option<SettingsError> {
        self.save_error.take()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Listen for changes of `key`. The listener receives the new value.
    pub fn subscribe(
        &mut self,
        key: SettingKey,
        listener: impl FnMut(SettingValue) + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(Topic::Changed(key), Box::new(listener))
    }

    /// Listen for interactability changes of `key`'s control.
    pub fn subscribe_interactable(
        &mut self,
        key: SettingKey,
        mut listener: impl FnMut(bool) + 'static,
    ) -> SubscriptionId {
        let listener: Listener = Box::new(move |v: SettingValue| listener(v.as_bool()));
        self.observers.subscribe(Topic::Interactable(key), listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.observers.len()
    }

    /// Drop every subscription. Called at teardown so no callback outlives
    /// the UI it points into.
    pub fn clear_listeners(&mut self) {
        let dropped = self.observers.len();
        self.observers.clear();
        log::debug!("Cleared {dropped} settings listeners");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Store and persist `value` (already coerced). Notifies and returns true
    /// only if the value changed.
    fn assign(&mut self, key: SettingKey, value: SettingValue) -> bool {
        self.write_backend(key, value);
        let previous = self.values.insert(key, value);
        if previous == Some(value) {
            log::trace!("{key}: unchanged ({value})");
            return false;
        }
        log::debug!("{key} = {value}");
        self.observers.notify(Topic::Changed(key), value);
        true
    }

    fn write_backend(&mut self, key: SettingKey, value: SettingValue) {
        let name = key.name();
        match value {
            SettingValue::Bool(b) => self.backend.set_int(name, b as i32),
            SettingValue::Float(f) => self.backend.set_float(name, f),
            SettingValue::Int(i) => self.backend.set_int(name, i),
        }
        self.dirty = true;
    }

    /// Eager save. Failures are logged and kept for `take_save_error`.
    fn commit(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        match self.backend.save() {
            Ok(()) => self.save_error = None,
            Err(e) => {
                log::warn!("Failed to save settings: {e}");
                self.save_error = Some(e);
            }
        }
    }

    fn apply_volume(&mut self, channel: AudioChannel, volume: f32) {
        self.assign(channel.volume_key(), SettingValue::Float(volume));

        let muted = self.is_muted(channel);
        if volume <= 0.0 && !muted {
            self.assign(channel.muted_key(), SettingValue::Bool(true));
        } else if volume > 0.0 && muted {
            self.assign(channel.muted_key(), SettingValue::Bool(false));
        }

        if volume > 0.0 {
            self.assign(channel.last_volume_key(), SettingValue::Float(volume));
        }
    }

    fn apply_muted(&mut self, channel: AudioChannel, muted: bool) {
        self.assign(channel.muted_key(), SettingValue::Bool(muted));

        let volume = self.volume(channel);
        if muted {
            if volume > 0.0 {
                self.assign(channel.last_volume_key(), SettingValue::Float(volume));
            }
            self.assign(channel.volume_key(), SettingValue::Float(0.0));
        } else if volume <= 0.0 {
            let last = self.last_volume(channel);
            let restored = if last > 0.0 { last } else { FALLBACK_RESTORE_VOLUME };
            self.assign(channel.volume_key(), SettingValue::Float(restored));
        }
    }

    fn set_push_interactable(&mut self, interactable: bool) {
        if self.push_interactable == interactable {
            return;
        }
        self.push_interactable = interactable;
        for key in PUSH_DEPENDENTS {
            self.observers
                .notify(Topic::Interactable(key), SettingValue::Bool(interactable));
        }
    }

    fn force_push_dependents(&mut self, enabled: bool) {
        let mut flipped = 0;
        for key in PUSH_DEPENDENTS {
            if self.assign(key, SettingValue::Bool(enabled)) {
                flipped += 1;
            }
        }
        if flipped > 0 {
            log::debug!("Push cascade: {flipped} dependents set to {enabled}");
        }
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("values", &self.values)
            .field("push_interactable", &self.push_interactable)
            .field("observers", &self.observers)
            .finish()
    }
}
