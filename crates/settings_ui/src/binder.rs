//! Two-way binding between settings controls and the store.
//!
//! Control to store: each control gets one change listener that forwards the
//! new value to the store's setter. Store to control: each bound key gets one
//! store subscription that silently refreshes every control showing that key.
//! Push dependents additionally follow the store's interactable signal.
//!
//! Controls never hear about their own refresh, so a user change makes exactly
//! one round trip.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use agit_settings::push::is_push_dependent;
use agit_settings::{
    AudioChannel, GraphicsQuality, Setting, SettingKey, SettingType, SettingValue, SettingsStore,
    SharedSettings, SubscriptionId, GRAPHICS_QUALITY,
};

use crate::control::{Control, ListenerId};

/// A control bound to one key, with its value type erased.
trait BoundControl {
    fn key(&self) -> SettingKey;
    /// Silent refresh from the store
    fn show(&self, value: SettingValue);
    fn set_interactable(&self, interactable: bool);
    /// Start forwarding user input to the store
    fn attach(&self, settings: Weak<RefCell<SettingsStore>>);
    fn detach(&self);
}

struct Binding<T, C: ?Sized> {
    setting: Setting<T>,
    control: Rc<C>,
    listener: Cell<Option<ListenerId>>,
}

impl<T, C> BoundControl for Binding<T, C>
where
    T: SettingType,
    C: Control<Value = T> + ?Sized + 'static,
{
    fn key(&self) -> SettingKey {
        self.setting.key()
    }

    fn show(&self, value: SettingValue) {
        self.control.set_value_silently(T::from_value(value));
    }

    fn set_interactable(&self, interactable: bool) {
        self.control.set_interactable(interactable);
    }

    fn attach(&self, settings: Weak<RefCell<SettingsStore>>) {
        let key = self.setting.key();
        let control: Weak<C> = Rc::downgrade(&self.control);

        let id = self.control.on_change(Box::new(move |value: T| {
            let Some(settings) = settings.upgrade() else {
                log::debug!("{key}: settings store is gone, ignoring input {value:?}");
                return;
            };
            let stored = match settings.try_borrow_mut() {
                Ok(mut store) => {
                    store.set_value(key, value.into_value());
                    T::from_value(store.get_value(key))
                }
                Err(_) => {
                    log::warn!("{key}: store is busy, dropping input {value:?}");
                    return;
                }
            };
            // The store may have coerced the input; show what it kept
            if let Some(control) = control.upgrade() {
                if control.value() != stored {
                    control.set_value_silently(stored);
                }
            }
        }));
        self.listener.set(Some(id));
    }

    fn detach(&self) {
        if let Some(id) = self.listener.take() {
            self.control.remove_listener(id);
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects the controls of a settings screen. `bind` wires them up.
pub struct SettingsBinderBuilder {
    settings: SharedSettings,
    bindings: Vec<Rc<dyn BoundControl>>,
}

impl SettingsBinderBuilder {
    /// Bind `control` to `setting`. Several controls may share one setting.
    pub fn control<T, C>(mut self, setting: Setting<T>, control: Rc<C>) -> Self
    where
        T: SettingType,
        C: Control<Value = T> + ?Sized + 'static,
    {
        self.bindings.push(Rc::new(Binding {
            setting,
            control,
            listener: Cell::new(None),
        }));
        self
    }

    pub fn volume<C>(self, channel: AudioChannel, slider: Rc<C>) -> Self
    where
        C: Control<Value = f32> + ?Sized + 'static,
    {
        self.control(channel.volume(), slider)
    }

    pub fn mute<C>(self, channel: AudioChannel, toggle: Rc<C>) -> Self
    where
        C: Control<Value = bool> + ?Sized + 'static,
    {
        self.control(channel.muted(), toggle)
    }

    pub fn quality<C>(self, selector: Rc<C>) -> Self
    where
        C: Control<Value = GraphicsQuality> + ?Sized + 'static,
    {
        self.control(GRAPHICS_QUALITY, selector)
    }

    /// Populate every control from the store, then subscribe both ways.
    pub fn bind(self) -> SettingsBinder {
        let mut by_key: BTreeMap<SettingKey, Vec<Rc<dyn BoundControl>>> = BTreeMap::new();
        for binding in &self.bindings {
            by_key.entry(binding.key()).or_default().push(binding.clone());
        }

        let mut subscriptions = Vec::new();
        {
            let mut store = self.settings.borrow_mut();
            for (key, targets) in by_key {
                let value = store.get_value(key);
                let interactable = store.is_interactable(key);
                for target in &targets {
                    target.show(value);
                    target.set_interactable(interactable);
                }

                if is_push_dependent(key) {
                    let gated = targets.clone();
                    subscriptions.push(store.subscribe_interactable(key, move |interactable| {
                        for target in &gated {
                            target.set_interactable(interactable);
                        }
                    }));
                }
                subscriptions.push(store.subscribe(key, move |value| {
                    for target in &targets {
                        target.show(value);
                    }
                }));
            }
        }

        let weak = Rc::downgrade(&self.settings);
        for binding in &self.bindings {
            binding.attach(weak.clone());
        }

        log::debug!(
            "Bound {} controls ({} store subscriptions)",
            self.bindings.len(),
            subscriptions.len()
        );

        SettingsBinder {
            settings: Some(self.settings),
            bindings: self.bindings,
            subscriptions,
        }
    }
}

// ============================================================================
// Binder
// ============================================================================

/// Live binding of a settings screen to the store.
///
/// Dropping the binder unbinds it.
pub struct SettingsBinder {
    settings: Option<SharedSettings>,
    bindings: Vec<Rc<dyn BoundControl>>,
    subscriptions: Vec<SubscriptionId>,
}

impl SettingsBinder {
    pub fn builder(settings: SharedSettings) -> SettingsBinderBuilder {
        SettingsBinderBuilder {
            settings,
            bindings: Vec::new(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.settings.is_some()
    }

    /// Number of bound controls
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Remove every listener in both directions and release the store.
    /// Controls keep their last displayed value. If the store is borrowed
    /// elsewhere its subscriptions are kept and retried by the next `unbind`
    /// (or drop).
    pub fn unbind(&mut self) {
        for binding in self.bindings.drain(..) {
            binding.detach();
        }

        let Some(settings) = self.settings.take() else {
            return;
        };
        let busy = match settings.try_borrow_mut() {
            Ok(mut store) => {
                for id in self.subscriptions.drain(..) {
                    store.unsubscribe(id);
                }
                false
            }
            Err(_) => true,
        };
        if busy {
            log::warn!(
                "Store busy while unbinding; {} subscriptions kept for retry",
                self.subscriptions.len()
            );
            self.settings = Some(settings);
        } else {
            log::debug!("Settings binder unbound");
        }
    }
}

impl Drop for SettingsBinder {
    fn drop(&mut self) {
        self.unbind();
    }
}

impl std::fmt::Debug for SettingsBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsBinder")
            .field("bound", &self.is_bound())
            .field("controls", &self.bindings.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
