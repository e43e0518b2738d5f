//! UI control abstraction and headless widget models.
//!
//! A control has a displayed value, an interactable flag and a list of
//! change listeners. `set_value` is what user interaction does: it updates
//! the value and fires listeners. `set_value_silently` is what programmatic
//! refreshes do: it updates the value only.
//!
//! All methods take `&self`. Listeners may call back into the control that
//! is firing them (typically a silent set); the firing listener is taken out
//! of the list while it runs, so a re-entrant `set_value` can't loop.

use std::cell::{Cell, RefCell};
use std::fmt;

use agit_settings::GraphicsQuality;

/// Token returned by `on_change`, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type ChangeListener<T> = Box<dyn FnMut(T)>;

/// A UI control that displays and edits one value.
pub trait Control {
    type Value: Copy + PartialEq + fmt::Debug;

    fn value(&self) -> Self::Value;

    /// User input. Updates the value and fires change listeners.
    /// Ignored while the control is not interactable.
    fn set_value(&self, value: Self::Value);

    /// Programmatic refresh. Updates the value without firing anything.
    fn set_value_silently(&self, value: Self::Value);

    fn set_interactable(&self, interactable: bool);
    fn is_interactable(&self) -> bool;

    fn on_change(&self, listener: ChangeListener<Self::Value>) -> ListenerId;

    /// Returns false if the id is unknown or already removed.
    fn remove_listener(&self, id: ListenerId) -> bool;

    fn listener_count(&self) -> usize;
}

/// Values a [`Widget`] can hold.
pub trait WidgetValue: Copy + PartialEq + fmt::Debug + 'static {
    /// Bring a raw input into the widget's range
    fn normalize(self) -> Self {
        self
    }
}

/// Slider values live in 0.0..=1.0
impl WidgetValue for f32 {
    fn normalize(self) -> Self {
        if self.is_nan() {
            0.0
        } else {
            self.clamp(0.0, 1.0)
        }
    }
}

impl WidgetValue for bool {}

impl WidgetValue for GraphicsQuality {}

// ============================================================================
// Headless widget
// ============================================================================

pub struct Widget<T: WidgetValue> {
    value: Cell<T>,
    interactable: Cell<bool>,
    next_id: Cell<u64>,
    /// `None` while the listener is running
    listeners: RefCell<Vec<(ListenerId, Option<ChangeListener<T>>)>>,
}

pub type Slider = Widget<f32>;
pub type Toggle = Widget<bool>;
pub type QualitySelector = Widget<GraphicsQuality>;

impl<T: WidgetValue> Widget<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: Cell::new(initial.normalize()),
            interactable: Cell::new(true),
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }

    fn emit(&self, value: T) {
        let ids: Vec<ListenerId> = self.listeners.borrow().iter().map(|(id, _)| *id).collect();
        for id in ids {
            let taken = self
                .listeners
                .borrow_mut()
                .iter_mut()
                .find(|(lid, _)| *lid == id)
                .and_then(|(_, slot)| slot.take());

            let Some(mut listener) = taken else {
                // Removed by an earlier listener, or already running
                continue;
            };
            listener(value);

            // Put it back unless it removed itself meanwhile
            let mut listeners = self.listeners.borrow_mut();
            if let Some((_, slot)) = listeners.iter_mut().find(|(lid, _)| *lid == id) {
                *slot = Some(listener);
            }
        }
    }
}

impl<T: WidgetValue> Control for Widget<T> {
    type Value = T;

    fn value(&self) -> T {
        self.value.get()
    }

    fn set_value(&self, value: T) {
        if !self.interactable.get() {
            log::trace!("Ignoring input {:?} on non-interactable control", value);
            return;
        }
        let value = value.normalize();
        if self.value.replace(value) == value {
            return;
        }
        self.emit(value);
    }

    fn set_value_silently(&self, value: T) {
        self.value.set(value.normalize());
    }

    fn set_interactable(&self, interactable: bool) {
        self.interactable.set(interactable);
    }

    fn is_interactable(&self) -> bool {
        self.interactable.get()
    }

    fn on_change(&self, listener: ChangeListener<T>) -> ListenerId {
        let id = ListenerId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.listeners.borrow_mut().push((id, Some(listener)));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl<T: WidgetValue + Default> Default for Widget<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: WidgetValue> fmt::Debug for Widget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("value", &self.value.get())
            .field("interactable", &self.interactable.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
