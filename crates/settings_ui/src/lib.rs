//! Settings screen plumbing.
//!
//! The UI toolkit is reached through the [`Control`] trait. [`Widget`] is a
//! headless model of a control (slider, toggle, quality selector) used by
//! tests and by screens that render from plain state. [`SettingsBinder`]
//! keeps a set of controls and the store in sync in both directions.

pub mod binder;
pub mod control;

pub use binder::{SettingsBinder, SettingsBinderBuilder};
pub use control::{
    ChangeListener, Control, ListenerId, QualitySelector, Slider, Toggle, Widget, WidgetValue,
};
