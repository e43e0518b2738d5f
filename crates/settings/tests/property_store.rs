// Property-based tests for the coupled settings (channel volumes, push group).
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use agit_settings::{
    AudioChannel, MemoryBackend, PushTopic, SettingKey, SettingValue, SettingsStore,
    PUSH_DEPENDENTS,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Volume(AudioChannel, f32),
    Mute(AudioChannel, bool),
    LastVolume(AudioChannel, f32),
    Master(bool),
    Topic(PushTopic, bool),
    Raw(SettingKey, SettingValue),
    Save,
}

fn arb_channel() -> impl Strategy<Value = AudioChannel> {
    prop::sample::select(AudioChannel::ALL.to_vec())
}

fn arb_topic() -> impl Strategy<Value = PushTopic> {
    prop::sample::select(PushTopic::ALL.to_vec())
}

fn arb_key() -> impl Strategy<Value = SettingKey> {
    prop::sample::select(SettingKey::all().collect::<Vec<_>>())
}

/// Volumes: mostly in range, with exact zero and out-of-range values mixed in.
fn arb_volume() -> impl Strategy<Value = f32> {
    prop_oneof![
        4 => 0.0f32..=1.0,
        1 => Just(0.0f32),
        1 => -2.0f32..3.0,
    ]
}

fn arb_value() -> impl Strategy<Value = SettingValue> {
    prop_oneof![
        any::<bool>().prop_map(SettingValue::Bool),
        (-2.0f32..3.0).prop_map(SettingValue::Float),
        (-5i32..5).prop_map(SettingValue::Int),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_channel(), arb_volume()).prop_map(|(c, v)| Op::Volume(c, v)),
        3 => (arb_channel(), any::<bool>()).prop_map(|(c, m)| Op::Mute(c, m)),
        1 => (arb_channel(), arb_volume()).prop_map(|(c, v)| Op::LastVolume(c, v)),
        2 => any::<bool>().prop_map(Op::Master),
        2 => (arb_topic(), any::<bool>()).prop_map(|(t, b)| Op::Topic(t, b)),
        2 => (arb_key(), arb_value()).prop_map(|(k, v)| Op::Raw(k, v)),
        1 => Just(Op::Save),
    ]
}

fn apply(store: &mut SettingsStore, op: &Op) {
    match *op {
        Op::Volume(c, v) => store.set_volume(c, v),
        Op::Mute(c, m) => store.set_muted(c, m),
        Op::LastVolume(c, v) => store.set_last_volume(c, v),
        Op::Master(on) => store.set_master_push(on),
        Op::Topic(t, on) => store.set(t.setting(), on),
        Op::Raw(k, v) => store.set_value(k, v),
        Op::Save => store.save_all().unwrap(),
    }
}

fn assert_invariants(store: &SettingsStore) -> Result<(), TestCaseError> {
    for channel in AudioChannel::ALL {
        let state = store.channel(channel);
        prop_assert!((0.0..=1.0).contains(&state.volume), "{channel}: {state:?}");
        prop_assert!(state.last_volume > 0.0, "{channel}: {state:?}");
        prop_assert!(state.is_consistent(), "{channel}: {state:?}");
    }
    if !store.push_enabled() {
        for key in PUSH_DEPENDENTS {
            prop_assert!(!store.get_value(key).as_bool(), "{key} on while master off");
            prop_assert!(!store.is_interactable(key));
        }
    }
    let quality = store.get_value(SettingKey::GraphicsQualityMode).as_i32();
    prop_assert!((0..=2).contains(&quality));
    Ok(())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Any sequence of writes leaves every channel and the push group consistent.
    #[test]
    fn invariants_hold_after_any_sequence(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut store = SettingsStore::open(Box::new(MemoryBackend::new()));
        for op in &ops {
            apply(&mut store, op);
            assert_invariants(&store)?;
        }
    }

    /// Mute then unmute returns an audible channel to where it was.
    #[test]
    fn mute_unmute_restores_volume(channel in arb_channel(), volume in 0.01f32..=1.0) {
        let mut store = SettingsStore::open(Box::new(MemoryBackend::new()));
        store.set_volume(channel, volume);
        store.set_muted(channel, true);
        prop_assert_eq!(store.volume(channel), 0.0);
        store.set_muted(channel, false);
        prop_assert_eq!(store.volume(channel), volume);
    }

    /// Eager saves mean a restart at any point sees the same values.
    #[test]
    fn restart_preserves_every_value(ops in prop::collection::vec(arb_op(), 0..25)) {
        let backend = MemoryBackend::new();
        let mut store = SettingsStore::open(Box::new(backend.clone()));
        for op in &ops {
            apply(&mut store, op);
        }

        let reloaded = SettingsStore::open(Box::new(backend.reopen()));
        prop_assert_eq!(reloaded.snapshot(), store.snapshot());
    }
}
