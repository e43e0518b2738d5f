// Integration tests for agit-prefs: exit codes, stdout contract, persistence.
//
// Run with: cargo test -p agit-cli --test prefs_cli -- --nocapture

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn prefs(file: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_agit-prefs"));
    cmd.env_remove("AGIT_SETTINGS").env_remove("RUST_LOG").arg("--file").arg(file);
    cmd
}

fn run(file: &Path, args: &[&str]) -> Output {
    prefs(file).args(args).output().expect("run agit-prefs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

// ===========================================================================
// Reading
// ===========================================================================

#[test]
fn get_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");

    let output = run(&file, &["get", "BGMVolume"]);
    assert_ok(&output);
    assert_eq!(stdout(&output), "1");

    let output = run(&file, &["get", "nighttimepushenabled"]);
    assert_ok(&output);
    assert_eq!(stdout(&output), "false");

    // Reading alone never creates the file
    assert!(!file.exists());
}

#[test]
fn list_json_is_one_object_in_table_order() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");

    let output = run(&file, &["list", "--json"]);
    assert_ok(&output);
    let text = stdout(&output);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let object = value.as_object().unwrap();

    assert_eq!(object.len(), 29);
    assert_eq!(object["GraphicsQualityMode"], 1);
    assert_eq!(object["BGMMuted"], false);
    assert_eq!(object["LastBGMVolume"], 0.5);
    let quality_at = text.find("GraphicsQualityMode").unwrap();
    assert!(quality_at < text.find("LiveBroadcastPushEnabled").unwrap());
}

#[test]
fn path_prints_file_override() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("custom.json");
    let output = run(&file, &["path"]);
    assert_ok(&output);
    assert_eq!(stdout(&output), file.display().to_string());
}

// ===========================================================================
// Writing
// ===========================================================================

#[test]
fn mute_then_unmute_restores_volume() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");

    assert_ok(&run(&file, &["volume", "bgm", "0.7"]));
    let output = run(&file, &["mute", "bgm"]);
    assert_ok(&output);
    assert!(stdout(&output).contains("(muted)"));
    assert_eq!(stdout(&run(&file, &["get", "BGMVolume"])), "0");

    assert_ok(&run(&file, &["unmute", "bgm"]));
    assert_eq!(stdout(&run(&file, &["get", "BGMVolume"])), "0.7");
    assert_eq!(stdout(&run(&file, &["get", "BGMMuted"])), "false");
}

#[test]
fn volume_zero_mutes() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");

    assert_ok(&run(&file, &["volume", "square-video", "0"]));
    assert_eq!(stdout(&run(&file, &["get", "SquareVideoMuted"])), "true");
}

#[test]
fn push_off_locks_topics() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");

    assert_ok(&run(&file, &["push", "off"]));
    assert_eq!(stdout(&run(&file, &["get", "GatheringPushEnabled"])), "false");

    // Turning a topic on while push is off is stored as off
    let output = run(&file, &["set", "GatheringPushEnabled", "on"]);
    assert_ok(&output);
    assert_eq!(stdout(&output), "GatheringPushEnabled = false");
    assert!(String::from_utf8_lossy(&output.stderr).contains("push on"));

    let listing = stdout(&run(&file, &["list"]));
    let line = listing.lines().find(|l| l.starts_with("GatheringPushEnabled")).unwrap();
    assert!(line.ends_with("(locked)"), "{line}");

    assert_ok(&run(&file, &["push", "on"]));
    assert_eq!(stdout(&run(&file, &["get", "GatheringPushEnabled"])), "true");
}

#[test]
fn push_on_when_already_on_keeps_topics() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");

    assert_ok(&run(&file, &["set", "RoomChatPushEnabled", "off"]));
    assert_ok(&run(&file, &["push", "on"]));

    assert_eq!(stdout(&run(&file, &["get", "RoomChatPushEnabled"])), "false");
    assert_eq!(stdout(&run(&file, &["get", "NightTimePushEnabled"])), "false");
    assert_eq!(stdout(&run(&file, &["get", "GatheringPushEnabled"])), "true");
}

#[test]
fn set_clamps_out_of_range() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");

    let output = run(&file, &["set", "GraphicsQualityMode", "7"]);
    assert_ok(&output);
    assert_eq!(stdout(&output), "GraphicsQualityMode = 2");
}

#[test]
fn reset_writes_every_default() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");

    assert_ok(&run(&file, &["set", "HapticEnabled", "off"]));
    assert_ok(&run(&file, &["push", "off"]));
    assert_ok(&run(&file, &["reset"]));
    assert_eq!(stdout(&run(&file, &["get", "HapticEnabled"])), "true");
    assert_eq!(stdout(&run(&file, &["get", "PushNotificationsEnabled"])), "true");
    assert_eq!(stdout(&run(&file, &["get", "MarketingInfoConsent"])), "false");

    let text = std::fs::read_to_string(&file).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 29);
    assert_eq!(object["MarketingInfoConsent"], 0);
    assert_eq!(object["NightTimePushEnabled"], 0);
    assert_eq!(object["GatheringPushEnabled"], 1);
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn unknown_key_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir.path().join("settings.json"), &["get", "NoSuchSetting"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_channel_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir.path().join("settings.json"), &["mute", "radio"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unparseable_value_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.json");
    let output = run(&file, &["set", "HapticEnabled", "maybe"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("maybe"));
    assert!(!file.exists());
}

#[test]
fn unwritable_file_is_error() {
    let dir = TempDir::new().unwrap();
    // A directory in place of the file makes the save fail
    let file = dir.path().join("settings.json");
    std::fs::create_dir(&file).unwrap();

    let output = run(&file, &["volume", "sfx", "0.3"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not saved"));
}
