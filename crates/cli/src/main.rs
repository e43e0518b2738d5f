// agit-prefs - inspect and edit client settings from the shell
// Every mutation goes through the settings store, so the same coupling rules
// apply as in the client (mute/volume, push master cascade).

mod exit_codes;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::ser::{Serialize, SerializeMap, Serializer};

use agit_settings::{
    default_settings_path, AudioChannel, JsonFileBackend, SettingKey, SettingKind, SettingValue,
    SettingsError, SettingsStore,
};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "agit-prefs")]
#[command(about = "Inspect and edit agit client settings")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Settings file (default: <config dir>/agit/settings.json)
    #[arg(long, global = true, env = "AGIT_SETTINGS", value_name = "PATH")]
    file: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every setting with its current value
    List {
        /// Print a single JSON object keyed by setting name
        #[arg(long)]
        json: bool,
    },

    /// Print the value of one setting
    Get {
        /// Setting name, e.g. BGMVolume (case-insensitive)
        #[arg(value_parser = parse_key)]
        key: SettingKey,
    },

    /// Set one setting. Coupled settings follow as in the client.
    #[command(after_help = "\
Examples:
  agit-prefs set SFXVolume 0.4
  agit-prefs set HapticEnabled off
  agit-prefs set GraphicsQualityMode 2")]
    Set {
        #[arg(value_parser = parse_key)]
        key: SettingKey,

        /// Number for volumes and quality, on/off for flags
        value: String,
    },

    /// Mute an audio channel, remembering its volume
    Mute {
        /// bgm, sfx, emoticon, square-video or my-voice
        #[arg(value_parser = parse_channel)]
        channel: AudioChannel,
    },

    /// Unmute an audio channel, restoring its last volume
    Unmute {
        #[arg(value_parser = parse_channel)]
        channel: AudioChannel,
    },

    /// Set an audio channel's volume (0.0 - 1.0)
    Volume {
        #[arg(value_parser = parse_channel)]
        channel: AudioChannel,

        #[arg(value_parser = parse_volume, allow_negative_numbers = true)]
        volume: f32,
    },

    /// Turn push notifications on or off (all topics follow)
    Push {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Reset every setting to its default
    Reset,

    /// Print the settings file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

fn parse_key(s: &str) -> Result<SettingKey, String> {
    s.parse().map_err(|e: SettingsError| e.to_string())
}

fn parse_channel(s: &str) -> Result<AudioChannel, String> {
    s.parse().map_err(|e: SettingsError| e.to_string())
}

fn parse_volume(s: &str) -> Result<f32, String> {
    SettingKind::VOLUME
        .parse(s)
        .map(SettingValue::as_f32)
        .map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Path => cmd_path(cli.file),
        Commands::List { json } => cmd_list(cli.file, json),
        Commands::Get { key } => cmd_get(cli.file, key),
        Commands::Set { key, value } => cmd_set(cli.file, key, &value),
        Commands::Mute { channel } => cmd_mute(cli.file, channel, true),
        Commands::Unmute { channel } => cmd_mute(cli.file, channel, false),
        Commands::Volume { channel, volume } => cmd_volume(cli.file, channel, volume),
        Commands::Push { state } => cmd_push(cli.file, matches!(state, Switch::On)),
        Commands::Reset => cmd_reset(cli.file),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<SettingsError> for CliError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::UnknownKey(_) => CliError::usage(e.to_string())
                .with_hint("run `agit-prefs list` to see every setting"),
            SettingsError::UnknownChannel(_) | SettingsError::InvalidValue { .. } => {
                CliError::usage(e.to_string())
            }
            SettingsError::NoConfigDir => {
                CliError::error(e.to_string()).with_hint("pass --file or set AGIT_SETTINGS")
            }
            SettingsError::Io(_) | SettingsError::Serialize(_) | SettingsError::Parse(_) => {
                CliError::error(e.to_string())
            }
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn settings_path(file: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match file {
        Some(path) => Ok(path),
        None => Ok(default_settings_path()?),
    }
}

fn open_store(file: Option<PathBuf>) -> Result<SettingsStore, CliError> {
    let path = settings_path(file)?;
    log::info!("Using settings file {}", path.display());
    Ok(SettingsStore::open(Box::new(JsonFileBackend::open(path))))
}

/// Surface a failed eager save as the command's error
fn finish(store: &mut SettingsStore) -> Result<(), CliError> {
    match store.take_save_error() {
        Some(e) => Err(CliError::error(format!("settings not saved: {}", e))),
        None => Ok(()),
    }
}

fn cmd_path(file: Option<PathBuf>) -> Result<(), CliError> {
    println!("{}", settings_path(file)?.display());
    Ok(())
}

/// Flat `{ name: value }` object in table order
struct SettingsJson<'a>(&'a [(SettingKey, SettingValue)]);

impl Serialize for SettingsJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key.name(), value)?;
        }
        map.end()
    }
}

fn cmd_list(file: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let store = open_store(file)?;
    let snapshot = store.snapshot();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        serde_json::to_string_pretty(&SettingsJson(&snapshot))
            .map_err(|e| CliError::error(format!("cannot encode settings: {}", e)))
            .and_then(|s| writeln!(out, "{}", s).map_err(|e| CliError::error(e.to_string())))
    } else {
        snapshot.iter().try_for_each(|(key, value)| {
            let locked = if store.is_interactable(*key) { "" } else { "  (locked)" };
            let kind = key.kind().describe();
            writeln!(out, "{:<28} {:<6} {}{}", key.name(), value.to_string(), kind, locked)
                .map_err(|e| CliError::error(e.to_string()))
        })
    }
}

fn cmd_get(file: Option<PathBuf>, key: SettingKey) -> Result<(), CliError> {
    let store = open_store(file)?;
    println!("{}", store.get_value(key));
    Ok(())
}

fn cmd_set(file: Option<PathBuf>, key: SettingKey, text: &str) -> Result<(), CliError> {
    let requested = key.kind().parse(text)?;
    let mut store = open_store(file)?;
    store.set_value(key, requested);
    finish(&mut store)?;

    let stored = store.get_value(key);
    println!("{} = {}", key.name(), stored);
    if stored != requested {
        eprintln!("note:  {} was stored as {} (requested {})", key.name(), stored, requested);
        if !store.is_interactable(key) {
            eprintln!("hint:  push notifications are off; run `agit-prefs push on` first");
        }
    }
    Ok(())
}

fn print_channel(store: &SettingsStore, channel: AudioChannel) {
    let state = store.channel(channel);
    let muted = if state.muted { " (muted)" } else { "" };
    println!("{}: volume {}{}, last {}", channel, state.volume, muted, state.last_volume);
}

fn cmd_mute(file: Option<PathBuf>, channel: AudioChannel, muted: bool) -> Result<(), CliError> {
    let mut store = open_store(file)?;
    store.set_muted(channel, muted);
    finish(&mut store)?;
    print_channel(&store, channel);
    Ok(())
}

fn cmd_volume(file: Option<PathBuf>, channel: AudioChannel, volume: f32) -> Result<(), CliError> {
    let mut store = open_store(file)?;
    store.set_volume(channel, volume);
    finish(&mut store)?;
    print_channel(&store, channel);
    Ok(())
}

fn cmd_push(file: Option<PathBuf>, enabled: bool) -> Result<(), CliError> {
    let mut store = open_store(file)?;
    store.set_master_push(enabled);
    finish(&mut store)?;
    println!("push notifications {}", if enabled { "on" } else { "off" });
    Ok(())
}

fn cmd_reset(file: Option<PathBuf>) -> Result<(), CliError> {
    let mut store = open_store(file)?;
    store.reset_to_defaults();
    // Write the full table so the file lists every setting afterwards
    store.save_all()?;
    println!("settings reset to defaults");
    Ok(())
}
