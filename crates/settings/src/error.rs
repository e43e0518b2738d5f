use std::fmt;
use std::io;

#[derive(Debug)]
pub enum SettingsError {
    /// Reading or writing the settings file failed.
    Io(io::Error),
    /// Settings could not be encoded for persistence.
    Serialize(String),
    /// The settings file exists but is not a flat JSON object.
    Parse(String),
    /// A persisted key name that is not part of the settings table.
    UnknownKey(String),
    /// An audio channel name that is not one of the known channels.
    UnknownChannel(String),
    /// User-typed text that cannot be read as the setting's kind.
    InvalidValue { value: String, expected: String },
    /// The platform has no per-user configuration directory.
    NoConfigDir,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(msg) => write!(f, "cannot encode settings: {msg}"),
            Self::Parse(msg) => write!(f, "cannot parse settings file: {msg}"),
            Self::UnknownKey(key) => write!(f, "unknown setting: {key}"),
            Self::UnknownChannel(name) => write!(f, "unknown audio channel: {name}"),
            Self::InvalidValue { value, expected } => {
                write!(f, "invalid value '{value}', expected {expected}")
            }
            Self::NoConfigDir => write!(f, "no configuration directory available"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SettingsError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
