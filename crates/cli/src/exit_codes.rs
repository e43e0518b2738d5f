//! CLI Exit Code Registry
//!
//! Single source of truth for `agit-prefs` exit codes.
//! Exit codes are part of the shell contract, scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | Error (settings file unwritable, no config directory)    |
//! | 2    | Usage error (unknown key or channel, unparseable value)  |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - the command was valid but could not be carried out.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. clap also exits with 2 for its own parse errors.
pub const EXIT_USAGE: u8 = 2;
