use crate::{AppError, AppResult};

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;

/// Usage text for `--help` and argument errors.
pub const USAGE: &str = "\
Usage: session-recorder [--list | --inspect <file.wav> | --help]

  (no flags)        record from the default microphone
  --list            print the recordings catalog, newest first
  --inspect <file>  print the WAV header of a recording";

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Record a session from the default input device.
    Record,
    /// Print the recordings catalog.
    List,
    /// Print the header of a WAV file.
    Inspect(PathBuf),
    /// Print usage.
    Help,
}

/// Parses the arguments following the program name.
#[track_caller]
pub fn parse_args<I, S>(args: I) -> AppResult<Mode>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();

    match args.as_slice() {
        [] => Ok(Mode::Record),
        [flag] if flag == "--list" => Ok(Mode::List),
        [flag] if flag == "--help" || flag == "-h" => Ok(Mode::Help),
        [flag, path] if flag == "--inspect" => Ok(Mode::Inspect(PathBuf::from(path))),
        [flag] if flag == "--inspect" => Err(AppError::UsageError {
            reason: "--inspect needs a file path".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
        _ => Err(AppError::UsageError {
            reason: format!("unrecognised arguments: {}", args.join(" ")),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
