use std::fmt;

/// Recorder lifecycle state.
///
/// ```text
/// idle/stopped → recording ⇄ paused
///                    ↓          ↓
///                  stopped ←────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    /// No session has been started yet.
    #[default]
    Idle,
    /// Frames are being appended to the output file.
    Recording,
    /// Session is open but incoming frames are dropped.
    Paused,
    /// Last session finished; a new one may be started.
    Stopped,
}

impl RecorderState {
    /// Whether a session (and its output file) is open.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }

    /// Whether `command` is allowed from this state.
    pub fn permits(self, command: RecorderCommand) -> bool {
        match command {
            RecorderCommand::Start => matches!(self, Self::Idle | Self::Stopped),
            RecorderCommand::Pause => self == Self::Recording,
            RecorderCommand::Resume => self == Self::Paused,
            RecorderCommand::Stop => self.is_active(),
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Control commands accepted by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderCommand {
    /// Begin a new session.
    Start,
    /// Stop appending frames.
    Pause,
    /// Resume appending frames.
    Resume,
    /// Finalize and close the session.
    Stop,
}

impl fmt::Display for RecorderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
        };
        f.write_str(name)
    }
}
