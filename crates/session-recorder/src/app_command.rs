/// Commands sent from the console input task to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Pause the current recording.
    Pause,
    /// Resume a paused recording.
    Resume,
    /// Stop the recording and exit.
    Stop,
}
