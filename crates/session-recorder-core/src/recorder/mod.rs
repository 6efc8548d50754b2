mod duration;
mod persistence;
#[allow(clippy::module_inception)]
mod recorder;
mod session;
mod state;

pub(crate) use session::{ActiveSession, Shared};

pub use {
    duration::{DurationTracker, active_duration},
    persistence::{PersistenceGateway, RecordId},
    recorder::{DEFAULT_STOP_TIMEOUT, Recorder, RecorderConfig},
    session::{RecordingSummary, SessionInfo},
    state::{RecorderCommand, RecorderState},
};
