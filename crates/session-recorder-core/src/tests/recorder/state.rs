use crate::{RecorderCommand, RecorderState};

/// WHAT: Transition table matches the recorder lifecycle
/// WHY: Every command must be rejected outside its allowed states
#[test]
fn given_each_state_when_checking_commands_then_only_lifecycle_edges_permitted() {
    use RecorderCommand::*;
    use RecorderState::*;

    // Given: Every (state, command) pair and the expected verdict
    let table = [
        (Idle, Start, true),
        (Idle, Pause, false),
        (Idle, Resume, false),
        (Idle, Stop, false),
        (Recording, Start, false),
        (Recording, Pause, true),
        (Recording, Resume, false),
        (Recording, Stop, true),
        (Paused, Start, false),
        (Paused, Pause, false),
        (Paused, Resume, true),
        (Paused, Stop, true),
        (Stopped, Start, true),
        (Stopped, Pause, false),
        (Stopped, Resume, false),
        (Stopped, Stop, false),
    ];

    // When/Then: permits() agrees with the table
    for (state, command, expected) in table {
        assert_eq!(
            state.permits(command),
            expected,
            "{} from {}",
            command,
            state
        );
    }
}

/// WHAT: States render as lowercase names
/// WHY: The status line and logs show them to the user
#[test]
fn given_states_when_displaying_then_lowercase_names() {
    assert_eq!(RecorderState::Idle.to_string(), "idle");
    assert_eq!(RecorderState::Recording.to_string(), "recording");
    assert_eq!(RecorderState::Paused.to_string(), "paused");
    assert_eq!(RecorderState::Stopped.to_string(), "stopped");
    assert_eq!(RecorderState::default(), RecorderState::Idle);
}
