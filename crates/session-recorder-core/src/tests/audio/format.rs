use crate::{AudioFormat, RecorderError};

/// WHAT: Default format is 16kHz mono 16-bit
/// WHY: Keeps multi-hour sessions small while staying adequate for speech
#[test]
fn given_default_format_when_deriving_rates_then_speech_quality_values() {
    // Given: The default format
    let format = AudioFormat::default();

    // When/Then: 32000 bytes per second, 2 bytes per frame
    assert_eq!(format.sample_rate, 16_000);
    assert_eq!(format.channels, 1);
    assert_eq!(format.bit_depth, 16);
    assert_eq!(format.byte_rate(), 32_000);
    assert_eq!(format.block_align(), 2);
    assert!(format.validate().is_ok());
}

/// WHAT: Derived fields scale with channels and bit depth
/// WHY: Byte rate and block align go straight into the WAV header
#[test]
fn given_stereo_32_bit_format_when_deriving_rates_then_values_scale() {
    // Given: 44.1kHz stereo 32-bit
    let format = AudioFormat {
        sample_rate: 44_100,
        channels: 2,
        bit_depth: 32,
    };

    // When/Then: 44100 * 2 * 4 bytes per second, 8 bytes per frame
    assert_eq!(format.byte_rate(), 352_800);
    assert_eq!(format.block_align(), 8);
}

/// WHAT: Formats a PCM header cannot describe are rejected
/// WHY: Bad parameters must fail at construction, not mid-session
#[test]
fn given_invalid_formats_when_validating_then_invalid_format_errors() {
    // Given: Zero rate, zero channels, odd bit depth, oversized frame
    let bad = [
        AudioFormat {
            sample_rate: 0,
            ..AudioFormat::default()
        },
        AudioFormat {
            channels: 0,
            ..AudioFormat::default()
        },
        AudioFormat {
            bit_depth: 12,
            ..AudioFormat::default()
        },
        AudioFormat {
            channels: u16::MAX,
            bit_depth: 32,
            ..AudioFormat::default()
        },
    ];

    // When/Then: Every one is rejected
    for format in bad {
        assert!(
            matches!(format.validate(), Err(RecorderError::InvalidFormat { .. })),
            "accepted {:?}",
            format
        );
    }
}

/// WHAT: Header fields saturate instead of wrapping for oversized formats
/// WHY: Unvalidated formats parsed from arbitrary files must not produce
/// small, plausible-looking values
#[test]
fn given_format_beyond_header_limits_when_deriving_fields_then_saturated() {
    // Given: 65535 channels of 32-bit audio at 48kHz
    let format = AudioFormat {
        sample_rate: 48_000,
        channels: u16::MAX,
        bit_depth: 32,
    };

    // When/Then: Wide values are exact, header fields saturate
    assert_eq!(format.bytes_per_second(), 12_582_720_000);
    assert_eq!(format.bytes_per_frame(), 262_140);
    assert_eq!(format.byte_rate(), u32::MAX);
    assert_eq!(format.block_align(), u16::MAX);
}
