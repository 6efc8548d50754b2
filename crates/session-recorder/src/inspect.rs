//! Read-only views over finished recordings: the catalog listing and the
//! WAV header summary.

use crate::{
    AppResult,
    catalog::{RecordingEntry, RecordingStatus},
    status_line::{format_duration, format_size},
};

use session_recorder_core::{WAV_HEADER_SIZE, WavHeader};

use std::{fs::File, io::Read, path::Path, time::Duration};

use tracing::instrument;

/// Reads and summarises the WAV header of `path`.
#[track_caller]
#[instrument]
pub fn inspect_file(path: &Path) -> AppResult<String> {
    let mut file = File::open(path)?;
    let file_len = file.metadata()?.len();

    let mut header = [0u8; WAV_HEADER_SIZE];
    let read = read_up_to(&mut file, &mut header)?;
    let parsed = WavHeader::parse(&header[..read])?;

    Ok(describe_header(path, &parsed, file_len))
}

/// Formats a parsed header next to the file's actual length.
pub fn describe_header(path: &Path, header: &WavHeader, file_len: u64) -> String {
    let actual_payload = file_len.saturating_sub(WAV_HEADER_SIZE as u64);
    let consistency = if u64::from(header.payload_bytes) == actual_payload {
        "header matches file length".to_string()
    } else {
        format!(
            "header declares {} bytes but file holds {} (not finalized?)",
            header.payload_bytes, actual_payload
        )
    };

    format!(
        "{}\n  format:   {} Hz, {} ch, {}-bit PCM\n  payload:  {} bytes\n  duration: {}\n  size:     {}\n  status:   {}",
        path.display(),
        header.format.sample_rate,
        header.format.channels,
        header.format.bit_depth,
        header.payload_bytes,
        format_duration(header.duration()),
        format_size(file_len),
        consistency,
    )
}

/// One line per catalog entry, in the order given.
pub fn describe_catalog(entries: &[RecordingEntry]) -> String {
    if entries.is_empty() {
        return "No recordings yet.".to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let status = match entry.status {
                RecordingStatus::Recording => "recording",
                RecordingStatus::Completed => "completed",
            };
            format!(
                "{:>4}  {}  {:<9}  {:>8}  {:>10}  {}",
                entry.id,
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                status,
                format_duration(Duration::from_secs(entry.duration_seconds)),
                format_size(entry.file_size_bytes),
                entry.filename,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_up_to(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
