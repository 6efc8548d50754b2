use std::{fs, io, io::Write, path::Path};

/// Replaces `path` with `contents` without ever leaving a half-written file.
///
/// Writes to `<path>.tmp`, syncs it, then renames it over the target.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = Path::new(&temp_path);

    let mut temp_file = fs::File::create(temp_path)?;
    temp_file.write_all(contents.as_bytes())?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(temp_path, path)
}
