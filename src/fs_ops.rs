use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

fn temp_path_for(dest: &Path) -> io::Result<PathBuf> {
    let parent = dest
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "dest has no parent"))?;
    let name = dest
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "dest has no filename"))?
        .to_string_lossy();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or(Duration::from_millis(0))
        .as_nanos();
    Ok(parent.join(format!("{name}.tmp-{nonce}")))
}

/// Replace `dest` with `bytes`, going through a sibling temp file.
pub fn write_bytes_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    replace_with(dest, |tmp| fs::write(tmp, bytes))
}

/// Fill a sibling temp file with `fill`, then move it over `dest`. The temp file never outlives a failure.
fn replace_with(dest: &Path, fill: impl FnOnce(&Path) -> io::Result<()>) -> io::Result<()> {
    let tmp = temp_path_for(dest)?;
    if let Err(err) = fill(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    if dest.exists() {
        if let Err(err) = fs::remove_file(dest) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
    }
    if let Err(err) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}
