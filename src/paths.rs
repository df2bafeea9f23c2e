use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const VENV_DIR_NAME: &str = ".venv";
pub const VENV_CFG_NAME: &str = "pyvenv.cfg";

#[cfg(windows)]
const INTERPRETER_SUBPATH: [&str; 2] = ["Scripts", "python.exe"];
#[cfg(not(windows))]
const INTERPRETER_SUBPATH: [&str; 2] = ["bin", "python"];

pub fn install_dir(exe: &Path) -> Result<PathBuf> {
    Ok(exe.parent().context("exe has no parent")?.to_path_buf())
}

pub fn venv_dir(root: &Path) -> PathBuf {
    root.join(VENV_DIR_NAME)
}

pub fn venv_cfg_path(root: &Path) -> PathBuf {
    venv_dir(root).join(VENV_CFG_NAME)
}

/// Bundled base interpreter the virtual environment points back to.
pub fn python_home(root: &Path) -> PathBuf {
    root.join("python")
}

pub fn interpreter_path(root: &Path) -> PathBuf {
    INTERPRETER_SUBPATH
        .iter()
        .fold(venv_dir(root), |path, part| path.join(part))
}

pub fn entry_script_path(root: &Path, entry_script: &str) -> PathBuf {
    root.join(entry_script)
}
