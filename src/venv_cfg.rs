use std::{
    fs, io,
    path::Path,
};

use crate::{config::CfgPolicy, error::LaunchError, fs_ops};

const KEY_HOME: &str = "home";
const KEY_SYSTEM_SITE: &str = "include-system-site-packages";
const KEY_VERSION: &str = "version";

fn managed_lines(python_home: &Path, python_version: &str) -> [(&'static str, String); 3] {
    [
        (KEY_HOME, format!("{KEY_HOME} = {}", python_home.display())),
        (KEY_SYSTEM_SITE, format!("{KEY_SYSTEM_SITE} = false")),
        (KEY_VERSION, format!("{KEY_VERSION} = {python_version}")),
    ]
}

/// The three managed lines and nothing else.
pub fn render(python_home: &Path, python_version: &str) -> String {
    let mut out = String::new();
    for (_, line) in managed_lines(python_home, python_version) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn line_key(line: &str) -> Option<&str> {
    let (key, _) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.starts_with('#') {
        return None;
    }
    Some(key)
}

/// Rewrite managed keys in place, keep every other line, append whatever managed key was absent.
pub fn merge(existing: &str, python_home: &Path, python_version: &str) -> String {
    let mut managed: Vec<(&str, String, bool)> = managed_lines(python_home, python_version)
        .into_iter()
        .map(|(key, line)| (key, line, false))
        .collect();

    let mut lines = Vec::new();
    for line in existing.lines() {
        let slot = match line_key(line) {
            Some(key) => managed
                .iter_mut()
                .find(|(managed_key, _, _)| managed_key.eq_ignore_ascii_case(key)),
            None => None,
        };
        match slot {
            Some((_, replacement, seen)) => {
                // Duplicate managed keys collapse into the first occurrence.
                if !*seen {
                    lines.push(replacement.clone());
                    *seen = true;
                }
            }
            None => lines.push(line.to_string()),
        }
    }
    for (_, line, seen) in &managed {
        if !seen {
            lines.push(line.clone());
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Write `<venv>/pyvenv.cfg`; the venv directory itself must already exist.
pub fn write(
    cfg_path: &Path,
    python_home: &Path,
    python_version: &str,
    policy: CfgPolicy,
) -> Result<(), LaunchError> {
    let venv = cfg_path.parent().unwrap_or(cfg_path);
    if !venv.is_dir() {
        return Err(LaunchError::VenvDirMissing {
            dir: venv.to_path_buf(),
        });
    }

    let config_error = |source: io::Error| LaunchError::ConfigWrite {
        path: cfg_path.to_path_buf(),
        source,
    };

    let contents = match policy {
        CfgPolicy::Overwrite => render(python_home, python_version),
        CfgPolicy::PreserveUnrelated => {
            let existing = match fs::read_to_string(cfg_path) {
                Ok(s) => s,
                Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
                Err(err) => return Err(config_error(err)),
            };
            merge(&existing, python_home, python_version)
        }
    };

    fs_ops::write_bytes_atomic(cfg_path, contents.as_bytes()).map_err(config_error)?;
    tracing::info!(path = %cfg_path.display(), ?policy, "wrote venv config");
    Ok(())
}
