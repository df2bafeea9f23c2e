use anyhow::{Context, Result};
use std::{
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    config::Settings,
    elevation,
    error::{ElevationError, LaunchError},
    messages::Messages,
    paths,
    platform::Platform,
    venv_cfg,
};

enum ElevationOutcome {
    NotNeeded,
    Delegated,
    Failed(ElevationError),
}

/// Starts the bundled interpreter on the entry script found next to the launcher executable.
pub struct Launcher<P: Platform, W: Write> {
    platform: P,
    out: W,
    exe: PathBuf,
    root: PathBuf,
    settings: Settings,
    messages: Messages,
    protected: Vec<PathBuf>,
}

impl<P: Platform, W: Write> Launcher<P, W> {
    pub fn new(platform: P, out: W, settings: Settings) -> Result<Self> {
        let exe = platform
            .current_exe()
            .context("resolve launcher executable path")?;
        let root = paths::install_dir(&exe)?;
        Ok(Self {
            platform,
            out,
            exe,
            root,
            messages: Messages::new(settings.language),
            settings,
            protected: elevation::protected_dirs(),
        })
    }

    #[cfg(test)]
    pub fn with_protected_dirs(mut self, protected: Vec<PathBuf>) -> Self {
        self.protected = protected;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[cfg(test)]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Runs the whole launch sequence and returns the process exit code.
    pub fn run(&mut self) -> i32 {
        match self.ensure_elevation() {
            ElevationOutcome::NotNeeded => {}
            ElevationOutcome::Delegated => {
                tracing::info!("handed off to elevated launcher");
                return 0;
            }
            ElevationOutcome::Failed(err) => {
                tracing::warn!(error = %err, "elevation failed");
                let line = self.messages.elevation_failed(&err);
                self.say(&line);
                self.pause();
                return 1;
            }
        }

        let code = match self.prepare().and_then(|(python, script)| self.launch(&python, &script)) {
            Ok(code) => code,
            Err(err) => {
                tracing::error!(error = %err, "launch aborted");
                let line = self.messages.launch_error(&err);
                self.say(&line);
                self.pause();
                return err.exit_code();
            }
        };

        if code == 0 {
            let line = self.messages.exited_normally();
            self.say(line);
        } else {
            let line = self.messages.exited_abnormally(code);
            self.say("");
            self.say(&line);
        }
        self.pause();
        code
    }

    fn ensure_elevation(&mut self) -> ElevationOutcome {
        if !elevation::is_protected(&self.root, &self.protected) {
            return ElevationOutcome::NotNeeded;
        }
        if self.platform.is_elevated() {
            tracing::debug!(root = %self.root.display(), "protected install, already elevated");
            return ElevationOutcome::NotNeeded;
        }

        tracing::info!(root = %self.root.display(), "protected install, requesting elevation");
        let line = self.messages.requesting_elevation();
        self.say(line);
        match self.platform.relaunch_elevated(&self.exe, &self.root) {
            Ok(()) => ElevationOutcome::Delegated,
            Err(err) => ElevationOutcome::Failed(err),
        }
    }

    /// Config write, then interpreter check, then entry script check; the first failure wins.
    fn prepare(&self) -> Result<(PathBuf, PathBuf), LaunchError> {
        venv_cfg::write(
            &paths::venv_cfg_path(&self.root),
            &paths::python_home(&self.root),
            &self.settings.python_version,
            self.settings.cfg_policy,
        )?;

        let python = paths::interpreter_path(&self.root);
        if !python.exists() {
            return Err(LaunchError::InterpreterMissing { path: python });
        }

        let script = paths::entry_script_path(&self.root, &self.settings.entry_script);
        if !script.exists() {
            return Err(LaunchError::EntryScriptMissing { path: script });
        }

        Ok((python, script))
    }

    fn launch(&self, python: &Path, script: &Path) -> Result<i32, LaunchError> {
        let mut cmd = Command::new(python);
        cmd.arg(script);
        tracing::info!(command = %command_line(python, script), "starting interpreter");

        let code = self
            .platform
            .spawn_and_wait(&mut cmd)
            .map_err(|source| LaunchError::Spawn {
                program: python.to_path_buf(),
                source,
            })?;
        tracing::info!(code, "interpreter exited");
        Ok(code)
    }

    fn say(&mut self, line: &str) {
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }

    fn pause(&mut self) {
        let prompt = self.messages.press_any_key();
        let _ = write!(self.out, "{prompt}");
        let _ = self.out.flush();
        self.platform.wait_for_key();
    }
}

/// The command line as the user would type it, both paths quoted.
pub fn command_line(python: &Path, script: &Path) -> String {
    format!("\"{}\" \"{}\"", python.display(), script.display())
}
