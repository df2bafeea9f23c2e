use std::{
    io::{self, BufRead, IsTerminal},
    path::{Path, PathBuf},
    process::Command,
};

use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal,
};

use crate::error::ElevationError;

/// OS services the launch flow depends on.
pub trait Platform {
    fn current_exe(&self) -> io::Result<PathBuf>;

    fn is_elevated(&self) -> bool;

    /// Start a second, elevated copy of `exe` in `work_dir`. Does not wait for it.
    fn relaunch_elevated(&self, exe: &Path, work_dir: &Path) -> Result<(), ElevationError>;

    /// Run `cmd` with inherited stdio and block until it exits.
    fn spawn_and_wait(&self, cmd: &mut Command) -> io::Result<i32>;

    fn wait_for_key(&self);
}

pub struct NativePlatform;

impl Platform for NativePlatform {
    fn current_exe(&self) -> io::Result<PathBuf> {
        std::env::current_exe()
    }

    fn is_elevated(&self) -> bool {
        native::is_elevated()
    }

    fn relaunch_elevated(&self, exe: &Path, work_dir: &Path) -> Result<(), ElevationError> {
        native::relaunch_elevated(exe, work_dir)
    }

    fn spawn_and_wait(&self, cmd: &mut Command) -> io::Result<i32> {
        let status = cmd.status()?;
        // Only a signal-terminated child on unix has no code.
        Ok(status.code().unwrap_or(-1))
    }

    fn wait_for_key(&self) {
        if !io::stdin().is_terminal() || terminal::enable_raw_mode().is_err() {
            wait_for_line(io::stdin().lock());
            return;
        }
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        let _ = terminal::disable_raw_mode();
    }
}

/// Piped or redirected stdin: one line, or end of input, stands in for a key press.
fn wait_for_line(mut input: impl BufRead) -> usize {
    let mut line = String::new();
    input.read_line(&mut line).unwrap_or(0)
}

/// Switch console output to UTF-8 so either message catalog renders.
pub fn prepare_console() {
    native::prepare_console();
}

#[cfg(windows)]
mod native {
    use std::{ffi::OsStr, iter::once, os::windows::ffi::OsStrExt, path::Path};
    use windows_sys::Win32::Foundation::{GetLastError, ERROR_CANCELLED};
    use windows_sys::Win32::Security::{
        AllocateAndInitializeSid, CheckTokenMembership, FreeSid, SID_IDENTIFIER_AUTHORITY,
    };
    use windows_sys::Win32::System::Console::SetConsoleOutputCP;
    use windows_sys::Win32::UI::Shell::{ShellExecuteExW, SHELLEXECUTEINFOW};
    use windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    use crate::error::ElevationError;

    const SECURITY_NT_AUTHORITY: [u8; 6] = [0, 0, 0, 0, 0, 5];
    const SECURITY_BUILTIN_DOMAIN_RID: u32 = 32;
    const DOMAIN_ALIAS_RID_ADMINS: u32 = 544;
    const CP_UTF8: u32 = 65001;

    fn to_wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(once(0)).collect()
    }

    pub fn prepare_console() {
        unsafe {
            SetConsoleOutputCP(CP_UTF8);
        }
    }

    /// Membership of the current token in BUILTIN\Administrators.
    pub fn is_elevated() -> bool {
        let authority = SID_IDENTIFIER_AUTHORITY {
            Value: SECURITY_NT_AUTHORITY,
        };
        let mut admin_group = std::ptr::null_mut();
        unsafe {
            let allocated = AllocateAndInitializeSid(
                &authority,
                2,
                SECURITY_BUILTIN_DOMAIN_RID,
                DOMAIN_ALIAS_RID_ADMINS,
                0,
                0,
                0,
                0,
                0,
                0,
                &mut admin_group,
            );
            if allocated == 0 {
                return false;
            }
            let mut is_member = 0;
            let checked = CheckTokenMembership(0, admin_group, &mut is_member);
            FreeSid(admin_group);
            checked != 0 && is_member != 0
        }
    }

    pub fn relaunch_elevated(exe: &Path, work_dir: &Path) -> Result<(), ElevationError> {
        let verb = to_wide(OsStr::new("runas"));
        let file = to_wide(exe.as_os_str());
        let dir = to_wide(work_dir.as_os_str());

        let mut info: SHELLEXECUTEINFOW = unsafe { std::mem::zeroed() };
        info.cbSize = std::mem::size_of::<SHELLEXECUTEINFOW>() as u32;
        info.lpVerb = verb.as_ptr();
        info.lpFile = file.as_ptr();
        info.lpDirectory = dir.as_ptr();
        info.nShow = SW_SHOWNORMAL;

        if unsafe { ShellExecuteExW(&mut info) } != 0 {
            return Ok(());
        }
        let code = unsafe { GetLastError() };
        if code == ERROR_CANCELLED {
            Err(ElevationError::Cancelled)
        } else {
            Err(ElevationError::Failed { code })
        }
    }
}

#[cfg(not(windows))]
mod native {
    use std::path::Path;

    use crate::error::ElevationError;

    pub fn prepare_console() {}

    pub fn is_elevated() -> bool {
        false
    }

    pub fn relaunch_elevated(_exe: &Path, _work_dir: &Path) -> Result<(), ElevationError> {
        Err(ElevationError::Failed { code: 0 })
    }
}
