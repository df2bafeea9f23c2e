#[path = "../src/config.rs"]
mod config;
#[path = "../src/elevation.rs"]
mod elevation;
#[path = "../src/error.rs"]
mod error;
#[path = "../src/fs_ops.rs"]
mod fs_ops;
#[path = "../src/launcher.rs"]
mod launcher;
#[path = "../src/messages.rs"]
mod messages;
#[path = "../src/paths.rs"]
mod paths;
#[path = "../src/platform.rs"]
mod platform;
#[path = "../src/venv_cfg.rs"]
mod venv_cfg;

use std::{
    cell::{Cell, RefCell},
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
    process::Command,
};

use config::{CfgPolicy, Language, Settings};
use error::ElevationError;
use launcher::Launcher;
use platform::Platform;
use pretty_assertions::assert_eq;

struct FakePlatform {
    exe: Option<PathBuf>,
    elevated: bool,
    relaunch_result: Result<(), ElevationError>,
    child_code: Option<i32>,
    elevation_checks: Cell<usize>,
    relaunches: RefCell<Vec<(PathBuf, PathBuf)>>,
    spawned: RefCell<Vec<(PathBuf, Vec<OsString>)>>,
    pauses: Cell<usize>,
}

impl FakePlatform {
    fn new(exe: PathBuf) -> Self {
        Self {
            exe: Some(exe),
            elevated: false,
            relaunch_result: Ok(()),
            child_code: Some(0),
            elevation_checks: Cell::new(0),
            relaunches: RefCell::new(Vec::new()),
            spawned: RefCell::new(Vec::new()),
            pauses: Cell::new(0),
        }
    }
}

impl Platform for FakePlatform {
    fn current_exe(&self) -> io::Result<PathBuf> {
        self.exe
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "no module file name"))
    }

    fn is_elevated(&self) -> bool {
        self.elevation_checks.set(self.elevation_checks.get() + 1);
        self.elevated
    }

    fn relaunch_elevated(&self, exe: &Path, work_dir: &Path) -> Result<(), ElevationError> {
        self.relaunches
            .borrow_mut()
            .push((exe.to_path_buf(), work_dir.to_path_buf()));
        self.relaunch_result.clone()
    }

    fn spawn_and_wait(&self, cmd: &mut Command) -> io::Result<i32> {
        let program = PathBuf::from(cmd.get_program());
        let args = cmd.get_args().map(|a| a.to_os_string()).collect();
        self.spawned.borrow_mut().push((program, args));
        match self.child_code {
            Some(code) => Ok(code),
            None => Err(io::Error::from_raw_os_error(2)),
        }
    }

    fn wait_for_key(&self) {
        self.pauses.set(self.pauses.get() + 1);
    }
}

struct Install {
    _tmp: tempfile::TempDir,
    root: PathBuf,
}

impl Install {
    fn empty() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("Apps").join("Foo");
        fs::create_dir_all(&root).unwrap();
        Self { _tmp: tmp, root }
    }

    fn with_venv() -> Self {
        let install = Self::empty();
        fs::create_dir_all(paths::venv_dir(&install.root)).unwrap();
        install
    }

    fn complete() -> Self {
        let install = Self::with_venv();
        let python = paths::interpreter_path(&install.root);
        fs::create_dir_all(python.parent().unwrap()).unwrap();
        fs::write(&python, "interpreter").unwrap();
        fs::write(install.root.join("main.py"), "print('film')\n").unwrap();
        install
    }

    fn exe(&self) -> PathBuf {
        self.root.join("PyAsciiFilmRun.exe")
    }

    fn cfg(&self) -> PathBuf {
        paths::venv_cfg_path(&self.root)
    }
}

fn launcher_for(
    platform: FakePlatform,
    protected: Vec<PathBuf>,
) -> Launcher<FakePlatform, Vec<u8>> {
    Launcher::new(platform, Vec::new(), Settings::default())
        .unwrap()
        .with_protected_dirs(protected)
}

fn console(launcher: &Launcher<FakePlatform, Vec<u8>>) -> String {
    String::from_utf8_lossy(launcher.output()).to_string()
}

#[test]
fn missing_venv_dir_fails_with_does_not_exist() {
    let install = Install::empty();
    let mut launcher = launcher_for(FakePlatform::new(install.exe()), vec![]);

    let code = launcher.run();

    assert_eq!(code, 1);
    assert!(console(&launcher).contains("does not exist"));
    assert!(launcher.platform().spawned.borrow().is_empty());
    assert_eq!(launcher.platform().pauses.get(), 1);
}

#[test]
fn missing_interpreter_fails_after_config_is_written() {
    let install = Install::with_venv();
    fs::write(install.root.join("main.py"), "").unwrap();
    let mut launcher = launcher_for(FakePlatform::new(install.exe()), vec![]);

    let code = launcher.run();

    assert_eq!(code, 1);
    assert!(install.cfg().exists());
    assert!(console(&launcher).contains("Python executable not found"));
    assert!(launcher.platform().spawned.borrow().is_empty());
}

#[test]
fn missing_interpreter_is_reported_before_missing_script() {
    let install = Install::with_venv();
    let mut launcher = launcher_for(FakePlatform::new(install.exe()), vec![]);

    assert_eq!(launcher.run(), 1);

    let out = console(&launcher);
    assert!(out.contains("Python executable not found"));
    assert!(!out.contains("main program file not found"));
}

#[test]
fn missing_entry_script_fails() {
    let install = Install::complete();
    fs::remove_file(install.root.join("main.py")).unwrap();
    let mut launcher = launcher_for(FakePlatform::new(install.exe()), vec![]);

    assert_eq!(launcher.run(), 1);
    assert!(console(&launcher).contains("main program file not found"));
}

#[test]
fn child_exit_zero_reports_normal_exit() {
    let install = Install::complete();
    let mut launcher = launcher_for(FakePlatform::new(install.exe()), vec![]);

    let code = launcher.run();

    assert_eq!(code, 0);
    let out = console(&launcher);
    assert!(out.contains("Program exited normally."));
    assert!(out.ends_with("Press any key to continue..."));
    assert_eq!(launcher.platform().pauses.get(), 1);

    let spawned = launcher.platform().spawned.borrow();
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].0, paths::interpreter_path(&install.root));
    assert_eq!(
        spawned[0].1,
        vec![install.root.join("main.py").into_os_string()]
    );
}

#[test]
fn child_exit_code_is_passed_through() {
    let install = Install::complete();
    let mut platform = FakePlatform::new(install.exe());
    platform.child_code = Some(42);
    let mut launcher = launcher_for(platform, vec![]);

    let code = launcher.run();

    assert_eq!(code, 42);
    assert!(console(&launcher).contains("Program exited abnormally, error code: 42"));
}

#[test]
fn spawn_failure_returns_minus_one() {
    let install = Install::complete();
    let mut platform = FakePlatform::new(install.exe());
    platform.child_code = None;
    let mut launcher = launcher_for(platform, vec![]);

    let code = launcher.run();

    assert_eq!(code, -1);
    assert!(console(&launcher).contains("Failed to start main program. Error Code: 2"));
    assert_eq!(launcher.platform().pauses.get(), 1);
}

#[test]
fn stale_config_is_replaced_by_three_keys() {
    let install = Install::complete();
    fs::write(install.cfg(), "prompt = old\nhome = C:\\elsewhere\nextra\n").unwrap();
    let mut launcher = launcher_for(FakePlatform::new(install.exe()), vec![]);

    assert_eq!(launcher.run(), 0);

    assert_eq!(
        fs::read_to_string(install.cfg()).unwrap(),
        format!(
            "home = {}\ninclude-system-site-packages = false\nversion = 3.8.0\n",
            install.root.join("python").display()
        )
    );
}

#[test]
fn preserve_policy_keeps_unrelated_lines() {
    let install = Install::complete();
    fs::write(install.cfg(), "prompt = film\nhome = C:\\elsewhere\n").unwrap();
    let settings = Settings {
        cfg_policy: CfgPolicy::PreserveUnrelated,
        ..Settings::default()
    };
    let mut launcher = Launcher::new(FakePlatform::new(install.exe()), Vec::new(), settings)
        .unwrap()
        .with_protected_dirs(vec![]);

    assert_eq!(launcher.run(), 0);

    let cfg = fs::read_to_string(install.cfg()).unwrap();
    assert!(cfg.starts_with("prompt = film\n"));
    assert!(cfg.contains(&format!("home = {}", install.root.join("python").display())));
    assert!(!cfg.contains("elsewhere"));
}

#[test]
fn unprotected_install_never_checks_elevation() {
    let install = Install::complete();
    let protected = vec![PathBuf::from(r"C:\Program Files")];
    let mut launcher = launcher_for(FakePlatform::new(install.exe()), protected);

    assert_eq!(launcher.run(), 0);
    assert_eq!(launcher.platform().elevation_checks.get(), 0);
    assert!(launcher.platform().relaunches.borrow().is_empty());
}

#[test]
fn protected_install_relaunches_once_and_exits_zero() {
    let install = Install::complete();
    let protected_base = install.root.parent().unwrap();
    let protected = vec![PathBuf::from(
        protected_base.to_string_lossy().to_uppercase(),
    )];
    let mut launcher = launcher_for(FakePlatform::new(install.exe()), protected);

    let code = launcher.run();

    assert_eq!(code, 0);
    let relaunches = launcher.platform().relaunches.borrow();
    assert_eq!(relaunches.len(), 1);
    assert_eq!(relaunches[0], (install.exe(), install.root.clone()));
    assert!(launcher.platform().spawned.borrow().is_empty());
    assert_eq!(launcher.platform().pauses.get(), 0);
    assert!(!install.cfg().exists());
    assert!(console(&launcher).contains("Requesting administrator privileges..."));
}

#[test]
fn protected_install_already_elevated_runs_directly() {
    let install = Install::complete();
    let mut platform = FakePlatform::new(install.exe());
    platform.elevated = true;
    let protected = vec![install.root.parent().unwrap().to_path_buf()];
    let mut launcher = launcher_for(platform, protected);

    assert_eq!(launcher.run(), 0);
    assert_eq!(launcher.platform().elevation_checks.get(), 1);
    assert!(launcher.platform().relaunches.borrow().is_empty());
    assert_eq!(launcher.platform().spawned.borrow().len(), 1);
}

#[test]
fn declined_elevation_exits_one_after_pause() {
    let install = Install::complete();
    let mut platform = FakePlatform::new(install.exe());
    platform.relaunch_result = Err(ElevationError::Cancelled);
    let protected = vec![install.root.clone()];
    let mut launcher = launcher_for(platform, protected);

    assert_eq!(launcher.run(), 1);
    assert!(console(&launcher).contains("User cancelled the privilege request."));
    assert_eq!(launcher.platform().pauses.get(), 1);
    assert!(launcher.platform().spawned.borrow().is_empty());
}

#[test]
fn failed_elevation_reports_os_code() {
    let install = Install::complete();
    let mut platform = FakePlatform::new(install.exe());
    platform.relaunch_result = Err(ElevationError::Failed { code: 5 });
    let protected = vec![install.root.clone()];
    let mut launcher = launcher_for(platform, protected);

    assert_eq!(launcher.run(), 1);
    assert!(console(&launcher).contains("Failed to request privileges. Error: 5"));
}

#[test]
fn chinese_catalog_is_used_when_configured() {
    let install = Install::complete();
    let mut platform = FakePlatform::new(install.exe());
    platform.child_code = Some(3);
    let settings = Settings {
        language: Language::Chinese,
        ..Settings::default()
    };
    let mut launcher = Launcher::new(platform, Vec::new(), settings)
        .unwrap()
        .with_protected_dirs(vec![]);

    assert_eq!(launcher.run(), 3);
    let out = console(&launcher);
    assert!(out.contains("程序异常退出，错误代码: 3"));
    assert!(out.ends_with("按任意键继续..."));
}

#[test]
fn unresolvable_exe_path_is_fatal() {
    let mut platform = FakePlatform::new(PathBuf::new());
    platform.exe = None;
    let err = Launcher::new(platform, Vec::new(), Settings::default())
        .err()
        .expect("launcher must not start without its own path");
    assert!(err.to_string().contains("resolve launcher executable path"));
}
