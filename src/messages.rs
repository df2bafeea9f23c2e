use crate::{
    config::Language,
    error::{ElevationError, LaunchError},
};

/// Console text for one display language.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    lang: Language,
}

impl Messages {
    pub fn new(lang: Language) -> Self {
        Self { lang }
    }

    pub fn requesting_elevation(&self) -> &'static str {
        match self.lang {
            Language::English => "Requesting administrator privileges...",
            Language::Chinese => "正在请求管理员权限...",
        }
    }

    pub fn elevation_failed(&self, err: &ElevationError) -> String {
        match (self.lang, err) {
            (Language::English, ElevationError::Cancelled) => {
                "User cancelled the privilege request.".to_string()
            }
            (Language::Chinese, ElevationError::Cancelled) => "用户取消了权限请求。".to_string(),
            (Language::English, ElevationError::Failed { code }) => {
                format!("Failed to request privileges. Error: {code}")
            }
            (Language::Chinese, ElevationError::Failed { code }) => {
                format!("请求权限失败。错误代码: {code}")
            }
        }
    }

    pub fn launch_error(&self, err: &LaunchError) -> String {
        match self.lang {
            Language::English => english_error(err),
            Language::Chinese => chinese_error(err),
        }
    }

    pub fn exited_normally(&self) -> &'static str {
        match self.lang {
            Language::English => "Program exited normally.",
            Language::Chinese => "程序正常退出。",
        }
    }

    pub fn exited_abnormally(&self, code: i32) -> String {
        match self.lang {
            Language::English => format!("Program exited abnormally, error code: {code}"),
            Language::Chinese => format!("程序异常退出，错误代码: {code}"),
        }
    }

    pub fn press_any_key(&self) -> &'static str {
        match self.lang {
            Language::English => "Press any key to continue...",
            Language::Chinese => "按任意键继续...",
        }
    }
}

fn english_error(err: &LaunchError) -> String {
    match err {
        LaunchError::VenvDirMissing { dir } => {
            format!("Error: .venv directory does not exist ({}).", dir.display())
        }
        LaunchError::ConfigWrite { path, source } => format!(
            "Error setting up virtual environment config: could not create/open {}: {source}",
            path.display()
        ),
        LaunchError::InterpreterMissing { path } => format!(
            "Error: Python executable not found in virtual environment ({}).",
            path.display()
        ),
        LaunchError::EntryScriptMissing { path } => {
            format!("Error: main program file not found ({}).", path.display())
        }
        LaunchError::Spawn { .. } => format!(
            "Failed to start main program. Error Code: {}",
            os_code_text(err)
        ),
    }
}

fn chinese_error(err: &LaunchError) -> String {
    match err {
        LaunchError::VenvDirMissing { dir } => {
            format!("错误：.venv 目录不存在（{}）。", dir.display())
        }
        LaunchError::ConfigWrite { path, source } => format!(
            "设置虚拟环境配置时出错: 无法创建/打开 {}: {source}",
            path.display()
        ),
        LaunchError::InterpreterMissing { path } => format!(
            "错误: 找不到虚拟环境中的Python可执行文件（{}）",
            path.display()
        ),
        LaunchError::EntryScriptMissing { path } => {
            format!("错误: 找不到主程序文件（{}）", path.display())
        }
        LaunchError::Spawn { .. } => format!("启动主程序失败。错误代码: {}", os_code_text(err)),
    }
}

fn os_code_text(err: &LaunchError) -> String {
    match (err.os_code(), err) {
        (Some(code), _) => code.to_string(),
        (None, LaunchError::Spawn { source, .. }) => source.to_string(),
        (None, _) => "unknown".to_string(),
    }
}
