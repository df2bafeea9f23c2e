include!(concat!(env!("OUT_DIR"), "/launcher_config.rs"));

/// Language of every line the launcher prints to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Chinese,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::English),
            "zh" => Some(Language::Chinese),
            _ => None,
        }
    }
}

/// What happens to lines of an existing `pyvenv.cfg` that the launcher does not manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfgPolicy {
    Overwrite,
    PreserveUnrelated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub language: Language,
    pub python_version: String,
    pub entry_script: String,
    pub cfg_policy: CfgPolicy,
}

impl Settings {
    pub fn from_build_config() -> Self {
        Self {
            // build.rs rejects anything but "en" and "zh".
            language: Language::from_code(LANGUAGE).unwrap_or(Language::English),
            python_version: PYTHON_VERSION.to_string(),
            entry_script: ENTRY_SCRIPT.to_string(),
            cfg_policy: if PRESERVE_VENV_CFG_LINES {
                CfgPolicy::PreserveUnrelated
            } else {
                CfgPolicy::Overwrite
            },
        }
    }
}

#[cfg(test)]
impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::English,
            python_version: "3.8.0".to_string(),
            entry_script: "main.py".to_string(),
            cfg_policy: CfgPolicy::Overwrite,
        }
    }
}
