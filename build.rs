use serde::Deserialize;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize)]
struct Config {
    name: String,
    product_name: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    description: String,
    version: String,
    #[serde(default)]
    icon: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_python_version")]
    python_version: String,
    #[serde(default = "default_entry_script")]
    entry_script: String,
    #[serde(default)]
    preserve_venv_cfg_lines: bool,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_python_version() -> String {
    "3.8.0".to_string()
}

fn default_entry_script() -> String {
    "main.py".to_string()
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let repo_root = PathBuf::from(manifest_dir);
    let config = load_config(&repo_root).unwrap_or_else(|err| {
        panic!("failed to load config.toml: {err}");
    });

    if let Err(err) = validate(&config) {
        panic!("invalid config.toml: {err}");
    }

    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "windows" {
        if let Err(err) = embed_resources(&repo_root, &config) {
            panic!("failed to embed resources: {err}");
        }
    }

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR not set"));
    if let Err(err) = write_config_rs(&out_dir, &config) {
        panic!("failed to write config: {err}");
    }
}

fn load_config(repo_root: &Path) -> io::Result<Config> {
    let config_path = repo_root.join("config.toml");
    println!("cargo:rerun-if-changed={}", config_path.display());
    let contents = fs::read_to_string(&config_path)?;
    let cfg: Config = toml::from_str(&contents)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(cfg)
}

fn validate(config: &Config) -> io::Result<()> {
    let invalid = |msg: String| io::Error::new(io::ErrorKind::InvalidData, msg);
    if !matches!(config.language.as_str(), "en" | "zh") {
        return Err(invalid(format!(
            "language must be \"en\" or \"zh\", got {:?}",
            config.language
        )));
    }
    if config.python_version.trim().is_empty() {
        return Err(invalid("python_version is empty".to_string()));
    }
    if config.entry_script.trim().is_empty() {
        return Err(invalid("entry_script is empty".to_string()));
    }
    Ok(())
}

fn embed_resources(repo_root: &Path, config: &Config) -> io::Result<()> {
    let icon_path = resolve_icon_path(repo_root, config);
    let mut res = winres::WindowsResource::new();
    if let Some(icon_path) = icon_path {
        println!("cargo:rerun-if-changed={}", icon_path.display());
        res.set_icon(icon_path.to_string_lossy().as_ref());
    }
    if !config.product_name.is_empty() {
        res.set("ProductName", &config.product_name);
    }
    if !config.description.is_empty() {
        res.set("FileDescription", &config.description);
    }
    if !config.company.is_empty() {
        res.set("CompanyName", &config.company);
    }
    if !config.version.is_empty() {
        res.set("FileVersion", &config.version);
        res.set("ProductVersion", &config.version);
    }
    if !config.name.is_empty() {
        res.set("InternalName", &config.name);
        res.set("OriginalFilename", &format!("{}.exe", config.name));
    }
    res.compile()?;
    Ok(())
}

fn resolve_icon_path(repo_root: &Path, config: &Config) -> Option<PathBuf> {
    if !config.icon.is_empty() {
        let candidate = repo_root.join(&config.icon);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    let assets_dir = repo_root.join("assets");
    if !assets_dir.exists() {
        return None;
    }
    let mut ico_paths: Vec<PathBuf> = fs::read_dir(&assets_dir).ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e.eq_ignore_ascii_case("ico")).unwrap_or(false))
        .collect();
    ico_paths.sort();
    ico_paths.first().cloned()
}

fn write_config_rs(out_dir: &Path, config: &Config) -> io::Result<()> {
    let out_path = out_dir.join("launcher_config.rs");
    let mut file = fs::File::create(&out_path)?;
    writeln!(file, "pub const NAME: &str = {:?};", config.name)?;
    writeln!(file, "pub const PRODUCT_NAME: &str = {:?};", config.product_name)?;
    writeln!(file, "pub const VERSION: &str = {:?};", config.version)?;
    writeln!(file, "pub const LANGUAGE: &str = {:?};", config.language)?;
    writeln!(
        file,
        "pub const PYTHON_VERSION: &str = {:?};",
        config.python_version.trim()
    )?;
    writeln!(
        file,
        "pub const ENTRY_SCRIPT: &str = {:?};",
        config.entry_script.trim()
    )?;
    writeln!(
        file,
        "pub const PRESERVE_VENV_CFG_LINES: bool = {:?};",
        config.preserve_venv_cfg_lines
    )?;
    Ok(())
}
