mod config;
mod elevation;
mod error;
mod fs_ops;
mod launcher;
mod logging;
mod messages;
mod paths;
mod platform;
mod venv_cfg;

use anyhow::Result;

use crate::{config::Settings, launcher::Launcher, platform::NativePlatform};

fn main() -> Result<()> {
    platform::prepare_console();

    let mut launcher = Launcher::new(
        NativePlatform,
        std::io::stdout(),
        Settings::from_build_config(),
    )?;

    // An unelevated process under Program Files cannot create the log dir; run without a log.
    let log = logging::init(launcher.root()).ok();
    tracing::info!(
        name = config::NAME,
        product = config::PRODUCT_NAME,
        version = config::VERSION,
        root = %launcher.root().display(),
        "launcher starting"
    );
    if let Some(log) = &log {
        tracing::debug!(path = %log.path.display(), "logging to file");
    }

    let code = launcher.run();
    drop(log);
    std::process::exit(code);
}
