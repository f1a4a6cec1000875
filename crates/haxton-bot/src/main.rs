//! Haxton bot binary.
//!
//! Wires the bot loops to a game client and runs until Ctrl-C. The client
//! is the in-memory simulated world from `haxton-sim`.
//!
//! # Startup Sequence
//!
//! 1. Load settings from `haxton-config.yaml` (or `$HAXTON_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Generate the simulated world
//! 4. Start the bot loops under a task supervisor
//! 5. Log task failures until Ctrl-C, then abort the loops

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use haxton_core::bot::Bot;
use haxton_core::settings::Settings;
use haxton_core::supervisor::TaskSupervisor;
use haxton_sim::SimWorld;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Environment variable naming the settings file.
const CONFIG_ENV: &str = "HAXTON_CONFIG";

/// Settings file used when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "haxton-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the settings file exists but cannot be parsed, or
/// if listening for Ctrl-C fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load settings; logging level depends on them.
    let path = config_path(std::env::var(CONFIG_ENV).ok());
    let (settings, from_file) = load_settings(&path)?;

    // 2. Initialize structured logging.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if settings.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    if from_file {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
    }

    // 3. Generate the world.
    let world = Arc::new(SimWorld::generate(&settings.simulation));
    info!(
        origin = %settings.simulation.origin,
        forts = settings.simulation.fort_count,
        radius_m = settings.simulation.radius_m,
        seed = settings.simulation.seed,
        "Simulated world generated"
    );

    // 4. Start the bot.
    let (supervisor, mut collector) = TaskSupervisor::new();
    let bot = Bot::new(world, settings, supervisor);
    let tasks = bot.start();

    // 5. Collect failures until Ctrl-C.
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }
            failure = collector.next() => {
                if failure.is_none() {
                    break;
                }
            }
        }
    }

    info!(failures = collector.total(), "Shutting down");
    tasks.abort_all();
    Ok(())
}

/// The settings path: `$HAXTON_CONFIG` when set and non-empty, else the
/// default file in the working directory.
fn config_path(from_env: Option<String>) -> PathBuf {
    from_env
        .filter(|value| !value.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load settings from `path`, falling back to defaults when it is absent.
///
/// The flag is `true` when the file was read.
fn load_settings(path: &Path) -> Result<(Settings, bool), AppError> {
    if path.exists() {
        Ok((Settings::from_file(path)?, true))
    } else {
        Ok((Settings::default(), false))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn env_path_wins_when_set() {
        assert_eq!(
            config_path(Some("/etc/haxton.yaml".to_owned())),
            PathBuf::from("/etc/haxton.yaml")
        );
    }

    #[test]
    fn blank_env_falls_back_to_default() {
        assert_eq!(config_path(None), PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(
            config_path(Some("  ".to_owned())),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
    }

    #[test]
    fn missing_file_gives_defaults() {
        let (settings, from_file) =
            load_settings(Path::new("/nonexistent/haxton-config.yaml")).unwrap();
        assert!(!from_file);
        assert_eq!(settings, Settings::default());
    }
}
