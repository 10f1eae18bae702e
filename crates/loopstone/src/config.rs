use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ring geometry tunables. Defaults match the designer's reference layout; a
/// config file can stretch the ring for large screens.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RingConfig {
    /// Orbital radius of the bead centers, in pixels.
    pub radius: f64,
    /// Dragging a bead past this distance from the center removes it.
    pub remove_threshold: f64,
    /// Scale from catalog bead diameters (mm) to on-screen pixels.
    pub pixels_per_mm: f64,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            radius: 130.0,
            remove_threshold: 220.0,
            pixels_per_mm: 3.5,
        }
    }
}

impl RingConfig {
    /// The remove threshold must sit outside the ring itself, otherwise every
    /// steady-state bead would count as removed.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.radius <= 0.0 || self.pixels_per_mm <= 0.0 {
            log::warn!("Ignoring non-positive ring dimensions in config");
            self = defaults;
        }
        if self.remove_threshold <= self.radius {
            log::warn!(
                "remove_threshold {} is inside the ring radius {}, using {}",
                self.remove_threshold,
                self.radius,
                self.radius + (defaults.remove_threshold - defaults.radius)
            );
            self.remove_threshold = self.radius + (defaults.remove_threshold - defaults.radius);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ring: RingConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "loomworks", "loopstone").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("LOOPSTONE").separator("__"))
        .build()?;

    let config: Config = s.try_deserialize()?;
    Ok(Config {
        ring: config.ring.validated(),
    })
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Falling back to default config: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

/// A change event counts only when it touches the config file itself;
/// sibling files in the directory are ignored.
fn is_config_event(event: &notify::Event, config_path: &std::path::Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Watches the config directory and emits [`AppEvent::ConfigReload`] whenever
/// the config file changes. Exits (with a log line) if watching cannot start;
/// the app simply keeps its current configuration then.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(|p| p.to_path_buf()) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    // notify delivers on its own thread; bridge into async land.
    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    );
    let mut watcher = match watcher {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if is_config_event(&event, &config_path) => {
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_layout() {
        let ring = RingConfig::default();
        assert_eq!(ring.radius, 130.0);
        assert_eq!(ring.remove_threshold, 220.0);
        assert_eq!(ring.pixels_per_mm, 3.5);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                "[ring]\nradius = 150.0\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let parsed: Config = s.try_deserialize().unwrap();

        assert_eq!(parsed.ring.radius, 150.0);
        assert_eq!(parsed.ring.remove_threshold, 220.0);
    }

    #[test]
    fn validation_pushes_threshold_outside_the_ring() {
        let ring = RingConfig {
            radius: 200.0,
            remove_threshold: 100.0,
            pixels_per_mm: 3.5,
        }
        .validated();

        assert!(ring.remove_threshold > ring.radius);
    }

    #[test]
    fn watcher_only_reacts_to_the_config_file() {
        let config_path = std::path::Path::new("/tmp/loopstone-config/config.toml");
        let modify = notify::Event::new(EventKind::Modify(notify::event::ModifyKind::Any));

        assert!(is_config_event(&modify.clone().add_path(config_path.to_path_buf()), config_path));
        assert!(!is_config_event(
            &modify.add_path("/tmp/loopstone-config/other.toml".into()),
            config_path
        ));

        let access = notify::Event::new(EventKind::Access(notify::event::AccessKind::Any));
        assert!(!is_config_event(&access.add_path(config_path.to_path_buf()), config_path));
    }

    #[test]
    fn validation_rejects_degenerate_dimensions() {
        let ring = RingConfig {
            radius: -1.0,
            remove_threshold: 220.0,
            pixels_per_mm: 3.5,
        }
        .validated();

        assert_eq!(ring, RingConfig::default());
    }
}
