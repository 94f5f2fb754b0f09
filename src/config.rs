use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use crate::vscroll::VirtualScrollConfig;

// ---------------------------------------------------------------------------
// ConfigFile — deserialized from TOML (all fields optional)
// ---------------------------------------------------------------------------

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(default)]
    pub scroll: ScrollConfigFile,
    pub watch_interval_ms: Option<u64>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ScrollConfigFile {
    pub buffer_lines: Option<usize>,
    pub min_lines_for_virtual: Option<usize>,
    pub estimated_line_height: Option<f64>,
    pub max_render_lines: Option<usize>,
}

// ---------------------------------------------------------------------------
// Config — resolved (all fields concrete)
// ---------------------------------------------------------------------------

pub struct Config {
    pub scroll: VirtualScrollConfig,
    pub watch_interval: Duration,
}

impl ConfigFile {
    /// Merge CLI values (overwrites non-None fields).
    pub fn merge_cli(
        &mut self,
        buffer_lines: Option<usize>,
        min_lines_for_virtual: Option<usize>,
        estimated_line_height: Option<f64>,
    ) {
        if let Some(v) = buffer_lines {
            debug!("config: CLI override buffer_lines={v}");
            self.scroll.buffer_lines = buffer_lines;
        }
        if let Some(v) = min_lines_for_virtual {
            debug!("config: CLI override min_lines_for_virtual={v}");
            self.scroll.min_lines_for_virtual = min_lines_for_virtual;
        }
        if let Some(v) = estimated_line_height {
            debug!("config: CLI override estimated_line_height={v}");
            self.scroll.estimated_line_height = estimated_line_height;
        }
    }

    /// Resolve to a Config by applying defaults to missing fields.
    pub fn resolve(self) -> Config {
        let defaults = VirtualScrollConfig::default();
        let config = Config {
            scroll: VirtualScrollConfig {
                buffer_lines: self.scroll.buffer_lines.unwrap_or(defaults.buffer_lines),
                min_lines_for_virtual: self
                    .scroll
                    .min_lines_for_virtual
                    .unwrap_or(defaults.min_lines_for_virtual),
                estimated_line_height: self
                    .scroll
                    .estimated_line_height
                    .unwrap_or(defaults.estimated_line_height),
                max_render_lines: self
                    .scroll
                    .max_render_lines
                    .unwrap_or(defaults.max_render_lines),
            },
            watch_interval: Duration::from_millis(self.watch_interval_ms.unwrap_or(200)),
        };
        info!(
            "config: resolved buffer_lines={}, min_lines_for_virtual={}, \
             estimated_line_height={}, max_render_lines={}, watch_interval={}ms",
            config.scroll.buffer_lines,
            config.scroll.min_lines_for_virtual,
            config.scroll.estimated_line_height,
            config.scroll.max_render_lines,
            config.watch_interval.as_millis(),
        );
        config
    }
}

/// Resolve the XDG config path for mdpane.
fn config_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config"))
        })?;
    Some(config_dir.join("mdpane").join("config.toml"))
}

/// Load config file. Returns `ConfigFile::default()` if no file exists.
/// Returns an error if the file exists but cannot be parsed.
pub fn load_config() -> anyhow::Result<ConfigFile> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            info!("config: no HOME or XDG_CONFIG_HOME set, using defaults");
            return Ok(ConfigFile::default());
        }
    };
    debug!("config: looking for {}", path.display());
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            info!("config: loaded from {}", path.display());
            let cfg: ConfigFile = toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("config: {} not found, using defaults", path.display());
            Ok(ConfigFile::default())
        }
        Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml() {
        let cfg: ConfigFile = toml::from_str("").unwrap();
        let resolved = cfg.resolve();
        assert_eq!(resolved.scroll.buffer_lines, 10);
        assert_eq!(resolved.scroll.min_lines_for_virtual, 500);
        assert_eq!(resolved.scroll.estimated_line_height, 20.0);
        assert_eq!(resolved.scroll.max_render_lines, 1000);
        assert_eq!(resolved.watch_interval, Duration::from_millis(200));
    }

    #[test]
    fn partial_toml() {
        let text = r#"
            watch_interval_ms = 500
            [scroll]
            buffer_lines = 25
        "#;
        let cfg: ConfigFile = toml::from_str(text).unwrap();
        let resolved = cfg.resolve();
        assert_eq!(resolved.scroll.buffer_lines, 25);
        assert_eq!(resolved.watch_interval, Duration::from_millis(500));
        // Defaults for unspecified fields
        assert_eq!(resolved.scroll.min_lines_for_virtual, 500);
        assert_eq!(resolved.scroll.estimated_line_height, 20.0);
    }

    #[test]
    fn invalid_toml() {
        let text = "this is not valid toml [[[";
        let result = toml::from_str::<ConfigFile>(text);
        assert!(result.is_err());
    }

    #[test]
    fn cli_overrides() {
        let mut cfg: ConfigFile = toml::from_str("[scroll]\nbuffer_lines = 5").unwrap();
        cfg.merge_cli(Some(30), None, Some(18.5));
        let resolved = cfg.resolve();
        assert_eq!(resolved.scroll.buffer_lines, 30); // CLI wins
        assert_eq!(resolved.scroll.estimated_line_height, 18.5);
        assert_eq!(resolved.scroll.min_lines_for_virtual, 500); // default
    }
}
