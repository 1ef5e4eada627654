use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rejected configuration value, from the config file, a CLI override, or a
/// component constructor.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("smoothing alpha must be finite and in (0.0, 1.0], got {0}")]
    Alpha(f64),
    #[error("target value must be greater than zero")]
    ZeroTarget,
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("bar width must be greater than zero")]
    ZeroBarWidth,
    #[error("workload passes must be greater than zero")]
    ZeroPasses,
    #[error("workload buffer size must be greater than zero")]
    ZeroBuffer,
}

/// Built-in digest workload parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of digest passes over the buffer.
    pub passes: u64,
    /// Buffer size in MiB hashed by each pass.
    pub buf_mib: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            passes: 32,
            buf_mib: 64,
        }
    }
}

/// Global configuration loaded from `~/.config/passmon/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassmonConfig {
    /// Controller poll/render interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Smoothing factor for the throughput estimate, in (0.0, 1.0].
    pub smoothing_alpha: f64,
    /// Progress bar width in cells.
    pub bar_width: usize,
    /// Optional workload parameters; if missing, built-in defaults are used.
    #[serde(default)]
    pub workload: Option<WorkloadConfig>,
}

impl Default for PassmonConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            smoothing_alpha: 0.05,
            bar_width: crate::report::DEFAULT_BAR_WIDTH,
            workload: None,
        }
    }
}

impl PassmonConfig {
    /// Reject values the telemetry components cannot run with. Called after
    /// CLI overrides have been applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_alpha(self.smoothing_alpha)?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.bar_width == 0 {
            return Err(ConfigError::ZeroBarWidth);
        }
        if let Some(workload) = &self.workload {
            if workload.passes == 0 {
                return Err(ConfigError::ZeroPasses);
            }
            if workload.buf_mib == 0 {
                return Err(ConfigError::ZeroBuffer);
            }
        }
        Ok(())
    }

    /// Workload section, or built-in defaults when the section is absent.
    pub fn workload_or_default(&self) -> WorkloadConfig {
        self.workload.clone().unwrap_or_default()
    }
}

/// Shared alpha check, also used by `RateEstimator::new`.
pub(crate) fn validate_alpha(alpha: f64) -> Result<(), ConfigError> {
    if alpha.is_finite() && alpha > 0.0 && alpha <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Alpha(alpha))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("passmon")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PassmonConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] but against an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<PassmonConfig> {
    if !path.exists() {
        let default_cfg = PassmonConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: PassmonConfig = toml::from_str(&data)?;
    Ok(cfg)
}
