//! Simulation configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. Built-in defaults
//! 2. `config/default.toml`
//! 3. `config/user.toml` (gitignored, user overrides)
//! 4. Environment variables (`PHYS_SECTION__KEY`)

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level configuration shared by all simulation binaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub freefall: FreeFallConfig,
    pub pendulum: PendulumConfig,
    pub refraction: RefractionConfig,
    pub projectile: ProjectileConfig,
}

impl AppConfig {
    /// Load configuration from the `config` directory next to the working directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // PHYS_FREEFALL__GRAVITY=1.62 -> freefall.gravity = 1.62
        figment = figment.merge(Env::prefixed("PHYS_").split("__"));

        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load, falling back to defaults with a warning when the files are unusable
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; using built-in defaults", e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        if self.camera.min_zoom <= 0.0 || self.camera.max_zoom <= 0.0 {
            return Err(ConfigError::Invalid("zoom bounds must be positive".into()));
        }
        if self.refraction.n1 < 1.0 || self.refraction.n2 < 1.0 {
            return Err(ConfigError::Invalid("refractive indices must be at least 1".into()));
        }
        for (name, step) in [
            ("freefall.step", self.freefall.step),
            ("projectile.step", self.projectile.step),
            ("pendulum.tick_rate", self.pendulum.tick_rate),
        ] {
            if !(step.is_finite() && step > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        if !(self.projectile.radius.is_finite() && self.projectile.radius > 0.0) {
            return Err(ConfigError::Invalid("projectile.radius must be positive".into()));
        }
        for (name, value) in [
            ("projectile.impulse", self.projectile.impulse),
            ("projectile.pan_speed", self.projectile.pan_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{} must be finite", name)));
            }
        }
        Ok(())
    }
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in pixels
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 675,
            vsync: true,
        }
    }
}

/// Camera panning and zoom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pan_speed: 30.0,
            zoom_speed: 0.01,
            min_zoom: 0.01,
            max_zoom: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeFallConfig {
    /// Default gravitational acceleration in m/s²
    pub gravity: f64,
    /// Default drop height in m
    pub height: f64,
    /// Animation step in seconds
    pub step: f32,
}

impl Default for FreeFallConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            height: 500.0,
            step: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumConfig {
    /// Angular acceleration coefficient per tick
    pub base_accel: f32,
    /// Physics ticks per second
    pub tick_rate: f32,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            base_accel: 0.0005,
            tick_rate: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefractionConfig {
    pub n1: f32,
    pub n2: f32,
}

impl Default for RefractionConfig {
    fn default() -> Self {
        Self { n1: 1.0, n2: 1.52 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Gravity in px/s², positive pulls down the screen
    pub gravity: [f32; 2],
    /// Slingshot impulse per pixel of pull
    pub impulse: f32,
    pub step: f32,
    pub radius: f32,
    /// Camera pan per frame, slower than the shared default
    pub pan_speed: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 900.0],
            impulse: 1000.0,
            step: 0.01,
            radius: 20.0,
            pan_speed: 5.0,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.freefall.gravity, 9.8);
        assert_eq!(config.refraction.n2, 1.52);
        assert_eq!(config.projectile.gravity, [0.0, 900.0]);
    }

    #[test]
    fn test_missing_directory_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load_from("does-not-exist").expect("defaults load");
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_user_file_overrides_default_file() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/default.toml",
                r#"
                [freefall]
                gravity = 9.81
                height = 100.0
                "#,
            )?;
            jail.create_file(
                "config/user.toml",
                r#"
                [freefall]
                gravity = 1.62
                "#,
            )?;

            let config = AppConfig::load().expect("config loads");
            assert_eq!(config.freefall.gravity, 1.62);
            assert_eq!(config.freefall.height, 100.0);
            assert_eq!(config.pendulum, PendulumConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/default.toml", "[refraction]\nn2 = 1.33\n")?;
            jail.set_env("PHYS_REFRACTION__N2", "2.42");

            let config = AppConfig::load().expect("config loads");
            assert_eq!(config.refraction.n2, 2.42);
            assert_eq!(config.refraction.n1, 1.0);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_index_rejected() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/default.toml", "[refraction]\nn1 = 0.5\n")?;

            let err = AppConfig::load().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_degenerate_projectile_rejected() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/default.toml", "[projectile]\nradius = 0.0\n")?;
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid(_))));

            jail.create_file("config/default.toml", "[projectile]\nradius = -3.0\n")?;
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid(_))));

            jail.create_file("config/default.toml", "[projectile]\nimpulse = inf\n")?;
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid(_))));
            Ok(())
        });
    }

    #[test]
    fn test_projectile_pan_speed_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("PHYS_PROJECTILE__PAN_SPEED", "12.5");

            let config = AppConfig::load().expect("config loads");
            assert_eq!(config.projectile.pan_speed, 12.5);
            assert_eq!(config.camera.pan_speed, 30.0);
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/default.toml", "[window]\nwidth = \"wide\"\n")?;

            let err = AppConfig::load().unwrap_err();
            assert!(matches!(err, ConfigError::Load(_)));
            Ok(())
        });
    }
}
