//! Startup configuration. Loaded once and never mutated afterwards.
//!
//! Keys follow the legacy `settings.json` layout:
//!
//! ```json
//! {
//!   "fps": 60,
//!   "background-colors": [[0.02, 0.02, 0.08, 1], [0.2, 0.05, 0.3, 1]],
//!   "stars": {
//!     "radius": 2, "color": [1, 1, 1, 0.8], "count": 80,
//!     "min-speed": 5, "max-speed": 25, "segments": 12, "draw-stars": true
//!   },
//!   "moveaway-from-mouse": true,
//!   "keep-distance-from-mouse": 120,
//!   "offset-bounds": 50
//! }
//! ```

use std::path::Path;

use eclipse_platform::Rgba;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SettingsError;
use crate::gradient::Gradient;
use crate::star::{MotionPolicy, RenderPolicy, SpawnParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StarSettings {
    pub radius: f32,
    pub color: Rgba,
    pub count: usize,
    pub min_speed: f32,
    pub max_speed: f32,
    pub segments: u32,
    pub draw_stars: bool,
}

impl Default for StarSettings {
    fn default() -> Self {
        Self {
            radius: 2.0,
            color: Rgba::new(1.0, 1.0, 1.0, 0.8),
            count: 60,
            min_speed: 5.0,
            max_speed: 25.0,
            segments: 12,
            draw_stars: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub fps: f32,
    pub background_colors: Gradient,
    pub stars: StarSettings,
    pub moveaway_from_mouse: bool,
    pub keep_distance_from_mouse: f32,
    pub offset_bounds: f32,
    /// Fixed RNG seed for reproducible skies.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: 120.0,
            background_colors: Gradient::new(vec![
                Rgba::new(0.02, 0.02, 0.08, 1.0),
                Rgba::new(0.10, 0.04, 0.22, 1.0),
                Rgba::new(0.30, 0.08, 0.30, 1.0),
            ]),
            stars: StarSettings::default(),
            moveaway_from_mouse: false,
            keep_distance_from_mouse: 100.0,
            offset_bounds: 50.0,
            seed: None,
        }
    }
}

impl Settings {
    /// Read a settings file; `.toml` files are parsed as TOML, anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let settings = if is_toml {
            Self::from_toml(&text)?
        } else {
            Self::from_json(&text)?
        };
        info!(
            "Loaded settings from {} ({} stars @ {} fps)",
            path.display(),
            settings.stars.count,
            settings.fps
        );
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        fn non_negative(field: &'static str, value: f32) -> Result<(), SettingsError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    field,
                    reason: format!("expected a finite value >= 0, got {value}"),
                })
            }
        }

        if !self.fps.is_finite() {
            return Err(SettingsError::Invalid {
                field: "fps",
                reason: format!("expected a finite frame rate, got {}", self.fps),
            });
        }
        non_negative("stars.radius", self.stars.radius)?;
        non_negative("stars.min-speed", self.stars.min_speed)?;
        non_negative("stars.max-speed", self.stars.max_speed)?;
        non_negative("keep-distance-from-mouse", self.keep_distance_from_mouse)?;
        non_negative("offset-bounds", self.offset_bounds)?;
        if self.stars.min_speed > self.stars.max_speed {
            return Err(SettingsError::Invalid {
                field: "stars.min-speed",
                reason: format!(
                    "{} exceeds max-speed {}",
                    self.stars.min_speed, self.stars.max_speed
                ),
            });
        }
        Ok(())
    }

    /// Seconds per frame. Zero when the rate is not positive, which the pacer
    /// treats as "never sleep".
    pub fn target_interval(&self) -> f32 {
        if self.fps > 0.0 && self.fps.is_finite() {
            1.0 / self.fps
        } else {
            0.0
        }
    }

    pub fn motion_policy(&self) -> MotionPolicy {
        if self.moveaway_from_mouse {
            MotionPolicy::AvoidPointer {
                keep_distance: self.keep_distance_from_mouse,
            }
        } else {
            MotionPolicy::Drift
        }
    }

    pub fn render_policy(&self) -> RenderPolicy {
        if self.stars.draw_stars {
            RenderPolicy::Disc {
                segments: self.stars.segments,
            }
        } else {
            RenderPolicy::Hidden
        }
    }

    pub fn spawn_params(&self) -> SpawnParams {
        SpawnParams {
            count: self.stars.count,
            radius: self.stars.radius,
            color: self.stars.color,
            min_speed: self.stars.min_speed,
            max_speed: self.stars.max_speed,
        }
    }
}
