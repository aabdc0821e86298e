use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::element::{FontStyle, FontWeight};
use crate::error::ConfigError;
use crate::state::View;

/// Environment variable naming a JSON config file for the binary
pub const CONFIG_ENV_VAR: &str = "MOCKUP_EDITOR_CONFIG";

/// Background image sources for each side of the product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductViews {
    pub front: Option<String>,
    pub back: Option<String>,
    pub left: Option<String>,
    pub right: Option<String>,
    /// Used for any view without its own image
    pub fallback: Option<String>,
}

impl ProductViews {
    pub fn background_for(&self, view: View) -> Option<&str> {
        let specific = match view {
            View::Front => &self.front,
            View::Back => &self.back,
            View::Left => &self.left,
            View::Right => &self.right,
        };
        specific.as_deref().or(self.fallback.as_deref())
    }

    /// Every distinct configured source
    pub fn sources(&self) -> Vec<&str> {
        let mut out: Vec<&str> = [&self.front, &self.back, &self.left, &self.right, &self.fallback]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// A font file registered under a family name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFace {
    pub family: String,
    pub path: PathBuf,
    #[serde(default)]
    pub weight: FontWeight,
    #[serde(default)]
    pub style: FontStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Hit radius of resize and rotate handles
    pub handle_radius: f32,
    /// Resize hotspots sit this far up-left of each corner
    pub handle_offset: f32,
    /// Distance of the rotate handle below the element
    pub rotate_handle_offset: f32,
    /// Degrees per discrete rotate step
    pub rotate_step: f32,
    pub nudge_step: f32,
    pub nudge_step_large: f32,
    pub history_limit: usize,
    pub image_load_timeout_ms: u64,
    pub fonts: Vec<FontFace>,
    pub product: ProductViews,
    /// Where the host stores saved designs
    pub design_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400.0,
            canvas_height: 400.0,
            handle_radius: 12.0,
            handle_offset: 6.0,
            rotate_handle_offset: 30.0,
            rotate_step: 15.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            history_limit: crate::command::DEFAULT_HISTORY_LIMIT,
            image_load_timeout_ms: 15_000,
            fonts: Vec::new(),
            product: ProductViews::default(),
            design_dir: PathBuf::from("designs"),
        }
    }
}

impl EditorConfig {
    /// Read and validate a JSON config file; missing keys take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `MOCKUP_EDITOR_CONFIG` if set, otherwise defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("handle_radius", self.handle_radius),
            ("rotate_step", self.rotate_step),
            ("nudge_step", self.nudge_step),
            ("nudge_step_large", self.nudge_step_large),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".into()));
        }
        if self.image_load_timeout_ms == 0 {
            return Err(ConfigError::Invalid("image_load_timeout_ms must be at least 1".into()));
        }
        Ok(())
    }

    pub fn image_load_timeout(&self) -> Duration {
        Duration::from_millis(self.image_load_timeout_ms)
    }
}
