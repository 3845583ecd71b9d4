//! Board configuration.
//!
//! Loaded from the JSON file named by `DESIGN_BOARD_CONFIG`; every section
//! falls back to its defaults when missing. `DESIGN_BOARD_SEARCH_URL`
//! overrides the search endpoint after the file is read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use egui::Color32;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::element::color::{parse_hex_color, to_hex};
use crate::error::{BoardError, BoardResult};

pub const CONFIG_PATH_ENV: &str = "DESIGN_BOARD_CONFIG";
pub const SEARCH_URL_ENV: &str = "DESIGN_BOARD_SEARCH_URL";

const DEFAULT_SEARCH_ENDPOINT: &str = "http://localhost:3000/api/products/search";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub canvas: CanvasConfig,
    pub zoom: ZoomConfig,
    pub search: SearchConfig,
    pub raster: RasterConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.0,
            step: 0.1,
        }
    }
}

impl ZoomConfig {
    /// Clamps to `[min, max]` and rounds away float drift from repeated steps.
    pub fn clamp(&self, zoom: f32) -> f32 {
        ((zoom * 100.0).round() / 100.0).max(self.min).min(self.max)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.step.is_finite()
            && self.min > 0.0
            && self.min <= self.max
            && self.step > 0.0
    }

    pub fn zoom_in(&self, zoom: f32) -> f32 {
        self.clamp(zoom + self.step)
    }

    pub fn zoom_out(&self, zoom: f32) -> f32 {
        self.clamp(zoom - self.step)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub per_page: u32,
    pub debounce_ms: u64,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_owned(),
            per_page: 20,
            debounce_ms: 300,
            timeout_secs: 10,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Pixels with all of r, g and b strictly above this become transparent.
    pub background_threshold: u8,
    pub timeout_secs: u64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            background_threshold: 240,
            timeout_secs: 10,
        }
    }
}

impl RasterConfig {
    /// Fetch timeout for remote images.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub background: String,
    /// TTF/OTF tried before the bundled fonts when rasterising text.
    pub font_path: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: to_hex(Color32::WHITE),
            font_path: None,
        }
    }
}

impl ExportConfig {
    pub fn background_color(&self) -> Color32 {
        parse_hex_color(&self.background).unwrap_or_else(|| {
            warn!("Invalid export background {:?}, using white", self.background);
            Color32::WHITE
        })
    }
}

impl BoardConfig {
    pub fn from_json(json: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_file(path: &Path) -> BoardResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config named by the environment, then applies overrides.
    /// A missing or broken file falls back to defaults with a warning.
    pub fn from_env() -> Self {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => match Self::load_file(Path::new(&path)) {
                Ok(config) => {
                    info!("Loaded board config from {}", path);
                    config
                }
                Err(e) => {
                    warn!("Ignoring config {}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        if let Ok(endpoint) = std::env::var(SEARCH_URL_ENV) {
            if !endpoint.trim().is_empty() {
                config.search.endpoint = endpoint;
            }
        }
        config
    }

    pub fn validate(&self) -> BoardResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(BoardError::CanvasSize {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }
        if !self.zoom.is_valid() {
            return Err(BoardError::ZoomRange {
                min: self.zoom.min,
                max: self.zoom.max,
                step: self.zoom.step,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BoardConfig::from_json(r#"{ "search": { "per_page": 5 } }"#).unwrap();
        assert_eq!(config.search.per_page, 5);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.canvas, CanvasConfig::default());
        assert_eq!(config.raster.background_threshold, 240);
    }

    #[test]
    fn test_zoom_steps_are_clamped() {
        let zoom = ZoomConfig::default();
        assert_eq!(zoom.zoom_in(2.0), 2.0);
        assert_eq!(zoom.zoom_out(0.5), 0.5);
        assert_eq!(zoom.zoom_in(1.0), 1.1);

        let mut z = 1.0;
        for _ in 0..3 {
            z = zoom.zoom_out(z);
        }
        assert_eq!(z, 0.7);
    }

    #[test]
    fn test_zero_canvas_is_rejected() {
        let config = BoardConfig::from_json(r#"{ "canvas": { "width": 0 } }"#).unwrap();
        assert!(matches!(config.validate(), Err(BoardError::CanvasSize { .. })));
    }

    #[test]
    fn test_inverted_zoom_range_is_rejected() {
        let config = BoardConfig::from_json(r#"{ "zoom": { "min": 2, "max": 1 } }"#).unwrap();
        assert!(matches!(config.validate(), Err(BoardError::ZoomRange { .. })));

        let config = BoardConfig::from_json(r#"{ "zoom": { "step": 0 } }"#).unwrap();
        assert!(matches!(config.validate(), Err(BoardError::ZoomRange { .. })));

        // Never panics even when handed an unvalidated range
        assert_eq!(config.zoom.clamp(5.0), 2.0);
        let inverted = ZoomConfig {
            min: 2.0,
            max: 1.0,
            step: 0.1,
        };
        assert_eq!(inverted.clamp(1.5), 1.0);
    }

    #[test]
    fn test_bad_zoom_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("design-board-zoom-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "zoom": { "min": 2, "max": 1 } }"#).unwrap();
        let result = BoardConfig::load_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(BoardError::ZoomRange { .. })));
    }

    #[test]
    fn test_background_color() {
        assert_eq!(ExportConfig::default().background_color(), Color32::WHITE);
    }
}
