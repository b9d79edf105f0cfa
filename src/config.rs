// src/config.rs
use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Id of the optional `<script type="application/json">` block in `index.html`.
pub const CONFIG_ELEMENT_ID: &str = "deep-zoomer-config";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewer: ViewerConfig,
    pub upload: UploadTiming,
}

/// Options handed to the rendering engine when a session is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Seconds a zoom or home animation takes to settle.
    pub animation_time: f64,
    /// Seconds the image takes to fade in once decoded.
    pub blend_time: f64,
    pub navigator_enabled: bool,
    pub navigator_corner: NavigatorCorner,
    /// Navigator width as a fraction of the viewport width.
    pub navigator_size_ratio: f64,
    /// Upper bound on screen pixels per image pixel.
    pub max_zoom_pixel_ratio: f64,
    /// Lower bound on zoom, relative to the fit-to-viewport zoom.
    pub min_zoom_level: f64,
    pub scroll_zoom_factor: f64,
    pub pan_constrained: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigatorCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

/// Pacing of the simulated processing sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadTiming {
    pub progress_step: u8,
    pub tick_interval_ms: u32,
    pub handoff_delay_ms: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            animation_time: 0.5,
            blend_time: 0.1,
            navigator_enabled: true,
            navigator_corner: NavigatorCorner::BottomRight,
            navigator_size_ratio: 0.15,
            max_zoom_pixel_ratio: 2.0,
            min_zoom_level: 0.8,
            scroll_zoom_factor: 1.2,
            pan_constrained: false,
        }
    }
}

impl Default for UploadTiming {
    fn default() -> Self {
        Self {
            progress_step: 10,
            tick_interval_ms: 200,
            handoff_delay_ms: 500,
        }
    }
}

impl NavigatorCorner {
    /// Inline CSS offsets anchoring the navigator inside the viewer stage.
    pub fn css(&self) -> &'static str {
        match self {
            NavigatorCorner::TopLeft => "top: 12px; left: 12px;",
            NavigatorCorner::TopRight => "top: 12px; right: 12px;",
            NavigatorCorner::BottomLeft => "bottom: 12px; left: 12px;",
            NavigatorCorner::BottomRight => "bottom: 12px; right: 12px;",
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let config: AppConfig =
            serde_json::from_str(raw).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the inline configuration block of the host page, falling back to
    /// the defaults when it is missing or unusable.
    pub fn load() -> Self {
        let Some(raw) = inline_config_text() else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => {
                log::info!("Loaded inline configuration");
                config
            }
            Err(e) => {
                log::warn!("Ignoring inline configuration: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let v = &self.viewer;
        if !(v.animation_time >= 0.0 && v.blend_time >= 0.0) {
            return Err(AppError::Config(
                "animation_time and blend_time must be non-negative".to_string(),
            ));
        }
        if !(v.navigator_size_ratio > 0.0 && v.navigator_size_ratio <= 1.0) {
            return Err(AppError::Config(format!(
                "navigator_size_ratio must be in (0, 1], got {}",
                v.navigator_size_ratio
            )));
        }
        if !(v.max_zoom_pixel_ratio > 0.0 && v.min_zoom_level > 0.0) {
            return Err(AppError::Config(
                "zoom bounds must be positive".to_string(),
            ));
        }
        if !(v.scroll_zoom_factor > 1.0) {
            return Err(AppError::Config(format!(
                "scroll_zoom_factor must be greater than 1, got {}",
                v.scroll_zoom_factor
            )));
        }
        let u = &self.upload;
        if u.progress_step == 0 || u.progress_step > 100 {
            return Err(AppError::Config(format!(
                "progress_step must be in 1..=100, got {}",
                u.progress_step
            )));
        }
        if u.tick_interval_ms == 0 {
            return Err(AppError::Config(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn inline_config_text() -> Option<String> {
    let document = gloo_utils::window().document()?;
    let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
    element.text_content().filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.viewer.animation_time, 0.5);
        assert_eq!(config.viewer.navigator_corner, NavigatorCorner::BottomRight);
        assert_eq!(config.viewer.navigator_size_ratio, 0.15);
        assert_eq!(config.viewer.max_zoom_pixel_ratio, 2.0);
        assert_eq!(config.viewer.min_zoom_level, 0.8);
        assert_eq!(config.viewer.scroll_zoom_factor, 1.2);
        assert!(!config.viewer.pan_constrained);
        assert_eq!(config.upload.progress_step, 10);
        assert_eq!(config.upload.tick_interval_ms, 200);
        assert_eq!(config.upload.handoff_delay_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{ "viewer": { "navigator_corner": "top-left", "animation_time": 1.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.viewer.navigator_corner, NavigatorCorner::TopLeft);
        assert_eq!(config.viewer.animation_time, 1.0);
        assert_eq!(config.viewer.scroll_zoom_factor, 1.2);
        assert_eq!(config.upload, UploadTiming::default());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = AppConfig::from_json("{ viewer: ").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(AppConfig::from_json(r#"{ "viewer": { "scroll_zoom_factor": 0.9 } }"#).is_err());
        assert!(AppConfig::from_json(r#"{ "viewer": { "navigator_size_ratio": 0 } }"#).is_err());
        assert!(AppConfig::from_json(r#"{ "upload": { "progress_step": 0 } }"#).is_err());
        assert!(AppConfig::from_json(r#"{ "upload": { "tick_interval_ms": 0 } }"#).is_err());
    }

    #[test]
    fn test_corner_css() {
        assert!(NavigatorCorner::BottomRight.css().contains("bottom"));
        assert!(NavigatorCorner::BottomRight.css().contains("right"));
        assert!(NavigatorCorner::TopLeft.css().contains("top"));
    }
}
