//! Configuration for the view and its tile sources.
//!
//! Everything deserialises from JSON with defaults for missing fields, so a
//! config can be as small as `{"sources": [{"url_template": "..."}]}`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    core::{
        camera::Camera,
        constants::{DEFAULT_MAX_ZOOM, MAX_SUPPORTED_ZOOM, TILE_SIZE},
    },
    MapError, Result,
};

const PLACEHOLDERS: [&str; 3] = ["{x}", "{y}", "{z}"];

/// Viewport and camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub tile_size: u32,
    pub max_zoom: i32,
    pub width: u32,
    pub height: u32,
    pub camera: Camera,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            max_zoom: DEFAULT_MAX_ZOOM,
            width: 800,
            height: 600,
            camera: Camera::default(),
        }
    }
}

impl ViewConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(MapError::Config("tile_size must be positive".to_string()));
        }
        check_max_zoom(self.max_zoom)?;
        let camera = &self.camera;
        if !camera.lon.is_finite() || !camera.lat.is_finite() || !camera.zoom.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "camera {:?} is not finite",
                self.camera
            )));
        }
        Ok(())
    }
}

/// One templated tile source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSourceConfig {
    pub url_template: String,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: i32,
    #[serde(default)]
    pub name: Option<String>,
}

impl TileSourceConfig {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            max_zoom: DEFAULT_MAX_ZOOM,
            name: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_max_zoom(self.max_zoom)?;
        let missing: Vec<&str> = PLACEHOLDERS
            .iter()
            .copied()
            .filter(|p| !self.url_template.contains(p))
            .collect();
        if !missing.is_empty() {
            return Err(MapError::Config(format!(
                "url template {:?} is missing {}",
                self.url_template,
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

/// A view plus the sources layered on it, bottom first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub view: ViewConfig,
    pub sources: Vec<TileSourceConfig>,
}

impl MapConfig {
    /// Parses and validates a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.view.validate()?;
        for source in &self.sources {
            source.validate()?;
        }
        Ok(())
    }
}

fn default_max_zoom() -> i32 {
    DEFAULT_MAX_ZOOM
}

fn check_max_zoom(max_zoom: i32) -> Result<()> {
    if !(0..=MAX_SUPPORTED_ZOOM).contains(&max_zoom) {
        return Err(MapError::Config(format!(
            "max_zoom {} outside 0..={}",
            max_zoom, MAX_SUPPORTED_ZOOM
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("maplet-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"sources": [{"url_template": "mem://{z}/{x}/{y}"}]}"#).unwrap();
        let config = MapConfig::from_file(&path);
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.view, ViewConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = MapConfig::from_file("/nonexistent/maplet.json").unwrap_err();
        assert!(matches!(err, MapError::Io(_)));
    }

    #[test]
    fn test_defaults() {
        let config = ViewConfig::default();
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.max_zoom, 18);
        assert_eq!(config.camera, Camera::new(-3.0, 40.0, 7.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = MapConfig::from_json(
            r#"{
                "view": {"width": 1024, "camera": {"lon": 30.3223, "lat": 59.9292, "zoom": 12.0}},
                "sources": [
                    {"url_template": "http://t2.openseamap.org/tile/{z}/{x}/{y}.png"},
                    {
                        "url_template": "http://t1.openseamap.org/seamark/{z}/{x}/{y}.png",
                        "name": "seamarks",
                        "max_zoom": 17
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.view.width, 1024);
        assert_eq!(config.view.height, 600);
        assert_eq!(config.view.camera.zoom, 12.0);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].max_zoom, 18);
        assert_eq!(config.sources[1].name.as_deref(), Some("seamarks"));
        assert_eq!(config.sources[1].max_zoom, 17);
    }

    #[test]
    fn test_round_trip_json() {
        let mut config = MapConfig::default();
        config.sources.push(TileSourceConfig::new("{z}/{x}/{y}"));
        let parsed = MapConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validation_errors() {
        let mut view = ViewConfig::default();
        view.tile_size = 0;
        assert!(matches!(view.validate(), Err(MapError::Config(_))));

        let mut view = ViewConfig::default();
        view.max_zoom = 31;
        assert!(view.validate().is_err());

        let source = TileSourceConfig::new("http://t/{z}/{x}.png");
        match source.validate() {
            Err(MapError::Config(msg)) => assert!(msg.contains("{y}")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        assert!(matches!(
            MapConfig::from_json("{ not json"),
            Err(MapError::Serialization(_))
        ));
    }
}
