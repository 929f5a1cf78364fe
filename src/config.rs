use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Pixel tolerance for anchor alignment. A pair matches when the
    /// distance is strictly below this value.
    pub threshold: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self { threshold: 5.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub container_width: f32,
    pub container_height: f32,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            node_width: 150.0,
            node_height: 40.0,
            container_width: 200.0,
            container_height: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Reserved for the container header band.
    pub top_margin: f32,
    pub side_margin: f32,
    pub bottom_margin: f32,
    pub spacing: f32,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            top_margin: 40.0,
            side_margin: 10.0,
            bottom_margin: 10.0,
            spacing: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphLayoutConfig {
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl Default for GraphLayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 150.0,
            rank_spacing: 200.0,
            margin_x: 50.0,
            margin_y: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// Minimum bounding-box extent for a captured stroke.
    pub min_size: f32,
    pub pressure: f32,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            min_size: 10.0,
            pressure: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub sizes: SizeConfig,
    pub pack: PackConfig,
    pub graph: GraphLayoutConfig,
    pub drawing: DrawingConfig,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}
