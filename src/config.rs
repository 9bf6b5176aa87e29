use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Hand;
use crate::foundation::error::{HandvizError, HandvizResult};
use crate::postprocess::CropRect;

/// Settings shared by the static and dynamic visualizers.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Explicit host executable. Skips discovery when set.
    pub blender_path: Option<PathBuf>,
    /// Directory holding `Manus-Hand-Left.fbx` and `Manus-Hand-Right.fbx`.
    pub resources_dir: PathBuf,
    pub static_output_dir: PathBuf,
    pub dynamic_output_dir: PathBuf,
    pub png_output_dir: PathBuf,
    /// Render a PNG next to each static export and crop it.
    pub export_png: bool,
    pub crop: CropRect,
    /// Run static samples concurrently, one host process per sample.
    pub parallel: bool,
    pub threads: Option<usize>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            blender_path: None,
            resources_dir: PathBuf::from("resources"),
            static_output_dir: PathBuf::from("output").join("static"),
            dynamic_output_dir: PathBuf::from("output").join("dynamic"),
            png_output_dir: PathBuf::from("output").join("png"),
            export_png: false,
            crop: CropRect::default(),
            parallel: false,
            threads: None,
        }
    }
}

impl VisualizerConfig {
    pub fn from_path(path: &Path) -> HandvizResult<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(s: &str) -> HandvizResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| HandvizError::validation(format!("config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> HandvizResult<()> {
        if self.crop.width == 0 || self.crop.height == 0 {
            return Err(HandvizError::validation("crop width/height must be non-zero"));
        }
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(HandvizError::validation("'threads' must be >= 1 when set"));
        }
        Ok(())
    }

    pub fn fbx_model_path(&self, hand: Hand) -> PathBuf {
        self.resources_dir.join(format!("Manus-Hand-{}.fbx", hand.as_str()))
    }
}
