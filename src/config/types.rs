use serde::{Deserialize, Serialize};

use crate::transcode::{
    TranscodeSettings, DEFAULT_MAX_DECODE_PIXELS, DEFAULT_MAX_SIZE, DEFAULT_QUALITY,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub optimize: OptimizeConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptimizeConfig {
    /// Largest texture edge in pixels
    #[serde(default = "default_max_size")]
    pub max_size: u32,

    /// JPEG quality (1-100)
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Worker threads (default: number of CPUs)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Refuse to decode images with more pixels than this
    #[serde(default = "default_max_decode_pixels")]
    pub max_decode_pixels: u64,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            quality: default_quality(),
            workers: None,
            max_decode_pixels: default_max_decode_pixels(),
        }
    }
}

impl OptimizeConfig {
    pub fn transcode_settings(&self) -> TranscodeSettings {
        TranscodeSettings {
            max_size: self.max_size,
            quality: self.quality,
            max_decode_pixels: self.max_decode_pixels,
        }
    }
}

fn default_max_size() -> u32 {
    DEFAULT_MAX_SIZE
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

fn default_max_decode_pixels() -> u64 {
    DEFAULT_MAX_DECODE_PIXELS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    /// Extensions of tileset descriptor files copied alongside tiles
    #[serde(default = "default_descriptor_extensions")]
    pub descriptor_extensions: Vec<String>,

    /// Follow symbolic links while walking the input tree
    #[serde(default = "default_true")]
    pub follow_links: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            descriptor_extensions: default_descriptor_extensions(),
            follow_links: true,
        }
    }
}

fn default_descriptor_extensions() -> Vec<String> {
    vec!["json".to_string()]
}

fn default_true() -> bool {
    true
}
