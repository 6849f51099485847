use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::globe::controller::AUTO_ROTATE_SPEED;
use crate::globe::sampler::DEFAULT_DOT_SPACING;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("dot spacing must be positive, got {0}")]
    DotSpacing(f64),
    #[error("pixel ratio must be positive, got {0}")]
    PixelRatio(f64),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "globe-regions")]
#[command(author, version, about = "Interactive terminal globe of cloud regions", long_about = None)]
pub struct Config {
    /// Directory holding the region list and lookup tables
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Land GeoJSON, relative to the data directory unless absolute
    #[arg(long, default_value = "land.json")]
    pub land: PathBuf,

    /// Region list, relative to the data directory unless absolute
    #[arg(long, default_value = "regions.json")]
    pub regions: PathBuf,

    /// Land dot spacing; the sampling grid step is this times 0.08 degrees
    #[arg(long, default_value_t = DEFAULT_DOT_SPACING)]
    pub dot_spacing: f64,

    /// Braille pixels per logical unit
    #[arg(long, default_value_t = 1.0)]
    pub pixel_ratio: f64,

    /// Start with the globe standing still
    #[arg(long)]
    pub no_auto_rotate: bool,

    /// Auto-rotation speed in degrees per frame
    #[arg(long, default_value_t = AUTO_ROTATE_SPEED)]
    pub rotate_speed: f64,

    /// Log file; filter with RUST_LOG
    #[arg(long, default_value = "globe-regions.log")]
    pub log_file: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dot_spacing > 0.0) {
            return Err(ConfigError::DotSpacing(self.dot_spacing));
        }
        if !(self.pixel_ratio > 0.0) {
            return Err(ConfigError::PixelRatio(self.pixel_ratio));
        }
        Ok(())
    }

    pub fn land_path(&self) -> PathBuf {
        self.data_dir.join(&self.land)
    }

    pub fn regions_path(&self) -> PathBuf {
        self.data_dir.join(&self.regions)
    }
}
