//! Scanner configuration
//!
//! Tuning values for every pipeline stage, stored in TOML format. The
//! thresholds are empirically tuned rather than derived, so each one is an
//! overridable setting with the tuned value as its default.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::ResolverConfig;
use crate::scan::AutoScanConfig;
use crate::vision::{OcrConfig, PreprocessConfig, RectangleConfig};

/// Scanner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Frame preprocessing settings
    pub preprocess: PreprocessConfig,
    /// Rectangle presence detection settings
    pub rectangle: RectangleConfig,
    /// Text recognition settings
    pub ocr: OcrConfig,
    /// Auto-scan scheduling settings
    pub auto_scan: AutoScanConfig,
    /// Catalog resolution settings
    pub resolver: ResolverConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            rectangle: RectangleConfig::default(),
            ocr: OcrConfig::default(),
            auto_scan: AutoScanConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<ScannerConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ScannerConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &ScannerConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "cardscan", "CardScan")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Default location of the scanner configuration file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("scanner.toml"))
}
