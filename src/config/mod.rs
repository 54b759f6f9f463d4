mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// One week.
const MAX_FRAME_OFFSET_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_roots(&mut config.roots);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./mediashelf.toml",
        "~/.config/mediashelf/config.toml",
        "/etc/mediashelf/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Expand a leading `~` in root paths.
pub fn expand_roots(roots: &mut [PathBuf]) {
    for root in roots.iter_mut() {
        if let Some(s) = root.to_str() {
            *root = PathBuf::from(shellexpand::tilde(s).as_ref());
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    for root in &config.roots {
        if !root.is_absolute() {
            anyhow::bail!("Root directory must be an absolute path: {:?}", root);
        }
        if !root.is_dir() {
            tracing::warn!("Root directory does not exist: {:?}", root);
        }
    }

    let thumbs = &config.thumbnails;
    if thumbs.width == 0 || thumbs.height == 0 {
        anyhow::bail!("Thumbnail dimensions must be non-zero");
    }
    if thumbs.width > u32::from(u16::MAX) || thumbs.height > u32::from(u16::MAX) {
        anyhow::bail!("Thumbnail dimensions cannot exceed {}", u16::MAX);
    }
    if !(1..=100).contains(&thumbs.quality) {
        anyhow::bail!("Thumbnail quality must be between 1 and 100");
    }
    if !(0.0..=MAX_FRAME_OFFSET_SECS).contains(&thumbs.frame_offset_secs) {
        anyhow::bail!(
            "Frame offset must be between 0 and {} seconds",
            MAX_FRAME_OFFSET_SECS
        );
    }
    if thumbs.sniff_bytes == 0 {
        anyhow::bail!("Sniff size must be at least 1 byte");
    }

    if config.streaming.chunk_size == 0 {
        anyhow::bail!("Streaming chunk size must be at least 1 byte");
    }

    Ok(())
}
