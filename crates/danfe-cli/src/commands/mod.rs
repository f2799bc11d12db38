pub mod batch;
pub mod config;
pub mod convert;
pub mod serve;

use std::path::Path;

use danfe_core::DanfeConfig;

/// Load the configuration from `--config`, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DanfeConfig> {
    match config_path {
        Some(path) => Ok(DanfeConfig::from_file(Path::new(path))?),
        None => Ok(DanfeConfig::default()),
    }
}
