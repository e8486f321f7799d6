use std::path::PathBuf;

use clap::Parser;

use crate::config::FieldConfig;
use crate::consts::{DEFAULT_CONTAINER_ID, DEFAULT_FPS};
use crate::errors::DriftResult;

#[derive(Parser, Default, Debug, Clone)]
#[clap(name = "driftfield", version, about)]
pub struct CliArgs {
    /// JSON particle configuration (particles.js shape)
    #[clap(long, value_parser, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of particles, overrides particles.number.value
    #[clap(long, value_parser, value_name = "N")]
    pub count: Option<f64>,

    /// Radius scale factor, overrides particles.size.value
    #[clap(long, value_parser, value_name = "SCALE")]
    pub size: Option<f64>,

    /// Container to mount the field into
    #[clap(long, value_parser, default_value = DEFAULT_CONTAINER_ID)]
    pub container: String,

    /// Target frame rate
    #[clap(
        long,
        default_value_t = DEFAULT_FPS,
        value_parser = clap::value_parser!(u32).range(1..=240)
    )]
    pub fps: u32,

    /// Stop after this many frames instead of running until interrupted
    #[clap(long, value_parser, value_name = "N")]
    pub frames: Option<u64>,

    /// Seed for reproducible particle layouts
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// Log level written to the log file (error, warn, info, debug, trace)
    #[clap(long, value_parser, default_value = "info")]
    pub log_level: String,
}

impl CliArgs {
    /// Config file contents (if any) with command-line overrides applied
    pub fn field_config(&self) -> DriftResult<FieldConfig> {
        let mut config = match &self.config {
            Some(path) => FieldConfig::from_file(path)?,
            None => FieldConfig::default(),
        };
        if let Some(count) = self.count {
            config = config.with_number(count);
        }
        if let Some(size) = self.size {
            config = config.with_size(size);
        }
        Ok(config)
    }
}
