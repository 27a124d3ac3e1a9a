//! Command-line flags and startup configuration.

use clap::Parser;
use folklore_map::config::{Config, MapSource};
use std::path::PathBuf;

/// Illustrated map of northern Argentina that tells regional legends.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Map image to open: an http(s) URL or a local file
    #[arg(long)]
    pub map: Option<MapSource>,

    /// Generative model used for the legends
    #[arg(long)]
    pub model: Option<String>,

    /// Environment variable holding the API key
    #[arg(long)]
    pub api_key_var: Option<String>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Everything the viewer needs at startup.
pub struct LaunchOptions {
    pub config: Config,
    /// Map given on the command line; wins over the remembered one
    pub map_override: Option<MapSource>,
    /// Problem met while reading the configuration, shown once the window opens
    pub startup_error: Option<String>,
}

impl Args {
    /// Reads the configuration file and applies the flags on top of it.
    pub fn into_launch_options(self) -> LaunchOptions {
        let (mut config, startup_error) = match Config::load(self.config.as_deref()) {
            Ok(config) => (config, None),
            Err(err) => {
                log::error!("{err}");
                (Config::default(), Some(err.to_string()))
            }
        };

        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(var) = self.api_key_var {
            config.api_key_var = var;
        }

        LaunchOptions {
            config,
            map_override: self.map,
            startup_error,
        }
    }
}
