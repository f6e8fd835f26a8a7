//! Configuration for the Neato SDK tools.
//!
//! Provides TOML-based configuration with:
//! - OAuth client settings (`[oauth]`): client id, redirect URI, scopes
//! - Token storage settings (`[storage]`): token file, validity margin
//! - Config file layering (user config dir + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, config_dir, load_config_file, load_config_with_options,
    save_config,
};
pub use error::{ConfigError, Result};
pub use types::*;
