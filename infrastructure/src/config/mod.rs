//! Configuration file loading for assembly-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ASSEMBLY_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./assembly.toml` or `./.assembly.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/assembly-quorum/config.toml`
//! 5. Default values
//!
//! Command-line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAnalysisConfig, FileAnthropicConfig, FileConfig,
    FileGenerationConfig, FileOllamaConfig, FileOpenAiConfig, FileOutputConfig, FileOutputFormat,
    FilePathsConfig, FileProvidersConfig, FileRunConfig,
};
pub use loader::ConfigLoader;
